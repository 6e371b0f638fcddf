//! Rule-based observations derived from a solved dispatch plan.
//!
//! Rules run in a fixed order and each contributes at most one entry, so the
//! output is deterministic and its ordering stable. The list is never empty.

use crate::config::EconomicsConfig;

/// An hour counts as off-peak up to this multiple of the reference off-peak rate.
const OFF_PEAK_TOLERANCE: f64 = 1.1;
/// Minimum peak-hour import reduction worth reporting.
const MIN_PEAK_SAVING_PERCENT: f64 = 5.0;
/// Solar utilization below this suggests storage expansion.
const ADEQUATE_SOLAR_UTILIZATION_PERCENT: f64 = 80.0;

pub struct RecommendationGenerator<'a> {
    economics: &'a EconomicsConfig,
}

impl<'a> RecommendationGenerator<'a> {
    pub fn new(economics: &'a EconomicsConfig) -> Self {
        Self { economics }
    }

    /// `battery_net` is signed: positive while charging, negative while
    /// discharging.
    pub fn generate(
        &self,
        load: &[f64],
        solar: &[f64],
        grid: &[f64],
        battery_net: &[f64],
        tariffs: &[f64],
        peak_reduction_percent: f64,
    ) -> Vec<String> {
        let mut recommendations = Vec::new();

        // 1. Peak-period import reduction versus serving the load directly.
        let peak_floor = self.economics.peak_tariff_floor();
        let peak_hours: Vec<usize> = (0..tariffs.len())
            .filter(|&t| tariffs[t] >= peak_floor)
            .collect();
        if let (Some(&first), Some(&last)) = (peak_hours.first(), peak_hours.last()) {
            let peak_load: f64 = peak_hours.iter().map(|&h| load[h]).sum();
            let peak_grid: f64 = peak_hours.iter().map(|&h| grid[h]).sum();
            if peak_load > 0.0 {
                let reduction = (peak_load - peak_grid) / peak_load * 100.0;
                if reduction >= MIN_PEAK_SAVING_PERCENT {
                    recommendations.push(format!(
                        "Peak period ({first}:00-{}:00): grid import cut by {reduction:.1}% \
                         relative to forecast load",
                        last + 1
                    ));
                }
            }
        }

        // 2. Battery contribution.
        let total_discharge: f64 = battery_net.iter().map(|b| (-b).max(0.0)).sum();
        if total_discharge > 0.0 {
            recommendations.push(format!(
                "Battery supplied {total_discharge:.1} kWh during high-tariff hours, \
                 reducing peak demand"
            ));
        }

        // 3. Solar utilization, always reported.
        let solar_available: f64 = solar.iter().sum();
        let solar_used: f64 = solar.iter().zip(load).map(|(s, l)| s.min(*l)).sum();
        let utilization = if solar_available > 0.0 {
            solar_used / solar_available * 100.0
        } else {
            0.0
        };
        if utilization < ADEQUATE_SOLAR_UTILIZATION_PERCENT {
            recommendations.push(format!(
                "Solar utilization at {utilization:.1}%; consider expanding storage \
                 capacity to raise it"
            ));
        } else {
            recommendations.push(format!(
                "Solar utilization at {utilization:.1}%; utilization is adequate"
            ));
        }

        // 4. Peak shaving magnitude.
        if peak_reduction_percent > MIN_PEAK_SAVING_PERCENT {
            recommendations.push(format!(
                "Peak shaving is significant: peak load reduced by {peak_reduction_percent:.1}%"
            ));
        }

        // 5. Off-peak charging.
        let off_peak_ceiling = self.economics.off_peak_rate_ntd_per_kwh * OFF_PEAK_TOLERANCE;
        let off_peak_hours: Vec<usize> = (0..tariffs.len())
            .filter(|&t| tariffs[t] <= off_peak_ceiling)
            .collect();
        if let (Some(&first), Some(&last)) = (off_peak_hours.first(), off_peak_hours.last()) {
            let off_peak_charge: f64 = off_peak_hours
                .iter()
                .map(|&h| battery_net[h].max(0.0))
                .sum();
            if off_peak_charge > 0.0 {
                recommendations.push(format!(
                    "Charge the battery during off-peak hours ({first}:00-{}:00); \
                     scheduled charging totals {off_peak_charge:.1} kWh",
                    last + 1
                ));
            }
        }

        if recommendations.is_empty() {
            recommendations.push("System operating normally; no additional recommendations".to_string());
        }

        recommendations
    }
}

/// Single entry emitted when the engine falls back to the baseline plan.
pub(crate) fn baseline_recommendation() -> String {
    "No optimal dispatch found; consider installing battery storage to enable cost optimization"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator_rules(
        load: &[f64],
        solar: &[f64],
        grid: &[f64],
        battery_net: &[f64],
        tariffs: &[f64],
        peak_reduction_percent: f64,
    ) -> Vec<String> {
        let economics = EconomicsConfig::default();
        RecommendationGenerator::new(&economics).generate(
            load,
            solar,
            grid,
            battery_net,
            tariffs,
            peak_reduction_percent,
        )
    }

    #[test]
    fn test_never_empty() {
        let recs = generator_rules(&[100.0], &[0.0], &[100.0], &[0.0], &[5.0], 0.0);
        assert!(!recs.is_empty());
    }

    #[test]
    fn test_peak_reduction_rule_fires() {
        // Hour 1 is peak (9.34 >= 8.406) and grid import is 40% below load.
        let recs = generator_rules(
            &[100.0, 100.0],
            &[0.0, 0.0],
            &[100.0, 60.0],
            &[0.0, -40.0],
            &[2.29, 9.34],
            0.0,
        );
        assert!(recs[0].contains("Peak period (1:00-2:00)"));
        assert!(recs[0].contains("40.0%"));
    }

    #[test]
    fn test_battery_discharge_rule_reports_total() {
        let recs = generator_rules(
            &[100.0, 100.0],
            &[0.0, 0.0],
            &[100.0, 70.0],
            &[10.0, -25.0],
            &[5.0, 5.0],
            0.0,
        );
        assert!(recs.iter().any(|r| r.contains("Battery supplied 25.0 kWh")));
    }

    #[test]
    fn test_solar_utilization_always_reported() {
        let no_solar = generator_rules(&[100.0], &[0.0], &[100.0], &[0.0], &[5.0], 0.0);
        assert!(no_solar.iter().any(|r| r.contains("Solar utilization at 0.0%")));
        assert!(no_solar.iter().any(|r| r.contains("expanding storage")));

        let full_use = generator_rules(&[100.0], &[80.0], &[20.0], &[0.0], &[5.0], 0.0);
        assert!(full_use.iter().any(|r| r.contains("utilization is adequate")));
    }

    #[test]
    fn test_off_peak_charging_rule() {
        // 2.29 * 1.1 = 2.519, so a 2.3 tariff hour is off-peak.
        let recs = generator_rules(
            &[100.0, 100.0],
            &[0.0, 0.0],
            &[130.0, 70.0],
            &[30.0, -27.0],
            &[2.3, 5.0],
            0.0,
        );
        assert!(recs
            .iter()
            .any(|r| r.contains("off-peak hours (0:00-1:00)") && r.contains("30.0 kWh")));
    }

    #[test]
    fn test_peak_shaving_magnitude_threshold() {
        let quiet = generator_rules(&[100.0], &[0.0], &[100.0], &[0.0], &[5.0], 4.0);
        assert!(!quiet.iter().any(|r| r.contains("Peak shaving is significant")));

        let strong = generator_rules(&[100.0], &[0.0], &[100.0], &[0.0], &[5.0], 12.5);
        assert!(strong
            .iter()
            .any(|r| r.contains("peak load reduced by 12.5%")));
    }
}
