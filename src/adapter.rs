//! Rescales utility-scale (megawatt) forecast series to a single facility's
//! kilowatt scale.
//!
//! The upstream forecasting ensemble predicts system-level load, solar and
//! wind in MW. The dispatch engine operates on one facility whose demand peak
//! should sit near 80% of its contracted grid capacity, so all three power
//! series are multiplied by a single linear factor derived from the load
//! maximum. Tariffs and TOU bands pass through unchanged.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ContractConfig;
use crate::domain::{ForecastPoint, ForecastSeries, TouPeriod};

/// Facility demand peak is targeted at this fraction of contract capacity.
pub const TARGET_PEAK_RATIO: f64 = 0.8;

/// One hour of system-scale forecast, as produced upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemForecastPoint {
    pub timestamp: DateTime<FixedOffset>,
    pub load_mw: f64,
    pub solar_mw: f64,
    pub wind_mw: f64,
    pub tariff_ntd_per_kwh: f64,
    pub period: TouPeriod,
}

#[derive(Debug, Clone)]
pub struct ForecastAdapter {
    max_contract_kw: f64,
}

impl ForecastAdapter {
    pub fn new(contract: &ContractConfig) -> Self {
        Self {
            max_contract_kw: contract.max_contract_kw,
        }
    }

    /// Linear factor mapping MW values onto the facility's kW scale.
    ///
    /// A non-positive load maximum falls back to 1 MW so the division is
    /// always defined.
    pub fn scale_factor(&self, points: &[SystemForecastPoint]) -> f64 {
        let load_max_mw = points.iter().map(|p| p.load_mw).fold(0.0, f64::max);
        let load_max_mw = if load_max_mw > 0.0 { load_max_mw } else { 1.0 };
        (self.max_contract_kw * TARGET_PEAK_RATIO) / (load_max_mw * 1000.0)
    }

    /// Convert a system-scale series into facility-scale optimizer input.
    /// Deterministic: identical inputs always produce identical output.
    pub fn scale(&self, points: &[SystemForecastPoint]) -> ForecastSeries {
        let kw_per_mw = 1000.0 * self.scale_factor(points);

        let scaled: Vec<ForecastPoint> = points
            .iter()
            .map(|p| ForecastPoint {
                timestamp: p.timestamp,
                load_kw: p.load_mw * kw_per_mw,
                solar_kw: p.solar_mw * kw_per_mw,
                wind_kw: p.wind_mw * kw_per_mw,
                tariff_ntd_per_kwh: p.tariff_ntd_per_kwh,
                period: p.period,
            })
            .collect();

        let max_kw = scaled.iter().map(|p| p.load_kw).fold(0.0, f64::max);
        let avg_kw = if scaled.is_empty() {
            0.0
        } else {
            scaled.iter().map(|p| p.load_kw).sum::<f64>() / scaled.len() as f64
        };
        info!(max_kw, avg_kw, "scaled system forecast to facility load");

        ForecastSeries::new(scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn point(load_mw: f64, solar_mw: f64) -> SystemForecastPoint {
        SystemForecastPoint {
            timestamp: FixedOffset::east_opt(8 * 3600)
                .unwrap()
                .with_ymd_and_hms(2024, 6, 1, 0, 0, 0)
                .unwrap(),
            load_mw,
            solar_mw,
            wind_mw: 0.0,
            tariff_ntd_per_kwh: 5.0,
            period: TouPeriod::OffPeak,
        }
    }

    #[test]
    fn test_peak_load_lands_at_target_ratio() {
        let adapter = ForecastAdapter::new(&ContractConfig::default());
        let points = vec![point(30_000.0, 5_000.0), point(25_000.0, 0.0)];
        let series = adapter.scale(&points);

        let max_load = series.loads().iter().cloned().fold(0.0, f64::max);
        assert!((max_load - 500.0 * TARGET_PEAK_RATIO).abs() < 1e-9);
        // Solar scales by the same factor, preserving its ratio to load.
        let ratio = series.points()[0].solar_kw / series.points()[0].load_kw;
        assert!((ratio - 5_000.0 / 30_000.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_load_guard() {
        let adapter = ForecastAdapter::new(&ContractConfig::default());
        let factor = adapter.scale_factor(&[point(0.0, 0.0)]);
        assert!((factor - 500.0 * TARGET_PEAK_RATIO / 1000.0).abs() < 1e-12);
    }

    #[test]
    fn test_scaling_is_reproducible() {
        let adapter = ForecastAdapter::new(&ContractConfig::default());
        let points = vec![point(28_500.0, 3_200.0), point(31_000.0, 0.0)];
        let a = serde_json::to_string(adapter.scale(&points).points()).unwrap();
        let b = serde_json::to_string(adapter.scale(&points).points()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_tariffs_pass_through() {
        let adapter = ForecastAdapter::new(&ContractConfig::default());
        let series = adapter.scale(&[point(30_000.0, 0.0)]);
        assert_eq!(series.points()[0].tariff_ntd_per_kwh, 5.0);
        assert_eq!(series.points()[0].period, TouPeriod::OffPeak);
    }
}
