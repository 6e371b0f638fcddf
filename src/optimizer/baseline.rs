//! "Do-nothing" reference dispatch: renewables are self-consumed up to load,
//! the battery sits idle, and the grid covers the remainder.
//!
//! Doubles as the economic baseline for savings computation and as the
//! literal fallback plan when the solver cannot produce an optimal result.

/// Hour-by-hour baseline dispatch and its total cost.
#[derive(Debug, Clone)]
pub struct BaselinePlan {
    pub cost_ntd: f64,
    pub grid_kw: Vec<f64>,
    pub solar_used_kw: Vec<f64>,
    pub wind_used_kw: Vec<f64>,
}

pub struct BaselineEstimator;

impl BaselineEstimator {
    /// Reference cost with renewables netted out: `Σ max(load - solar - wind, 0) · tariff`.
    ///
    /// This is the single baseline-cost definition used everywhere, so the
    /// savings percentage is consistent between optimal and degraded results.
    pub fn cost(load: &[f64], solar: &[f64], wind: &[f64], tariffs: &[f64]) -> f64 {
        (0..load.len())
            .map(|t| (load[t] - solar[t] - wind[t]).max(0.0) * tariffs[t])
            .sum()
    }

    pub fn estimate(load: &[f64], solar: &[f64], wind: &[f64], tariffs: &[f64]) -> BaselinePlan {
        let t_len = load.len();
        let mut grid_kw = Vec::with_capacity(t_len);
        let mut solar_used_kw = Vec::with_capacity(t_len);
        let mut wind_used_kw = Vec::with_capacity(t_len);

        for t in 0..t_len {
            let net_load = (load[t] - solar[t] - wind[t]).max(0.0);
            let solar_used = solar[t].min(load[t]);
            let wind_used = wind[t].min(load[t] - solar_used);
            grid_kw.push(net_load);
            solar_used_kw.push(solar_used);
            wind_used_kw.push(wind_used.max(0.0));
        }

        BaselinePlan {
            cost_ntd: Self::cost(load, solar, wind, tariffs),
            grid_kw,
            solar_used_kw,
            wind_used_kw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_nets_renewables() {
        let cost = BaselineEstimator::cost(
            &[100.0, 100.0],
            &[50.0, 0.0],
            &[0.0, 0.0],
            &[2.0, 5.0],
        );
        assert_eq!(cost, (100.0 - 50.0) * 2.0 + 100.0 * 5.0);
    }

    #[test]
    fn test_surplus_renewables_clamp_to_zero() {
        // Generation exceeds load: no negative grid import.
        let plan = BaselineEstimator::estimate(&[40.0], &[60.0], &[10.0], &[5.0]);
        assert_eq!(plan.grid_kw[0], 0.0);
        assert_eq!(plan.cost_ntd, 0.0);
        assert_eq!(plan.solar_used_kw[0], 40.0);
        assert_eq!(plan.wind_used_kw[0], 0.0);
    }

    #[test]
    fn test_wind_fills_after_solar() {
        let plan = BaselineEstimator::estimate(&[100.0], &[30.0], &[50.0], &[5.0]);
        assert_eq!(plan.solar_used_kw[0], 30.0);
        assert_eq!(plan.wind_used_kw[0], 50.0);
        assert_eq!(plan.grid_kw[0], 20.0);
    }
}
