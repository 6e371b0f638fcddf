//! Cost-minimal dispatch planning for a facility with battery storage and
//! on-site renewables.
//!
//! [`ScheduleOptimizer::optimize`] validates its input, solves the hourly
//! MILP and extracts the plan. Any solver-side failure (missing backend,
//! infeasible, unbounded, timed out) is absorbed: the engine substitutes the
//! baseline dispatch and reports `Baseline` status instead of erroring.

pub mod baseline;
pub mod milp;
pub mod recommendations;
pub mod scenario;

use chrono::{DateTime, FixedOffset};
use tracing::{info, warn};

pub use baseline::{BaselineEstimator, BaselinePlan};
pub use milp::SolveFailure;
pub use recommendations::RecommendationGenerator;
pub use scenario::{Scenario, ScenarioOutcome, ScenarioSimulator, DEFAULT_INITIAL_SOC};

use crate::config::DispatchConfig;
use crate::domain::{
    DispatchStatus, ForecastSeries, HourlyDispatch, OptimizationResult,
};
use crate::error::DispatchError;
use milp::SolvedDispatch;

pub struct ScheduleOptimizer {
    config: DispatchConfig,
}

impl ScheduleOptimizer {
    /// Build an optimizer around a validated, immutable configuration.
    pub fn new(config: DispatchConfig) -> Result<Self, DispatchError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Compute a dispatch plan for a facility-scale forecast series.
    pub fn optimize(
        &self,
        series: &ForecastSeries,
        initial_soc: f64,
    ) -> Result<OptimizationResult, DispatchError> {
        self.run(
            &series.loads(),
            &series.solars(),
            &series.winds(),
            &series.tariffs(),
            Some(&series.timestamps()),
            initial_soc,
        )
    }

    /// Column-array variant of [`Self::optimize`] for callers without
    /// timestamped input. All arrays must have equal, non-zero length.
    pub fn optimize_components(
        &self,
        load: &[f64],
        solar: &[f64],
        wind: &[f64],
        tariffs: &[f64],
        initial_soc: f64,
    ) -> Result<OptimizationResult, DispatchError> {
        self.run(load, solar, wind, tariffs, None, initial_soc)
    }

    fn run(
        &self,
        load: &[f64],
        solar: &[f64],
        wind: &[f64],
        tariffs: &[f64],
        timestamps: Option<&[DateTime<FixedOffset>]>,
        initial_soc: f64,
    ) -> Result<OptimizationResult, DispatchError> {
        validate_inputs(load, solar, wind, tariffs, initial_soc)?;

        info!(horizon = load.len(), initial_soc, "starting dispatch optimization");

        match milp::solve(&self.config, load, solar, wind, tariffs, initial_soc) {
            Ok(solved) => {
                let result = self.optimal_result(load, solar, wind, tariffs, timestamps, &solved);
                info!(
                    savings_ntd = result.savings_ntd,
                    savings_percent = result.savings_percent,
                    "optimization complete"
                );
                Ok(result)
            }
            Err(failure) => {
                warn!(%failure, "no optimal plan; falling back to baseline dispatch");
                Ok(self.baseline_result(load, solar, wind, tariffs, timestamps, initial_soc))
            }
        }
    }

    fn optimal_result(
        &self,
        load: &[f64],
        solar: &[f64],
        wind: &[f64],
        tariffs: &[f64],
        timestamps: Option<&[DateTime<FixedOffset>]>,
        solved: &SolvedDispatch,
    ) -> OptimizationResult {
        let t_len = load.len();
        let capacity = self.config.battery.capacity_kwh;
        let credit = self.config.economics.renewable_credit_factor;

        let battery_net: Vec<f64> = (0..t_len)
            .map(|t| solved.charge_kw[t] - solved.discharge_kw[t])
            .collect();

        let grid_cost: f64 = (0..t_len).map(|t| solved.grid_kw[t] * tariffs[t]).sum();
        let renewable_credit: f64 = (0..t_len)
            .map(|t| (solved.solar_used_kw[t] + solved.wind_used_kw[t]) * tariffs[t])
            .sum::<f64>()
            * credit;
        let optimized_cost = grid_cost - renewable_credit;

        let baseline_cost = BaselineEstimator::cost(load, solar, wind, tariffs);
        let savings = baseline_cost - optimized_cost;
        let savings_percent = if baseline_cost > 0.0 {
            savings / baseline_cost * 100.0
        } else {
            0.0
        };

        let baseline_peak = load.iter().cloned().fold(0.0, f64::max);
        let optimized_peak = solved.grid_kw.iter().cloned().fold(0.0, f64::max);
        let peak_reduction_percent = if baseline_peak > 0.0 {
            (baseline_peak - optimized_peak) / baseline_peak * 100.0
        } else {
            0.0
        };

        let schedule = (0..t_len)
            .map(|t| HourlyDispatch {
                hour: t,
                timestamp: timestamps.map(|ts| ts[t]),
                grid_kw: solved.grid_kw[t],
                battery_kw: battery_net[t],
                solar_used_kw: solved.solar_used_kw[t],
                wind_used_kw: solved.wind_used_kw[t],
                load_kw: load[t],
                tariff_ntd_per_kwh: tariffs[t],
                cost_ntd: solved.grid_kw[t] * tariffs[t],
                soc_fraction: if capacity > 0.0 {
                    solved.soc_kwh[t + 1] / capacity
                } else {
                    0.0
                },
            })
            .collect();

        let recommendations = RecommendationGenerator::new(&self.config.economics).generate(
            load,
            solar,
            &solved.grid_kw,
            &battery_net,
            tariffs,
            peak_reduction_percent,
        );

        OptimizationResult {
            status: DispatchStatus::Optimal,
            baseline_cost_ntd: baseline_cost,
            optimized_cost_ntd: optimized_cost,
            savings_ntd: savings,
            savings_percent,
            peak_reduction_percent,
            schedule,
            recommendations,
        }
    }

    fn baseline_result(
        &self,
        load: &[f64],
        solar: &[f64],
        wind: &[f64],
        tariffs: &[f64],
        timestamps: Option<&[DateTime<FixedOffset>]>,
        initial_soc: f64,
    ) -> OptimizationResult {
        let battery = &self.config.battery;
        let plan = BaselineEstimator::estimate(load, solar, wind, tariffs);

        // Battery idles through the baseline plan; SOC stays flat.
        let soc_fraction = initial_soc.clamp(battery.min_soc, battery.max_soc);

        let schedule = (0..load.len())
            .map(|t| HourlyDispatch {
                hour: t,
                timestamp: timestamps.map(|ts| ts[t]),
                grid_kw: plan.grid_kw[t],
                battery_kw: 0.0,
                solar_used_kw: plan.solar_used_kw[t],
                wind_used_kw: plan.wind_used_kw[t],
                load_kw: load[t],
                tariff_ntd_per_kwh: tariffs[t],
                cost_ntd: plan.grid_kw[t] * tariffs[t],
                soc_fraction,
            })
            .collect();

        OptimizationResult {
            status: DispatchStatus::Baseline,
            baseline_cost_ntd: plan.cost_ntd,
            optimized_cost_ntd: plan.cost_ntd,
            savings_ntd: 0.0,
            savings_percent: 0.0,
            peak_reduction_percent: 0.0,
            schedule,
            recommendations: vec![recommendations::baseline_recommendation()],
        }
    }
}

fn validate_inputs(
    load: &[f64],
    solar: &[f64],
    wind: &[f64],
    tariffs: &[f64],
    initial_soc: f64,
) -> Result<(), DispatchError> {
    if load.is_empty() {
        return Err(DispatchError::InsufficientData(
            "empty forecast horizon".to_string(),
        ));
    }
    if load.len() != solar.len() || load.len() != wind.len() || load.len() != tariffs.len() {
        return Err(DispatchError::InsufficientData(format!(
            "forecast array lengths differ: load={} solar={} wind={} tariff={}",
            load.len(),
            solar.len(),
            wind.len(),
            tariffs.len()
        )));
    }
    for (name, values) in [
        ("load", load),
        ("solar", solar),
        ("wind", wind),
        ("tariff", tariffs),
    ] {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(DispatchError::InsufficientData(format!(
                "{name} forecast contains non-finite values"
            )));
        }
    }
    if tariffs.iter().any(|&t| t <= 0.0) {
        return Err(DispatchError::InsufficientData(
            "tariffs must be positive".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&initial_soc) {
        return Err(DispatchError::InsufficientData(format!(
            "initial_soc {initial_soc} outside [0, 1]"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_rejects_empty_horizon() {
        let optimizer = ScheduleOptimizer::new(DispatchConfig::default()).unwrap();
        let err = optimizer
            .optimize_components(&[], &[], &[], &[], 0.5)
            .unwrap_err();
        assert!(matches!(err, DispatchError::InsufficientData(_)));
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let optimizer = ScheduleOptimizer::new(DispatchConfig::default()).unwrap();
        let err = optimizer
            .optimize_components(&[100.0, 100.0], &[0.0], &[0.0, 0.0], &[5.0, 5.0], 0.5)
            .unwrap_err();
        assert!(matches!(err, DispatchError::InsufficientData(_)));
    }

    #[rstest]
    #[case(-0.1)]
    #[case(1.5)]
    #[case(f64::NAN)]
    fn test_rejects_out_of_range_initial_soc(#[case] soc: f64) {
        let optimizer = ScheduleOptimizer::new(DispatchConfig::default()).unwrap();
        assert!(optimizer
            .optimize_components(&[100.0], &[0.0], &[0.0], &[5.0], soc)
            .is_err());
    }

    #[test]
    fn test_rejects_non_finite_forecast() {
        let optimizer = ScheduleOptimizer::new(DispatchConfig::default()).unwrap();
        assert!(optimizer
            .optimize_components(&[f64::INFINITY], &[0.0], &[0.0], &[5.0], 0.5)
            .is_err());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut cfg = DispatchConfig::default();
        cfg.battery.efficiency = 2.0;
        assert!(matches!(
            ScheduleOptimizer::new(cfg),
            Err(DispatchError::InvalidConfig(_))
        ));
    }
}
