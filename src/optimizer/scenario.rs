//! What-if simulation: re-run the optimizer under named parameter overrides.
//!
//! Every scenario builds its own configuration value and its own optimizer,
//! so runs are fully isolated: the base configuration is never touched and no
//! scenario can observe another's overrides.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::DispatchConfig;
use crate::domain::{ForecastSeries, OptimizationResult};
use crate::error::DispatchError;
use crate::optimizer::ScheduleOptimizer;

/// Initial state of charge assumed when a scenario does not override it.
pub const DEFAULT_INITIAL_SOC: f64 = 0.5;

/// A named set of parameter overrides. Fields left `None` inherit the base
/// configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub battery_capacity_kwh: Option<f64>,
    pub max_contract_kw: Option<f64>,
    pub initial_soc: Option<f64>,
}

impl Scenario {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            battery_capacity_kwh: None,
            max_contract_kw: None,
            initial_soc: None,
        }
    }

    /// Base configuration with this scenario's overrides applied.
    pub fn apply(&self, base: &DispatchConfig) -> DispatchConfig {
        let mut cfg = base.clone();
        if let Some(capacity) = self.battery_capacity_kwh {
            cfg.battery.capacity_kwh = capacity;
        }
        if let Some(contract) = self.max_contract_kw {
            cfg.contract.max_contract_kw = contract;
        }
        cfg
    }
}

/// Result of one simulated scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub battery_capacity_kwh: f64,
    pub max_contract_kw: f64,
    pub result: OptimizationResult,
}

pub struct ScenarioSimulator {
    base: DispatchConfig,
}

impl ScenarioSimulator {
    pub fn new(base: DispatchConfig) -> Self {
        Self { base }
    }

    pub fn base_config(&self) -> &DispatchConfig {
        &self.base
    }

    /// Run each scenario in order against the same forecast. Scenarios
    /// execute sequentially; an invalid override rejects the whole run before
    /// any solve happens for that scenario.
    pub fn run(
        &self,
        series: &ForecastSeries,
        scenarios: &[Scenario],
    ) -> Result<Vec<ScenarioOutcome>, DispatchError> {
        let mut outcomes = Vec::with_capacity(scenarios.len());

        for (i, scenario) in scenarios.iter().enumerate() {
            info!(index = i + 1, name = %scenario.name, "simulating scenario");

            let cfg = scenario.apply(&self.base);
            let optimizer = ScheduleOptimizer::new(cfg)?;
            let initial_soc = scenario.initial_soc.unwrap_or(DEFAULT_INITIAL_SOC);
            let result = optimizer.optimize(series, initial_soc)?;

            outcomes.push(ScenarioOutcome {
                name: scenario.name.clone(),
                battery_capacity_kwh: optimizer.config().battery.capacity_kwh,
                max_contract_kw: optimizer.config().contract.max_contract_kw,
                result,
            });
        }

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overrides_only_named_fields() {
        let base = DispatchConfig::default();
        let scenario = Scenario {
            name: "bigger battery".into(),
            battery_capacity_kwh: Some(300.0),
            max_contract_kw: None,
            initial_soc: Some(0.7),
        };

        let cfg = scenario.apply(&base);
        assert_eq!(cfg.battery.capacity_kwh, 300.0);
        assert_eq!(cfg.contract.max_contract_kw, base.contract.max_contract_kw);
        assert_eq!(cfg.battery.efficiency, base.battery.efficiency);
        // The base is untouched.
        assert_eq!(base.battery.capacity_kwh, 100.0);
    }

    #[test]
    fn test_named_has_no_overrides() {
        let scenario = Scenario::named("as-is");
        let base = DispatchConfig::default();
        assert_eq!(scenario.apply(&base), base);
    }
}
