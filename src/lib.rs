//! Time-of-use dispatch optimization engine.
//!
//! Given an hourly forecast of facility load, solar and wind power plus a
//! grid tariff schedule, the engine computes a cost-minimal dispatch plan
//! (grid import, battery charge/discharge, renewable self-consumption)
//! subject to battery physics and contract-capacity constraints, then derives
//! savings metrics and rule-based recommendations from the solution.
//!
//! The solve is a MILP handled by CBC through `good_lp` (behind the
//! default-on `optimization` feature). When no optimal plan exists — solver
//! missing, infeasible, unbounded or timed out — the engine degrades to the
//! baseline "do-nothing" dispatch instead of failing.

pub mod adapter;
pub mod config;
pub mod domain;
pub mod error;
pub mod optimizer;
pub mod tariff;
pub mod telemetry;

pub use adapter::{ForecastAdapter, SystemForecastPoint};
pub use config::{
    BatteryConfig, ContractConfig, DispatchConfig, EconomicsConfig, SolverConfig,
};
pub use domain::{
    DispatchStatus, ForecastPoint, ForecastSeries, HourlyDispatch, OptimizationResult, TouPeriod,
};
pub use error::DispatchError;
pub use optimizer::{
    BaselineEstimator, RecommendationGenerator, Scenario, ScenarioOutcome, ScenarioSimulator,
    ScheduleOptimizer, SolveFailure,
};
pub use tariff::{TariffRates, TariffTable};
