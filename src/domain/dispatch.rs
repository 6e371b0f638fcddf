use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Terminal status of a dispatch optimization.
///
/// The engine itself only ever emits `Optimal` (solver proved optimality) or
/// `Baseline` (degraded mode); `Infeasible` and `Unbounded` complete the wire
/// vocabulary for callers that persist raw solver statuses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DispatchStatus {
    Optimal,
    Infeasible,
    Unbounded,
    Baseline,
}

impl std::fmt::Display for DispatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Optimal => "Optimal",
            Self::Infeasible => "Infeasible",
            Self::Unbounded => "Unbounded",
            Self::Baseline => "Baseline",
        };
        write!(f, "{s}")
    }
}

/// One hour of the dispatch plan.
///
/// `battery_kw` is signed: positive while charging, negative while
/// discharging. `timestamp` is present when the plan was computed from a
/// [`crate::domain::ForecastSeries`] and absent for raw column-array calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlyDispatch {
    pub hour: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<FixedOffset>>,
    pub grid_kw: f64,
    pub battery_kw: f64,
    pub solar_used_kw: f64,
    pub wind_used_kw: f64,
    pub load_kw: f64,
    pub tariff_ntd_per_kwh: f64,
    pub cost_ntd: f64,
    /// End-of-hour battery state of charge as a fraction of capacity.
    pub soc_fraction: f64,
}

/// Complete outcome of one `optimize()` call. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub status: DispatchStatus,
    pub baseline_cost_ntd: f64,
    pub optimized_cost_ntd: f64,
    pub savings_ntd: f64,
    pub savings_percent: f64,
    pub peak_reduction_percent: f64,
    pub schedule: Vec<HourlyDispatch>,
    pub recommendations: Vec<String>,
}

impl OptimizationResult {
    /// True when the solver could not produce an optimal plan and the
    /// baseline dispatch was substituted.
    pub fn is_degraded(&self) -> bool {
        self.status == DispatchStatus::Baseline
    }

    /// Total energy discharged from the battery over the horizon (kWh).
    pub fn total_discharge_kwh(&self) -> f64 {
        self.schedule.iter().map(|h| (-h.battery_kw).max(0.0)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_capitalized() {
        let json = serde_json::to_string(&DispatchStatus::Baseline).unwrap();
        assert_eq!(json, "\"Baseline\"");
        assert_eq!(DispatchStatus::Optimal.to_string(), "Optimal");
    }

    #[test]
    fn test_timestamp_omitted_when_absent() {
        let row = HourlyDispatch {
            hour: 0,
            timestamp: None,
            grid_kw: 10.0,
            battery_kw: 0.0,
            solar_used_kw: 0.0,
            wind_used_kw: 0.0,
            load_kw: 10.0,
            tariff_ntd_per_kwh: 5.0,
            cost_ntd: 50.0,
            soc_fraction: 0.5,
        };
        let json = serde_json::to_string(&row).unwrap();
        assert!(!json.contains("timestamp"));
    }
}
