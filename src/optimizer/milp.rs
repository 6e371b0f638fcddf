//! MILP formulation of the hourly dispatch problem.
//!
//! Decision variables per hour: grid import, battery charge, battery
//! discharge, state of charge, solar and wind self-consumption, plus a binary
//! charge flag. Charge/discharge exclusivity is encoded with a big-M
//! disjunction (M = 2 x capacity). The objective is grid cost minus the
//! avoided-cost credit for self-consumed renewables.
//!
//! Solved with CBC through `good_lp`, bounded by the configured wall-clock
//! limit. Everything here is behind the `optimization` feature; without it
//! the solve reports `SolverUnavailable` and the engine degrades to the
//! baseline plan.

use std::fmt;

use crate::config::DispatchConfig;

/// Raw variable values extracted from an optimal solve.
#[derive(Debug, Clone)]
pub(crate) struct SolvedDispatch {
    pub grid_kw: Vec<f64>,
    pub charge_kw: Vec<f64>,
    pub discharge_kw: Vec<f64>,
    pub solar_used_kw: Vec<f64>,
    pub wind_used_kw: Vec<f64>,
    /// State of charge in kWh, length T+1 (index 0 is the initial state).
    pub soc_kwh: Vec<f64>,
}

/// Why a solve produced no optimal plan. Never fatal: every variant degrades
/// to the baseline dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveFailure {
    SolverUnavailable,
    Infeasible,
    Unbounded,
    Failed(String),
}

impl fmt::Display for SolveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SolverUnavailable => write!(f, "no solver backend available"),
            Self::Infeasible => write!(f, "problem is infeasible"),
            Self::Unbounded => write!(f, "problem is unbounded"),
            Self::Failed(msg) => write!(f, "solver failed: {msg}"),
        }
    }
}

#[cfg(feature = "optimization")]
pub(crate) fn solve(
    cfg: &DispatchConfig,
    load: &[f64],
    solar: &[f64],
    wind: &[f64],
    tariffs: &[f64],
    initial_soc: f64,
) -> Result<SolvedDispatch, SolveFailure> {
    use good_lp::{constraint, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel};

    let t_len = load.len();
    let battery = &cfg.battery;
    let capacity = battery.capacity_kwh;
    let efficiency = battery.efficiency;
    let credit = cfg.economics.renewable_credit_factor;
    let peak_floor = cfg.economics.peak_tariff_floor();
    let peak_grid_cap = cfg.contract.max_contract_kw * cfg.contract.peak_grid_cap_ratio;

    let mut problem = ProblemVariables::new();

    let grid = problem.add_vector(
        variable().min(0.0).max(cfg.contract.max_contract_kw),
        t_len,
    );
    let charge = problem.add_vector(variable().min(0.0).max(battery.charge_bound_kw()), t_len);
    let discharge =
        problem.add_vector(variable().min(0.0).max(battery.discharge_bound_kw()), t_len);
    let soc = problem.add_vector(
        variable()
            .min(capacity * battery.min_soc)
            .max(capacity * battery.max_soc),
        t_len + 1,
    );
    let solar_used: Vec<_> = (0..t_len)
        .map(|t| problem.add(variable().min(0.0).max(solar[t].max(0.0))))
        .collect();
    let wind_used: Vec<_> = (0..t_len)
        .map(|t| problem.add(variable().min(0.0).max(wind[t].max(0.0))))
        .collect();
    let charge_flag = problem.add_vector(variable().binary(), t_len);

    // Minimize grid cost net of the renewable self-consumption credit.
    let objective = (0..t_len)
        .map(|t| {
            tariffs[t] * grid[t] - credit * tariffs[t] * (solar_used[t] + wind_used[t])
        })
        .sum::<Expression>();

    let mut model = problem.minimise(objective).using(good_lp::coin_cbc);
    model.set_parameter("log", "0");
    model.set_parameter("sec", &cfg.solver.time_limit_seconds.to_string());

    // Initial state of charge.
    let mut model = model.with(constraint!(soc[0] == capacity * initial_soc));

    let big_m = capacity * 2.0;
    for t in 0..t_len {
        // Energy balance: supply must cover the hourly load.
        model = model.with(constraint!(
            grid[t] + solar_used[t] + wind_used[t] + efficiency * discharge[t] - charge[t]
                >= load[t]
        ));

        // SOC recursion with charge-side efficiency loss.
        model = model.with(constraint!(
            soc[t + 1] == soc[t] + efficiency * charge[t] - discharge[t]
        ));

        // A battery hour either charges or discharges, never both.
        model = model.with(constraint!(charge[t] <= big_m * charge_flag[t]));
        model = model.with(constraint!(
            discharge[t] + big_m * charge_flag[t] <= big_m
        ));

        // Peak shaving: cap grid import during peak-tariff hours.
        if tariffs[t] >= peak_floor {
            model = model.with(constraint!(grid[t] <= peak_grid_cap));
        }
    }

    let solution = model.solve().map_err(|err| match err {
        ResolutionError::Infeasible => SolveFailure::Infeasible,
        ResolutionError::Unbounded => SolveFailure::Unbounded,
        other => SolveFailure::Failed(other.to_string()),
    })?;

    // CBC can report values a hair below zero; clamp on extraction.
    let values = |vars: &[good_lp::Variable]| -> Vec<f64> {
        vars.iter().map(|&v| solution.value(v).max(0.0)).collect()
    };

    Ok(SolvedDispatch {
        grid_kw: values(&grid),
        charge_kw: values(&charge),
        discharge_kw: values(&discharge),
        solar_used_kw: values(&solar_used),
        wind_used_kw: values(&wind_used),
        soc_kwh: soc.iter().map(|&v| solution.value(v)).collect(),
    })
}

#[cfg(not(feature = "optimization"))]
pub(crate) fn solve(
    _cfg: &DispatchConfig,
    _load: &[f64],
    _solar: &[f64],
    _wind: &[f64],
    _tariffs: &[f64],
    _initial_soc: f64,
) -> Result<SolvedDispatch, SolveFailure> {
    Err(SolveFailure::SolverUnavailable)
}
