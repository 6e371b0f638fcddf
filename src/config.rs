use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::DispatchError;
use crate::tariff::TariffTable;

/// Full engine configuration.
///
/// This is an immutable value: every `optimize()` call captures the
/// configuration it was constructed with, and per-scenario overrides build a
/// fresh copy instead of mutating a shared instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DispatchConfig {
    pub battery: BatteryConfig,
    pub contract: ContractConfig,
    pub economics: EconomicsConfig,
    pub solver: SolverConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatteryConfig {
    pub capacity_kwh: f64,
    /// One-way conversion efficiency applied on charge and discharge.
    pub efficiency: f64,
    /// Lower state-of-charge bound as a fraction of capacity.
    pub min_soc: f64,
    /// Upper state-of-charge bound as a fraction of capacity.
    pub max_soc: f64,
    pub max_charge_rate_kw: f64,
    pub max_discharge_rate_kw: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_kwh: 100.0,
            efficiency: 0.9,
            min_soc: 0.1,
            max_soc: 0.9,
            max_charge_rate_kw: 50.0,
            max_discharge_rate_kw: 50.0,
        }
    }
}

impl BatteryConfig {
    /// Per-hour charge power bound: half the capacity, further limited by the
    /// inverter charge rating when one is set.
    pub fn charge_bound_kw(&self) -> f64 {
        let half = self.capacity_kwh * 0.5;
        if self.max_charge_rate_kw > 0.0 {
            half.min(self.max_charge_rate_kw)
        } else {
            half
        }
    }

    /// Per-hour discharge power bound, mirroring [`Self::charge_bound_kw`].
    pub fn discharge_bound_kw(&self) -> f64 {
        let half = self.capacity_kwh * 0.5;
        if self.max_discharge_rate_kw > 0.0 {
            half.min(self.max_discharge_rate_kw)
        } else {
            half
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Contracted grid capacity (kW); grid import may never exceed this.
    pub max_contract_kw: f64,
    /// Fraction of contract capacity allowed during peak-tariff hours.
    pub peak_grid_cap_ratio: f64,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            max_contract_kw: 500.0,
            peak_grid_cap_ratio: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomicsConfig {
    /// Avoided-cost value of self-consumed renewable energy, as a fraction of
    /// the displaced grid tariff. Not a market sale price.
    pub renewable_credit_factor: f64,
    /// Reference peak rate used to classify peak-tariff hours.
    pub peak_rate_ntd_per_kwh: f64,
    /// Reference off-peak rate used to classify off-peak hours.
    pub off_peak_rate_ntd_per_kwh: f64,
    /// An hour counts as peak when its tariff reaches this fraction of the
    /// reference peak rate.
    pub peak_tariff_threshold_ratio: f64,
}

impl Default for EconomicsConfig {
    fn default() -> Self {
        let rates = TariffTable::default().summer;
        Self {
            renewable_credit_factor: 0.8,
            peak_rate_ntd_per_kwh: rates.peak_ntd_per_kwh,
            off_peak_rate_ntd_per_kwh: rates.off_peak_ntd_per_kwh,
            peak_tariff_threshold_ratio: 0.9,
        }
    }
}

impl EconomicsConfig {
    /// Tariff level at or above which an hour is treated as peak.
    pub fn peak_tariff_floor(&self) -> f64 {
        self.peak_rate_ntd_per_kwh * self.peak_tariff_threshold_ratio
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Wall-clock bound on a single solve.
    pub time_limit_seconds: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_seconds: 60,
        }
    }
}

impl DispatchConfig {
    /// Load configuration from `config/default.toml` overlaid with
    /// `TOU__`-prefixed environment variables (e.g.
    /// `TOU__BATTERY__CAPACITY_KWH=200`).
    pub fn load() -> Result<Self, DispatchError> {
        let figment = Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("TOU__").split("__"));
        let cfg: Self = figment
            .extract()
            .map_err(|e| DispatchError::InvalidConfig(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate that all parameters are physically and economically possible.
    pub fn validate(&self) -> Result<(), DispatchError> {
        let b = &self.battery;
        if !b.capacity_kwh.is_finite() || b.capacity_kwh < 0.0 {
            return Err(invalid("battery.capacity_kwh must be non-negative"));
        }
        if !(b.efficiency > 0.0 && b.efficiency <= 1.0) {
            return Err(invalid("battery.efficiency must be in (0, 1]"));
        }
        if !(0.0..1.0).contains(&b.min_soc) {
            return Err(invalid("battery.min_soc must be in [0, 1)"));
        }
        if !(b.max_soc > b.min_soc && b.max_soc <= 1.0) {
            return Err(invalid("battery.max_soc must be in (min_soc, 1]"));
        }
        if b.max_charge_rate_kw < 0.0 || b.max_discharge_rate_kw < 0.0 {
            return Err(invalid("battery charge/discharge rates must be non-negative"));
        }

        let c = &self.contract;
        if !c.max_contract_kw.is_finite() || c.max_contract_kw < 0.0 {
            return Err(invalid("contract.max_contract_kw must be non-negative"));
        }
        if !(c.peak_grid_cap_ratio > 0.0 && c.peak_grid_cap_ratio <= 1.0) {
            return Err(invalid("contract.peak_grid_cap_ratio must be in (0, 1]"));
        }

        let e = &self.economics;
        if e.renewable_credit_factor < 0.0 {
            return Err(invalid("economics.renewable_credit_factor must be non-negative"));
        }
        if e.peak_rate_ntd_per_kwh <= 0.0 || e.off_peak_rate_ntd_per_kwh <= 0.0 {
            return Err(invalid("economics reference rates must be positive"));
        }
        if !(e.peak_tariff_threshold_ratio > 0.0 && e.peak_tariff_threshold_ratio <= 1.0) {
            return Err(invalid("economics.peak_tariff_threshold_ratio must be in (0, 1]"));
        }

        if self.solver.time_limit_seconds == 0 {
            return Err(invalid("solver.time_limit_seconds must be at least 1"));
        }

        Ok(())
    }
}

fn invalid(msg: &str) -> DispatchError {
    DispatchError::InvalidConfig(msg.to_string())
}
