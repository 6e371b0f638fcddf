//! Taipower time-of-use tariff tables (2024 schedule).
//!
//! Rates are in NTD/kWh and split into a summer (June-September) and a
//! non-summer season, each with peak, half-peak and off-peak bands. Weekday
//! band boundaries are identical in both seasons.

use serde::{Deserialize, Serialize};

use crate::domain::TouPeriod;

/// Rate triple for one season.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TariffRates {
    pub peak_ntd_per_kwh: f64,
    pub half_peak_ntd_per_kwh: f64,
    pub off_peak_ntd_per_kwh: f64,
}

impl TariffRates {
    pub fn rate_for(&self, period: TouPeriod) -> f64 {
        match period {
            TouPeriod::Peak => self.peak_ntd_per_kwh,
            TouPeriod::HalfPeak => self.half_peak_ntd_per_kwh,
            TouPeriod::OffPeak => self.off_peak_ntd_per_kwh,
        }
    }
}

/// Seasonal TOU rate tables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TariffTable {
    pub summer: TariffRates,
    pub non_summer: TariffRates,
}

impl Default for TariffTable {
    fn default() -> Self {
        Self {
            summer: TariffRates {
                peak_ntd_per_kwh: 9.34,
                half_peak_ntd_per_kwh: 5.80,
                off_peak_ntd_per_kwh: 2.29,
            },
            non_summer: TariffRates {
                peak_ntd_per_kwh: 9.10,
                half_peak_ntd_per_kwh: 5.54,
                off_peak_ntd_per_kwh: 2.18,
            },
        }
    }
}

impl TariffTable {
    pub fn rates_for_month(&self, month: u32) -> &TariffRates {
        if is_summer_month(month) {
            &self.summer
        } else {
            &self.non_summer
        }
    }

    /// Tariff for a given month and hour of day.
    pub fn rate_at(&self, month: u32, hour: u32) -> f64 {
        self.rates_for_month(month).rate_for(period_for_hour(hour))
    }
}

/// Summer tariffs apply June through September.
pub fn is_summer_month(month: u32) -> bool {
    (6..=9).contains(&month)
}

/// Weekday band for an hour of day: peak 10-12 and 13-17, half-peak 7-10,
/// 12-13 and 17-23, off-peak otherwise.
pub fn period_for_hour(hour: u32) -> TouPeriod {
    match hour {
        10..=11 | 13..=16 => TouPeriod::Peak,
        7..=9 | 12 | 17..=22 => TouPeriod::HalfPeak,
        _ => TouPeriod::OffPeak,
    }
}
