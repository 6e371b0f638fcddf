use chrono::{DateTime, Duration, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::DispatchError;
use crate::tariff;

/// Time-of-use tariff band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TouPeriod {
    Peak,
    HalfPeak,
    OffPeak,
}

impl std::fmt::Display for TouPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Peak => "peak",
            Self::HalfPeak => "half_peak",
            Self::OffPeak => "off_peak",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for TouPeriod {
    type Err = &'static str;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "peak" => Ok(Self::Peak),
            "half_peak" => Ok(Self::HalfPeak),
            "off_peak" => Ok(Self::OffPeak),
            _ => Err("invalid period; expected peak, half_peak or off_peak"),
        }
    }
}

/// One hour of facility-scale forecast input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: DateTime<FixedOffset>,
    pub load_kw: f64,
    pub solar_kw: f64,
    pub wind_kw: f64,
    pub tariff_ntd_per_kwh: f64,
    pub period: TouPeriod,
}

/// Ordered hourly forecast over the optimization horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastSeries(Vec<ForecastPoint>);

impl ForecastSeries {
    pub fn new(points: Vec<ForecastPoint>) -> Self {
        Self(points)
    }

    /// Build a series from parallel column arrays, assigning consecutive
    /// hourly timestamps starting at `start` and classifying each hour's TOU
    /// band from its hour of day.
    pub fn from_components(
        start: DateTime<FixedOffset>,
        load_kw: &[f64],
        solar_kw: &[f64],
        wind_kw: &[f64],
        tariffs: &[f64],
    ) -> Result<Self, DispatchError> {
        if load_kw.len() != solar_kw.len()
            || load_kw.len() != wind_kw.len()
            || load_kw.len() != tariffs.len()
        {
            return Err(DispatchError::InsufficientData(format!(
                "forecast array lengths differ: load={} solar={} wind={} tariff={}",
                load_kw.len(),
                solar_kw.len(),
                wind_kw.len(),
                tariffs.len()
            )));
        }

        let points = (0..load_kw.len())
            .map(|t| {
                let timestamp = start + Duration::hours(t as i64);
                ForecastPoint {
                    timestamp,
                    load_kw: load_kw[t],
                    solar_kw: solar_kw[t],
                    wind_kw: wind_kw[t],
                    tariff_ntd_per_kwh: tariffs[t],
                    period: tariff::period_for_hour(timestamp.hour()),
                }
            })
            .collect();
        Ok(Self(points))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.0
    }

    pub fn loads(&self) -> Vec<f64> {
        self.0.iter().map(|p| p.load_kw).collect()
    }

    pub fn solars(&self) -> Vec<f64> {
        self.0.iter().map(|p| p.solar_kw).collect()
    }

    pub fn winds(&self) -> Vec<f64> {
        self.0.iter().map(|p| p.wind_kw).collect()
    }

    pub fn tariffs(&self) -> Vec<f64> {
        self.0.iter().map(|p| p.tariff_ntd_per_kwh).collect()
    }

    pub fn timestamps(&self) -> Vec<DateTime<FixedOffset>> {
        self.0.iter().map(|p| p.timestamp).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 6, 1, 0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_period_parsing() {
        use std::str::FromStr;
        assert_eq!(TouPeriod::from_str("peak").unwrap(), TouPeriod::Peak);
        assert_eq!(TouPeriod::from_str("HALF_PEAK").unwrap(), TouPeriod::HalfPeak);
        assert!(TouPeriod::from_str("shoulder").is_err());
    }

    #[test]
    fn test_from_components_assigns_hours_and_periods() {
        let series = ForecastSeries::from_components(
            start(),
            &[100.0; 24],
            &[0.0; 24],
            &[0.0; 24],
            &[5.0; 24],
        )
        .unwrap();

        assert_eq!(series.len(), 24);
        assert_eq!(series.points()[0].period, TouPeriod::OffPeak);
        assert_eq!(series.points()[10].period, TouPeriod::Peak);
        assert_eq!(series.points()[18].period, TouPeriod::HalfPeak);
        assert_eq!(series.points()[5].timestamp, start() + Duration::hours(5));
    }

    #[test]
    fn test_from_components_rejects_length_mismatch() {
        let err = ForecastSeries::from_components(start(), &[1.0, 2.0], &[0.0], &[0.0], &[5.0])
            .unwrap_err();
        assert!(matches!(err, DispatchError::InsufficientData(_)));
    }
}
