//! Session snapshot and usage
//!
//! The observed conditions of a charging session, as supplied by the billing
//! system for one evaluation, and the per-dimension usage to be priced.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::tariff::DimensionType;

/// Conditions of a charging session at evaluation time.
///
/// `at` is local time at the charge point; time-of-day, date and weekday
/// restrictions are all evaluated against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    at: NaiveDateTime,
    energy_kwh: Decimal,
    power_kw: Decimal,
    #[serde(rename = "duration_seconds", with = "duration_seconds")]
    duration: TimeDelta,
}

impl SessionSnapshot {
    pub fn new(at: NaiveDateTime, energy_kwh: Decimal, power_kw: Decimal, duration: TimeDelta) -> Self {
        Self {
            at,
            energy_kwh,
            power_kw,
            duration,
        }
    }

    pub fn at(&self) -> NaiveDateTime {
        self.at
    }

    pub fn time(&self) -> NaiveTime {
        self.at.time()
    }

    pub fn date(&self) -> NaiveDate {
        self.at.date()
    }

    pub fn weekday(&self) -> Weekday {
        self.at.weekday()
    }

    /// Energy consumed so far, kWh.
    pub fn energy_kwh(&self) -> Decimal {
        self.energy_kwh
    }

    /// Charging power, kW.
    pub fn power_kw(&self) -> Decimal {
        self.power_kw
    }

    /// Elapsed session time.
    pub fn duration(&self) -> TimeDelta {
        self.duration
    }
}

mod duration_seconds {
    use chrono::TimeDelta;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(duration.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        let seconds = i64::deserialize(deserializer)?;
        TimeDelta::try_seconds(seconds)
            .ok_or_else(|| de::Error::custom(format!("duration out of range: {seconds}s")))
    }
}

/// Raw usage per billing dimension.
///
/// Units: seconds for [`DimensionType::Time`] and
/// [`DimensionType::ParkingTime`], kWh for [`DimensionType::Energy`].
/// A dimension that is not present counts as zero usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Usage(BTreeMap<DimensionType, Decimal>);

impl Usage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Energy and charging time taken from the snapshot, plus parking time.
    pub fn from_session(session: &SessionSnapshot, parking_time: TimeDelta) -> Self {
        Self::new()
            .with(DimensionType::Energy, session.energy_kwh())
            .with(DimensionType::Time, Decimal::from(session.duration().num_seconds()))
            .with(DimensionType::ParkingTime, Decimal::from(parking_time.num_seconds()))
    }

    pub fn with(mut self, dimension: DimensionType, amount: Decimal) -> Self {
        self.0.insert(dimension, amount);
        self
    }

    pub fn get(&self, dimension: DimensionType) -> Decimal {
        self.0.get(&dimension).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DimensionType, Decimal)> + '_ {
        self.0.iter().map(|(dimension, amount)| (*dimension, *amount))
    }
}

impl FromIterator<(DimensionType, Decimal)> for Usage {
    fn from_iter<I: IntoIterator<Item = (DimensionType, Decimal)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot::new(
            NaiveDateTime::parse_from_str("2024-06-08 22:30:00", "%Y-%m-%d %H:%M:%S").unwrap(),
            "23.5".parse().unwrap(),
            "11".parse().unwrap(),
            TimeDelta::minutes(95),
        )
    }

    #[test]
    fn snapshot_exposes_calendar_fields() {
        let s = snapshot();
        assert_eq!(s.weekday(), Weekday::Sat);
        assert_eq!(s.date(), NaiveDate::from_ymd_opt(2024, 6, 8).unwrap());
        assert_eq!(s.time(), NaiveTime::from_hms_opt(22, 30, 0).unwrap());
    }

    #[test]
    fn snapshot_json_uses_seconds_for_duration() {
        let json = serde_json::to_value(snapshot()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "at": "2024-06-08T22:30:00",
                "energy_kwh": "23.5",
                "power_kw": "11",
                "duration_seconds": 5700
            })
        );
        let back: SessionSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snapshot());
    }

    #[test]
    fn missing_dimension_counts_as_zero() {
        let usage = Usage::new().with(DimensionType::Energy, Decimal::TEN);
        assert_eq!(usage.get(DimensionType::Energy), Decimal::TEN);
        assert_eq!(usage.get(DimensionType::Time), Decimal::ZERO);
    }

    #[test]
    fn usage_from_session() {
        let usage = Usage::from_session(&snapshot(), TimeDelta::minutes(10));
        assert_eq!(usage.get(DimensionType::Energy), "23.5".parse().unwrap());
        assert_eq!(usage.get(DimensionType::Time), Decimal::from(5700));
        assert_eq!(usage.get(DimensionType::ParkingTime), Decimal::from(600));
        assert_eq!(usage.get(DimensionType::Flat), Decimal::ZERO);
    }

    #[test]
    fn usage_parses_from_dimension_keyed_object() {
        let usage: Usage =
            serde_json::from_str(r#"{"ENERGY": "12.5", "PARKING_TIME": 900}"#).unwrap();
        assert_eq!(usage.get(DimensionType::Energy), "12.5".parse().unwrap());
        assert_eq!(usage.get(DimensionType::ParkingTime), Decimal::from(900));
    }
}
