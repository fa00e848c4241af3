//! OCPI wire representation
//!
//! Flat DTOs with the protocol's field names. Decoding goes through
//! `TryFrom`, so a parsed tariff satisfies the same invariants as one built
//! in code. Absent values are omitted, never written as `null`.

use chrono::{NaiveDate, NaiveTime, TimeDelta, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::element::TariffElement;
use super::model::Tariff;
use super::price_component::PriceComponent;
use super::restriction::TariffRestriction;
use crate::domain::common::{CurrencyCode, EnergyMix, MultiLanguageText, TariffId};
use crate::support::errors::{TariffError, TariffResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<DayOfWeek> for Weekday {
    fn from(day: DayOfWeek) -> Self {
        match day {
            DayOfWeek::Monday => Weekday::Mon,
            DayOfWeek::Tuesday => Weekday::Tue,
            DayOfWeek::Wednesday => Weekday::Wed,
            DayOfWeek::Thursday => Weekday::Thu,
            DayOfWeek::Friday => Weekday::Fri,
            DayOfWeek::Saturday => Weekday::Sat,
            DayOfWeek::Sunday => Weekday::Sun,
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

/// `HH:MM` time of day; seconds are written only when non-zero.
mod time_of_day {
    use chrono::{NaiveTime, Timelike};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(time) if time.second() == 0 => {
                serializer.serialize_str(&time.format("%H:%M").to_string())
            }
            Some(time) => serializer.serialize_str(&time.format("%H:%M:%S").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveTime>, D::Error> {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map(Some)
            .map_err(|e| de::Error::custom(format!("invalid time of day {raw:?}: {e}")))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct TariffRestrictionsDto {
    #[serde(default, with = "time_of_day", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "time_of_day", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_kwh: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_kwh: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_power: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_power: Option<Decimal>,
    /// Seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_duration: Option<i64>,
    /// Seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<Vec<DayOfWeek>>,
}

fn duration_from_seconds(field: &'static str, seconds: Option<i64>) -> TariffResult<Option<TimeDelta>> {
    seconds
        .map(|s| {
            TimeDelta::try_seconds(s).ok_or_else(|| {
                TariffError::invalid("tariff restriction", format!("{field} out of range: {s}"))
            })
        })
        .transpose()
}

impl TariffRestrictionsDto {
    /// An object without any bound decodes to no restriction at all. An
    /// empty `day_of_week` list counts as absent.
    pub fn into_restriction(mut self) -> TariffResult<Option<TariffRestriction>> {
        if self.day_of_week.as_ref().is_some_and(Vec::is_empty) {
            self.day_of_week = None;
        }
        if self == Self::default() {
            return Ok(None);
        }
        TariffRestriction::try_from(self).map(Some)
    }
}

impl TryFrom<TariffRestrictionsDto> for TariffRestriction {
    type Error = TariffError;

    fn try_from(dto: TariffRestrictionsDto) -> Result<Self, Self::Error> {
        let mut builder = TariffRestriction::builder()
            .start_time(dto.start_time)
            .end_time(dto.end_time)
            .start_date(dto.start_date)
            .end_date(dto.end_date)
            .min_kwh(dto.min_kwh)
            .max_kwh(dto.max_kwh)
            .min_power(dto.min_power)
            .max_power(dto.max_power)
            .min_duration(duration_from_seconds("min_duration", dto.min_duration)?)
            .max_duration(duration_from_seconds("max_duration", dto.max_duration)?);
        if let Some(days) = dto.day_of_week.filter(|days| !days.is_empty()) {
            builder = builder.days_of_week(days.into_iter().map(Weekday::from));
        }
        builder.build()
    }
}

impl From<&TariffRestriction> for TariffRestrictionsDto {
    fn from(restriction: &TariffRestriction) -> Self {
        let time = restriction.time_window();
        let date = restriction.date_window();
        let energy = restriction.energy_range();
        let power = restriction.power_range();
        let duration = restriction.duration_range();

        Self {
            start_time: time.and_then(|w| w.start()),
            end_time: time.and_then(|w| w.end()),
            start_date: date.and_then(|w| w.start()),
            end_date: date.and_then(|w| w.end()),
            min_kwh: energy.and_then(|b| b.min()),
            max_kwh: energy.and_then(|b| b.max()),
            min_power: power.and_then(|b| b.min()),
            max_power: power.and_then(|b| b.max()),
            min_duration: duration.and_then(|b| b.min()).map(|d| d.num_seconds()),
            max_duration: duration.and_then(|b| b.max()).map(|d| d.num_seconds()),
            day_of_week: restriction
                .days_of_week()
                .map(|days| days.iter().copied().map(DayOfWeek::from).collect()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TariffElementDto {
    pub price_components: Vec<PriceComponent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restrictions: Option<TariffRestrictionsDto>,
}

impl TryFrom<TariffElementDto> for TariffElement {
    type Error = TariffError;

    fn try_from(dto: TariffElementDto) -> Result<Self, Self::Error> {
        let restriction = dto
            .restrictions
            .map(TariffRestrictionsDto::into_restriction)
            .transpose()?
            .flatten();
        TariffElement::new(dto.price_components, restriction)
    }
}

impl From<TariffElement> for TariffElementDto {
    fn from(element: TariffElement) -> Self {
        Self {
            price_components: element.price_components().to_vec(),
            restrictions: element.restriction().map(TariffRestrictionsDto::from),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TariffDto {
    pub id: TariffId,
    pub currency: CurrencyCode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tariff_alt_text: MultiLanguageText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tariff_alt_url: Option<String>,
    pub elements: Vec<TariffElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_mix: Option<EnergyMix>,
}

impl TryFrom<TariffDto> for Tariff {
    type Error = TariffError;

    fn try_from(dto: TariffDto) -> Result<Self, Self::Error> {
        let mut builder = Tariff::builder(dto.id, dto.currency)
            .texts(dto.tariff_alt_text)
            .elements(dto.elements);
        if let Some(url) = dto.tariff_alt_url {
            builder = builder.info_url(url);
        }
        if let Some(energy_mix) = dto.energy_mix {
            builder = builder.energy_mix(energy_mix);
        }
        builder.build()
    }
}

impl From<Tariff> for TariffDto {
    fn from(tariff: Tariff) -> Self {
        Self {
            id: tariff.id().clone(),
            currency: tariff.currency(),
            tariff_alt_text: tariff.text().to_vec(),
            tariff_alt_url: tariff.info_url().map(str::to_string),
            elements: tariff.elements().to_vec(),
            energy_mix: tariff.energy_mix().cloned(),
        }
    }
}
