//! Value carriers shared by the tariff entities
//!
//! Identifier, currency code, multi-language text and energy-mix metadata.
//! None of these take part in tariff evaluation.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::support::errors::{TariffError, TariffResult};

/// Tariff identifier, unique within the operator's platform.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TariffId(String);

impl TariffId {
    /// OCPI `string(36)`.
    pub const MAX_LEN: usize = 36;

    pub fn new(id: impl Into<String>) -> TariffResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(TariffError::invalid("tariff id", "must not be empty"));
        }
        if id.chars().count() > Self::MAX_LEN {
            return Err(TariffError::invalid(
                "tariff id",
                format!("longer than {} characters: {}", Self::MAX_LEN, id),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TariffId {
    type Error = TariffError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TariffId> for String {
    fn from(id: TariffId) -> Self {
        id.0
    }
}

impl fmt::Display for TariffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ISO 4217 currency code (three uppercase ASCII letters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode([u8; 3]);

impl CurrencyCode {
    pub fn new(code: &str) -> TariffResult<Self> {
        match code.as_bytes() {
            &[a, b, c] if [a, b, c].iter().all(u8::is_ascii_uppercase) => Ok(Self([a, b, c])),
            _ => Err(TariffError::invalid(
                "currency",
                format!("not an ISO 4217 code: {code:?}"),
            )),
        }
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII uppercase bytes pass `new`.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = TariffError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.as_str().to_string()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One translation of a human-readable text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayText {
    /// ISO 639-1 language code
    pub language: String,
    pub text: String,
}

impl DisplayText {
    pub fn new(language: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            text: text.into(),
        }
    }
}

/// Multi-language text; may be empty.
pub type MultiLanguageText = Vec<DisplayText>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnergySourceCategory {
    Nuclear,
    GeneralFossil,
    Coal,
    Gas,
    GeneralGreen,
    Solar,
    Wind,
    Water,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnvironmentalImpactCategory {
    NuclearWaste,
    CarbonDioxide,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergySource {
    pub source: EnergySourceCategory,
    /// Share of this source, 0-100
    pub percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentalImpact {
    pub source: EnvironmentalImpactCategory,
    /// g/kWh
    pub amount: Decimal,
}

/// Energy-mix metadata attached to a tariff.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnergyMix {
    pub is_green_energy: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub energy_sources: Vec<EnergySource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environ_impact: Vec<EnvironmentalImpact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_product_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tariff_id_rejects_empty_and_overlong() {
        assert!(TariffId::new("").is_err());
        assert!(TariffId::new("   ").is_err());
        assert!(TariffId::new("x".repeat(37)).is_err());
        assert_eq!(TariffId::new("12").unwrap().as_str(), "12");
    }

    #[test]
    fn currency_code_is_three_uppercase_letters() {
        assert_eq!(CurrencyCode::new("EUR").unwrap().to_string(), "EUR");
        assert!(CurrencyCode::new("eur").is_err());
        assert!(CurrencyCode::new("EURO").is_err());
        assert!(CurrencyCode::new("€").is_err());
    }

    #[test]
    fn energy_mix_omits_empty_fields() {
        let mix = EnergyMix {
            is_green_energy: true,
            ..Default::default()
        };
        let json = serde_json::to_value(&mix).unwrap();
        assert_eq!(json, serde_json::json!({ "is_green_energy": true }));
    }

    #[test]
    fn energy_mix_parses_sources() {
        let mix: EnergyMix = serde_json::from_value(serde_json::json!({
            "is_green_energy": false,
            "energy_sources": [
                { "source": "GENERAL_GREEN", "percentage": "35.9" },
                { "source": "COAL", "percentage": "64.1" }
            ],
            "environ_impact": [{ "source": "CARBON_DIOXIDE", "amount": "372" }],
            "supplier_name": "E.ON Energy Deutschland"
        }))
        .unwrap();
        assert_eq!(mix.energy_sources.len(), 2);
        assert_eq!(mix.energy_sources[1].source, EnergySourceCategory::Coal);
        assert_eq!(mix.environ_impact[0].amount, Decimal::from(372));
        assert_eq!(mix.energy_product_name, None);
    }
}
