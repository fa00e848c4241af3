use thiserror::Error;

use crate::domain::common::TariffId;
use crate::domain::tariff::DimensionType;

/// Construction-time failures of the tariff value types.
///
/// A constructor either returns a fully valid value or one of these; no
/// partially built value ever escapes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TariffError {
    #[error("Invalid {entity}: {reason}")]
    InvalidConstruction {
        entity: &'static str,
        reason: String,
    },

    #[error("Ambiguous restriction: {0}")]
    AmbiguousRestriction(String),
}

impl TariffError {
    pub(crate) fn invalid(entity: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConstruction {
            entity,
            reason: reason.into(),
        }
    }

    pub(crate) fn ambiguous(reason: impl Into<String>) -> Self {
        Self::AmbiguousRestriction(reason.into())
    }
}

/// No element of the tariff applies to the session.
///
/// Recoverable: the billing system picks the fallback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No element of tariff {tariff_id} matches the session")]
pub struct NoMatchingElement {
    pub tariff_id: TariffId,
}

/// A cost left the representable decimal range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CostOverflow {
    #[error("Cost of {0} usage exceeds the decimal range")]
    Component(DimensionType),

    #[error("Summed cost exceeds the decimal range")]
    Total,
}

/// Why a session could not be priced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error(transparent)]
    NoMatch(#[from] NoMatchingElement),

    #[error(transparent)]
    Overflow(#[from] CostOverflow),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Tariff(#[from] TariffError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TariffResult<T> = Result<T, TariffError>;
