pub mod common;
pub mod session;
pub mod tariff;

// Re-export commonly used types
pub use common::{
    CurrencyCode, DisplayText, EnergyMix, EnergySource, EnergySourceCategory,
    EnvironmentalImpact, EnvironmentalImpactCategory, MultiLanguageText, TariffId,
};
pub use session::{SessionSnapshot, Usage};
pub use tariff::{
    Bounds, CostBreakdown, CostLine, DateWindow, DimensionType, PriceComponent, Tariff,
    TariffBuilder, TariffElement, TariffRestriction, TariffRestrictionBuilder, TimeWindow,
};

pub use crate::support::errors::{
    CostOverflow, EvaluationError, NoMatchingElement, TariffError, TariffResult,
};
