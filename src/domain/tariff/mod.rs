//! Tariff aggregate
//!
//! Price components, restrictions, elements and the tariff root that selects
//! which element prices a session.

mod dimension;
mod element;
mod model;
mod price_component;
mod restriction;
mod wire;

pub use dimension::DimensionType;
pub use element::TariffElement;
pub use model::{CostBreakdown, CostLine, Tariff, TariffBuilder};
pub use price_component::PriceComponent;
pub use restriction::{Bounds, DateWindow, TariffRestriction, TariffRestrictionBuilder, TimeWindow};
