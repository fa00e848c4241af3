//! # OCPI tariffs
//!
//! Tariff model and evaluation engine for EV charging sessions, following
//! the OCPI tariff structure.
//!
//! ## Architecture
//!
//! - **domain**: tariff value types (price components, restrictions,
//!   elements, tariffs) and the session snapshot they are evaluated against
//! - **application**: the evaluation entry point and billing service
//! - **support**: errors and tracing setup
//! - **config**: TOML configuration
//!
//! ```
//! use chrono::{NaiveDate, TimeDelta};
//! use ocpi_tariffs::domain::{
//!     CurrencyCode, DimensionType, PriceComponent, SessionSnapshot, Tariff, TariffElement,
//!     TariffId, Usage,
//! };
//!
//! let tariff = Tariff::builder(TariffId::new("12")?, CurrencyCode::new("EUR")?)
//!     .element(TariffElement::unrestricted([
//!         PriceComponent::flat_rate("1.00".parse()?),
//!         PriceComponent::energy("0.25".parse()?),
//!     ])?)
//!     .build()?;
//!
//! let at = NaiveDate::from_ymd_opt(2024, 6, 11).unwrap().and_hms_opt(9, 30, 0).unwrap();
//! let session = SessionSnapshot::new(at, "20".parse()?, "11".parse()?, TimeDelta::hours(2));
//! let usage = Usage::new().with(DimensionType::Energy, session.energy_kwh());
//!
//! let cost = ocpi_tariffs::evaluate(&tariff, &session, &usage)?;
//! assert_eq!(cost, "6.00".parse::<rust_decimal::Decimal>()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod support;

pub use config::{default_config_path, AppConfig};

// Re-export the evaluation entry point
pub use application::{evaluate, BillingService, Evaluation};
