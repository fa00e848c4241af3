pub mod errors;
pub mod telemetry;

pub use errors::{
    AppError, ConfigError, CostOverflow, EvaluationError, NoMatchingElement, TariffError,
    TariffResult,
};
pub use telemetry::init_tracing;
