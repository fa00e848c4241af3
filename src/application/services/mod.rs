//! Application services

mod billing;

pub use billing::{evaluate, BillingService, Evaluation};
