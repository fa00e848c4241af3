//! Billing service for pricing charging sessions against a tariff

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::{EvaluationConfig, FallbackPolicy};
use crate::domain::{
    CostBreakdown, CurrencyCode, EvaluationError, NoMatchingElement, SessionSnapshot, Tariff,
    TariffId, Usage,
};

/// Price `usage` with the element of `tariff` selected for `session`.
///
/// Fails when no element matches, leaving the fallback to the caller, or
/// when the cost leaves the decimal range.
pub fn evaluate(
    tariff: &Tariff,
    session: &SessionSnapshot,
    usage: &Usage,
) -> Result<Decimal, EvaluationError> {
    tariff.total_cost(session, usage)
}

/// Result of pricing one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub tariff_id: TariffId,
    pub currency: CurrencyCode,
    /// Position of the element that priced the session
    pub element_index: usize,
    /// The element was chosen by the fallback policy, not by its restriction
    pub fallback_applied: bool,
    pub breakdown: CostBreakdown,
    /// Breakdown total, rounded when configured
    pub total: Decimal,
}

impl Evaluation {
    pub fn format_total(&self) -> String {
        format!("{} {}", self.total, self.currency)
    }
}

/// Service for billing operations
#[derive(Debug, Clone, Default)]
pub struct BillingService {
    config: EvaluationConfig,
}

impl BillingService {
    pub fn new(config: EvaluationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    pub fn evaluate(
        &self,
        tariff: &Tariff,
        session: &SessionSnapshot,
        usage: &Usage,
    ) -> Result<Evaluation, EvaluationError> {
        let (element_index, fallback_applied) = match tariff.select_element_index(session) {
            Some(index) => (index, false),
            None => match self.config.fallback {
                FallbackPolicy::FirstElement => {
                    warn!(
                        tariff_id = %tariff.id(),
                        "No tariff element matches, pricing with the first element"
                    );
                    (0, true)
                }
                FallbackPolicy::Reject => {
                    metrics::counter!("tariff_evaluations_total", "outcome" => "rejected")
                        .increment(1);
                    warn!(tariff_id = %tariff.id(), "No tariff element matches, session rejected");
                    return Err(NoMatchingElement {
                        tariff_id: tariff.id().clone(),
                    }
                    .into());
                }
            },
        };

        let breakdown = tariff.elements()[element_index]
            .cost_breakdown(session, usage)
            .inspect_err(|e| {
                metrics::counter!("tariff_evaluations_total", "outcome" => "overflow").increment(1);
                error!(tariff_id = %tariff.id(), element_index, "Failed to price session: {}", e);
            })?;
        let total = match self.config.round_to {
            Some(dp) => breakdown.total.round_dp(dp),
            None => breakdown.total,
        };

        let outcome = if fallback_applied { "fallback" } else { "matched" };
        metrics::counter!("tariff_evaluations_total", "outcome" => outcome).increment(1);

        debug!(
            tariff_id = %tariff.id(),
            element_index,
            lines = breakdown.lines.len(),
            "Cost breakdown calculated"
        );
        info!(
            tariff_id = %tariff.id(),
            element_index,
            fallback_applied,
            total = %total,
            currency = %tariff.currency(),
            "Session priced"
        );

        Ok(Evaluation {
            tariff_id: tariff.id().clone(),
            currency: tariff.currency(),
            element_index,
            fallback_applied,
            breakdown,
            total,
        })
    }

    /// Evaluate with usage derived from the snapshot plus `parking_time`.
    pub fn evaluate_session(
        &self,
        tariff: &Tariff,
        session: &SessionSnapshot,
        parking_time: chrono::TimeDelta,
    ) -> Result<Evaluation, EvaluationError> {
        self.evaluate(tariff, session, &Usage::from_session(session, parking_time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DimensionType, PriceComponent, TariffElement, TariffRestriction};
    use chrono::{NaiveDateTime, TimeDelta, Weekday};

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn session(when: &str) -> SessionSnapshot {
        SessionSnapshot::new(
            NaiveDateTime::parse_from_str(when, "%Y-%m-%d %H:%M").unwrap(),
            d("10.5"),
            d("11"),
            TimeDelta::minutes(50),
        )
    }

    /// Only priced on weekends.
    fn weekend_tariff() -> Tariff {
        let weekend = TariffRestriction::builder()
            .days_of_week([Weekday::Sat, Weekday::Sun])
            .build()
            .unwrap();
        Tariff::builder(TariffId::new("W1").unwrap(), CurrencyCode::new("EUR").unwrap())
            .element(
                TariffElement::new(
                    [
                        PriceComponent::energy(d("0.333")),
                        PriceComponent::parking_time(d("0.0011"), TimeDelta::minutes(1)).unwrap(),
                    ],
                    Some(weekend),
                )
                .unwrap(),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn evaluate_returns_selected_element_cost() {
        let usage = Usage::new().with(DimensionType::Energy, d("10.5"));
        // 11 kWh * 0.333
        assert_eq!(
            evaluate(&weekend_tariff(), &session("2024-06-08 12:00"), &usage).unwrap(),
            d("3.663")
        );
    }

    #[test]
    fn evaluate_reports_no_match() {
        let err = evaluate(&weekend_tariff(), &session("2024-06-11 12:00"), &Usage::new()).unwrap_err();
        assert!(matches!(err, EvaluationError::NoMatch(ref e) if e.tariff_id.as_str() == "W1"));
    }

    #[test]
    fn reject_policy_surfaces_no_match() {
        let service = BillingService::default();
        let result = service.evaluate_session(&weekend_tariff(), &session("2024-06-11 12:00"), TimeDelta::zero());
        assert!(result.is_err());
    }

    #[test]
    fn first_element_policy_prices_unmatched_session() {
        let service = BillingService::new(EvaluationConfig {
            fallback: FallbackPolicy::FirstElement,
            round_to: None,
        });
        let evaluation = service
            .evaluate_session(&weekend_tariff(), &session("2024-06-11 12:00"), TimeDelta::zero())
            .unwrap();
        assert!(evaluation.fallback_applied);
        assert_eq!(evaluation.element_index, 0);
        assert_eq!(evaluation.total, d("3.663"));
    }

    #[test]
    fn total_is_rounded_but_lines_are_not() {
        let service = BillingService::new(EvaluationConfig {
            fallback: FallbackPolicy::Reject,
            round_to: Some(2),
        });
        let evaluation = service
            .evaluate_session(&weekend_tariff(), &session("2024-06-09 12:00"), TimeDelta::seconds(61))
            .unwrap();

        assert!(!evaluation.fallback_applied);
        // 3.663 energy + 120 s * 0.0011 parking
        assert_eq!(evaluation.breakdown.total, d("3.795"));
        // ties to even
        assert_eq!(evaluation.total, d("3.80"));
        assert_eq!(evaluation.format_total(), "3.80 EUR");
    }

    #[test]
    fn overflowing_usage_is_an_error_not_a_panic() {
        let service = BillingService::default();
        let usage = Usage::new().with(DimensionType::ParkingTime, Decimal::MAX);
        let err = service
            .evaluate(&weekend_tariff(), &session("2024-06-09 12:00"), &usage)
            .unwrap_err();
        assert!(matches!(err, EvaluationError::Overflow(_)));
    }
}
