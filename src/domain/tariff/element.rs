//! Tariff element: one candidate pricing rule

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::model::{CostBreakdown, CostLine};
use super::price_component::PriceComponent;
use super::restriction::TariffRestriction;
use super::wire::TariffElementDto;
use crate::domain::session::{SessionSnapshot, Usage};
use crate::support::errors::{CostOverflow, TariffError, TariffResult};

/// Price components that apply together, optionally guarded by a restriction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TariffElementDto", into = "TariffElementDto")]
pub struct TariffElement {
    price_components: Vec<PriceComponent>,
    restriction: Option<TariffRestriction>,
}

impl TariffElement {
    pub fn new(
        price_components: impl IntoIterator<Item = PriceComponent>,
        restriction: Option<TariffRestriction>,
    ) -> TariffResult<Self> {
        let price_components: Vec<_> = price_components.into_iter().collect();
        if price_components.is_empty() {
            return Err(TariffError::invalid(
                "tariff element",
                "needs at least one price component",
            ));
        }

        Ok(Self {
            price_components,
            restriction,
        })
    }

    pub fn unrestricted(price_components: impl IntoIterator<Item = PriceComponent>) -> TariffResult<Self> {
        Self::new(price_components, None)
    }

    /// Never empty.
    pub fn price_components(&self) -> &[PriceComponent] {
        &self.price_components
    }

    pub fn restriction(&self) -> Option<&TariffRestriction> {
        self.restriction.as_ref()
    }

    pub fn is_restricted(&self) -> bool {
        self.restriction.is_some()
    }

    pub fn matches(&self, session: &SessionSnapshot) -> bool {
        self.restriction
            .as_ref()
            .map_or(true, |restriction| restriction.matches(session))
    }

    /// Sum of all components billed against `usage` for `session`.
    ///
    /// A dimension missing from `usage` bills zero usage.
    pub fn total_cost(&self, session: &SessionSnapshot, usage: &Usage) -> Result<Decimal, CostOverflow> {
        let total = self
            .price_components
            .iter()
            .try_fold(Decimal::ZERO, |total, component| {
                let cost = component.bill(usage.get(component.dimension()))?;
                total.checked_add(cost).ok_or(CostOverflow::Total)
            })?;
        trace!(at = %session.at(), %total, "Tariff element priced");
        Ok(total)
    }

    /// Per-component cost lines, in declaration order.
    pub fn cost_breakdown(
        &self,
        session: &SessionSnapshot,
        usage: &Usage,
    ) -> Result<CostBreakdown, CostOverflow> {
        let lines = self
            .price_components
            .iter()
            .map(|component| {
                let amount = usage.get(component.dimension());
                Ok::<_, CostOverflow>(CostLine {
                    dimension: component.dimension(),
                    usage: amount,
                    billed_quantity: component.billed_quantity(amount)?,
                    unit_price: component.unit_price(),
                    step_size: component.step_size(),
                    cost: component.bill(amount)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let total = lines
            .iter()
            .try_fold(Decimal::ZERO, |total, line| total.checked_add(line.cost))
            .ok_or(CostOverflow::Total)?;
        trace!(at = %session.at(), lines = lines.len(), %total, "Tariff element broken down");

        Ok(CostBreakdown { lines, total })
    }
}
