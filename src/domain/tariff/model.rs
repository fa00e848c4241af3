//! Tariff domain entity

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::dimension::DimensionType;
use super::element::TariffElement;
use super::wire::TariffDto;
use crate::domain::common::{CurrencyCode, DisplayText, EnergyMix, MultiLanguageText, TariffId};
use crate::domain::session::{SessionSnapshot, Usage};
use crate::support::errors::{EvaluationError, NoMatchingElement, TariffError, TariffResult};

/// A tariff: ordered alternative pricing elements.
///
/// Elements are tried in declaration order and the first one whose
/// restriction matches the session prices it. A cheaper element further
/// down the list is never preferred.
///
/// Equality, ordering and hashing look at `id` only, so two versions of the
/// same tariff with different prices compare equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TariffDto", into = "TariffDto")]
pub struct Tariff {
    id: TariffId,
    currency: CurrencyCode,
    text: MultiLanguageText,
    info_url: Option<String>,
    elements: Vec<TariffElement>,
    energy_mix: Option<EnergyMix>,
}

impl Tariff {
    pub fn builder(id: TariffId, currency: CurrencyCode) -> TariffBuilder {
        TariffBuilder {
            id,
            currency,
            text: Vec::new(),
            info_url: None,
            elements: Vec::new(),
            energy_mix: None,
        }
    }

    pub fn id(&self) -> &TariffId {
        &self.id
    }

    pub fn currency(&self) -> CurrencyCode {
        self.currency
    }

    pub fn text(&self) -> &[DisplayText] {
        &self.text
    }

    pub fn info_url(&self) -> Option<&str> {
        self.info_url.as_deref()
    }

    /// Never empty; order is priority.
    pub fn elements(&self) -> &[TariffElement] {
        &self.elements
    }

    pub fn energy_mix(&self) -> Option<&EnergyMix> {
        self.energy_mix.as_ref()
    }

    pub fn first_element(&self) -> &TariffElement {
        &self.elements[0]
    }

    /// Position of the first element whose restriction matches.
    pub fn select_element_index(&self, session: &SessionSnapshot) -> Option<usize> {
        let index = self
            .elements
            .iter()
            .position(|element| element.matches(session));

        match index {
            Some(index) => debug!(tariff_id = %self.id, index, "Tariff element selected"),
            None => debug!(tariff_id = %self.id, "No tariff element matches session"),
        }

        index
    }

    pub fn select_element(&self, session: &SessionSnapshot) -> Option<&TariffElement> {
        self.select_element_index(session)
            .map(|index| &self.elements[index])
    }

    fn no_match(&self) -> NoMatchingElement {
        NoMatchingElement {
            tariff_id: self.id.clone(),
        }
    }

    /// Cost of `usage` under the element selected for `session`.
    pub fn total_cost(&self, session: &SessionSnapshot, usage: &Usage) -> Result<Decimal, EvaluationError> {
        let element = self.select_element(session).ok_or_else(|| self.no_match())?;
        Ok(element.total_cost(session, usage)?)
    }

    pub fn cost_breakdown(
        &self,
        session: &SessionSnapshot,
        usage: &Usage,
    ) -> Result<CostBreakdown, EvaluationError> {
        let element = self.select_element(session).ok_or_else(|| self.no_match())?;
        Ok(element.cost_breakdown(session, usage)?)
    }
}

impl PartialEq for Tariff {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Tariff {}

impl PartialOrd for Tariff {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tariff {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for Tariff {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for Tariff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Assembles a [`Tariff`]; `build` rejects a tariff without elements.
#[derive(Debug, Clone)]
pub struct TariffBuilder {
    id: TariffId,
    currency: CurrencyCode,
    text: MultiLanguageText,
    info_url: Option<String>,
    elements: Vec<TariffElement>,
    energy_mix: Option<EnergyMix>,
}

impl TariffBuilder {
    pub fn text(mut self, text: DisplayText) -> Self {
        self.text.push(text);
        self
    }

    pub fn texts(mut self, texts: impl IntoIterator<Item = DisplayText>) -> Self {
        self.text.extend(texts);
        self
    }

    pub fn info_url(mut self, url: impl Into<String>) -> Self {
        self.info_url = Some(url.into());
        self
    }

    pub fn element(mut self, element: TariffElement) -> Self {
        self.elements.push(element);
        self
    }

    pub fn elements(mut self, elements: impl IntoIterator<Item = TariffElement>) -> Self {
        self.elements.extend(elements);
        self
    }

    pub fn energy_mix(mut self, energy_mix: EnergyMix) -> Self {
        self.energy_mix = Some(energy_mix);
        self
    }

    pub fn build(self) -> TariffResult<Tariff> {
        if self.elements.is_empty() {
            return Err(TariffError::invalid(
                "tariff",
                format!("{} needs at least one element", self.id),
            ));
        }

        Ok(Tariff {
            id: self.id,
            currency: self.currency,
            text: self.text,
            info_url: self.info_url,
            elements: self.elements,
            energy_mix: self.energy_mix,
        })
    }
}

/// Cost of one price component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostLine {
    pub dimension: DimensionType,
    /// Raw usage fed into the component
    pub usage: Decimal,
    /// Usage after rounding up to whole steps
    pub billed_quantity: Decimal,
    pub unit_price: Decimal,
    pub step_size: u32,
    pub cost: Decimal,
}

/// Cost breakdown for a charging session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostBreakdown {
    pub lines: Vec<CostLine>,
    pub total: Decimal,
}

impl CostBreakdown {
    /// Summed cost of all lines billing `dimension`.
    pub fn cost_of(&self, dimension: DimensionType) -> Decimal {
        self.lines
            .iter()
            .filter(|line| line.dimension == dimension)
            .map(|line| line.cost)
            .sum()
    }
}

// ── Tests ──────────────────────────────────────────────────────
