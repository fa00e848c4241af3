//! Price component: one billing dimension with its unit price and step size

use std::fmt;
use std::num::NonZeroU32;

use chrono::TimeDelta;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::dimension::DimensionType;
use crate::support::errors::{CostOverflow, TariffError, TariffResult};

fn default_step_size() -> NonZeroU32 {
    NonZeroU32::MIN
}

/// Pricing of a single dimension.
///
/// Usage is billed in blocks of `step_size` units of the dimension's
/// natural unit (seconds for time dimensions, kWh for energy). A time
/// component with step size 300 bills 6 minutes of use as 10 minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceComponent {
    #[serde(rename = "type")]
    dimension: DimensionType,
    #[serde(rename = "price")]
    unit_price: Decimal,
    #[serde(default = "default_step_size")]
    step_size: NonZeroU32,
}

impl PriceComponent {
    pub fn new(dimension: DimensionType, unit_price: Decimal, step_size: u32) -> TariffResult<Self> {
        let step_size = NonZeroU32::new(step_size)
            .ok_or_else(|| TariffError::invalid("price component", "step_size must be >= 1"))?;

        Ok(Self {
            dimension,
            unit_price,
            step_size,
        })
    }

    /// Fixed fee per session.
    pub fn flat_rate(price: Decimal) -> Self {
        Self {
            dimension: DimensionType::Flat,
            unit_price: price,
            step_size: NonZeroU32::MIN,
        }
    }

    /// Price per kWh, billed per whole kWh.
    pub fn energy(price_per_kwh: Decimal) -> Self {
        Self {
            dimension: DimensionType::Energy,
            unit_price: price_per_kwh,
            step_size: NonZeroU32::MIN,
        }
    }

    /// Price per second of charging, billed in `billing_increment` blocks.
    pub fn charging_time(price: Decimal, billing_increment: TimeDelta) -> TariffResult<Self> {
        Self::new(DimensionType::Time, price, increment_seconds(billing_increment)?)
    }

    /// Price per second of parking, billed in `billing_increment` blocks.
    pub fn parking_time(price: Decimal, billing_increment: TimeDelta) -> TariffResult<Self> {
        Self::new(
            DimensionType::ParkingTime,
            price,
            increment_seconds(billing_increment)?,
        )
    }

    pub fn dimension(&self) -> DimensionType {
        self.dimension
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn step_size(&self) -> u32 {
        self.step_size.get()
    }

    /// Number of whole blocks billed for `usage`. Negative usage bills nothing.
    pub fn billed_blocks(&self, usage: Decimal) -> Decimal {
        match self.dimension {
            DimensionType::Flat => Decimal::ONE,
            DimensionType::Energy | DimensionType::Time | DimensionType::ParkingTime => {
                let usage = usage.max(Decimal::ZERO);
                (usage / Decimal::from(self.step_size.get())).ceil()
            }
        }
    }

    /// `usage` rounded up to the next whole block, in the dimension's unit.
    pub fn billed_quantity(&self, usage: Decimal) -> Result<Decimal, CostOverflow> {
        match self.dimension {
            DimensionType::Flat => Ok(Decimal::ONE),
            DimensionType::Energy | DimensionType::Time | DimensionType::ParkingTime => self
                .billed_blocks(usage)
                .checked_mul(Decimal::from(self.step_size.get()))
                .ok_or(CostOverflow::Component(self.dimension)),
        }
    }

    /// Cost of `usage`. A flat component ignores its argument.
    ///
    /// `unit_price` is per natural unit, so a TIME price is per second and
    /// an ENERGY price per kWh, whatever the step size.
    pub fn bill(&self, usage: Decimal) -> Result<Decimal, CostOverflow> {
        let cost = match self.dimension {
            DimensionType::Flat => self.unit_price,
            DimensionType::Energy | DimensionType::Time | DimensionType::ParkingTime => self
                .billed_quantity(usage)?
                .checked_mul(self.unit_price)
                .ok_or(CostOverflow::Component(self.dimension))?,
        };
        trace!(
            dimension = %self.dimension,
            %usage,
            step_size = self.step_size.get(),
            %cost,
            "Price component billed"
        );
        Ok(cost)
    }
}

/// Whole seconds of a billing increment, rounded to nearest (ties to even).
fn increment_seconds(increment: TimeDelta) -> TariffResult<u32> {
    let seconds = (Decimal::from(increment.num_milliseconds()) / Decimal::from(1000)).round();
    seconds.to_u32().filter(|s| *s >= 1).ok_or_else(|| {
        TariffError::invalid(
            "price component",
            format!("billing increment {increment} rounds to less than one second"),
        )
    })
}

impl fmt::Display for PriceComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type: {}, price: {}, step size: {}",
            self.dimension, self.unit_price, self.step_size
        )
    }
}
