//! Billing dimensions

use std::fmt;

use serde::{Deserialize, Serialize};

/// What a price component bills for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum DimensionType {
    /// Billed in kWh
    Energy,
    /// Fixed price per session, independent of usage
    Flat,
    /// Time not charging, billed in seconds
    ParkingTime,
    /// Time charging, billed in seconds
    Time,
}

impl DimensionType {
    pub const ALL: &'static [DimensionType] =
        &[Self::Energy, Self::Flat, Self::ParkingTime, Self::Time];

    /// Wire name of the dimension.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Energy => "ENERGY",
            Self::Flat => "FLAT",
            Self::ParkingTime => "PARKING_TIME",
            Self::Time => "TIME",
        }
    }

    /// Whether usage is measured in seconds.
    pub fn is_time_based(&self) -> bool {
        matches!(self, Self::Time | Self::ParkingTime)
    }
}

impl fmt::Display for DimensionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
