use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::LearnError;

/// Kinds of promotions that appear in grocery ad text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealType {
    /// Plain price: `$4.99`.
    Price,
    /// Price per unit: `$3.99/lb`, `$1.99 ea`.
    UnitPrice,
    /// Bundle price: `2 for $5`, `3/$10`.
    MultiBuy,
    /// Buy N get M free.
    Bogo,
    /// Flat discount: `Save $2`, `$3 off`.
    SaveAmount,
    /// Percentage discount: `25% off`.
    PercentOff,
    /// Loyalty-program price: club price, prime deal.
    MemberPrice,
    Unknown,
}

impl DealType {
    pub const ALL: [DealType; 8] = [
        DealType::Price,
        DealType::UnitPrice,
        DealType::MultiBuy,
        DealType::Bogo,
        DealType::SaveAmount,
        DealType::PercentOff,
        DealType::MemberPrice,
        DealType::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DealType::Price => "price",
            DealType::UnitPrice => "unit_price",
            DealType::MultiBuy => "multi_buy",
            DealType::Bogo => "bogo",
            DealType::SaveAmount => "save_amount",
            DealType::PercentOff => "percent_off",
            DealType::MemberPrice => "member_price",
            DealType::Unknown => "unknown",
        }
    }

    /// Lenient parse for the correction-ingestion path only: unrecognized
    /// strings collapse to `Price`. Every other boundary must use `FromStr`
    /// and surface `LearnError::UnknownDealType`.
    pub fn or_price(s: &str) -> DealType {
        s.parse().unwrap_or(DealType::Price)
    }
}

impl FromStr for DealType {
    type Err = LearnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price" => Ok(DealType::Price),
            "unit_price" => Ok(DealType::UnitPrice),
            "multi_buy" => Ok(DealType::MultiBuy),
            "bogo" => Ok(DealType::Bogo),
            "save_amount" => Ok(DealType::SaveAmount),
            "percent_off" => Ok(DealType::PercentOff),
            "member_price" => Ok(DealType::MemberPrice),
            "unknown" => Ok(DealType::Unknown),
            other => Err(LearnError::UnknownDealType {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for DealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sales unit attached to unit-priced deals and catalog products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Lb,
    Oz,
    Kg,
    Each,
}

impl Unit {
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Lb => "lb",
            Unit::Oz => "oz",
            Unit::Kg => "kg",
            Unit::Each => "ea",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
