use serde::{Deserialize, Serialize};

use super::types::{DealType, Unit};

/// Per-type deal payload. A tagged union instead of an open metadata map,
/// so each variant carries exactly the fields that exist for that kind of
/// promotion and matching on it is exhaustive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum DealDetails {
    Price {
        /// Pre-discount price when the ad shows one ("was $X now $Y").
        original_price: Option<f64>,
        discount_amount: Option<f64>,
    },
    UnitPrice {
        unit: Unit,
    },
    MultiBuy {
        quantity: u32,
        /// Bundle total as printed; the deal's `price` field holds the
        /// derived per-unit price.
        total_price: f64,
    },
    Bogo {
        buy_quantity: u32,
        get_quantity: u32,
    },
    SaveAmount {
        amount: f64,
    },
    PercentOff {
        percent: f64,
    },
    MemberPrice {
        /// Loyalty program the price is gated behind, when known.
        program: Option<String>,
    },
    Unknown,
}

impl DealDetails {
    /// Plain price with nothing else attached.
    pub fn plain_price() -> Self {
        DealDetails::Price {
            original_price: None,
            discount_amount: None,
        }
    }

    pub fn deal_type(&self) -> DealType {
        match self {
            DealDetails::Price { .. } => DealType::Price,
            DealDetails::UnitPrice { .. } => DealType::UnitPrice,
            DealDetails::MultiBuy { .. } => DealType::MultiBuy,
            DealDetails::Bogo { .. } => DealType::Bogo,
            DealDetails::SaveAmount { .. } => DealType::SaveAmount,
            DealDetails::PercentOff { .. } => DealType::PercentOff,
            DealDetails::MemberPrice { .. } => DealType::MemberPrice,
            DealDetails::Unknown => DealType::Unknown,
        }
    }

    /// Bundle or buy quantity, for the variants that have one.
    pub fn quantity(&self) -> Option<u32> {
        match self {
            DealDetails::MultiBuy { quantity, .. } => Some(*quantity),
            DealDetails::Bogo { buy_quantity, .. } => Some(*buy_quantity),
            _ => None,
        }
    }

    /// Whether the deal carries any discount figure.
    pub fn has_discount(&self) -> bool {
        match self {
            DealDetails::Price {
                discount_amount, ..
            } => discount_amount.is_some(),
            DealDetails::SaveAmount { .. } | DealDetails::PercentOff { .. } => true,
            _ => false,
        }
    }

    pub fn original_price(&self) -> Option<f64> {
        match self {
            DealDetails::Price { original_price, .. } => *original_price,
            _ => None,
        }
    }
}
