use serde::{Deserialize, Serialize};

use flyer_core::deal::{DealDetails, DealType, ExtractedDeal, Unit};
use flyer_core::models::ProductMatch;

/// Fields of a deal a user can correct. Anything left `None` keeps the
/// original value. This is the boundary type external callers submit, so
/// `deal_type` is a free-form string parsed leniently with
/// [`DealType::or_price`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DealPatch {
    pub product_name: Option<String>,
    pub price: Option<f64>,
    pub deal_type: Option<String>,
}

impl DealPatch {
    pub fn price(price: f64) -> Self {
        DealPatch {
            price: Some(price),
            ..Default::default()
        }
    }

    pub fn product_name(name: &str) -> Self {
        DealPatch {
            product_name: Some(name.to_string()),
            ..Default::default()
        }
    }

    /// Apply the patch to the deal it corrects. A deal-type change
    /// degrades the payload to the minimal shape of the target type;
    /// the patch cannot express richer payload fields.
    pub fn apply_to(&self, original: &ExtractedDeal) -> ExtractedDeal {
        let mut deal = original.clone();
        if let Some(name) = &self.product_name {
            deal.product_name = Some(name.clone());
        }
        if let Some(price) = self.price {
            deal.price = Some(price);
        }
        if let Some(type_str) = &self.deal_type {
            let target = DealType::or_price(type_str);
            if target != original.deal_type() {
                deal.details = minimal_details(target, deal.price);
                if target != DealType::UnitPrice {
                    deal.unit = None;
                }
            }
        }
        deal
    }
}

fn minimal_details(target: DealType, price: Option<f64>) -> DealDetails {
    match target {
        DealType::Price | DealType::Unknown => DealDetails::plain_price(),
        DealType::UnitPrice => DealDetails::UnitPrice { unit: Unit::Each },
        DealType::MultiBuy => DealDetails::MultiBuy {
            quantity: 1,
            total_price: price.unwrap_or(0.0),
        },
        DealType::Bogo => DealDetails::Bogo {
            buy_quantity: 1,
            get_quantity: 1,
        },
        DealType::SaveAmount => DealDetails::SaveAmount {
            amount: price.unwrap_or(0.0),
        },
        DealType::PercentOff => DealDetails::PercentOff { percent: 0.0 },
        DealType::MemberPrice => DealDetails::MemberPrice { program: None },
    }
}

/// One user correction as submitted to the learner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionRequest {
    pub store: String,
    /// The deal the extractor produced.
    pub original_deal: ExtractedDeal,
    /// What the user changed about it.
    pub patch: DealPatch,
    /// Ad text around the deal, used to probe for new price patterns.
    pub raw_text: String,
    /// The product match the user rejected, when there was one.
    pub original_match: Option<ProductMatch>,
    /// Catalog id of the product the user says is right.
    pub corrected_product_id: Option<String>,
}

impl CorrectionRequest {
    pub fn new(store: &str, original_deal: ExtractedDeal, patch: DealPatch) -> Self {
        let raw_text = original_deal.raw_text.clone();
        CorrectionRequest {
            store: store.to_string(),
            original_deal,
            patch,
            raw_text,
            original_match: None,
            corrected_product_id: None,
        }
    }

    pub fn with_raw_text(mut self, raw_text: &str) -> Self {
        self.raw_text = raw_text.to_string();
        self
    }

    pub fn with_match(mut self, rejected: ProductMatch, corrected_product_id: &str) -> Self {
        self.original_match = Some(rejected);
        self.corrected_product_id = Some(corrected_product_id.to_string());
        self
    }
}
