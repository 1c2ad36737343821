use serde::{Deserialize, Serialize};

use super::confidence::Confidence;
use super::details::DealDetails;
use super::source::DealSource;
use super::types::{DealType, Unit};

/// A structured price/promotion record extracted from ad text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDeal {
    /// The matched span of source text, capped at a configured length.
    pub raw_text: String,
    /// Per-type payload.
    pub details: DealDetails,
    /// Product name associated from nearby text, when one was found.
    pub product_name: Option<String>,
    /// Category supplied by the caller (section headers, prior matches).
    /// Extraction never sets it; the matcher uses it for candidate
    /// backfill and the category-match feature.
    pub category_hint: Option<String>,
    /// Effective per-unit price where one applies (for MultiBuy this is
    /// total / quantity).
    pub price: Option<f64>,
    pub unit: Option<Unit>,
    pub confidence: Confidence,
    /// (start, end) byte offsets in the normalized source text.
    pub span: (usize, usize),
    pub source: DealSource,
}

impl ExtractedDeal {
    /// Build a deal with zero confidence; scoring happens in a later pass.
    pub fn new(raw_text: impl Into<String>, details: DealDetails, source: DealSource) -> Self {
        Self {
            raw_text: raw_text.into(),
            details,
            product_name: None,
            category_hint: None,
            price: None,
            unit: None,
            confidence: Confidence::default(),
            span: (0, 0),
            source,
        }
    }

    pub fn deal_type(&self) -> DealType {
        self.details.deal_type()
    }

    /// True when the two spans share at least one byte.
    pub fn overlaps(&self, other: &ExtractedDeal) -> bool {
        !(self.span.1 < other.span.0 || other.span.1 < self.span.0)
    }

    /// How much the extraction captured: +3 product name, +2 price,
    /// +1 unit, +1 discount, +1 original price. Used to settle overlap
    /// dedup in favor of the richer deal.
    pub fn info_score(&self) -> u32 {
        let mut score = 0;
        if self.product_name.is_some() {
            score += 3;
        }
        if self.price.is_some() {
            score += 2;
        }
        if self.unit.is_some() || self.details.quantity().is_some() {
            score += 1;
        }
        if self.details.has_discount() {
            score += 1;
        }
        if self.details.original_price().is_some() {
            score += 1;
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deal_at(start: usize, end: usize) -> ExtractedDeal {
        let mut d = ExtractedDeal::new(
            "$4.99",
            DealDetails::plain_price(),
            DealSource::generic("price"),
        );
        d.span = (start, end);
        d
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = deal_at(0, 5);
        let b = deal_at(3, 9);
        let c = deal_at(6, 10);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn info_score_rewards_completeness() {
        let bare = deal_at(0, 5);
        let mut rich = deal_at(0, 5);
        rich.product_name = Some("Organic Apples".to_string());
        rich.price = Some(4.99);
        rich.unit = Some(Unit::Lb);
        assert!(rich.info_score() > bare.info_score());
        assert_eq!(rich.info_score(), 6);
    }
}
