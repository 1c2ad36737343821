use serde::{Deserialize, Serialize};

use super::defaults;

/// Extraction tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Max chars between a product-name span and the deal it labels.
    pub max_product_distance: usize,
    /// OCR row-grouping threshold as a fraction of page height.
    pub row_y_proximity: f64,
    /// Cap on stored raw_text for template block deals.
    pub max_raw_text_len: usize,
    /// Numeric captures from learned patterns must land in this range.
    pub min_plausible_price: f64,
    pub max_plausible_price: f64,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_product_distance: defaults::MAX_PRODUCT_DISTANCE,
            row_y_proximity: defaults::ROW_Y_PROXIMITY,
            max_raw_text_len: defaults::MAX_RAW_TEXT_LEN,
            min_plausible_price: defaults::MIN_PLAUSIBLE_PRICE,
            max_plausible_price: defaults::MAX_PLAUSIBLE_PRICE,
        }
    }
}

impl ExtractConfig {
    pub fn plausible_price(&self, price: f64) -> bool {
        (self.min_plausible_price..=self.max_plausible_price).contains(&price)
    }
}
