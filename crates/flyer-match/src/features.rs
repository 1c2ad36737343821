//! The ten-feature similarity vector shared by heuristic scoring and the
//! trained classifier. Feature order is part of the persisted model
//! format and must not change between versions.

use flyer_core::constants::FEATURE_COUNT;
use flyer_core::{CatalogProduct, ExtractedDeal};

use crate::strings;

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "levenshtein_sim",
    "jaro_winkler_sim",
    "ngram_overlap_2",
    "ngram_overlap_3",
    "word_overlap",
    "category_match",
    "price_reasonableness",
    "historical_purchase",
    "brand_match",
    "unit_match",
];

/// Fixed weights used until a classifier has been trained. Name
/// similarity carries most of the signal.
pub const HEURISTIC_WEIGHTS: [f64; FEATURE_COUNT] =
    [0.15, 0.2, 0.1, 0.1, 0.15, 0.1, 0.05, 0.05, 0.05, 0.05];

pub fn feature_names() -> Vec<String> {
    FEATURE_NAMES.iter().map(|n| n.to_string()).collect()
}

/// Compute the feature vector for one (deal, product) pair.
pub fn feature_vector(deal: &ExtractedDeal, product: &CatalogProduct) -> Vec<f64> {
    let mut features = vec![0.0; FEATURE_COUNT];

    let deal_name = deal
        .product_name
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();
    let product_name = product.name.to_lowercase();

    features[0] = strings::levenshtein_similarity(&deal_name, &product_name);
    features[1] = strings::jaro_winkler_similarity(&deal_name, &product_name);
    features[2] = strings::ngram_overlap(&deal_name, &product_name, 2);
    features[3] = strings::ngram_overlap(&deal_name, &product_name, 3);
    features[4] = strings::word_jaccard(&deal_name, &product_name);

    if let Some(hint) = deal.category_hint.as_deref() {
        if !hint.is_empty() && hint.eq_ignore_ascii_case(&product.category) {
            features[5] = 1.0;
        }
    }

    if let Some(price) = deal.price {
        if product.typical_price > 0.0 {
            let ratio = price / product.typical_price;
            features[6] = (1.0 - (ratio - 1.0).abs()).max(0.0);
        }
    }

    features[7] = product.purchase_frequency;

    if let (Some(deal_brand), Some(product_brand)) =
        (extract_brand(deal.product_name.as_deref()), &product.brand)
    {
        if product_brand.to_lowercase().contains(&deal_brand) {
            features[8] = 1.0;
        }
    }

    if let (Some(deal_unit), Some(product_unit)) = (deal.unit, product.unit) {
        if deal_unit == product_unit {
            features[9] = 1.0;
        }
    }

    features
}

/// Weighted sum used before any model exists.
pub fn heuristic_score(features: &[f64]) -> f64 {
    features
        .iter()
        .zip(HEURISTIC_WEIGHTS.iter())
        .map(|(f, w)| f * w)
        .sum()
}

/// The leading capitalized word of an ad product name is usually the
/// brand.
fn extract_brand(name: Option<&str>) -> Option<String> {
    let first = name?.split_whitespace().next()?;
    if first.chars().next()?.is_uppercase() {
        Some(first.to_lowercase())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flyer_core::{DealDetails, DealSource, Unit};

    fn deal(name: &str) -> ExtractedDeal {
        let mut d = ExtractedDeal::new(
            name,
            DealDetails::plain_price(),
            DealSource::generic("price"),
        );
        d.product_name = Some(name.to_string());
        d
    }

    fn product(name: &str) -> CatalogProduct {
        CatalogProduct {
            id: "p1".to_string(),
            name: name.to_string(),
            category: "dairy".to_string(),
            typical_price: 4.0,
            unit: Some(Unit::Each),
            brand: None,
            purchase_frequency: 0.0,
        }
    }

    #[test]
    fn identical_names_max_out_string_features() {
        let f = feature_vector(&deal("Whole Milk"), &product("Whole Milk"));
        for i in 0..5 {
            assert!((f[i] - 1.0).abs() < 1e-9, "feature {i} = {}", f[i]);
        }
    }

    #[test]
    fn missing_deal_name_zeroes_string_features() {
        let mut d = deal("x");
        d.product_name = None;
        let f = feature_vector(&d, &product("Whole Milk"));
        assert_eq!(&f[0..5], &[0.0; 5]);
    }

    #[test]
    fn price_reasonableness_peaks_at_typical_price() {
        let mut d = deal("Whole Milk");
        d.price = Some(4.0);
        let at_typical = feature_vector(&d, &product("Whole Milk"))[6];
        d.price = Some(6.0);
        let above = feature_vector(&d, &product("Whole Milk"))[6];
        d.price = Some(20.0);
        let far = feature_vector(&d, &product("Whole Milk"))[6];
        assert!((at_typical - 1.0).abs() < 1e-9);
        assert!(above < at_typical);
        assert_eq!(far, 0.0);
    }

    #[test]
    fn category_hint_drives_category_feature() {
        let mut d = deal("Whole Milk");
        d.category_hint = Some("Dairy".to_string());
        assert_eq!(feature_vector(&d, &product("Whole Milk"))[5], 1.0);
        d.category_hint = Some("produce".to_string());
        assert_eq!(feature_vector(&d, &product("Whole Milk"))[5], 0.0);
        d.category_hint = None;
        assert_eq!(feature_vector(&d, &product("Whole Milk"))[5], 0.0);
    }

    #[test]
    fn brand_matches_first_capitalized_word() {
        let mut p = product("Tide Pods 42ct");
        p.brand = Some("Tide".to_string());
        let f = feature_vector(&deal("Tide Laundry Detergent"), &p);
        assert_eq!(f[8], 1.0);
    }

    #[test]
    fn unit_feature_requires_both_units() {
        let mut d = deal("Ground Beef");
        d.unit = Some(Unit::Lb);
        let mut p = product("Ground Beef");
        p.unit = Some(Unit::Lb);
        assert_eq!(feature_vector(&d, &p)[9], 1.0);
        p.unit = None;
        assert_eq!(feature_vector(&d, &p)[9], 0.0);
    }

    #[test]
    fn heuristic_weights_sum_to_one() {
        let sum: f64 = HEURISTIC_WEIGHTS.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn heuristic_score_stays_in_unit_interval() {
        let f = feature_vector(&deal("Whole Milk"), &product("Whole Milk"));
        let s = heuristic_score(&f);
        assert!((0.0..=1.0).contains(&s));
    }
}
