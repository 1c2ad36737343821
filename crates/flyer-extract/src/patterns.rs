//! Compiled pattern families for Phase 1 extraction.
//!
//! Family order matters: unit-suffixed price shapes run before the bare
//! price shape so `$3.99/lb` is not claimed as a plain `$3.99`.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use flyer_core::Unit;

/// What a price-family hit means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceLabel {
    Unit(Unit),
    Bare,
}

/// Price patterns, most specific first.
pub static PRICE_PATTERNS: LazyLock<Vec<(Regex, PriceLabel, &'static str)>> =
    LazyLock::new(|| {
        [
            (
                r"(?i)\$(\d+(?:\.\d{2})?)\s*/\s*(?:lb|pound|lbs)",
                PriceLabel::Unit(Unit::Lb),
                "unit_price_lb",
            ),
            (
                r"(?i)\$(\d+(?:\.\d{2})?)\s*/\s*(?:oz|ounce)",
                PriceLabel::Unit(Unit::Oz),
                "unit_price_oz",
            ),
            (
                r"(?i)\$(\d+(?:\.\d{2})?)\s*/\s*(?:kg|kilogram)",
                PriceLabel::Unit(Unit::Kg),
                "unit_price_kg",
            ),
            (
                r"(?i)\$(\d+(?:\.\d{2})?)\s*(?:ea|each)",
                PriceLabel::Unit(Unit::Each),
                "unit_price_each",
            ),
            (r"\$(\d+(?:\.\d{2})?)", PriceLabel::Bare, "price"),
        ]
        .into_iter()
        .map(|(p, label, name)| (Regex::new(p).unwrap(), label, name))
        .collect()
    });

/// Multi-buy: "2 for $5", "3/$10", "buy 2 @ $7".
pub static MULTI_BUY_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)\b(\d+)\s*(?:for|/)\s*\$(\d+(?:\.\d{2})?)", "multi_buy"),
        (
            r"(?i)buy\s+(\d+)\s+(?:for|@)\s*\$(\d+(?:\.\d{2})?)",
            "multi_buy_explicit",
        ),
    ]
    .into_iter()
    .map(|(p, name)| (Regex::new(p).unwrap(), name))
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BogoShape {
    /// "buy N get M free" or "BxGyF" — quantities captured.
    Counted,
    /// Bare "bogo" — 1 for 1.
    Simple,
}

pub static BOGO_PATTERNS: LazyLock<Vec<(Regex, BogoShape, &'static str)>> = LazyLock::new(|| {
    [
        (
            r"(?i)buy\s+(\d+)\s+get\s+(\d+)\s+free",
            BogoShape::Counted,
            "bogo",
        ),
        (
            r"(?i)\bb(?:uy\s*)?(\d)g(?:et\s*)?(\d)f(?:ree)?\b",
            BogoShape::Counted,
            "bogo_short",
        ),
        (r"(?i)\bbogo\b", BogoShape::Simple, "bogo_simple"),
    ]
    .into_iter()
    .map(|(p, shape, name)| (Regex::new(p).unwrap(), shape, name))
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountShape {
    Amount,
    Percent,
}

pub static DISCOUNT_PATTERNS: LazyLock<Vec<(Regex, DiscountShape, &'static str)>> =
    LazyLock::new(|| {
        [
            (
                r"(?i)save\s+\$(\d+(?:\.\d{2})?)",
                DiscountShape::Amount,
                "save_amount",
            ),
            (
                r"(?i)(\d+(?:\.\d{1,2})?)\s*%\s*off",
                DiscountShape::Percent,
                "percent_off",
            ),
            (
                r"(?i)\$(\d+(?:\.\d{2})?)\s*off",
                DiscountShape::Amount,
                "dollar_off",
            ),
        ]
        .into_iter()
        .map(|(p, shape, name)| (Regex::new(p).unwrap(), shape, name))
        .collect()
    });

/// Product-name candidates. OCR makes these noisy; association picks the
/// nearest preceding hit within a bounded distance.
pub static PRODUCT_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        // ALL-CAPS runs, common in ad headlines.
        (r"([A-Z][A-Z\s]{3,30})", "caps_product"),
        // Mixed case immediately before a price.
        (r"([A-Za-z][A-Za-z\s']{2,30})\s*\$", "product_before_price"),
        // Bulleted or dashed list entries.
        (r"[•\-]\s*([A-Za-z][A-Za-z\s']{2,30})", "bulleted_product"),
    ]
    .into_iter()
    .map(|(p, name)| (Regex::new(p).unwrap(), name))
    .collect()
});

/// What a store-specific hit means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreShape {
    /// Single price capture, plain price.
    Price,
    /// Single price capture behind a loyalty program.
    MemberPrice,
    /// Two captures: was-price then now-price.
    WasNow,
}

/// Store-specific overrides, keyed by normalized store name.
pub static STORE_PATTERNS: LazyLock<BTreeMap<&'static str, Vec<(Regex, StoreShape, &'static str)>>> =
    LazyLock::new(|| {
        let compile = |rows: &[(&'static str, StoreShape, &'static str)]| {
            rows.iter()
                .map(|(p, shape, name)| (Regex::new(p).unwrap(), *shape, *name))
                .collect::<Vec<_>>()
        };

        let mut map = BTreeMap::new();
        map.insert(
            "costco",
            compile(&[
                (
                    r"(?i)(?:manufacturer's?\s+)?instant\s+savings?\s+\$(\d+(?:\.\d{2})?)",
                    StoreShape::Price,
                    "instant_savings",
                ),
                (
                    r"(?i)after\s+(?:instant\s+)?savings?\s+\$(\d+(?:\.\d{2})?)",
                    StoreShape::Price,
                    "after_savings",
                ),
            ]),
        );
        map.insert(
            "whole_foods",
            compile(&[
                (
                    r"(?i)prime\s+member\s+deal[:\s]+\$(\d+(?:\.\d{2})?)",
                    StoreShape::MemberPrice,
                    "prime_deal",
                ),
                (
                    r"(?i)sale[:\s]+\$(\d+(?:\.\d{2})?)",
                    StoreShape::Price,
                    "sale_price",
                ),
            ]),
        );
        map.insert(
            "safeway",
            compile(&[
                (
                    r"(?i)club\s+price[:\s]+\$(\d+(?:\.\d{2})?)",
                    StoreShape::MemberPrice,
                    "club_price",
                ),
                (
                    r"(?i)just\s+for\s+u[:\s]+\$(\d+(?:\.\d{2})?)",
                    StoreShape::MemberPrice,
                    "j4u_price",
                ),
            ]),
        );
        map.insert(
            "walmart",
            compile(&[
                (
                    r"(?i)rollback[:\s]+\$(\d+(?:\.\d{2})?)",
                    StoreShape::Price,
                    "rollback",
                ),
                (
                    r"(?i)was\s+\$(\d+(?:\.\d{2})?)\s*now\s+\$(\d+(?:\.\d{2})?)",
                    StoreShape::WasNow,
                    "was_now",
                ),
            ]),
        );
        map
    });

/// Stores with built-in override patterns.
pub fn known_stores() -> Vec<String> {
    STORE_PATTERNS.keys().map(|k| k.to_string()).collect()
}
