//! Store template model and the built-in defaults.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use flyer_core::DealType;

/// How a store lays its ad pages out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutType {
    /// Deal cells in columns; blocks split on blank lines.
    #[default]
    Grid,
    /// One deal per separator-delimited line.
    List,
    /// Irregular; blocks split on blank-line runs.
    Mixed,
}

/// What a layout region holds. Only `Deals` regions feed extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionRole {
    #[default]
    Deals,
    Header,
    Footer,
    Image,
}

/// A fractional bounding box on the page, 0..1 on both axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutRegion {
    pub name: String,
    pub x_start: f64,
    pub x_end: f64,
    pub y_start: f64,
    pub y_end: f64,
    #[serde(default)]
    pub role: RegionRole,
}

impl LayoutRegion {
    pub fn new(name: &str, x_start: f64, x_end: f64, y_start: f64, y_end: f64, role: RegionRole) -> Self {
        Self {
            name: name.to_string(),
            x_start,
            x_end,
            y_start,
            y_end,
            role,
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.x_start..=self.x_end).contains(&x) && (self.y_start..=self.y_end).contains(&y)
    }
}

/// A pattern learned from a user correction, scanned against the full ad
/// text on every parse for this store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomPattern {
    pub id: String,
    pub pattern: String,
    pub deal_type: DealType,
    /// Snippet of the corrected deal's raw text, for auditability.
    pub learned_from: String,
}

/// Everything learned about one store's ad format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreTemplate {
    pub store_name: String,
    pub layout_type: LayoutType,
    pub regions: Vec<LayoutRegion>,
    /// Store-specific price regex; first capture group is the price.
    pub price_pattern: Option<String>,
    /// Store-specific product-name regex, matched per line.
    pub product_pattern: Option<String>,
    /// Block separator for `List` layouts.
    pub deal_separator: String,
    pub columns: u32,
    pub has_header: bool,
    pub has_member_prices: bool,
    /// Corrections absorbed into this template.
    pub sample_count: u32,
    /// Rolling extraction accuracy reported by the tracker, 0..1.
    pub accuracy: f64,
    pub last_updated: Option<DateTime<Utc>>,
    pub custom_patterns: Vec<CustomPattern>,
}

impl Default for StoreTemplate {
    fn default() -> Self {
        Self {
            store_name: String::new(),
            layout_type: LayoutType::Grid,
            regions: Vec::new(),
            price_pattern: None,
            product_pattern: None,
            deal_separator: "\n".to_string(),
            columns: 1,
            has_header: true,
            has_member_prices: false,
            sample_count: 0,
            accuracy: 0.0,
            last_updated: None,
            custom_patterns: Vec::new(),
        }
    }
}

impl StoreTemplate {
    pub fn named(store: &str) -> Self {
        Self {
            store_name: store.to_string(),
            ..Self::default()
        }
    }
}

fn standard_regions(header_end: f64, footer_start: f64) -> Vec<LayoutRegion> {
    vec![
        LayoutRegion::new("header", 0.0, 1.0, 0.0, header_end, RegionRole::Header),
        LayoutRegion::new("main_deals", 0.0, 1.0, header_end, footer_start, RegionRole::Deals),
        LayoutRegion::new("footer", 0.0, 1.0, footer_start, 1.0, RegionRole::Footer),
    ]
}

/// Built-in templates for common chains. Learned state loaded from disk
/// overrides these per store.
pub fn default_templates() -> BTreeMap<String, StoreTemplate> {
    let mut map = BTreeMap::new();

    map.insert(
        "costco".to_string(),
        StoreTemplate {
            layout_type: LayoutType::Grid,
            columns: 2,
            has_member_prices: true,
            regions: standard_regions(0.1, 0.85),
            price_pattern: Some(r"\$(\d+\.\d{2})\s+(?:after|instant)".to_string()),
            product_pattern: Some(r"^([A-Z][A-Z\s]{5,40})$".to_string()),
            ..StoreTemplate::named("costco")
        },
    );
    map.insert(
        "whole_foods".to_string(),
        StoreTemplate {
            layout_type: LayoutType::Mixed,
            columns: 3,
            has_member_prices: true,
            regions: vec![
                LayoutRegion::new("header", 0.0, 1.0, 0.0, 0.15, RegionRole::Header),
                LayoutRegion::new("prime_deals", 0.0, 0.5, 0.15, 0.5, RegionRole::Deals),
                LayoutRegion::new("regular_deals", 0.5, 1.0, 0.15, 0.85, RegionRole::Deals),
                LayoutRegion::new("footer", 0.0, 1.0, 0.85, 1.0, RegionRole::Footer),
            ],
            price_pattern: Some(r"(?:sale|prime)\s*\$(\d+\.\d{2})".to_string()),
            ..StoreTemplate::named("whole_foods")
        },
    );
    map.insert(
        "safeway".to_string(),
        StoreTemplate {
            layout_type: LayoutType::Grid,
            columns: 3,
            has_member_prices: true,
            regions: standard_regions(0.12, 0.88),
            price_pattern: Some(r"club\s+price\s+\$(\d+\.\d{2})".to_string()),
            ..StoreTemplate::named("safeway")
        },
    );
    map.insert(
        "walmart".to_string(),
        StoreTemplate {
            layout_type: LayoutType::List,
            columns: 1,
            regions: standard_regions(0.1, 0.9),
            price_pattern: Some(
                r"(?:rollback|was\s+\$\d+\.\d{2}\s+now)\s*\$(\d+\.\d{2})".to_string(),
            ),
            ..StoreTemplate::named("walmart")
        },
    );
    map.insert(
        "kroger".to_string(),
        StoreTemplate {
            layout_type: LayoutType::Grid,
            columns: 4,
            has_member_prices: true,
            regions: vec![
                LayoutRegion::new("header", 0.0, 1.0, 0.0, 0.1, RegionRole::Header),
                LayoutRegion::new("digital_coupons", 0.0, 0.3, 0.1, 0.5, RegionRole::Deals),
                LayoutRegion::new("main_deals", 0.3, 1.0, 0.1, 0.9, RegionRole::Deals),
                LayoutRegion::new("footer", 0.0, 1.0, 0.9, 1.0, RegionRole::Footer),
            ],
            ..StoreTemplate::named("kroger")
        },
    );

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_common_chains() {
        let templates = default_templates();
        assert_eq!(templates.len(), 5);
        for (key, t) in &templates {
            assert_eq!(key, &t.store_name);
            assert!(t.regions.iter().any(|r| r.role == RegionRole::Deals));
        }
        assert_eq!(templates["walmart"].layout_type, LayoutType::List);
        assert_eq!(templates["costco"].columns, 2);
    }

    #[test]
    fn default_price_patterns_compile() {
        for t in default_templates().values() {
            if let Some(p) = &t.price_pattern {
                assert!(regex::Regex::new(p).is_ok(), "bad pattern for {}", t.store_name);
            }
        }
    }

    #[test]
    fn region_containment_is_inclusive() {
        let r = LayoutRegion::new("deals", 0.0, 1.0, 0.1, 0.85, RegionRole::Deals);
        assert!(r.contains(0.5, 0.1));
        assert!(r.contains(0.5, 0.85));
        assert!(!r.contains(0.5, 0.9));
    }

    #[test]
    fn template_round_trips_through_json() {
        let mut t = default_templates().remove("costco").unwrap();
        t.custom_patterns.push(CustomPattern {
            id: "price_1".to_string(),
            pattern: r"\$(4\.99)".to_string(),
            deal_type: DealType::Price,
            learned_from: "ROTISSERIE CHICKEN $4.99".to_string(),
        });
        let json = serde_json::to_string(&t).unwrap();
        let back: StoreTemplate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
