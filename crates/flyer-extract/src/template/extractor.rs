//! Template-driven extraction and correction-based template learning.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use flyer_core::config::ExtractConfig;
use flyer_core::constants::PRICE_EPSILON;
use flyer_core::errors::{ExtractError, FlyerError, PersistError};
use flyer_core::persist;
use flyer_core::traits::StoreResolver;
use flyer_core::{Confidence, DealDetails, DealSource, DealType, ExtractedDeal};

use crate::regex_extractor::RegexExtractor;
use crate::store_key::SubstringStoreResolver;
use crate::template::template::{default_templates, CustomPattern, RegionRole, StoreTemplate};
use crate::template::LayoutType;

/// One positioned OCR text block, coordinates normalized to 0..1.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OcrFragment {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

impl OcrFragment {
    pub fn new(x: f64, y: f64, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            text: text.into(),
        }
    }
}

static GENERIC_PRICE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$(\d+\.\d{2})").unwrap());
static TITLEISH_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Za-z\s']{2,30}$").unwrap());

/// Phase 2 extractor. Wraps the regex extractor with per-store layout
/// knowledge and patterns learned from corrections.
pub struct TemplateExtractor {
    templates: BTreeMap<String, StoreTemplate>,
    path: Option<PathBuf>,
    regex: RegexExtractor,
    resolver: SubstringStoreResolver,
    config: ExtractConfig,
}

impl TemplateExtractor {
    /// In-memory extractor with only the built-in templates.
    pub fn new(config: ExtractConfig) -> Self {
        Self {
            templates: default_templates(),
            path: None,
            regex: RegexExtractor::new(config.clone()),
            resolver: SubstringStoreResolver::new(),
            config,
        }
    }

    /// Extractor backed by a templates artifact. Learned templates
    /// override the built-in defaults per store; corrupt or missing
    /// artifacts degrade to the defaults.
    pub fn open(path: impl Into<PathBuf>, config: ExtractConfig) -> Self {
        let path = path.into();
        let mut templates = default_templates();
        let learned: BTreeMap<String, StoreTemplate> = persist::load_json_or_default(&path);
        let loaded = learned.len();
        templates.extend(learned);
        debug!(path = %path.display(), loaded, "template extractor opened");
        Self {
            templates,
            path: Some(path),
            regex: RegexExtractor::new(config.clone()),
            resolver: SubstringStoreResolver::new(),
            config,
        }
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    /// Register or replace a store template wholesale. Every pattern the
    /// template carries must compile.
    pub fn register_template(&mut self, template: StoreTemplate) -> Result<(), FlyerError> {
        let mut patterns: Vec<&str> = Vec::new();
        patterns.extend(template.price_pattern.as_deref());
        patterns.extend(template.product_pattern.as_deref());
        patterns.extend(template.custom_patterns.iter().map(|c| c.pattern.as_str()));
        for pattern in patterns {
            Regex::new(pattern).map_err(|e| ExtractError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;
        }
        let key = self.resolver.normalize(&template.store_name);
        info!(store = %key, "template registered");
        self.templates.insert(key, template);
        self.save()?;
        Ok(())
    }

    /// Attach a price pattern to an existing store template by hand,
    /// bypassing the correction probe.
    pub fn add_custom_pattern(
        &mut self,
        store: &str,
        pattern: &str,
        deal_type: DealType,
    ) -> Result<(), FlyerError> {
        Regex::new(pattern).map_err(|e| ExtractError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        let known: Vec<String> = self.templates.keys().cloned().collect();
        let key = self
            .resolver
            .resolve(store, &known)
            .ok_or_else(|| ExtractError::UnknownStore {
                store: store.to_string(),
            })?;
        let template = self
            .templates
            .get_mut(&key)
            .ok_or_else(|| ExtractError::UnknownStore {
                store: store.to_string(),
            })?;
        template.custom_patterns.push(CustomPattern {
            id: format!("manual_{}", template.custom_patterns.len() + 1),
            pattern: pattern.to_string(),
            deal_type,
            learned_from: String::new(),
        });
        template.last_updated = Some(chrono::Utc::now());
        self.save()?;
        Ok(())
    }

    pub fn template_for(&self, store: &str) -> Option<&StoreTemplate> {
        let known: Vec<String> = self.templates.keys().cloned().collect();
        let key = self.resolver.resolve(store, &known)?;
        self.templates.get(&key)
    }

    /// Extract deals from an ad. Layout-aware when the store has a
    /// template and, with OCR fragments, coordinate-aware. Always merges
    /// with a plain regex pass; template-sourced deals win duplicates.
    pub fn extract(
        &self,
        text: &str,
        store: Option<&str>,
        fragments: Option<&[OcrFragment]>,
    ) -> Vec<ExtractedDeal> {
        let template = store.and_then(|s| self.template_for(s));

        let mut deals = Vec::new();
        if let Some(t) = template {
            deals = match fragments {
                Some(frags) if !frags.is_empty() => self.extract_with_fragments(t, frags),
                _ => self.extract_with_layout(t, text),
            };
            deals.extend(self.apply_custom_patterns(t, text));
        }

        let regex_deals = self.regex.extract(text, None);
        let mut merged = merge_deals(deals, regex_deals);
        for deal in &mut merged {
            deal.confidence = self.score(deal, template);
        }
        merged
    }

    fn extract_with_layout(&self, t: &StoreTemplate, text: &str) -> Vec<ExtractedDeal> {
        let blocks: Vec<String> = match t.layout_type {
            LayoutType::Grid => split_on_blank_lines(text),
            LayoutType::List => text
                .split(t.deal_separator.as_str())
                .map(|b| b.to_string())
                .collect(),
            LayoutType::Mixed => {
                static BLANKS: LazyLock<Regex> =
                    LazyLock::new(|| Regex::new(r"\n{2,}").unwrap());
                BLANKS
                    .split(text)
                    .filter(|b| !b.trim().is_empty())
                    .map(|b| b.to_string())
                    .collect()
            }
        };

        blocks
            .iter()
            .filter_map(|b| self.extract_from_block(t, b))
            .collect()
    }

    fn extract_with_fragments(
        &self,
        t: &StoreTemplate,
        fragments: &[OcrFragment],
    ) -> Vec<ExtractedDeal> {
        // Bucket fragments into deal regions; headers, footers and images
        // never produce deals.
        let mut per_region: BTreeMap<&str, Vec<&OcrFragment>> = BTreeMap::new();
        for frag in fragments {
            if let Some(region) = t.regions.iter().find(|r| r.contains(frag.x, frag.y)) {
                if region.role == RegionRole::Deals {
                    per_region.entry(region.name.as_str()).or_default().push(frag);
                }
            }
        }

        let mut deals = Vec::new();
        for (_region, mut frags) in per_region {
            frags.sort_by(|a, b| {
                a.y.partial_cmp(&b.y)
                    .unwrap_or(Ordering::Equal)
                    .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
            });

            // Fragments on the same visual row form one deal block.
            let mut row: Vec<&str> = Vec::new();
            let mut last_y = f64::NEG_INFINITY;
            for frag in frags {
                if !row.is_empty() && (frag.y - last_y).abs() > self.config.row_y_proximity {
                    deals.extend(self.extract_from_block(t, &row.join(" ")));
                    row.clear();
                }
                row.push(&frag.text);
                last_y = frag.y;
            }
            if !row.is_empty() {
                deals.extend(self.extract_from_block(t, &row.join(" ")));
            }
        }
        deals
    }

    /// At most one deal per block, and only when a price is found.
    fn extract_from_block(&self, t: &StoreTemplate, block: &str) -> Option<ExtractedDeal> {
        if block.trim().is_empty() {
            return None;
        }

        let mut product_name = t
            .product_pattern
            .as_deref()
            .and_then(|p| Regex::new(&format!("(?m){p}")).ok())
            .and_then(|re| re.captures(block))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string());

        let price = t
            .price_pattern
            .as_deref()
            .and_then(|p| Regex::new(&format!("(?i){p}")).ok())
            .and_then(|re| re.captures(block))
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .or_else(|| {
                GENERIC_PRICE
                    .captures(block)
                    .and_then(|c| c.get(1))
                    .and_then(|m| m.as_str().parse::<f64>().ok())
            })?;

        if product_name.is_none() {
            product_name = block
                .trim()
                .lines()
                .take(3)
                .map(str::trim)
                .find(|line| TITLEISH_LINE.is_match(line))
                .map(|line| line.to_string());
        }

        let raw_text: String = block.chars().take(self.config.max_raw_text_len).collect();
        let mut deal = ExtractedDeal::new(
            raw_text,
            DealDetails::plain_price(),
            DealSource::TemplateRegion {
                store: t.store_name.clone(),
            },
        );
        deal.product_name = product_name;
        deal.price = Some(price);
        Some(deal)
    }

    /// Learned patterns run over the whole ad text. The first capture
    /// group holding a plausible price wins; stored patterns that no
    /// longer compile are skipped.
    fn apply_custom_patterns(&self, t: &StoreTemplate, text: &str) -> Vec<ExtractedDeal> {
        let mut deals = Vec::new();
        for cp in &t.custom_patterns {
            let Ok(re) = Regex::new(&format!("(?i){}", cp.pattern)) else {
                continue;
            };
            for caps in re.captures_iter(text) {
                let price = caps
                    .iter()
                    .skip(1)
                    .flatten()
                    .filter_map(|m| m.as_str().parse::<f64>().ok())
                    .find(|p| self.config.plausible_price(*p));
                let Some(price) = price else { continue };
                let raw = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
                let mut deal = ExtractedDeal::new(
                    raw,
                    DealDetails::plain_price(),
                    DealSource::CustomPattern { id: cp.id.clone() },
                );
                deal.price = Some(price);
                deals.push(deal);
            }
        }
        deals
    }

    fn score(&self, deal: &ExtractedDeal, template: Option<&StoreTemplate>) -> Confidence {
        let mut c = Confidence::new(Confidence::TEMPLATE_BASE);
        match &deal.source {
            DealSource::TemplateRegion { .. } => c = c + 0.15,
            DealSource::CustomPattern { .. } => c = c + 0.2,
            _ => {}
        }
        if deal.product_name.is_some() {
            c = c + 0.15;
        }
        if deal.price.map(|p| self.config.plausible_price(p)) == Some(true) {
            c = c + 0.1;
        }
        if let Some(t) = template {
            if t.accuracy > 0.0 {
                c = c + t.accuracy * 0.1;
            }
        }
        c
    }

    /// Fold a user correction into the store's template. A price
    /// correction probes the source text with candidate pattern shapes;
    /// the first shape that matches is kept as a custom pattern. Always
    /// persists the template set.
    pub fn learn_from_correction(
        &mut self,
        store: &str,
        original: &ExtractedDeal,
        corrected: &ExtractedDeal,
        raw_text: &str,
    ) -> Result<(), PersistError> {
        let key = self.resolver.normalize(store);
        let template = self
            .templates
            .entry(key.clone())
            .or_insert_with(|| StoreTemplate::named(&key));
        template.sample_count += 1;

        let price_changed = match (original.price, corrected.price) {
            (Some(a), Some(b)) => (a - b).abs() > PRICE_EPSILON,
            (None, Some(_)) => true,
            _ => false,
        };
        if price_changed {
            if let Some(price) = corrected.price {
                let escaped = regex::escape(&format!("{price:.2}"));
                let candidates = [
                    format!(r"\$({escaped})"),
                    format!(r"({escaped})\s*(?:dollars?|usd)"),
                    format!(r"price[:\s]+\$?({escaped})"),
                ];
                for pattern in candidates {
                    let Ok(re) = Regex::new(&format!("(?i){pattern}")) else {
                        continue;
                    };
                    if re.is_match(raw_text) {
                        let learned_from: String = corrected.raw_text.chars().take(50).collect();
                        info!(store = %key, pattern = %pattern, "learned custom price pattern");
                        template.custom_patterns.push(CustomPattern {
                            id: format!("price_{}", template.sample_count),
                            pattern,
                            deal_type: DealType::Price,
                            learned_from,
                        });
                        break;
                    }
                }
            }
        }

        template.last_updated = Some(chrono::Utc::now());
        self.save()
    }

    /// Record the tracker's rolling accuracy for a store's template.
    pub fn update_accuracy(&mut self, store: &str, accuracy: f64) -> Result<(), PersistError> {
        let known: Vec<String> = self.templates.keys().cloned().collect();
        let Some(key) = self.resolver.resolve(store, &known) else {
            return Ok(());
        };
        if let Some(template) = self.templates.get_mut(&key) {
            template.accuracy = accuracy.clamp(0.0, 1.0);
        }
        self.save()
    }

    fn save(&self) -> Result<(), PersistError> {
        match &self.path {
            Some(path) => persist::save_json(path, &self.templates),
            None => Ok(()),
        }
    }
}

fn split_on_blank_lines(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current.join("\n"));
    }
    blocks
}

/// Template deals first; a regex deal joins only when no template deal
/// already covers the same price and a similar product.
fn merge_deals(
    template_deals: Vec<ExtractedDeal>,
    regex_deals: Vec<ExtractedDeal>,
) -> Vec<ExtractedDeal> {
    let template_len = template_deals.len();
    let mut merged = template_deals;
    for rd in regex_deals {
        let duplicate = merged[..template_len].iter().any(|td| {
            prices_match(td.price, rd.price)
                && similar_products(td.product_name.as_deref(), rd.product_name.as_deref())
        });
        if !duplicate {
            merged.push(rd);
        }
    }
    merged
}

fn prices_match(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => (a - b).abs() <= PRICE_EPSILON,
        (None, None) => true,
        _ => false,
    }
}

/// Equal, substring either way, or word overlap covering at least half
/// of the smaller name.
fn similar_products(a: Option<&str>, b: Option<&str>) -> bool {
    let (Some(a), Some(b)) = (a, b) else {
        return false;
    };
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a == b || a.contains(&b) || b.contains(&a) {
        return true;
    }
    let words_a: std::collections::HashSet<&str> = a.split_whitespace().collect();
    let words_b: std::collections::HashSet<&str> = b.split_whitespace().collect();
    let overlap = words_a.intersection(&words_b).count();
    overlap as f64 >= words_a.len().min(words_b.len()) as f64 * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> TemplateExtractor {
        TemplateExtractor::new(ExtractConfig::default())
    }

    #[test]
    fn resolves_store_names_fuzzily() {
        let e = extractor();
        assert!(e.template_for("Whole Foods Market").is_some());
        assert!(e.template_for("COSTCO WHOLESALE #512").is_some());
        assert!(e.template_for("corner bodega").is_none());
    }

    #[test]
    fn list_layout_extracts_one_deal_per_line() {
        let e = extractor();
        let text = "GREAT VALUE MILK\nrollback $3.49\nBREAD rollback $1.99";
        let deals = e.extract(text, Some("walmart"), None);
        let template_prices: Vec<f64> = deals
            .iter()
            .filter(|d| matches!(d.source, DealSource::TemplateRegion { .. }))
            .filter_map(|d| d.price)
            .collect();
        assert!(template_prices.contains(&3.49));
        assert!(template_prices.contains(&1.99));
    }

    #[test]
    fn grid_layout_splits_on_blank_lines() {
        let e = extractor();
        let text = "ROTISSERIE CHICKEN\n$4.99 after savings\n\nPAPER TOWELS\n$15.99 instant";
        let deals = e.extract(text, Some("costco"), None);
        let template_deals: Vec<_> = deals
            .iter()
            .filter(|d| matches!(d.source, DealSource::TemplateRegion { .. }))
            .collect();
        assert_eq!(template_deals.len(), 2);
        assert!(template_deals
            .iter()
            .any(|d| d.product_name.as_deref() == Some("ROTISSERIE CHICKEN")));
    }

    #[test]
    fn fragments_group_into_rows_by_y_proximity() {
        let e = extractor();
        // Two fragments on one visual row, a third far below.
        let frags = vec![
            OcrFragment::new(0.1, 0.3, "APPLES"),
            OcrFragment::new(0.6, 0.31, "club price $2.99"),
            OcrFragment::new(0.1, 0.6, "club price $4.49"),
        ];
        let deals = e.extract("", Some("safeway"), Some(&frags));
        let template_deals: Vec<_> = deals
            .iter()
            .filter(|d| matches!(d.source, DealSource::TemplateRegion { .. }))
            .collect();
        assert_eq!(template_deals.len(), 2);
        let row_deal = template_deals
            .iter()
            .find(|d| d.price == Some(2.99))
            .unwrap();
        assert!(row_deal.raw_text.contains("APPLES"));
    }

    #[test]
    fn header_fragments_never_produce_deals() {
        let e = extractor();
        let frags = vec![OcrFragment::new(0.5, 0.02, "SAFEWAY WEEKLY club price $9.99")];
        let deals = e.extract("", Some("safeway"), Some(&frags));
        assert!(deals.is_empty());
    }

    #[test]
    fn template_deals_win_merge_over_regex_duplicates() {
        let e = extractor();
        let text = "ORGANIC APPLES\n$2.99";
        let deals = e.extract(text, Some("safeway"), None);
        let dupes = deals.iter().filter(|d| d.price == Some(2.99)).count();
        assert_eq!(dupes, 1);
        assert!(matches!(
            deals.iter().find(|d| d.price == Some(2.99)).unwrap().source,
            DealSource::TemplateRegion { .. }
        ));
    }

    #[test]
    fn learned_pattern_survives_reload_and_fires() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("templates.json");
        let config = ExtractConfig::default();

        let mut e = TemplateExtractor::open(&path, config.clone());
        let mut original = ExtractedDeal::new(
            "WIDGET price: $2.99",
            DealDetails::plain_price(),
            DealSource::generic("price"),
        );
        original.price = Some(2.99);
        let mut corrected = original.clone();
        corrected.price = Some(4.99);
        e.learn_from_correction("Corner Mart", &original, &corrected, "WIDGET price: $4.99")
            .unwrap();

        let reopened = TemplateExtractor::open(&path, config);
        let t = reopened.template_for("corner_mart").unwrap();
        assert_eq!(t.sample_count, 1);
        assert_eq!(t.custom_patterns.len(), 1);

        let deals = reopened.extract("GADGET $4.99 today", Some("corner_mart"), None);
        assert!(deals
            .iter()
            .any(|d| matches!(d.source, DealSource::CustomPattern { .. }) && d.price == Some(4.99)));
    }

    #[test]
    fn unchanged_price_learns_no_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("templates.json");
        let mut e = TemplateExtractor::open(&path, ExtractConfig::default());

        let mut deal = ExtractedDeal::new(
            "EGGS $3.49",
            DealDetails::plain_price(),
            DealSource::generic("price"),
        );
        deal.price = Some(3.49);
        let mut corrected = deal.clone();
        corrected.product_name = Some("Large Eggs".to_string());
        e.learn_from_correction("safeway", &deal, &corrected, "EGGS $3.49")
            .unwrap();

        let t = e.template_for("safeway").unwrap();
        assert!(t.custom_patterns.is_empty());
        assert_eq!(t.sample_count, 1);
        assert!(t.last_updated.is_some());
    }

    #[test]
    fn template_accuracy_raises_confidence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("templates.json");
        let mut e = TemplateExtractor::open(&path, ExtractConfig::default());
        let text = "MILK\nclub price $5.49";

        let before = e.extract(text, Some("safeway"), None);
        e.update_accuracy("safeway", 0.8).unwrap();
        let after = e.extract(text, Some("safeway"), None);

        let conf = |deals: &[ExtractedDeal]| {
            deals
                .iter()
                .find(|d| matches!(d.source, DealSource::TemplateRegion { .. }))
                .map(|d| d.confidence.value())
                .unwrap()
        };
        assert!((conf(&after) - conf(&before) - 0.08).abs() < 1e-9);
    }

    #[test]
    fn invalid_stored_pattern_is_skipped() {
        let mut e = extractor();
        let t = e
            .templates
            .entry("badstore".to_string())
            .or_insert_with(|| StoreTemplate::named("badstore"));
        t.custom_patterns.push(CustomPattern {
            id: "price_1".to_string(),
            pattern: r"\$((unclosed".to_string(),
            deal_type: DealType::Price,
            learned_from: String::new(),
        });
        let deals = e.extract("STUFF $3.99", Some("badstore"), None);
        assert!(deals
            .iter()
            .all(|d| !matches!(d.source, DealSource::CustomPattern { .. })));
    }

    #[test]
    fn register_template_rejects_bad_patterns() {
        let mut e = extractor();
        let mut t = StoreTemplate::named("Trader Joe's");
        t.price_pattern = Some(r"\$((unclosed".to_string());
        let err = e.register_template(t).unwrap_err();
        assert!(matches!(
            err,
            FlyerError::Extract(ExtractError::InvalidPattern { .. })
        ));

        let mut good = StoreTemplate::named("Trader Joe's");
        good.price_pattern = Some(r"\$(\d+\.\d{2})\s+deal".to_string());
        e.register_template(good).unwrap();
        assert!(e.template_for("Trader Joe").is_some());
    }

    #[test]
    fn manual_custom_pattern_needs_a_known_store() {
        let mut e = extractor();
        let err = e
            .add_custom_pattern("nowhere mart", r"\$(\d+\.\d{2})", DealType::Price)
            .unwrap_err();
        assert!(matches!(
            err,
            FlyerError::Extract(ExtractError::UnknownStore { .. })
        ));

        e.add_custom_pattern("costco", r"member\s+\$(\d+\.\d{2})", DealType::Price)
            .unwrap();
        let deals = e.extract("GOUDA WHEEL\nmember $8.99", Some("costco"), None);
        assert!(deals
            .iter()
            .any(|d| matches!(d.source, DealSource::CustomPattern { .. })));
    }

    #[test]
    fn similar_product_checks() {
        assert!(similar_products(Some("Organic Apples"), Some("organic apples")));
        assert!(similar_products(Some("Apples"), Some("Organic Apples")));
        assert!(similar_products(
            Some("Fresh Organic Gala Apples"),
            Some("Gala Apples")
        ));
        assert!(!similar_products(Some("Apples"), Some("Oranges")));
        assert!(!similar_products(None, Some("Apples")));
    }
}
