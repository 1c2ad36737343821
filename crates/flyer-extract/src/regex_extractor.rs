//! Phase 1: pattern-family extraction over normalized ad text.

use regex::Regex;
use tracing::debug;

use flyer_core::config::ExtractConfig;
use flyer_core::traits::StoreResolver;
use flyer_core::{Confidence, DealDetails, DealSource, DealType, ExtractedDeal};

use crate::patterns::{
    known_stores, BogoShape, DiscountShape, PriceLabel, StoreShape, BOGO_PATTERNS,
    DISCOUNT_PATTERNS, MULTI_BUY_PATTERNS, PRICE_PATTERNS, PRODUCT_PATTERNS, STORE_PATTERNS,
};
use crate::store_key::SubstringStoreResolver;

/// Pattern-based extractor. Deterministic for a given input; malformed or
/// empty text yields an empty result, never an error.
#[derive(Debug, Default)]
pub struct RegexExtractor {
    config: ExtractConfig,
    resolver: SubstringStoreResolver,
}

/// Product-name candidate located in the normalized text.
struct NameSpan {
    start: usize,
    end: usize,
    name: String,
}

impl RegexExtractor {
    pub fn new(config: ExtractConfig) -> Self {
        Self {
            config,
            resolver: SubstringStoreResolver::new(),
        }
    }

    /// Extract all deals from `text`. A `store_hint` that resolves to a
    /// known store unlocks that store's override patterns.
    pub fn extract(&self, text: &str, store_hint: Option<&str>) -> Vec<ExtractedDeal> {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return Vec::new();
        }

        let names = self.collect_product_names(&normalized);
        let mut deals = Vec::new();

        if let Some(store) = store_hint.and_then(|h| self.resolver.resolve(h, &known_stores())) {
            self.extract_store_overrides(&normalized, &store, &mut deals);
        }
        self.extract_multi_buy(&normalized, &mut deals);
        self.extract_bogo(&normalized, &mut deals);
        self.extract_discounts(&normalized, &mut deals);
        self.extract_prices(&normalized, &mut deals);

        for deal in &mut deals {
            self.associate_product(deal, &names);
            deal.confidence = self.score(deal);
        }

        let deals = dedup_overlaps(deals);
        debug!(count = deals.len(), "regex extraction finished");
        deals
    }

    fn extract_prices(&self, text: &str, out: &mut Vec<ExtractedDeal>) {
        for (re, label, pattern_name) in PRICE_PATTERNS.iter() {
            for caps in re.captures_iter(text) {
                let m = caps.get(0).map(|m| (m.start(), m.end(), m.as_str()));
                let Some((start, end, raw)) = m else { continue };
                let Some(price) = parse_price(&caps, 1) else { continue };
                let details = match label {
                    PriceLabel::Unit(unit) => DealDetails::UnitPrice { unit: *unit },
                    PriceLabel::Bare => DealDetails::plain_price(),
                };
                let mut deal = ExtractedDeal::new(raw, details, DealSource::generic(pattern_name));
                deal.span = (start, end);
                deal.price = Some(price);
                if let PriceLabel::Unit(unit) = label {
                    deal.unit = Some(*unit);
                }
                out.push(deal);
            }
        }
    }

    fn extract_multi_buy(&self, text: &str, out: &mut Vec<ExtractedDeal>) {
        for (re, pattern_name) in MULTI_BUY_PATTERNS.iter() {
            for caps in re.captures_iter(text) {
                let m = caps.get(0).map(|m| (m.start(), m.end(), m.as_str()));
                let Some((start, end, raw)) = m else { continue };
                let Some(quantity) = caps.get(1).and_then(|q| q.as_str().parse::<u32>().ok())
                else {
                    continue;
                };
                let Some(total_price) = parse_price(&caps, 2) else { continue };
                if quantity == 0 {
                    continue;
                }
                let mut deal = ExtractedDeal::new(
                    raw,
                    DealDetails::MultiBuy {
                        quantity,
                        total_price,
                    },
                    DealSource::generic(pattern_name),
                );
                deal.span = (start, end);
                deal.price = Some(total_price / quantity as f64);
                out.push(deal);
            }
        }
    }

    fn extract_bogo(&self, text: &str, out: &mut Vec<ExtractedDeal>) {
        for (re, shape, pattern_name) in BOGO_PATTERNS.iter() {
            for caps in re.captures_iter(text) {
                let m = caps.get(0).map(|m| (m.start(), m.end(), m.as_str()));
                let Some((start, end, raw)) = m else { continue };
                let (buy_quantity, get_quantity) = match shape {
                    BogoShape::Counted => {
                        let buy = caps.get(1).and_then(|c| c.as_str().parse().ok());
                        let get = caps.get(2).and_then(|c| c.as_str().parse().ok());
                        match (buy, get) {
                            (Some(b), Some(g)) => (b, g),
                            _ => continue,
                        }
                    }
                    BogoShape::Simple => (1, 1),
                };
                let mut deal = ExtractedDeal::new(
                    raw,
                    DealDetails::Bogo {
                        buy_quantity,
                        get_quantity,
                    },
                    DealSource::generic(pattern_name),
                );
                deal.span = (start, end);
                out.push(deal);
            }
        }
    }

    fn extract_discounts(&self, text: &str, out: &mut Vec<ExtractedDeal>) {
        for (re, shape, pattern_name) in DISCOUNT_PATTERNS.iter() {
            for caps in re.captures_iter(text) {
                let m = caps.get(0).map(|m| (m.start(), m.end(), m.as_str()));
                let Some((start, end, raw)) = m else { continue };
                let Some(value) = parse_price(&caps, 1) else { continue };
                let details = match shape {
                    DiscountShape::Amount => DealDetails::SaveAmount { amount: value },
                    DiscountShape::Percent => DealDetails::PercentOff { percent: value },
                };
                let mut deal =
                    ExtractedDeal::new(raw, details, DealSource::generic(pattern_name));
                deal.span = (start, end);
                out.push(deal);
            }
        }
    }

    fn extract_store_overrides(&self, text: &str, store: &str, out: &mut Vec<ExtractedDeal>) {
        let Some(rows) = STORE_PATTERNS.get(store) else { return };
        for (re, shape, pattern_name) in rows {
            for caps in re.captures_iter(text) {
                let m = caps.get(0).map(|m| (m.start(), m.end(), m.as_str()));
                let Some((start, end, raw)) = m else { continue };
                let Some(first) = parse_price(&caps, 1) else { continue };
                let (details, price) = match shape {
                    StoreShape::Price => (DealDetails::plain_price(), first),
                    StoreShape::MemberPrice => (
                        DealDetails::MemberPrice {
                            program: Some(member_program(store).to_string()),
                        },
                        first,
                    ),
                    StoreShape::WasNow => {
                        let Some(now) = parse_price(&caps, 2) else { continue };
                        (
                            DealDetails::Price {
                                original_price: Some(first),
                                discount_amount: Some(((first - now) * 100.0).round() / 100.0),
                            },
                            now,
                        )
                    }
                };
                let mut deal = ExtractedDeal::new(
                    raw,
                    details,
                    DealSource::StorePattern {
                        store: store.to_string(),
                        pattern: (*pattern_name).to_string(),
                    },
                );
                deal.span = (start, end);
                deal.price = Some(price);
                out.push(deal);
            }
        }
    }

    fn collect_product_names(&self, text: &str) -> Vec<NameSpan> {
        let mut names = Vec::new();
        for (re, _) in PRODUCT_PATTERNS.iter() {
            for caps in re.captures_iter(text) {
                let Some(m) = caps.get(1) else { continue };
                let Some(name) = clean_product_name(m.as_str()) else { continue };
                names.push(NameSpan {
                    start: m.start(),
                    end: m.end(),
                    name,
                });
            }
        }
        names.sort_by_key(|n| n.start);
        names
    }

    /// Attach the nearest product-name span that ends at or before the
    /// deal and within the configured distance.
    fn associate_product(&self, deal: &mut ExtractedDeal, names: &[NameSpan]) {
        let best = names
            .iter()
            .filter(|n| n.end <= deal.span.0)
            .filter(|n| deal.span.0 - n.end <= self.config.max_product_distance)
            .max_by_key(|n| n.end);
        if let Some(n) = best {
            deal.product_name = Some(n.name.clone());
        }
    }

    fn score(&self, deal: &ExtractedDeal) -> Confidence {
        let mut c = Confidence::new(Confidence::REGEX_BASE);
        if deal.product_name.is_some() {
            c = c + 0.2;
        }
        if deal.price.map(|p| self.config.plausible_price(p)) == Some(true) {
            c = c + 0.15;
        }
        if deal.deal_type() != DealType::Unknown {
            c = c + 0.1;
        }
        if deal.unit.is_some() || deal.details.quantity().is_some() {
            c = c + 0.1;
        }
        if deal.source.is_store_specific() {
            c = c + 0.15;
        }
        c
    }
}

/// Loyalty program attached to a store's member-price patterns.
fn member_program(store: &str) -> &'static str {
    match store {
        "whole_foods" => "prime",
        "safeway" => "club",
        _ => "member",
    }
}

/// OCR cleanup applied before any pattern runs. Span offsets in extracted
/// deals refer to this normalized text.
pub fn normalize(text: &str) -> String {
    static SPACES: std::sync::LazyLock<Regex> =
        std::sync::LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
    static NEWLINES: std::sync::LazyLock<Regex> =
        std::sync::LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

    let replaced = text.replace('¢', " cents");
    let collapsed = SPACES.replace_all(&replaced, " ");
    NEWLINES.replace_all(&collapsed, "\n\n").trim().to_string()
}

/// Whitespace collapse, edge punctuation strip, title case, 50-char cap.
/// Returns None when nothing word-like survives.
pub fn clean_product_name(raw: &str) -> Option<String> {
    let cleaned = raw
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
        .filter(|w| !w.is_empty())
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ");
    if cleaned.chars().any(|c| c.is_alphabetic()) {
        Some(cleaned.chars().take(50).collect())
    } else {
        None
    }
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

fn parse_price(caps: &regex::Captures<'_>, group: usize) -> Option<f64> {
    caps.get(group)?.as_str().parse::<f64>().ok()
}

/// Drop overlapping deals, keeping the one that captured more. Ties go to
/// the higher confidence, then to the earlier span.
fn dedup_overlaps(mut deals: Vec<ExtractedDeal>) -> Vec<ExtractedDeal> {
    deals.sort_by(|a, b| {
        a.span
            .0
            .cmp(&b.span.0)
            .then(b.info_score().cmp(&a.info_score()))
    });
    let mut kept: Vec<ExtractedDeal> = Vec::new();
    for deal in deals {
        match kept.iter().position(|k| k.overlaps(&deal)) {
            Some(i) => {
                let richer = deal.info_score() > kept[i].info_score()
                    || (deal.info_score() == kept[i].info_score()
                        && deal.confidence > kept[i].confidence);
                if richer {
                    kept[i] = deal;
                }
            }
            None => kept.push(deal),
        }
    }
    kept.sort_by_key(|d| d.span.0);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use flyer_core::Unit;

    fn extractor() -> RegexExtractor {
        RegexExtractor::new(ExtractConfig::default())
    }

    #[test]
    fn empty_and_garbage_input_yield_no_deals() {
        let e = extractor();
        assert!(e.extract("", None).is_empty());
        assert!(e.extract("   \n\n  ", None).is_empty());
        assert!(e.extract("no prices mentioned here", None).is_empty());
    }

    #[test]
    fn multi_buy_derives_per_unit_price() {
        let deals = extractor().extract("APPLES 3 for $6", None);
        assert_eq!(deals.len(), 1);
        let deal = &deals[0];
        assert_eq!(deal.deal_type(), DealType::MultiBuy);
        assert_eq!(deal.price, Some(2.0));
        assert_eq!(
            deal.details,
            DealDetails::MultiBuy {
                quantity: 3,
                total_price: 6.0
            }
        );
        assert_eq!(deal.product_name.as_deref(), Some("Apples"));
    }

    #[test]
    fn bare_bogo_means_one_for_one() {
        let deals = extractor().extract("CEREAL BOGO this week", None);
        assert_eq!(deals.len(), 1);
        assert_eq!(
            deals[0].details,
            DealDetails::Bogo {
                buy_quantity: 1,
                get_quantity: 1
            }
        );
    }

    #[test]
    fn counted_bogo_captures_quantities() {
        let deals = extractor().extract("buy 2 get 1 free", None);
        assert_eq!(deals.len(), 1);
        assert_eq!(
            deals[0].details,
            DealDetails::Bogo {
                buy_quantity: 2,
                get_quantity: 1
            }
        );
    }

    #[test]
    fn unit_price_wins_over_bare_price_on_same_span() {
        let deals = extractor().extract("GROUND BEEF $4.99/lb", None);
        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].deal_type(), DealType::UnitPrice);
        assert_eq!(deals[0].unit, Some(Unit::Lb));
        assert_eq!(deals[0].price, Some(4.99));
    }

    #[test]
    fn overlapping_price_mentions_collapse_to_one_deal() {
        // The bare-price family fires once; nothing else overlaps it twice.
        let deals = extractor().extract("MILK $5.99", None);
        let fives = deals
            .iter()
            .filter(|d| d.price == Some(5.99))
            .count();
        assert_eq!(fives, 1);
    }

    #[test]
    fn store_hint_unlocks_override_patterns() {
        let text = "TV STAND was $89.99 now $59.99";
        let with_store = extractor().extract(text, Some("Walmart Supercenter"));
        let deal = with_store
            .iter()
            .find(|d| d.source.is_store_specific())
            .unwrap();
        assert_eq!(deal.price, Some(59.99));
        assert_eq!(deal.details.original_price(), Some(89.99));
        assert!(deal.details.has_discount());

        let without = extractor().extract(text, None);
        assert!(without.iter().all(|d| !d.source.is_store_specific()));
    }

    #[test]
    fn member_price_overrides_capture_the_program() {
        let deals = extractor().extract("OLIVE OIL club price: $7.49", Some("safeway"));
        let deal = deals.iter().find(|d| d.source.is_store_specific()).unwrap();
        assert_eq!(
            deal.details,
            DealDetails::MemberPrice {
                program: Some("club".to_string())
            }
        );
        assert_eq!(deal.price, Some(7.49));
    }

    #[test]
    fn percent_off_extracts_without_a_price() {
        let deals = extractor().extract("25% off all socks", None);
        let deal = deals
            .iter()
            .find(|d| d.details == DealDetails::PercentOff { percent: 25.0 })
            .unwrap();
        assert_eq!(deal.price, None);
    }

    #[test]
    fn richer_overlapping_deal_wins_dedup() {
        // "$3" carries a price and an associated name, so it outscores the
        // enclosing save-amount span.
        let deals = extractor().extract("save $3 today", None);
        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].deal_type(), DealType::Price);
        assert_eq!(deals[0].price, Some(3.0));
    }

    #[test]
    fn product_association_respects_distance() {
        let far = format!("BANANAS\n{}$0.59", "123 456 789\n".repeat(20));
        let deals = extractor().extract(&far, None);
        let deal = deals.iter().find(|d| d.price == Some(0.59)).unwrap();
        assert_eq!(deal.product_name, None);
    }

    #[test]
    fn confidence_is_additive_and_clamped() {
        let deals = extractor().extract("CHICKEN THIGHS $2.99/lb", None);
        let deal = &deals[0];
        // base 0.3 + name 0.2 + price 0.15 + type 0.1 + unit 0.1
        assert!((deal.confidence.value() - 0.85).abs() < 1e-9);
        assert!(deal.confidence.value() <= 1.0);
    }

    #[test]
    fn extraction_is_deterministic() {
        let text = "EGGS $3.49\nMILK 2 for $7\nBREAD save $1";
        let a = extractor().extract(text, Some("safeway"));
        let b = extractor().extract(text, Some("safeway"));
        assert_eq!(a, b);
    }

    #[test]
    fn cents_glyph_is_normalized() {
        assert_eq!(normalize("bananas 59¢ each"), "bananas 59 cents each");
    }

    #[test]
    fn product_names_are_cleaned_and_capped() {
        assert_eq!(
            clean_product_name("  ORGANIC  apples!! "),
            Some("Organic Apples".to_string())
        );
        assert_eq!(clean_product_name("$$ 123"), None);
        let long = "a".repeat(120);
        assert_eq!(clean_product_name(&long).unwrap().len(), 50);
    }
}
