//! End-to-end extraction over realistic ad text from the shared
//! fixtures, covering the generic pattern families, store overrides, and
//! template-driven extraction.

use flyer_core::config::ExtractConfig;
use flyer_core::deal::{DealDetails, DealType};
use flyer_core::Unit;
use flyer_extract::{RegexExtractor, TemplateExtractor};
use test_fixtures::{COSTCO_AD, NOISY_AD, SAFEWAY_AD, WALMART_AD};

fn extractor() -> RegexExtractor {
    RegexExtractor::new(ExtractConfig::default())
}

#[test]
fn safeway_ad_yields_expected_deal_mix() {
    let deals = extractor().extract(SAFEWAY_AD, Some("safeway"));

    let unit = deals
        .iter()
        .find(|d| d.deal_type() == DealType::UnitPrice)
        .expect("unit price deal");
    assert_eq!(unit.price, Some(1.99));
    assert_eq!(unit.unit, Some(Unit::Lb));
    assert_eq!(unit.product_name.as_deref(), Some("Organic Gala Apples"));

    let multi = deals
        .iter()
        .find(|d| d.deal_type() == DealType::MultiBuy)
        .expect("multi-buy deal");
    assert_eq!(multi.price, Some(3.0));
    assert_eq!(
        multi.details,
        DealDetails::MultiBuy {
            quantity: 2,
            total_price: 6.0,
        }
    );

    let bogo = deals
        .iter()
        .find(|d| d.deal_type() == DealType::Bogo)
        .expect("bogo deal");
    assert_eq!(
        bogo.details,
        DealDetails::Bogo {
            buy_quantity: 1,
            get_quantity: 1,
        }
    );
    assert_eq!(bogo.product_name.as_deref(), Some("Paper Towels"));

    let member = deals
        .iter()
        .find(|d| d.deal_type() == DealType::MemberPrice)
        .expect("club price deal");
    assert_eq!(member.price, Some(3.49));

    for deal in &deals {
        let v = deal.confidence.value();
        assert!((0.0..=1.0).contains(&v), "confidence out of range: {v}");
    }
}

#[test]
fn store_overrides_require_the_hint() {
    let hinted = extractor().extract(SAFEWAY_AD, Some("safeway"));
    let unhinted = extractor().extract(SAFEWAY_AD, None);
    assert!(hinted.iter().any(|d| d.deal_type() == DealType::MemberPrice));
    assert!(!unhinted.iter().any(|d| d.deal_type() == DealType::MemberPrice));
}

#[test]
fn extraction_is_deterministic() {
    let a = extractor().extract(SAFEWAY_AD, Some("safeway"));
    let b = extractor().extract(SAFEWAY_AD, Some("safeway"));
    assert_eq!(a, b);
}

#[test]
fn bare_bogo_defaults_to_one_for_one() {
    let deals = extractor().extract("WOOL SOCKS bogo this week", None);
    let bogo = deals
        .iter()
        .find(|d| d.deal_type() == DealType::Bogo)
        .expect("bogo deal");
    assert_eq!(
        bogo.details,
        DealDetails::Bogo {
            buy_quantity: 1,
            get_quantity: 1,
        }
    );
}

#[test]
fn three_for_six_prices_at_two_per_unit() {
    let deals = extractor().extract("GRANOLA BARS\n3 for $6.00", None);
    let multi = deals
        .iter()
        .find(|d| d.deal_type() == DealType::MultiBuy)
        .expect("multi-buy deal");
    assert_eq!(multi.price, Some(2.0));
    assert_eq!(
        multi.details,
        DealDetails::MultiBuy {
            quantity: 3,
            total_price: 6.0,
        }
    );
}

#[test]
fn one_price_one_deal() {
    let deals = extractor().extract("WHOLE MILK $5.99", None);
    assert_eq!(deals.len(), 1);
    assert_eq!(deals[0].price, Some(5.99));
    assert_eq!(deals[0].product_name.as_deref(), Some("Whole Milk"));
}

#[test]
fn walmart_was_now_keeps_both_prices() {
    let deals = extractor().extract(WALMART_AD, Some("walmart"));
    let was_now = deals
        .iter()
        .find(|d| d.details.original_price().is_some())
        .expect("was/now deal");
    assert_eq!(was_now.price, Some(9.99));
    assert_eq!(was_now.details.original_price(), Some(12.99));
    assert!(deals.iter().any(|d| d.price == Some(1.48)));
}

#[test]
fn garbled_ocr_never_panics() {
    let deals = extractor().extract(NOISY_AD, None);
    for deal in &deals {
        let v = deal.confidence.value();
        assert!((0.0..=1.0).contains(&v));
    }
}

#[test]
fn costco_template_drives_extraction() {
    let templates = TemplateExtractor::new(ExtractConfig::default());
    let deals = templates.extract(COSTCO_AD, Some("costco"), None);
    assert!(!deals.is_empty());
    assert!(deals.iter().any(|d| d.source.is_template()));
    assert!(deals.iter().any(|d| d.price == Some(4.99)));
    assert!(deals
        .iter()
        .any(|d| d.product_name.as_deref() == Some("Kirkland Paper Towels")
            || d.product_name.as_deref() == Some("KIRKLAND PAPER TOWELS")));
}
