//! Shared fixtures for integration tests across the workspace: realistic
//! OCR ad text, a small grocery catalog, and builders for deals and
//! labeled training examples.

use flyer_core::catalog::{CatalogProduct, ProductCatalog};
use flyer_core::deal::{Confidence, DealDetails, DealSource, ExtractedDeal, Unit};
use flyer_core::models::TrainingExample;

/// A typical Safeway weekly-ad page as OCR renders it.
pub const SAFEWAY_AD: &str = "\
SAFEWAY WEEKLY SPECIALS

WHOLE MILK
club price $3.49

ORGANIC GALA APPLES
$1.99/lb

CHEERIOS CEREAL
2 for $6

PAPER TOWELS
buy 1 get 1 free

DISH SOAP
save $2
";

/// A Costco-style ad: uppercase product lines, instant savings pricing.
pub const COSTCO_AD: &str = "\
KIRKLAND PAPER TOWELS
$15.99 after savings

ROTISSERIE CHICKEN
$4.99 instant savings

ORGANIC EGGS TWO DOZEN
$7.49 after $2 instant savings
";

/// A Walmart-style ad with rollback and was/now pricing.
pub const WALMART_AD: &str = "\
GREAT VALUE BREAD
rollback $1.48

LAUNDRY DETERGENT
was $12.99 now $9.99
";

/// Garbled OCR output that must not panic any extractor.
pub const NOISY_AD: &str = "~~!! @@ ###\n\u{00a2}\u{00a2}\u{00a2} 99\u{00a2} ea ___ $ . 9\n\n\n\n||| 25% off";

/// Ten products across four categories, with brands and purchase history
/// where the matcher's features need them.
pub fn grocery_catalog() -> ProductCatalog {
    ProductCatalog::new(vec![
        product("milk-whole", "Whole Milk Gallon", "dairy", 4.29)
            .brand("Lucerne")
            .frequency(0.9),
        product("milk-skim", "Skim Milk Half Gallon", "dairy", 2.79).frequency(0.2),
        product("eggs-large", "Large Eggs Dozen", "dairy", 3.49)
            .brand("Lucerne")
            .frequency(0.7),
        product("apples-gala", "Organic Gala Apples", "produce", 2.49)
            .unit(Unit::Lb)
            .frequency(0.6),
        product("bananas", "Bananas", "produce", 0.59)
            .unit(Unit::Lb)
            .frequency(0.8),
        product("cereal-cheerios", "Cheerios Cereal", "pantry", 4.99).brand("Cheerios"),
        product("bread-wheat", "Whole Wheat Bread", "pantry", 2.99).frequency(0.5),
        product("towels-paper", "Paper Towels 6 Pack", "household", 8.99).brand("Kirkland"),
        product("soap-dish", "Dish Soap", "household", 3.49),
        product("chicken-rotisserie", "Rotisserie Chicken", "deli", 4.99).frequency(0.4),
    ])
}

/// A plain-price deal with the given associated product name.
pub fn price_deal(name: &str, price: f64) -> ExtractedDeal {
    let mut deal = ExtractedDeal::new(
        format!("{name} ${price:.2}"),
        DealDetails::plain_price(),
        DealSource::generic("price"),
    );
    deal.product_name = Some(name.to_string());
    deal.price = Some(price);
    deal.confidence = Confidence::new(0.5);
    deal
}

/// A linearly separable training set: positives pair each catalog product
/// with a deal named after it at its typical price, negatives pair it
/// with a different product's deal. Large enough to train on at default
/// thresholds.
pub fn separable_training_set() -> Vec<TrainingExample> {
    let catalog = grocery_catalog();
    let products = catalog.products();
    let mut examples = Vec::with_capacity(products.len() * 2);
    for (i, product) in products.iter().enumerate() {
        examples.push(TrainingExample {
            deal: price_deal(&product.name, product.typical_price),
            product: product.clone(),
            is_match: true,
        });
        let other = &products[(i + products.len() / 2) % products.len()];
        examples.push(TrainingExample {
            deal: price_deal(&other.name, other.typical_price),
            product: product.clone(),
            is_match: false,
        });
    }
    examples
}

fn product(id: &str, name: &str, category: &str, typical_price: f64) -> CatalogProduct {
    CatalogProduct {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        typical_price,
        unit: None,
        brand: None,
        purchase_frequency: 0.0,
    }
}

trait ProductExt {
    fn brand(self, brand: &str) -> Self;
    fn unit(self, unit: Unit) -> Self;
    fn frequency(self, f: f64) -> Self;
}

impl ProductExt for CatalogProduct {
    fn brand(mut self, brand: &str) -> Self {
        self.brand = Some(brand.to_string());
        self
    }

    fn unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    fn frequency(mut self, f: f64) -> Self {
        self.purchase_frequency = f;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_all_categories() {
        let catalog = grocery_catalog();
        for category in ["dairy", "produce", "pantry", "household", "deli"] {
            assert!(
                !catalog.by_category(category).is_empty(),
                "no products in {category}"
            );
        }
    }

    #[test]
    fn training_set_is_balanced() {
        let examples = separable_training_set();
        let positives = examples.iter().filter(|e| e.is_match).count();
        assert_eq!(positives * 2, examples.len());
        assert!(examples.len() >= 10);
    }
}
