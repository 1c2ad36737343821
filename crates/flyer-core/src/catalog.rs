//! Product catalog the matcher ranks deals against. Owned by an external
//! collaborator; the core only reads it.

use serde::{Deserialize, Serialize};

use crate::deal::Unit;

/// One purchasable product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: String,
    pub name: String,
    pub category: String,
    /// Usual shelf price, used for price-reasonableness scoring.
    pub typical_price: f64,
    pub unit: Option<Unit>,
    pub brand: Option<String>,
    /// Normalized historical purchase frequency in [0, 1].
    pub purchase_frequency: f64,
}

/// Ordered list of products with substring search and category filtering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCatalog {
    products: Vec<CatalogProduct>,
}

impl ProductCatalog {
    pub fn new(products: Vec<CatalogProduct>) -> Self {
        Self { products }
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn products(&self) -> &[CatalogProduct] {
        &self.products
    }

    pub fn get(&self, id: &str) -> Option<&CatalogProduct> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Case-insensitive substring search: a product matches when its name
    /// contains the whole query or any single query word.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&CatalogProduct> {
        let query_lower = query.to_lowercase();
        let words: Vec<&str> = query_lower.split_whitespace().collect();

        self.products
            .iter()
            .filter(|p| {
                let name = p.name.to_lowercase();
                name.contains(&query_lower) || words.iter().any(|w| name.contains(w))
            })
            .take(limit)
            .collect()
    }

    pub fn by_category(&self, category: &str) -> Vec<&CatalogProduct> {
        self.products
            .iter()
            .filter(|p| p.category.eq_ignore_ascii_case(category))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ProductCatalog {
        ProductCatalog::new(vec![
            CatalogProduct {
                id: "p1".into(),
                name: "Organic Gala Apples".into(),
                category: "produce".into(),
                typical_price: 2.49,
                unit: Some(Unit::Lb),
                brand: None,
                purchase_frequency: 0.4,
            },
            CatalogProduct {
                id: "p2".into(),
                name: "Whole Milk".into(),
                category: "dairy".into(),
                typical_price: 3.99,
                unit: Some(Unit::Each),
                brand: None,
                purchase_frequency: 0.8,
            },
        ])
    }

    #[test]
    fn search_matches_whole_query_or_single_words() {
        let c = catalog();
        assert_eq!(c.search("gala apples", 10).len(), 1);
        // "milk" as a lone word also matches.
        assert_eq!(c.search("fresh milk", 10)[0].id, "p2");
        assert!(c.search("anchovies", 10).is_empty());
    }

    #[test]
    fn category_filter_ignores_case() {
        let c = catalog();
        assert_eq!(c.by_category("Produce").len(), 1);
        assert_eq!(c.by_category("bakery").len(), 0);
    }
}
