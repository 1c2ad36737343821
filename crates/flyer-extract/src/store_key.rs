//! Store name normalization and resolution.

use flyer_core::traits::StoreResolver;

/// Resolves free-form store names by normalization and substring match.
///
/// "Whole Foods Market #104" and "whole_foods" both resolve to the same
/// key so store-specific patterns and templates apply.
#[derive(Debug, Default, Clone)]
pub struct SubstringStoreResolver;

impl SubstringStoreResolver {
    pub fn new() -> Self {
        Self
    }
}

impl StoreResolver for SubstringStoreResolver {
    fn normalize(&self, raw: &str) -> String {
        raw.trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect::<String>()
            .split('_')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("_")
    }

    fn resolve(&self, raw: &str, known: &[String]) -> Option<String> {
        let key = self.normalize(raw);
        if key.is_empty() {
            return None;
        }
        if let Some(exact) = known.iter().find(|k| **k == key) {
            return Some(exact.clone());
        }
        known
            .iter()
            .find(|k| key.contains(k.as_str()) || k.contains(&key))
            .cloned()
    }
}
