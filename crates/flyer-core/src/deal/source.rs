use serde::{Deserialize, Serialize};

/// Where an extracted deal came from. Provenance feeds confidence scoring
/// and merge tie-breaking, so it is typed rather than a free-form map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DealSource {
    /// One of the generic regex families; `pattern` is the family label.
    GenericPattern { pattern: String },
    /// A store-specific regex override.
    StorePattern { store: String, pattern: String },
    /// Block extraction driven by a store template's layout.
    TemplateRegion { store: String },
    /// A custom pattern learned from a correction.
    CustomPattern { id: String },
}

impl DealSource {
    pub fn generic(pattern: &str) -> Self {
        DealSource::GenericPattern {
            pattern: pattern.to_string(),
        }
    }

    /// Store-specific patterns earn a confidence bonus.
    pub fn is_store_specific(&self) -> bool {
        matches!(self, DealSource::StorePattern { .. })
    }

    /// Template-sourced deals win merge ties over regex-sourced ones.
    pub fn is_template(&self) -> bool {
        matches!(
            self,
            DealSource::TemplateRegion { .. } | DealSource::CustomPattern { .. }
        )
    }
}
