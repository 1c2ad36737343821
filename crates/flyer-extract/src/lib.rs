//! # flyer-extract
//!
//! Phases 1 and 2 of the progressive pipeline: pattern-based deal
//! extraction from noisy OCR ad text, and per-store learned templates
//! that improve on it. Extraction never fails — malformed input yields an
//! empty deal list.

pub mod patterns;
pub mod regex_extractor;
pub mod store_key;
pub mod template;

pub use regex_extractor::RegexExtractor;
pub use store_key::SubstringStoreResolver;
pub use template::{OcrFragment, StoreTemplate, TemplateExtractor};
