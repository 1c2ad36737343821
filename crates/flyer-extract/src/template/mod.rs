//! Phase 2: learned per-store layout templates.

mod extractor;
mod template;

pub use extractor::{OcrFragment, TemplateExtractor};
pub use template::{
    default_templates, CustomPattern, LayoutRegion, LayoutType, RegionRole, StoreTemplate,
};
