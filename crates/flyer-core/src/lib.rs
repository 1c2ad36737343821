//! # flyer-core
//!
//! Foundation crate for the flyerparse deal-extraction core.
//! Defines all types, traits, errors, config, constants, and the atomic
//! JSON persistence helpers. Every other crate in the workspace depends
//! on this.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod deal;
pub mod errors;
pub mod models;
pub mod persist;
pub mod phase;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use catalog::{CatalogProduct, ProductCatalog};
pub use config::FlyerConfig;
pub use deal::{Confidence, DealDetails, DealSource, DealType, ExtractedDeal, Unit};
pub use errors::{FlyerError, FlyerResult};
pub use models::{ProcessingResult, ProductMatch};
pub use phase::LearningPhase;
