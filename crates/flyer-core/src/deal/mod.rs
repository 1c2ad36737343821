pub mod confidence;
pub mod details;
pub mod extracted;
pub mod source;
pub mod types;

pub use confidence::Confidence;
pub use details::DealDetails;
pub use extracted::ExtractedDeal;
pub use source::DealSource;
pub use types::{DealType, Unit};
