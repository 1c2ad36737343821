mod match_model;
mod store_resolver;

pub use match_model::MatchModel;
pub use store_resolver::StoreResolver;
