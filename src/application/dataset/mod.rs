pub mod feature_aligner;
pub mod series;

pub use feature_aligner::{BatchSummary, FeatureAligner};
