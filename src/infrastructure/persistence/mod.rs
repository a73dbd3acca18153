pub mod artifact_store;
pub mod dataset_csv;
pub mod latest;
pub mod manifest;
pub mod news_csv;
pub mod price_csv;

pub use artifact_store::{ArtifactStore, CsvArtifact, LatestArtifactCache};
pub use latest::latest;
