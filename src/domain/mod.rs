// Artifact kinds and file naming
pub mod artifact;

// Domain-specific error types
pub mod errors;

// Training rows
pub mod features;

// Price bars and the wide panel
pub mod market;

// News articles
pub mod news;

// Port interfaces
pub mod ports;

// Keyword → sector rules
pub mod sector_rules;

// Sentiment labels and the scorer trait
pub mod sentiment;

// Ticker universe records
pub mod universe;
