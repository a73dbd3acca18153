pub mod http_client_factory;
pub mod market_data;
pub mod mock;
pub mod news;
pub mod persistence;
pub mod universe;

pub use http_client_factory::HttpClientFactory;
