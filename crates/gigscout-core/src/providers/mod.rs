// Data source implementations
pub mod http;

pub use http::HttpGigSource;
