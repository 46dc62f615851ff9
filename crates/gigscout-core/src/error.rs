use thiserror::Error;

/// All the ways browsing can go wrong
#[derive(Error, Debug)]
pub enum Error {
    /// A filter id the registry never declared. Always a programming error.
    #[error("Unknown filter: {0}")]
    UnknownFilter(String),

    #[error("Invalid value {value:?} for filter {id}")]
    InvalidFilterValue { id: String, value: String },

    #[error(transparent)]
    Fetch(#[from] FetchFailure),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Why a data source could not deliver a page
///
/// Kept separate from [`Error`] because it is surfaced as a view state
/// rather than bubbling through the filtering code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Could not decode response: {0}")]
    Decode(String),

    #[error("Request rejected: {0}")]
    Rejected(String),
}
