//! Error types for the roster data model
//!
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use thiserror::Error;

/// Result type alias for data model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while validating records and datasets
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A required attribute is absent, null, or blank
    #[error("record #{position} is missing required field '{field}'")]
    MissingField {
        /// Index of the offending record in its dataset
        position: usize,
        /// Name of the missing attribute
        field: &'static str,
    },

    /// Two records share an identifier
    #[error("duplicate identifier '{identifier}' at records #{first} and #{second}")]
    DuplicateIdentifier {
        /// The repeated identifier
        identifier: String,
        /// Index of the first occurrence
        first: usize,
        /// Index of the repeated occurrence
        second: usize,
    },
}
