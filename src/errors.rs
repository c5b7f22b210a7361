use crate::converters::Converter;

/// Error types for marshaling operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No converter accepts the type in the requested slot, or the JSON path
    /// has no adapter registered for it.
    #[error("Unsupported type: {type_name}")]
    UnsupportedType { type_name: &'static str },

    /// A second adapter was registered for a type that already has one.
    #[error("Duplicate adapter for type {type_name}")]
    DuplicateAdapter { type_name: &'static str },

    /// A converter chain listed the same converter twice.
    #[error("Duplicate converter in chain: {converter:?}")]
    DuplicateConverter { converter: Converter },

    /// The wire form does not match what the target type expects.
    #[error("Malformed {type_name} value{}: {reason}", at_field(.field))]
    MalformedWireValue {
        type_name: &'static str,
        /// Path of the offending field inside a structured body, when known.
        field: Option<String>,
        reason: String,
    },

    /// A converter that expects content received an empty body.
    #[error("Empty body where {type_name} was expected")]
    EmptyBody { type_name: &'static str },

    /// A value cannot be carried in an HTTP header.
    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    /// JSON serialization errors.
    #[error("Serde JSON error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a [`Error::MalformedWireValue`] without field information.
    pub fn malformed(type_name: &'static str, reason: impl std::fmt::Display) -> Self {
        Error::MalformedWireValue {
            type_name,
            field: None,
            reason: reason.to_string(),
        }
    }
}

fn at_field(field: &Option<String>) -> String {
    match field {
        Some(f) => format!(" at `{f}`"),
        None => String::new(),
    }
}

/// A specialized `Result` type for marshaling operations.
pub type Result<T> = std::result::Result<T, Error>;
