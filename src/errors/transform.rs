//! Error types for shaping raw subgraph records into typed results.

/// Errors raised by a result normalizer.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// A raw record could not be decoded into the entity's raw shape.
    #[error("Failed to decode {entity} record {index}")]
    Decode {
        /// The entity being normalized
        entity: &'static str,
        /// Index of the offending record
        index: usize,
        /// The underlying decode error
        #[source]
        source: serde_json::Error,
    },

    /// The normalizer needs at least one record and got none.
    #[error("Expected at least one {entity} record")]
    MissingRecord {
        /// The entity being normalized
        entity: &'static str,
    },

    /// A payload lacks a field the normalizer depends on.
    #[error("Payload has no `{field}` field")]
    MissingField {
        /// Name of the missing field
        field: String,
    },

    /// A decoded field holds a value that cannot be represented.
    #[error("Invalid value for `{field}`: {details}")]
    InvalidValue {
        /// Name of the offending field
        field: &'static str,
        /// What was wrong with the value
        details: String,
    },
}

impl TransformError {
    /// Create a `Decode` error for a record of an entity.
    pub fn decode(entity: &'static str, index: usize, source: serde_json::Error) -> Self {
        TransformError::Decode {
            entity,
            index,
            source,
        }
    }

    /// Create a `MissingRecord` error for an entity.
    pub fn missing_record(entity: &'static str) -> Self {
        TransformError::MissingRecord { entity }
    }

    /// Create a `MissingField` error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        TransformError::MissingField {
            field: field.into(),
        }
    }

    /// Create an `InvalidValue` error.
    pub fn invalid_value(field: &'static str, details: impl Into<String>) -> Self {
        TransformError::InvalidValue {
            field,
            details: details.into(),
        }
    }
}
