//! Error types for the grid engines.

use crate::model::ItemId;

/// Result type alias for data view operations.
pub type Result<T> = std::result::Result<T, DataViewError>;

/// Broad classification of a [`DataViewError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The call would have broken the id index or row identity. Nothing was
    /// mutated.
    InvariantViolation,
    /// The API was used in an unsupported way (e.g. grouping with no metadata
    /// provider, invalid options).
    UsageMisuse,
}

/// Errors returned by item stores and data views.
///
/// Every error is returned before any part of the offending mutation becomes
/// visible.
#[derive(Debug, thiserror::Error)]
pub enum DataViewError {
    /// Two items carry the same id.
    #[error("Each item must have a unique '{field}' value: {id} appears more than once")]
    DuplicateId { field: String, id: ItemId },

    /// An item has no value in the id field.
    #[error("Each item must have a '{field}' value: item at position {position} has none")]
    MissingId { field: String, position: usize },

    /// A replacement item's id differs from the id being updated.
    #[error("Replacement item for {expected} carries id {actual}")]
    IdMismatch { expected: ItemId, actual: ItemId },

    /// No item with this id exists.
    #[error("Unknown item id {0}")]
    UnknownId(ItemId),

    /// Bulk call received parallel slices of different lengths.
    #[error("Mismatched bulk arguments: {ids} ids but {items} items")]
    LengthMismatch { ids: usize, items: usize },

    /// Insert position past the end of the store.
    #[error("Insert position {index} is out of bounds for {len} items")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Grouping was requested but no group metadata provider is configured.
    #[error("Grouping requires a group item metadata provider")]
    MissingGroupMetadataProvider,

    /// Construction options were rejected.
    #[error(transparent)]
    Options(#[from] OptionsError),
}

impl DataViewError {
    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateId { .. }
            | Self::MissingId { .. }
            | Self::IdMismatch { .. }
            | Self::UnknownId(_)
            | Self::LengthMismatch { .. }
            | Self::IndexOutOfBounds { .. } => ErrorKind::InvariantViolation,
            Self::MissingGroupMetadataProvider | Self::Options(_) => ErrorKind::UsageMisuse,
        }
    }
}

/// Errors raised while loading or validating option structs.
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    /// JSON could not be parsed, or carried unknown keys.
    #[error("Invalid options JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML could not be parsed, or carried unknown keys.
    #[error("Invalid options TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// A field holds a value outside its valid range.
    #[error("Invalid value for option '{field}': {message}")]
    InvalidValue { field: &'static str, message: String },
}

impl OptionsError {
    /// Create a value error.
    pub fn invalid_value(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            message: message.into(),
        }
    }
}
