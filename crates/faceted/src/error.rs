//! Error types for the filtering engine.
//!
//! Filtering itself is total: missing attributes, unknown control kinds,
//! and unset configuration all resolve to documented defaults. Errors
//! exist only for handing the public API an ID it does not know.

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, FilterError>;

/// Errors that can occur when addressing engine entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// The control ID is not registered with this container.
    #[error("unknown control ID")]
    UnknownControl,
    /// The item ID is not registered with this container.
    #[error("unknown item ID")]
    UnknownItem,
    /// The label ID is not registered with this container.
    #[error("unknown label ID")]
    UnknownLabel,
}
