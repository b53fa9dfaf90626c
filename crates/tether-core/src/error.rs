use thiserror::Error;

/// Failures a hook can observe. Only configuration errors are returned to callers; the
/// rest are turned into hook state or log records.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HookError {
    /// Visibility threshold outside `[0, 1]`.
    #[error("threshold must be between 0 and 1 (got {0})")]
    InvalidThreshold(f64),

    /// Observer root margin that is not a finite number of pixels.
    #[error("root margin must be a finite number of pixels (got {0})")]
    InvalidRootMargin(f64),

    /// Response status outside the 2xx range.
    #[error("HTTP Error! Status: {0}")]
    HttpStatus(u16),

    /// The transport failed before a response arrived.
    #[error("{0}")]
    Transport(String),

    /// A body or stored blob was not valid JSON for the expected type.
    #[error("{0}")]
    Decode(String),

    /// A value could not be serialized to JSON.
    #[error("{0}")]
    Encode(String),

    #[error("storage error: {0}")]
    Storage(String),

    /// The capability is missing in this execution context.
    #[error("{0} is not available in this environment")]
    Unsupported(&'static str),
}
