#![forbid(unsafe_code)]

use thiserror::Error;

/// Failure to parse a foreign owner reference token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("expected 3 or 4 '/'-separated segments, got {0}")]
    Segments(usize),
    #[error("empty cluster segment")]
    EmptyCluster,
    #[error("empty kind")]
    EmptyKind,
    #[error("empty name")]
    EmptyName,
    #[error("invalid escape in segment {0:?}")]
    BadEscape(String),
}

/// Failure to lift a raw object into a cluster object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectError {
    #[error("object has no apiVersion/kind")]
    MissingTypeMeta,
    #[error("object has no name")]
    MissingName,
}
