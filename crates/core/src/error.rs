#![forbid(unsafe_code)]

use std::fmt;

use thiserror::Error;

use crate::shape::ShapeKind;

/// Position inside a value where a nested conversion failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
    Key(String),
    /// Element shape of a sequence, reported by the static matcher.
    Items,
    /// Value shape of a map.
    Values,
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => write!(f, "field `{}`", name),
            PathSegment::Index(i) => write!(f, "index {}", i),
            PathSegment::Key(k) => write!(f, "key {}", k),
            PathSegment::Items => f.write_str("sequence items"),
            PathSegment::Values => f.write_str("map values"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    #[error("cannot convert {from} to {to}")]
    KindMismatch { from: ShapeKind, to: ShapeKind },
    #[error("struct {from} is not assignable to {to}: {detail}")]
    ShapeMismatch { from: String, to: String, detail: String },
    #[error("{at}: {source}")]
    ElementConversion {
        at: PathSegment,
        #[source]
        source: Box<ConvertError>,
    },
}

impl ConvertError {
    /// Wrap `self` as a failure at `at`.
    pub fn at(self, at: PathSegment) -> Self {
        ConvertError::ElementConversion { at, source: Box::new(self) }
    }

    /// Innermost error, below all element wrappers.
    pub fn root(&self) -> &ConvertError {
        let mut cur = self;
        while let ConvertError::ElementConversion { source, .. } = cur {
            cur = source;
        }
        cur
    }

    /// Path from the outermost position to the failure.
    pub fn path(&self) -> Vec<&PathSegment> {
        let mut out = Vec::new();
        let mut cur = self;
        while let ConvertError::ElementConversion { at, source } = cur {
            out.push(at);
            cur = source;
        }
        out
    }
}
