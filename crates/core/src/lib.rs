//! Kinship core: a value model with declared shapes and a coercion engine.
//!
//! - [`resolve`] strips reference and named layers off a value
//! - [`matcher`] decides whether a declared shape can become a target shape
//! - [`convert_to`] rebuilds a value in a target shape, recursively
//! - [`scalar`] holds the explicit per-kind converters

#![forbid(unsafe_code)]

mod convert;
mod error;
pub mod matcher;
mod resolve;
pub mod scalar;
mod shape;
mod value;

pub use convert::{convert_like, convert_to};
pub use error::{ConvertError, PathSegment};
pub use resolve::{resolve, Resolved};
pub use shape::{FieldShape, Shape, ShapeKind, StructShape};
pub use value::{MapValue, NamedValue, RefValue, SeqValue, StructValue, Value};

pub mod prelude {
    pub use super::{convert_like, convert_to, ConvertError, Shape, ShapeKind, StructShape, StructValue, Value};
}
