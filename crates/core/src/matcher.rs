//! Shape matcher: static compatibility between a declared source shape and a target shape.
//!
//! The engine consults this before walking maps so that incompatible value
//! shapes are rejected even when there are no entries. Sequences are only
//! checked element by element.

#![forbid(unsafe_code)]

use crate::error::{ConvertError, PathSegment};
use crate::shape::{Shape, ShapeKind, StructShape};

/// Scalar compatibility: identical kinds, or any numeric to any numeric.
pub fn scalar(from: ShapeKind, to: ShapeKind) -> Result<(), ConvertError> {
    if !from.is_scalar() || !to.is_scalar() {
        return Err(ConvertError::KindMismatch { from, to });
    }
    if from == to || (from.is_numeric() && to.is_numeric()) {
        Ok(())
    } else {
        Err(ConvertError::KindMismatch { from, to })
    }
}

/// Field set and order must be identical; field shapes are checked separately.
pub fn struct_layout(source: &StructShape, target: &StructShape) -> Result<(), ConvertError> {
    let mismatch = |detail: String| ConvertError::ShapeMismatch {
        from: source.name.clone(),
        to: target.name.clone(),
        detail,
    };
    if source.fields.len() != target.fields.len() {
        return Err(mismatch(format!(
            "{} fields vs {} fields",
            source.fields.len(),
            target.fields.len()
        )));
    }
    for (i, (s, t)) in source.fields.iter().zip(&target.fields).enumerate() {
        if s.name != t.name {
            return Err(mismatch(format!("field {} is `{}`, expected `{}`", i, s.name, t.name)));
        }
    }
    Ok(())
}

/// Map keys are copied, not coerced: their concrete kinds must be identical.
pub fn map_key(source: &Shape, target: &Shape) -> Result<(), ConvertError> {
    let (from, to) = (source.concrete().kind(), target.concrete().kind());
    if from != to {
        return Err(ConvertError::KindMismatch { from, to });
    }
    check(source, target)
}

/// Can a value declared as `source` be converted to `target`?
pub fn check(source: &Shape, target: &Shape) -> Result<(), ConvertError> {
    let source = source.concrete();
    match target.underlying() {
        Shape::Ref(pointee) => check(source, pointee),
        Shape::Struct(dst) => match source {
            Shape::Struct(src) => {
                struct_layout(src, dst)?;
                for (s, t) in src.fields.iter().zip(&dst.fields) {
                    check(&s.shape, &t.shape).map_err(|e| e.at(PathSegment::Field(t.name.clone())))?;
                }
                Ok(())
            }
            other => Err(ConvertError::KindMismatch { from: other.kind(), to: ShapeKind::Struct }),
        },
        Shape::Seq(dst) => match source {
            Shape::Seq(src) => check(src, dst).map_err(|e| e.at(PathSegment::Items)),
            other => Err(ConvertError::KindMismatch { from: other.kind(), to: ShapeKind::Seq }),
        },
        Shape::Map { key: dk, value: dv } => match source {
            Shape::Map { key: sk, value: sv } => {
                map_key(sk, dk)?;
                check(sv, dv).map_err(|e| e.at(PathSegment::Values))
            }
            other => Err(ConvertError::KindMismatch { from: other.kind(), to: ShapeKind::Map }),
        },
        scalar_target => scalar(source.kind(), scalar_target.kind()),
    }
}
