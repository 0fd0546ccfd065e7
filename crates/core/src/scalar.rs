//! Explicit scalar converters.
//!
//! Each accepts any depth of reference/named wrapping and returns the plain
//! scalar. Numeric conversions follow `as` cast semantics: widening is exact,
//! narrowing truncates silently. An absent input yields the zero value.

#![forbid(unsafe_code)]

use crate::error::ConvertError;
use crate::resolve::{resolve, Resolved};
use crate::shape::ShapeKind;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Number {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl Number {
    pub(crate) fn of(v: &Value) -> Option<Self> {
        match v {
            Value::Int32(n) => Some(Number::I32(*n)),
            Value::Int64(n) => Some(Number::I64(*n)),
            Value::Float32(n) => Some(Number::F32(*n)),
            Value::Float64(n) => Some(Number::F64(*n)),
            _ => None,
        }
    }

    pub(crate) fn as_i32(self) -> i32 {
        match self {
            Number::I32(n) => n,
            Number::I64(n) => n as i32,
            Number::F32(n) => n as i32,
            Number::F64(n) => n as i32,
        }
    }

    pub(crate) fn as_i64(self) -> i64 {
        match self {
            Number::I32(n) => n as i64,
            Number::I64(n) => n,
            Number::F32(n) => n as i64,
            Number::F64(n) => n as i64,
        }
    }

    pub(crate) fn as_f32(self) -> f32 {
        match self {
            Number::I32(n) => n as f32,
            Number::I64(n) => n as f32,
            Number::F32(n) => n,
            Number::F64(n) => n as f32,
        }
    }

    pub(crate) fn as_f64(self) -> f64 {
        match self {
            Number::I32(n) => n as f64,
            Number::I64(n) => n as f64,
            Number::F32(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Cast into a value of a numeric kind; `None` for non-numeric kinds.
    pub(crate) fn cast(self, to: ShapeKind) -> Option<Value> {
        match to {
            ShapeKind::Int32 => Some(Value::Int32(self.as_i32())),
            ShapeKind::Int64 => Some(Value::Int64(self.as_i64())),
            ShapeKind::Float32 => Some(Value::Float32(self.as_f32())),
            ShapeKind::Float64 => Some(Value::Float64(self.as_f64())),
            _ => None,
        }
    }
}

fn number(v: &Value, to: ShapeKind) -> Result<Option<Number>, ConvertError> {
    match resolve(v) {
        Resolved::Absent { .. } => Ok(None),
        Resolved::Concrete { value, .. } => Number::of(value)
            .map(Some)
            .ok_or(ConvertError::KindMismatch { from: value.kind(), to }),
    }
}

pub fn text(v: &Value) -> Result<String, ConvertError> {
    match resolve(v) {
        Resolved::Absent { .. } => Ok(String::new()),
        Resolved::Concrete { value: Value::Text(s), .. } => Ok(s.clone()),
        Resolved::Concrete { value, .. } => Err(ConvertError::KindMismatch { from: value.kind(), to: ShapeKind::Text }),
    }
}

pub fn boolean(v: &Value) -> Result<bool, ConvertError> {
    match resolve(v) {
        Resolved::Absent { .. } => Ok(false),
        Resolved::Concrete { value: Value::Bool(b), .. } => Ok(*b),
        Resolved::Concrete { value, .. } => Err(ConvertError::KindMismatch { from: value.kind(), to: ShapeKind::Bool }),
    }
}

pub fn int32(v: &Value) -> Result<i32, ConvertError> {
    Ok(number(v, ShapeKind::Int32)?.map(Number::as_i32).unwrap_or_default())
}

pub fn int64(v: &Value) -> Result<i64, ConvertError> {
    Ok(number(v, ShapeKind::Int64)?.map(Number::as_i64).unwrap_or_default())
}

pub fn float32(v: &Value) -> Result<f32, ConvertError> {
    Ok(number(v, ShapeKind::Float32)?.map(Number::as_f32).unwrap_or_default())
}

pub fn float64(v: &Value) -> Result<f64, ConvertError> {
    Ok(number(v, ShapeKind::Float64)?.map(Number::as_f64).unwrap_or_default())
}
