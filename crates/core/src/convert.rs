//! Coercion engine: rebuild a value in a target shape.

#![forbid(unsafe_code)]

use metrics::counter;
use tracing::debug;

use crate::error::{ConvertError, PathSegment};
use crate::matcher;
use crate::resolve::{resolve, Resolved};
use crate::scalar::Number;
use crate::shape::{Shape, StructShape};
use crate::value::{MapValue, SeqValue, StructValue, Value};

/// Convert `input` into a new value of shape `target`.
///
/// Reference and named layers on the input are resolved first; an absent
/// input yields `target.zero_value()`. Named targets produce a value of the
/// target's declared name. Conversion is all-or-nothing: the first failure at
/// any depth aborts the call.
pub fn convert_to(input: &Value, target: &Shape) -> Result<Value, ConvertError> {
    counter!("convert_attempts", 1u64);
    let out = coerce(input, target);
    if let Err(e) = &out {
        counter!("convert_err", 1u64);
        debug!(target_shape = %target, error = %e, "conversion failed");
    }
    out
}

/// Convert `input` into the shape of `exemplar` (usually a zero value).
pub fn convert_like(input: &Value, exemplar: &Value) -> Result<Value, ConvertError> {
    convert_to(input, &exemplar.shape())
}

fn coerce(input: &Value, target: &Shape) -> Result<Value, ConvertError> {
    match target {
        Shape::Named { name, underlying } => Ok(Value::named(name.clone(), coerce(input, underlying)?)),
        Shape::Ref(pointee) => match resolve(input) {
            Resolved::Absent { .. } => Ok(Value::nil((**pointee).clone())),
            Resolved::Concrete { value, .. } => Ok(Value::reference(coerce(value, pointee)?)),
        },
        _ => match resolve(input) {
            Resolved::Absent { .. } => Ok(target.zero_value()),
            Resolved::Concrete { value, .. } => coerce_concrete(value, target),
        },
    }
}

fn coerce_concrete(value: &Value, target: &Shape) -> Result<Value, ConvertError> {
    match (target, value) {
        (Shape::Text, Value::Text(s)) => Ok(Value::Text(s.clone())),
        (Shape::Bool, Value::Bool(b)) => Ok(Value::Bool(*b)),
        (Shape::Struct(dst), Value::Struct(src)) => coerce_struct(src, dst),
        (Shape::Seq(elem), Value::Seq(src)) => coerce_seq(src, elem),
        (Shape::Map { key, value: val }, Value::Map(src)) => coerce_map(src, key, val),
        (t, v) => Number::of(v)
            .and_then(|n| n.cast(t.kind()))
            .ok_or(ConvertError::KindMismatch { from: v.kind(), to: t.kind() }),
    }
}

fn coerce_struct(src: &StructValue, dst: &StructShape) -> Result<Value, ConvertError> {
    matcher::struct_layout(&src.shape, dst)?;
    if src.fields.len() != dst.fields.len() {
        return Err(ConvertError::ShapeMismatch {
            from: src.shape.name.clone(),
            to: dst.name.clone(),
            detail: format!("value carries {} fields", src.fields.len()),
        });
    }
    let fields = src
        .fields
        .iter()
        .zip(&dst.fields)
        .map(|(v, f)| coerce(v, &f.shape).map_err(|e| e.at(PathSegment::Field(f.name.clone()))))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::Struct(StructValue { shape: dst.clone(), fields }))
}

fn coerce_seq(src: &SeqValue, elem: &Shape) -> Result<Value, ConvertError> {
    let items = src
        .items
        .iter()
        .enumerate()
        .map(|(i, v)| coerce(v, elem).map_err(|e| e.at(PathSegment::Index(i))))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::Seq(SeqValue { elem: elem.clone(), items }))
}

fn coerce_map(src: &MapValue, key: &Shape, value: &Shape) -> Result<Value, ConvertError> {
    matcher::map_key(&src.key, key)?;
    matcher::check(&src.value, value).map_err(|e| e.at(PathSegment::Values))?;
    let mut out = MapValue::new(key.clone(), value.clone());
    for (k, v) in &src.entries {
        let at = || PathSegment::Key(k.to_string());
        let k2 = coerce(k, key).map_err(|e| e.at(at()))?;
        let v2 = coerce(v, value).map_err(|e| e.at(at()))?;
        out.insert(k2, v2);
    }
    Ok(Value::Map(out))
}
