//! Dynamically typed values that carry their declared shape.

#![forbid(unsafe_code)]

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConvertError;
use crate::shape::{Shape, ShapeKind, StructShape};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Text(String),
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Struct(StructValue),
    Seq(SeqValue),
    Map(MapValue),
    Ref(RefValue),
    Named(NamedValue),
}

/// Struct instance; `fields` line up with `shape.fields`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StructValue {
    pub shape: StructShape,
    pub fields: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeqValue {
    pub elem: Shape,
    pub items: Vec<Value>,
}

/// Insertion-ordered associative container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapValue {
    pub key: Shape,
    pub value: Shape,
    pub entries: Vec<(Value, Value)>,
}

/// Reference to a value of shape `target`; `None` is a nil reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefValue {
    pub target: Shape,
    pub value: Option<Box<Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedValue {
    pub name: String,
    pub inner: Box<Value>,
}

impl StructValue {
    /// Build a struct value, checking the field count against the layout.
    pub fn new(shape: StructShape, fields: Vec<Value>) -> Result<Self, ConvertError> {
        if shape.fields.len() != fields.len() {
            return Err(ConvertError::ShapeMismatch {
                from: shape.name.clone(),
                to: shape.name.clone(),
                detail: format!("layout has {} fields, got {} values", shape.fields.len(), fields.len()),
            });
        }
        Ok(Self { shape, fields })
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.shape.field_index(name).and_then(|i| self.fields.get(i))
    }
}

impl MapValue {
    pub fn new(key: Shape, value: Shape) -> Self {
        Self { key, value, entries: Vec::new() }
    }

    /// Insert or replace; returns the previous value for an equal key.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl Value {
    /// Wrap a value in one reference layer.
    pub fn reference(value: Value) -> Self {
        Value::Ref(RefValue { target: value.shape(), value: Some(Box::new(value)) })
    }

    /// A nil reference to `target`.
    pub fn nil(target: Shape) -> Self {
        Value::Ref(RefValue { target, value: None })
    }

    pub fn named(name: impl Into<String>, inner: Value) -> Self {
        Value::Named(NamedValue { name: name.into(), inner: Box::new(inner) })
    }

    pub fn seq(elem: Shape, items: Vec<Value>) -> Self {
        Value::Seq(SeqValue { elem, items })
    }

    pub fn map(key: Shape, value: Shape, entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        let mut m = MapValue::new(key, value);
        for (k, v) in entries {
            m.insert(k, v);
        }
        Value::Map(m)
    }

    /// Declared shape of this value.
    pub fn shape(&self) -> Shape {
        match self {
            Value::Text(_) => Shape::Text,
            Value::Bool(_) => Shape::Bool,
            Value::Int32(_) => Shape::Int32,
            Value::Int64(_) => Shape::Int64,
            Value::Float32(_) => Shape::Float32,
            Value::Float64(_) => Shape::Float64,
            Value::Struct(s) => Shape::Struct(s.shape.clone()),
            Value::Seq(s) => Shape::seq(s.elem.clone()),
            Value::Map(m) => Shape::map(m.key.clone(), m.value.clone()),
            Value::Ref(r) => Shape::reference(r.target.clone()),
            Value::Named(n) => Shape::named(n.name.clone(), n.inner.shape()),
        }
    }

    /// Kind of the declared shape; named values report their underlying kind.
    pub fn kind(&self) -> ShapeKind {
        match self {
            Value::Text(_) => ShapeKind::Text,
            Value::Bool(_) => ShapeKind::Bool,
            Value::Int32(_) => ShapeKind::Int32,
            Value::Int64(_) => ShapeKind::Int64,
            Value::Float32(_) => ShapeKind::Float32,
            Value::Float64(_) => ShapeKind::Float64,
            Value::Struct(_) => ShapeKind::Struct,
            Value::Seq(_) => ShapeKind::Seq,
            Value::Map(_) => ShapeKind::Map,
            Value::Ref(_) => ShapeKind::Ref,
            Value::Named(n) => n.inner.kind(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::Text(s.to_string()) }
}
impl From<String> for Value {
    fn from(s: String) -> Self { Value::Text(s) }
}
impl From<bool> for Value {
    fn from(b: bool) -> Self { Value::Bool(b) }
}
impl From<i32> for Value {
    fn from(n: i32) -> Self { Value::Int32(n) }
}
impl From<i64> for Value {
    fn from(n: i64) -> Self { Value::Int64(n) }
}
impl From<f32> for Value {
    fn from(n: f32) -> Self { Value::Float32(n) }
}
impl From<f64> for Value {
    fn from(n: f64) -> Self { Value::Float64(n) }
}
impl From<StructValue> for Value {
    fn from(s: StructValue) -> Self { Value::Struct(s) }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{:?}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int32(n) => write!(f, "{}", n),
            Value::Int64(n) => write!(f, "{}", n),
            Value::Float32(n) => write!(f, "{}", n),
            Value::Float64(n) => write!(f, "{}", n),
            Value::Struct(s) => {
                write!(f, "{}{{", s.shape.name)?;
                for (i, (field, v)) in s.shape.fields.iter().zip(&s.fields).enumerate() {
                    if i > 0 { f.write_str(", ")?; }
                    write!(f, "{}: {}", field.name, v)?;
                }
                f.write_str("}")
            }
            Value::Seq(s) => {
                f.write_str("[")?;
                for (i, v) in s.items.iter().enumerate() {
                    if i > 0 { f.write_str(", ")?; }
                    write!(f, "{}", v)?;
                }
                f.write_str("]")
            }
            Value::Map(m) => {
                f.write_str("{")?;
                for (i, (k, v)) in m.entries.iter().enumerate() {
                    if i > 0 { f.write_str(", ")?; }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("}")
            }
            Value::Ref(r) => match &r.value {
                Some(v) => write!(f, "&{}", v),
                None => f.write_str("nil"),
            },
            Value::Named(n) => write!(f, "{}({})", n.name, n.inner),
        }
    }
}
