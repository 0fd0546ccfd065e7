//! Shape descriptors: the closed universe of declared types the engine understands.

#![forbid(unsafe_code)]

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::{MapValue, NamedValue, RefValue, SeqValue, StructValue, Value};

/// Coarse classification of a shape, used for dispatch and error reporting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Text,
    Bool,
    Int32,
    Int64,
    Float32,
    Float64,
    Struct,
    Seq,
    Map,
    Ref,
}

impl ShapeKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ShapeKind::Int32 | ShapeKind::Int64 | ShapeKind::Float32 | ShapeKind::Float64)
    }

    pub fn is_scalar(self) -> bool {
        self.is_numeric() || matches!(self, ShapeKind::Text | ShapeKind::Bool)
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ShapeKind::Text => "text",
            ShapeKind::Bool => "bool",
            ShapeKind::Int32 => "int32",
            ShapeKind::Int64 => "int64",
            ShapeKind::Float32 => "float32",
            ShapeKind::Float64 => "float64",
            ShapeKind::Struct => "struct",
            ShapeKind::Seq => "sequence",
            ShapeKind::Map => "map",
            ShapeKind::Ref => "reference",
        };
        f.write_str(s)
    }
}

/// Declared type of a value, or the requested type of a conversion.
///
/// `Named` is a distinct declared type over some underlying shape (a retyped
/// scalar, struct, sequence or map). Conversion looks through it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Text,
    Bool,
    Int32,
    Int64,
    Float32,
    Float64,
    Struct(StructShape),
    Seq(Box<Shape>),
    Map { key: Box<Shape>, value: Box<Shape> },
    Ref(Box<Shape>),
    Named { name: String, underlying: Box<Shape> },
}

/// Struct layout; field order is part of the layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct StructShape {
    pub name: String,
    pub fields: Vec<FieldShape>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FieldShape {
    pub name: String,
    pub shape: Shape,
}

impl StructShape {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), fields: Vec::new() }
    }

    /// Builder-style field append.
    pub fn field(mut self, name: impl Into<String>, shape: Shape) -> Self {
        self.fields.push(FieldShape { name: name.into(), shape });
        self
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

impl Shape {
    pub fn seq(elem: Shape) -> Self { Shape::Seq(Box::new(elem)) }

    pub fn map(key: Shape, value: Shape) -> Self {
        Shape::Map { key: Box::new(key), value: Box::new(value) }
    }

    pub fn reference(pointee: Shape) -> Self { Shape::Ref(Box::new(pointee)) }

    pub fn named(name: impl Into<String>, underlying: Shape) -> Self {
        Shape::Named { name: name.into(), underlying: Box::new(underlying) }
    }

    /// Kind of the shape; named shapes report their underlying kind.
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Text => ShapeKind::Text,
            Shape::Bool => ShapeKind::Bool,
            Shape::Int32 => ShapeKind::Int32,
            Shape::Int64 => ShapeKind::Int64,
            Shape::Float32 => ShapeKind::Float32,
            Shape::Float64 => ShapeKind::Float64,
            Shape::Struct(_) => ShapeKind::Struct,
            Shape::Seq(_) => ShapeKind::Seq,
            Shape::Map { .. } => ShapeKind::Map,
            Shape::Ref(_) => ShapeKind::Ref,
            Shape::Named { underlying, .. } => underlying.kind(),
        }
    }

    /// Strip named layers only.
    pub fn underlying(&self) -> &Shape {
        let mut cur = self;
        while let Shape::Named { underlying, .. } = cur {
            cur = underlying;
        }
        cur
    }

    /// Strip named and reference layers.
    pub fn concrete(&self) -> &Shape {
        let mut cur = self;
        loop {
            match cur {
                Shape::Named { underlying, .. } => cur = underlying,
                Shape::Ref(pointee) => cur = pointee,
                _ => return cur,
            }
        }
    }

    /// The value a conversion yields when its input resolves to absent.
    pub fn zero_value(&self) -> Value {
        match self {
            Shape::Text => Value::Text(String::new()),
            Shape::Bool => Value::Bool(false),
            Shape::Int32 => Value::Int32(0),
            Shape::Int64 => Value::Int64(0),
            Shape::Float32 => Value::Float32(0.0),
            Shape::Float64 => Value::Float64(0.0),
            Shape::Struct(s) => Value::Struct(StructValue {
                fields: s.fields.iter().map(|f| f.shape.zero_value()).collect(),
                shape: s.clone(),
            }),
            Shape::Seq(elem) => Value::Seq(SeqValue { elem: (**elem).clone(), items: Vec::new() }),
            Shape::Map { key, value } => Value::Map(MapValue::new((**key).clone(), (**value).clone())),
            Shape::Ref(pointee) => Value::Ref(RefValue { target: (**pointee).clone(), value: None }),
            Shape::Named { name, underlying } => Value::Named(NamedValue {
                name: name.clone(),
                inner: Box::new(underlying.zero_value()),
            }),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Struct(s) => write!(f, "{}", s.name),
            Shape::Seq(elem) => write!(f, "[]{}", elem),
            Shape::Map { key, value } => write!(f, "map[{}]{}", key, value),
            Shape::Ref(pointee) => write!(f, "*{}", pointee),
            Shape::Named { name, .. } => f.write_str(name),
            scalar => write!(f, "{}", scalar.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point() -> StructShape {
        StructShape::new("Point").field("x", Shape::Int32).field("label", Shape::reference(Shape::Text))
    }

    #[test]
    fn named_reports_underlying_kind() {
        let s = Shape::named("Names", Shape::seq(Shape::Text));
        assert_eq!(s.kind(), ShapeKind::Seq);
        assert_eq!(s.underlying(), &Shape::seq(Shape::Text));
    }

    #[test]
    fn concrete_strips_refs_and_names() {
        let s = Shape::reference(Shape::named("X", Shape::reference(Shape::Bool)));
        assert_eq!(s.concrete(), &Shape::Bool);
        // underlying() leaves the reference alone
        assert_eq!(s.underlying().kind(), ShapeKind::Ref);
    }

    #[test]
    fn struct_zero_value_zeroes_each_field() {
        let z = Shape::Struct(point()).zero_value();
        match z {
            Value::Struct(sv) => {
                assert_eq!(sv.fields[0], Value::Int32(0));
                assert_eq!(sv.fields[1], Value::nil(Shape::Text));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn zero_collections_are_empty_not_absent() {
        match Shape::seq(Shape::Text).zero_value() {
            Value::Seq(s) => assert!(s.items.is_empty()),
            other => panic!("unexpected {other:?}"),
        }
        match Shape::map(Shape::Text, Shape::Int64).zero_value() {
            Value::Map(m) => assert!(m.is_empty()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn display_is_go_like() {
        let s = Shape::map(Shape::Text, Shape::seq(Shape::reference(Shape::Struct(point()))));
        assert_eq!(s.to_string(), "map[text][]*Point");
    }

    #[test]
    fn shape_tokens_serialize_snake_case() {
        let json = serde_json::to_value(Shape::seq(Shape::Float64)).unwrap();
        assert_eq!(json, serde_json::json!({ "seq": "float64" }));
        let back: Shape = serde_json::from_value(serde_json::json!({ "named": { "name": "x", "underlying": "text" } })).unwrap();
        assert_eq!(back, Shape::named("x", Shape::Text));
    }
}
