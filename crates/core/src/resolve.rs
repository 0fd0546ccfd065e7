//! Indirection resolver: strips reference and named layers off a value.

#![forbid(unsafe_code)]

use crate::value::Value;

/// Outcome of resolving a value's indirection chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolved<'a> {
    /// Concrete value reached after stripping `layers` wrappers.
    Concrete { value: &'a Value, layers: usize },
    /// A nil reference was hit after stripping `layers` wrappers.
    Absent { layers: usize },
}

impl<'a> Resolved<'a> {
    pub fn value(self) -> Option<&'a Value> {
        match self {
            Resolved::Concrete { value, .. } => Some(value),
            Resolved::Absent { .. } => None,
        }
    }

    pub fn is_absent(self) -> bool { matches!(self, Resolved::Absent { .. }) }
}

/// Resolve `input` to its concrete value or to absent.
///
/// Values own their pointees, so every chain is finite and the loop always ends.
pub fn resolve(input: &Value) -> Resolved<'_> {
    let mut cur = input;
    let mut layers = 0usize;
    loop {
        match cur {
            Value::Ref(r) => match r.value.as_deref() {
                Some(next) => {
                    cur = next;
                    layers += 1;
                }
                None => return Resolved::Absent { layers },
            },
            Value::Named(n) => {
                cur = &n.inner;
                layers += 1;
            }
            _ => return Resolved::Concrete { value: cur, layers },
        }
    }
}
