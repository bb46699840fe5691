use serde::{Deserialize, Serialize};

use crate::error::{RunError, RunResult};
use crate::heap::{HeapData, HeapId};
use crate::resource::{MAX_DATA_RECURSION_DEPTH, ResourceError, ResourceTracker};
use crate::runtime::Runtime;
use crate::tracer::VmTracer;
use crate::types::{Dict, List};
use crate::value::Value;

/// A host-side value at the coercion boundary.
///
/// This is the only type host data enters or leaves the runtime as. It is
/// deliberately JSON-shaped; anything the runtime cannot hand back
/// faithfully (classes, callables, generators) crosses outward as a `Repr`
/// and refuses to cross back in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Object {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Object>),
    Dict(Vec<(Object, Object)>),
    /// A display-only stand-in for a value with no host representation.
    Repr(String),
}

impl From<serde_json::Value> for Object {
    #[expect(clippy::cast_possible_truncation)]
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::None,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else {
                    // Integral floats in exact-integer range collapse to
                    // Int, mirroring a host with a single number type.
                    let f = n.as_f64().unwrap_or(f64::MAX);
                    if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
                        Self::Int(f as i64)
                    } else {
                        Self::Float(f)
                    }
                }
            }
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            serde_json::Value::Object(map) => Self::Dict(
                map.into_iter()
                    .map(|(k, v)| (Self::String(k), Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Object {
    /// Coerces this host value into a runtime value, allocating composite
    /// data on the heap.
    ///
    /// Nesting is bounded by [`MAX_DATA_RECURSION_DEPTH`]; `Repr` values
    /// and NaN floats are refused with `UnsupportedType`.
    pub fn to_value<T: ResourceTracker, Tr: VmTracer>(
        &self,
        rt: &mut Runtime<T, Tr>,
    ) -> RunResult<Value> {
        self.to_value_at(rt, 0)
    }

    fn to_value_at<T: ResourceTracker, Tr: VmTracer>(
        &self,
        rt: &mut Runtime<T, Tr>,
        depth: usize,
    ) -> RunResult<Value> {
        if depth > MAX_DATA_RECURSION_DEPTH {
            return Err(ResourceError::Recursion {
                limit: MAX_DATA_RECURSION_DEPTH,
                depth,
            }
            .into());
        }
        match self {
            Self::None => Ok(Value::None),
            Self::Bool(b) => Ok(Value::Bool(*b)),
            Self::Int(i) => Ok(Value::Int(*i)),
            Self::Float(f) if f.is_nan() => Err(RunError::unsupported_type(
                "NaN has no runtime representation",
            )),
            Self::Float(f) => Ok(Value::Float(*f)),
            Self::String(s) => Ok(Value::Str(rt.interns.intern(s))),
            Self::List(items) => {
                let values = items
                    .iter()
                    .map(|item| item.to_value_at(rt, depth + 1))
                    .collect::<RunResult<Vec<_>>>()?;
                let id = rt.heap.allocate(HeapData::List(List::new(values)))?;
                Ok(Value::Ref(id))
            }
            Self::Dict(pairs) => {
                let mut dict = Dict::new();
                for (key, value) in pairs {
                    let key = key.to_value_at(rt, depth + 1)?;
                    let value = value.to_value_at(rt, depth + 1)?;
                    dict.insert(key, value);
                }
                let id = rt.heap.allocate(HeapData::Dict(dict))?;
                Ok(Value::Ref(id))
            }
            Self::Repr(_) => Err(RunError::unsupported_type(
                "cannot coerce a host repr value back into the runtime",
            )),
        }
    }

    /// Converts a runtime value back into a host value.
    ///
    /// Values with no host shape become `Repr`; nesting beyond the data
    /// recursion limit is elided as `Repr("...")`.
    #[must_use]
    pub fn from_value<T: ResourceTracker, Tr: VmTracer>(
        value: &Value,
        rt: &Runtime<T, Tr>,
    ) -> Self {
        Self::from_value_at(value, rt, 0)
    }

    fn from_value_at<T: ResourceTracker, Tr: VmTracer>(
        value: &Value,
        rt: &Runtime<T, Tr>,
        depth: usize,
    ) -> Self {
        if depth > MAX_DATA_RECURSION_DEPTH {
            return Self::Repr("...".to_owned());
        }
        match value {
            Value::None => Self::None,
            Value::Bool(b) => Self::Bool(*b),
            Value::Int(i) => Self::Int(*i),
            Value::Float(f) => Self::Float(*f),
            Value::Str(id) => Self::String(rt.interns.get_str(*id).to_owned()),
            Value::Type(t) => Self::Repr(format!("<class '{t}'>")),
            Value::Ref(id) => Self::from_heap(*id, rt, depth),
        }
    }

    fn from_heap<T: ResourceTracker, Tr: VmTracer>(
        id: HeapId,
        rt: &Runtime<T, Tr>,
        depth: usize,
    ) -> Self {
        match rt.heap.get(id) {
            HeapData::List(list) => Self::List(
                list.items()
                    .iter()
                    .map(|v| Self::from_value_at(v, rt, depth + 1))
                    .collect(),
            ),
            HeapData::Tuple(tuple) => Self::List(
                tuple
                    .items()
                    .iter()
                    .map(|v| Self::from_value_at(v, rt, depth + 1))
                    .collect(),
            ),
            HeapData::Dict(dict) => Self::Dict(
                dict.iter()
                    .map(|(k, v)| {
                        (
                            Self::from_value_at(&k, rt, depth + 1),
                            Self::from_value_at(&v, rt, depth + 1),
                        )
                    })
                    .collect(),
            ),
            HeapData::Class(class) => {
                Self::Repr(format!("<class '{}'>", rt.interns.get_str(class.name())))
            }
            HeapData::Instance(_) | HeapData::Callable(_) | HeapData::Generator(_)
            | HeapData::Super(_) => {
                let value = Value::Ref(id);
                Self::Repr(format!("<{} object>", value.type_name(&rt.heap, &rt.interns)))
            }
        }
    }
}

/// Coerces host-native (JSON-shaped) data into a runtime value.
///
/// The convenience composition of [`Object::from`] and [`Object::to_value`].
pub fn coerce_from_host<T: ResourceTracker, Tr: VmTracer>(
    rt: &mut Runtime<T, Tr>,
    host: serde_json::Value,
) -> RunResult<Value> {
    Object::from(host).to_value(rt)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;

    /// A mixed host array coerces elementwise, order preserved.
    #[test]
    fn mixed_array_coerces_in_order() {
        let mut rt = Runtime::new();
        let value = coerce_from_host(&mut rt, json!([1, 2.5, "x", true])).unwrap();
        let Value::Ref(id) = value else {
            panic!("expected a heap value, got {value:?}")
        };
        let HeapData::List(list) = rt.heap.get(id) else {
            panic!("expected a list")
        };
        let x = Value::Str(rt.interns.intern("x"));
        assert_eq!(
            list.items(),
            [Value::Int(1), Value::Float(2.5), x, Value::Bool(true)]
        );
    }

    /// Integral floats collapse to Int at the boundary.
    #[test]
    fn integral_float_collapses_to_int() {
        assert_eq!(Object::from(json!(3.0)), Object::Int(3));
        assert_eq!(Object::from(json!(2.5)), Object::Float(2.5));
    }

    /// Converting out and back in again reproduces the same runtime data.
    #[test]
    fn round_trip_is_stable() {
        let mut rt = Runtime::new();
        let first = coerce_from_host(&mut rt, json!({"a": [1, "two"], "b": null})).unwrap();
        let out = Object::from_value(&first, &rt);
        let second = out.to_value(&mut rt).unwrap();
        assert_eq!(Object::from_value(&second, &rt), out);
    }

    /// Repr values refuse to cross back into the runtime.
    #[test]
    fn repr_does_not_coerce_inward() {
        let mut rt = Runtime::new();
        let err = Object::Repr("<Dog object>".to_owned()).to_value(&mut rt).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedType);
    }

    /// Nesting beyond the data recursion limit fails cleanly.
    #[test]
    fn deep_nesting_is_bounded() {
        let mut rt = Runtime::new();
        let mut nested = json!(1);
        for _ in 0..=MAX_DATA_RECURSION_DEPTH {
            nested = json!([nested]);
        }
        let err = coerce_from_host(&mut rt, nested).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotSupported);
        assert!(err.message().contains("recursion"));
    }
}
