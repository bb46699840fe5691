use std::borrow::Cow;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::heap::{Heap, HeapData, HeapId};
use crate::intern::{Interns, StringId};
use crate::resource::ResourceTracker;
use crate::types::Type;

/// A runtime value.
///
/// Values are small and `Copy`: primitives are carried inline, strings by
/// interner id, and everything composite by heap id. Classification is
/// always by tag; no value ever has to be probed for shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(StringId),
    /// A builtin type used as a value, e.g. as an `isinstance` target.
    Type(Type),
    /// Handle to heap-allocated data: containers, classes, instances,
    /// callables, generators, super proxies.
    Ref(HeapId),
}

// NaN never enters the runtime (coercion rejects it), so the reflexivity
// Eq requires holds for every value we store.
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::None => 0u8.hash(state),
            Self::Bool(b) => (1u8, b).hash(state),
            Self::Int(i) => (2u8, i).hash(state),
            Self::Float(v) => {
                // 0.0 and -0.0 compare equal, so they must hash equal.
                let bits = if *v == 0.0 { 0u64 } else { v.to_bits() };
                (3u8, bits).hash(state);
            }
            Self::Str(id) => (4u8, id).hash(state),
            Self::Type(t) => (5u8, t).hash(state),
            Self::Ref(id) => (6u8, id).hash(state),
        }
    }
}

impl Value {
    /// Classifies this value into the builtin type lattice.
    #[must_use]
    pub fn value_type<T: ResourceTracker>(&self, heap: &Heap<T>) -> Type {
        match self {
            Self::None => Type::NoneType,
            Self::Bool(_) => Type::Bool,
            Self::Int(_) => Type::Int,
            Self::Float(_) => Type::Float,
            Self::Str(_) => Type::Str,
            Self::Type(_) => Type::Type,
            Self::Ref(id) => match heap.get(*id) {
                HeapData::List(_) => Type::List,
                HeapData::Tuple(_) => Type::Tuple,
                HeapData::Dict(_) => Type::Dict,
                HeapData::Class(_) => Type::Type,
                HeapData::Instance(_) => Type::Instance,
                HeapData::Callable(_) => Type::Function,
                HeapData::Generator(_) => Type::Generator,
                HeapData::Super(_) => Type::Super,
            },
        }
    }

    /// The human-readable type label used in diagnostics.
    ///
    /// Host-primitive wrappers keep their historical labels: booleans are
    /// "bool", both numeric kinds are "Native number", strings are "str",
    /// and the none value is "NoneType". Instances and classes report their
    /// class name.
    #[must_use]
    pub fn type_name<'a, T: ResourceTracker>(
        &self,
        heap: &'a Heap<T>,
        interns: &'a Interns,
    ) -> Cow<'a, str> {
        match self {
            Self::None => Cow::Borrowed("NoneType"),
            Self::Bool(_) => Cow::Borrowed("bool"),
            Self::Int(_) | Self::Float(_) => Cow::Borrowed("Native number"),
            Self::Str(_) => Cow::Borrowed("str"),
            Self::Type(_) => Cow::Borrowed("type"),
            Self::Ref(id) => match heap.get(*id) {
                HeapData::List(_) => Cow::Borrowed("list"),
                HeapData::Tuple(_) => Cow::Borrowed("tuple"),
                HeapData::Dict(_) => Cow::Borrowed("dict"),
                HeapData::Class(class) => Cow::Borrowed(interns.get_str(class.name())),
                HeapData::Instance(instance) => {
                    let class = match heap.get(instance.class_id()) {
                        HeapData::Class(class) => class,
                        other => unreachable!("instance of non-class {}", other.variant_name()),
                    };
                    Cow::Borrowed(interns.get_str(class.name()))
                }
                HeapData::Callable(_) => Cow::Borrowed("function"),
                HeapData::Generator(_) => Cow::Borrowed("generator"),
                HeapData::Super(_) => Cow::Borrowed("super"),
            },
        }
    }

    /// Whether this value is the none singleton.
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}
