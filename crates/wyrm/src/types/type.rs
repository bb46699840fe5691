use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::error::RunResult;
use crate::heap::{Heap, HeapData, HeapId};
use crate::intern::Interns;
use crate::resource::ResourceTracker;
use crate::types::ClassObject;

/// The builtin type lattice.
///
/// Every value classifies into exactly one of these; user-defined classes
/// all classify as `Instance` (their objects) or `Type` (the class itself)
/// and are distinguished by heap identity, not by this tag.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
pub enum Type {
    Type,
    #[strum(serialize = "NoneType")]
    NoneType,
    Bool,
    Int,
    Float,
    Str,
    List,
    Tuple,
    Dict,
    Function,
    Generator,
    Instance,
    Super,
}

/// Lazily materialized class objects for the builtin types.
///
/// `isinstance` against a builtin type and user classes subclassing
/// builtins both need the builtin to exist as a real class object on the
/// heap. The registry allocates each one on first use and memoizes the id,
/// so repeated queries compare against the same identity. There are no
/// ambient globals; the registry lives on the runtime that owns the heap.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    class_ids: AHashMap<Type, HeapId>,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the class object backing a builtin type, allocating it on
    /// first use. Builtin classes have no bases and a single-entry mro.
    pub fn class_id<T: ResourceTracker>(
        &mut self,
        t: Type,
        heap: &mut Heap<T>,
        interns: &mut Interns,
    ) -> RunResult<HeapId> {
        if let Some(id) = self.class_ids.get(&t) {
            return Ok(*id);
        }
        let name = interns.intern(t.into());
        let class = ClassObject::new(name, []);
        let id = heap.allocate(HeapData::Class(class))?;
        heap.class_mut(id)?.set_mro(vec![id]);
        self.class_ids.insert(t, id);
        Ok(id)
    }

    /// The memoized class id for a type, if it has been materialized.
    #[must_use]
    pub fn existing_class_id(&self, t: Type) -> Option<HeapId> {
        self.class_ids.get(&t).copied()
    }
}
