use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::call::Callable;
use crate::error::{RunError, RunResult};
use crate::intern::Interns;
use crate::resource::ResourceTracker;
use crate::types::{ClassObject, Dict, Generator, Instance, List, Tuple};

/// Handle to a heap slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeapId(u32);

/// Data stored in a heap slot.
#[derive(Debug, Clone, IntoStaticStr, Serialize, Deserialize)]
pub enum HeapData {
    List(List),
    Tuple(Tuple),
    Dict(Dict),
    Class(ClassObject),
    Instance(Instance),
    Callable(Callable),
    Generator(Generator),
    Super(crate::super_proxy::SuperProxy),
}

impl HeapData {
    /// The variant name, for diagnostics and heap statistics.
    #[must_use]
    pub fn variant_name(&self) -> &'static str {
        self.into()
    }
}

/// The slot arena for composite runtime data.
///
/// Slots live until the runtime is dropped; there is no refcounting or
/// collection. Allocation consults the resource tracker, so bounded
/// embeddings fail cleanly when the budget runs out.
#[derive(Debug)]
pub struct Heap<T: ResourceTracker> {
    slots: Vec<HeapData>,
    tracker: T,
}

impl<T: ResourceTracker> Heap<T> {
    #[must_use]
    pub fn new(capacity: usize, tracker: T) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            tracker,
        }
    }

    /// Allocates a slot, charging the resource tracker.
    pub fn allocate(&mut self, data: HeapData) -> RunResult<HeapId> {
        self.tracker.on_allocate()?;
        let id = HeapId(u32::try_from(self.slots.len()).expect("heap overflow"));
        self.slots.push(data);
        Ok(id)
    }

    /// Returns a slot's data.
    ///
    /// # Panics
    /// Panics if the id did not come from this heap.
    #[must_use]
    pub fn get(&self, id: HeapId) -> &HeapData {
        &self.slots[id.0 as usize]
    }

    /// Returns a slot's data mutably.
    ///
    /// # Panics
    /// Panics if the id did not come from this heap.
    #[must_use]
    pub fn get_mut(&mut self, id: HeapId) -> &mut HeapData {
        &mut self.slots[id.0 as usize]
    }

    /// Checks a nesting depth against the tracker's limit.
    pub fn check_depth(&self, depth: usize) -> RunResult<()> {
        self.tracker.check_depth(depth)?;
        Ok(())
    }

    /// The tracker's allocation count, if it keeps one.
    #[must_use]
    pub fn allocations(&self) -> Option<usize> {
        self.tracker.allocations()
    }

    pub fn class(&self, id: HeapId) -> RunResult<&ClassObject> {
        match self.get(id) {
            HeapData::Class(class) => Ok(class),
            other => Err(expected(id, "class", other)),
        }
    }

    pub fn class_mut(&mut self, id: HeapId) -> RunResult<&mut ClassObject> {
        match self.get_mut(id) {
            HeapData::Class(class) => Ok(class),
            other => Err(expected(id, "class", other)),
        }
    }

    pub fn dict(&self, id: HeapId) -> RunResult<&Dict> {
        match self.get(id) {
            HeapData::Dict(dict) => Ok(dict),
            other => Err(expected(id, "dict", other)),
        }
    }

    pub fn dict_mut(&mut self, id: HeapId) -> RunResult<&mut Dict> {
        match self.get_mut(id) {
            HeapData::Dict(dict) => Ok(dict),
            other => Err(expected(id, "dict", other)),
        }
    }

    pub fn instance(&self, id: HeapId) -> RunResult<&Instance> {
        match self.get(id) {
            HeapData::Instance(instance) => Ok(instance),
            other => Err(expected(id, "instance", other)),
        }
    }

    pub fn instance_mut(&mut self, id: HeapId) -> RunResult<&mut Instance> {
        match self.get_mut(id) {
            HeapData::Instance(instance) => Ok(instance),
            other => Err(expected(id, "instance", other)),
        }
    }

    pub fn generator_mut(&mut self, id: HeapId) -> RunResult<&mut Generator> {
        match self.get_mut(id) {
            HeapData::Generator(generator) => Ok(generator),
            other => Err(expected(id, "generator", other)),
        }
    }

    pub fn super_proxy(&self, id: HeapId) -> RunResult<crate::super_proxy::SuperProxy> {
        match self.get(id) {
            HeapData::Super(proxy) => Ok(*proxy),
            other => Err(expected(id, "super", other)),
        }
    }

    /// Summarizes the heap for host diagnostics.
    #[must_use]
    pub fn stats(&self, interns: &Interns) -> HeapStats {
        let mut objects_by_type = BTreeMap::new();
        for slot in &self.slots {
            *objects_by_type.entry(slot.variant_name()).or_insert(0) += 1;
        }
        HeapStats {
            live_objects: self.slots.len(),
            objects_by_type,
            interned_strings: interns.dynamic_count(),
        }
    }
}

/// A point-in-time summary of heap occupancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeapStats {
    /// Total allocated slots.
    pub live_objects: usize,
    /// Slot counts keyed by data kind.
    pub objects_by_type: BTreeMap<&'static str, usize>,
    /// Dynamically interned strings.
    pub interned_strings: usize,
}

fn expected(id: HeapId, expected: &str, found: &HeapData) -> RunError {
    RunError::type_mismatch(format!(
        "heap slot {id}: expected {expected}, found {found}",
        id = id.0,
        found = found.variant_name(),
    ))
}
