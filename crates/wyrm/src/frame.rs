use serde::{Deserialize, Serialize};

use crate::error::RunResult;
use crate::heap::{Heap, HeapData, HeapId};
use crate::intern::{FunctionId, StringId};
use crate::resource::ResourceTracker;
use crate::types::Dict;
use crate::value::Value;

/// An execution frame: a code object plus its name bindings and resume
/// point.
///
/// Frames are plain data. This crate never executes them; it builds them,
/// hands them to the machine, and (for generators) stores them suspended on
/// the heap. `lasti` is the machine's resume cursor and is opaque here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// The code object this frame executes.
    pub function: FunctionId,
    /// Local bindings, a heap dict.
    pub locals: HeapId,
    /// Module-level bindings, a heap dict.
    pub globals: HeapId,
    /// The owning generator, when this frame belongs to one.
    pub generator: Option<HeapId>,
    /// The machine's resume cursor.
    pub lasti: usize,
}

/// Everything needed to build a frame.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    pub function: FunctionId,
    pub globals: HeapId,
    /// Bound arguments, inserted into the locals dict.
    pub callargs: Vec<(StringId, Value)>,
    /// An existing dict to use as locals. Class bodies pass their namespace
    /// here; plain calls leave it `None` and get a fresh dict.
    pub locals: Option<HeapId>,
}

impl Frame {
    /// Builds a frame, allocating a locals dict if the config does not
    /// supply one.
    pub fn from_config<T: ResourceTracker>(
        heap: &mut Heap<T>,
        config: FrameConfig,
    ) -> RunResult<Self> {
        let locals = match config.locals {
            Some(id) => id,
            None => heap.allocate(HeapData::Dict(Dict::new()))?,
        };
        let dict = heap.dict_mut(locals)?;
        for (name, value) in config.callargs {
            dict.insert_str(name, value);
        }
        Ok(Self {
            function: config.function,
            locals,
            globals: config.globals,
            generator: None,
            lasti: 0,
        })
    }

    /// Reads a local binding.
    pub fn local<T: ResourceTracker>(
        &self,
        heap: &Heap<T>,
        name: StringId,
    ) -> RunResult<Option<Value>> {
        Ok(heap.dict(self.locals)?.get_str(name))
    }
}
