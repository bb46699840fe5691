use crate::args::ArgValues;
use crate::error::{CallFlow, RunError, RunResult};
use crate::heap::{Heap, HeapStats};
use crate::intern::{ExtFunctionId, Interns};
use crate::resource::{NoLimitTracker, ResourceTracker};
use crate::tracer::{NoopTracer, VmTracer};
use crate::types::TypeRegistry;

/// A host-registered native function.
///
/// Natives receive the runtime and the call arguments; they participate in
/// the uniform dispatch path like any other callable.
pub type NativeFn<T, Tr> = fn(&mut Runtime<T, Tr>, ArgValues) -> RunResult<CallFlow>;

/// The shared state every operation in this crate threads through: heap,
/// interner, builtin-type registry, tracer, and the native function table.
///
/// There are no ambient globals; two runtimes never share state.
#[derive(Debug)]
pub struct Runtime<T: ResourceTracker = NoLimitTracker, Tr: VmTracer = NoopTracer> {
    pub heap: Heap<T>,
    pub interns: Interns,
    pub registry: TypeRegistry,
    pub tracer: Tr,
    natives: Vec<NativeFn<T, Tr>>,
    call_depth: usize,
}

impl Runtime {
    /// Creates an unbounded, untraced runtime.
    #[must_use]
    pub fn new() -> Self {
        Self::with_parts(NoLimitTracker, NoopTracer)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ResourceTracker, Tr: VmTracer> Runtime<T, Tr> {
    /// Creates a runtime with the given resource tracker and tracer.
    #[must_use]
    pub fn with_parts(tracker: T, tracer: Tr) -> Self {
        Self {
            heap: Heap::new(64, tracker),
            interns: Interns::new(),
            registry: TypeRegistry::new(),
            tracer,
            natives: Vec::new(),
            call_depth: 0,
        }
    }

    /// Registers a native function, returning the id callables refer to it
    /// by.
    pub fn register_native(&mut self, f: NativeFn<T, Tr>) -> ExtFunctionId {
        let id = ExtFunctionId(u32::try_from(self.natives.len()).expect("native table overflow"));
        self.natives.push(f);
        id
    }

    /// Returns a registered native function.
    pub fn native(&self, id: ExtFunctionId) -> RunResult<NativeFn<T, Tr>> {
        self.natives
            .get(id.0 as usize)
            .copied()
            .ok_or_else(|| RunError::type_mismatch("unknown native function"))
    }

    /// Enters a call: bumps the depth, checks it against the tracker, and
    /// notifies the tracer. Paired with [`exit_call`](Self::exit_call).
    pub(crate) fn enter_call(&mut self, name: Option<&str>) -> RunResult<()> {
        self.call_depth += 1;
        if let Err(err) = self.heap.check_depth(self.call_depth) {
            self.call_depth -= 1;
            return Err(err);
        }
        self.tracer.on_call(name, self.call_depth);
        Ok(())
    }

    pub(crate) fn exit_call(&mut self) {
        self.tracer.on_return(self.call_depth);
        self.call_depth = self.call_depth.saturating_sub(1);
    }

    /// The current call nesting depth.
    #[must_use]
    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    /// Summarizes heap occupancy for host diagnostics.
    #[must_use]
    pub fn heap_stats(&self) -> HeapStats {
        self.heap.stats(&self.interns)
    }
}
