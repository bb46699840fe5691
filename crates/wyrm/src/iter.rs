use crate::call::call_next;
use crate::error::{CallFlow, RunResult};
use crate::machine::MachineContext;
use crate::resource::ResourceTracker;
use crate::runtime::Runtime;
use crate::tracer::VmTracer;
use crate::value::Value;

/// Drives an iterator to exhaustion, feeding every produced value to the
/// consumer in order.
///
/// Exhaustion ends the loop normally; any error from the iterator or the
/// consumer stops the loop immediately and propagates.
pub fn iter_for_each<T, Tr, M, F>(
    rt: &mut Runtime<T, Tr>,
    mach: &mut M,
    iterator: Value,
    mut consumer: F,
) -> RunResult<()>
where
    T: ResourceTracker,
    Tr: VmTracer,
    M: MachineContext<T, Tr>,
    F: FnMut(&mut Runtime<T, Tr>, Value) -> RunResult<()>,
{
    loop {
        match call_next(rt, mach, iterator)? {
            CallFlow::Value(value) => consumer(rt, value)?,
            CallFlow::Exhausted => return Ok(()),
        }
    }
}
