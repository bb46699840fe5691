use serde::{Deserialize, Serialize};

use crate::args::ArgValues;
use crate::call::call_method;
use crate::error::{CallFlow, RunError, RunResult};
use crate::frame::Frame;
use crate::heap::{HeapData, HeapId};
use crate::intern::StaticStrings;
use crate::machine::MachineContext;
use crate::resource::ResourceTracker;
use crate::runtime::Runtime;
use crate::tracer::VmTracer;
use crate::value::Value;

/// A zero-argument `super()` proxy: the current instance paired with the
/// single base class its initializer delegates to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuperProxy {
    /// The instance under construction.
    pub instance: Value,
    /// The one base class.
    pub base: HeapId,
}

/// Builds a `super()` proxy from the calling frame.
///
/// Only the zero-argument form inside an `__init__` of a single-base class
/// is supported; every other shape fails loudly. The receiver is read from
/// the frame's first parameter binding.
pub fn make_super<T: ResourceTracker, Tr: VmTracer>(
    rt: &mut Runtime<T, Tr>,
    frame: &Frame,
    args: &ArgValues,
) -> RunResult<Value> {
    if !args.is_empty() {
        return Err(RunError::not_supported(
            "super() with arguments is not supported, use the zero-argument form",
        ));
    }
    let function = rt.interns.function(frame.function);
    if function.name() != StaticStrings::Init.into() {
        return Err(RunError::not_supported(
            "super() is only supported inside __init__",
        ));
    }
    let Some(receiver_param) = function.signature().first_param() else {
        return Err(RunError::type_mismatch(
            "super() requires a method taking a receiver",
        ));
    };
    let Some(instance) = frame.local(&rt.heap, receiver_param)? else {
        return Err(RunError::type_mismatch(
            "super() could not find the receiver binding",
        ));
    };
    let Value::Ref(instance_id) = instance else {
        return Err(RunError::type_mismatch(
            "super() receiver is not an instance",
        ));
    };
    let class_id = rt.heap.instance(instance_id)?.class_id();
    let class = rt.heap.class(class_id)?;
    let base = match class.bases() {
        [base] => *base,
        [] => {
            let name = rt.interns.get_str(class.name());
            return Err(RunError::not_supported(format!(
                "super(): class {name} has no base class"
            )));
        }
        _ => {
            let name = rt.interns.get_str(class.name());
            return Err(RunError::not_supported(format!(
                "super(): class {name} has multiple bases"
            )));
        }
    };
    let id = rt
        .heap
        .allocate(HeapData::Super(SuperProxy { instance, base }))?;
    Ok(Value::Ref(id))
}

/// Invokes the base class initializer through a `super()` proxy.
pub fn super_init<T: ResourceTracker, Tr: VmTracer, M: MachineContext<T, Tr>>(
    rt: &mut Runtime<T, Tr>,
    mach: &mut M,
    proxy: SuperProxy,
    args: ArgValues,
) -> RunResult<CallFlow> {
    let base = rt.heap.class(proxy.base)?;
    let Some(init) = base.attr(StaticStrings::Init.into()) else {
        let name = rt.interns.get_str(base.name());
        return Err(RunError::type_mismatch(format!(
            "class {name} has no __init__ to delegate to"
        )));
    };
    call_method(rt, mach, proxy.instance, init, args)
}
