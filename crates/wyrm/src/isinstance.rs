use crate::call::Callable;
use crate::error::{RunError, RunResult};
use crate::heap::{Heap, HeapData, HeapId};
use crate::resource::ResourceTracker;
use crate::runtime::Runtime;
use crate::tracer::VmTracer;
use crate::value::Value;

/// Resolves a value used where a class is expected to a class id.
///
/// Classes circulate in three forms: the class object itself, the
/// constructor callable returned by the class factory, and the builtin type
/// tags. Builtins are materialized through the registry on first use.
pub(crate) fn resolve_class_value<T: ResourceTracker, Tr: VmTracer>(
    rt: &mut Runtime<T, Tr>,
    value: Value,
) -> RunResult<HeapId> {
    match value {
        Value::Type(t) => rt.registry.class_id(t, &mut rt.heap, &mut rt.interns),
        Value::Ref(id) => match rt.heap.get(id) {
            HeapData::Class(_) => Ok(id),
            HeapData::Callable(Callable::Constructor(class_id)) => Ok(*class_id),
            _ => Err(not_a_class(&rt.heap, &rt.interns, value)),
        },
        _ => Err(not_a_class(&rt.heap, &rt.interns, value)),
    }
}

fn not_a_class<T: ResourceTracker>(
    heap: &Heap<T>,
    interns: &crate::intern::Interns,
    value: Value,
) -> RunError {
    RunError::type_mismatch(format!(
        "'{name}' object is not a class",
        name = value.type_name(heap, interns),
    ))
}

/// Whether `value` is an instance of `target`.
///
/// A tuple target is the any-of form: the query is the disjunction over its
/// elements. Builtin type targets match primitives by tag; user instances
/// match a class target when it appears in their class's mro.
pub fn isinstance<T: ResourceTracker, Tr: VmTracer>(
    rt: &mut Runtime<T, Tr>,
    value: Value,
    target: Value,
) -> RunResult<bool> {
    if let Value::Ref(id) = target {
        if let HeapData::Tuple(tuple) = rt.heap.get(id) {
            let targets = tuple.items().to_vec();
            for t in targets {
                if isinstance(rt, value, t)? {
                    return Ok(true);
                }
            }
            return Ok(false);
        }
    }

    if let Value::Type(t) = target {
        if let Value::Ref(id) = value {
            if let HeapData::Instance(instance) = rt.heap.get(id) {
                // An instance matches a builtin target only if its class
                // chain reaches that builtin's class object.
                let class_id = instance.class_id();
                return Ok(match rt.registry.existing_class_id(t) {
                    Some(builtin) => rt.heap.class(class_id)?.is_subclass_of(builtin),
                    None => false,
                });
            }
        }
        return Ok(value.value_type(&rt.heap) == t);
    }

    let class_id = resolve_class_value(rt, target)?;
    if let Value::Ref(id) = value {
        if let HeapData::Instance(instance) = rt.heap.get(id) {
            return Ok(rt.heap.class(instance.class_id())?.is_subclass_of(class_id));
        }
    }
    Ok(false)
}

/// Whether `value` is one of the runtime's own data values, as opposed to a
/// callable, generator, or super proxy.
///
/// Immediates and the heap data shapes (lists, tuples, dicts, classes,
/// instances) answer true; the dispatch machinery answers false.
#[must_use]
pub fn is_runtime_value<T: ResourceTracker, Tr: VmTracer>(
    rt: &Runtime<T, Tr>,
    value: Value,
) -> bool {
    match value {
        Value::None | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_)
        | Value::Type(_) => true,
        Value::Ref(id) => matches!(
            rt.heap.get(id),
            HeapData::List(_)
                | HeapData::Tuple(_)
                | HeapData::Dict(_)
                | HeapData::Class(_)
                | HeapData::Instance(_)
        ),
    }
}

/// Whether `candidate` names a class whose mro contains the class named by
/// `target`. Both sides accept the same class forms as [`isinstance`]
/// targets; a tuple target is the any-of form.
pub fn issubclass<T: ResourceTracker, Tr: VmTracer>(
    rt: &mut Runtime<T, Tr>,
    candidate: Value,
    target: Value,
) -> RunResult<bool> {
    if let Value::Ref(id) = target {
        if let HeapData::Tuple(tuple) = rt.heap.get(id) {
            let targets = tuple.items().to_vec();
            for t in targets {
                if issubclass(rt, candidate, t)? {
                    return Ok(true);
                }
            }
            return Ok(false);
        }
    }
    let candidate_id = resolve_class_value(rt, candidate)?;
    let target_id = resolve_class_value(rt, target)?;
    Ok(rt.heap.class(candidate_id)?.is_subclass_of(target_id))
}
