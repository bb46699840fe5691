use serde::{Deserialize, Serialize};

use crate::args::ArgValues;
use crate::error::{CallFlow, RunError, RunResult};
use crate::frame::FrameConfig;
use crate::heap::{Heap, HeapData, HeapId};
use crate::intern::{ExtFunctionId, FunctionId, Interns, StaticStrings};
use crate::machine::{FrameFlow, MachineContext};
use crate::resource::ResourceTracker;
use crate::runtime::Runtime;
use crate::tracer::VmTracer;
use crate::types::{Generator, GeneratorState, Instance};
use crate::value::Value;

/// An interpreted code object paired with the globals it closed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpretedFn {
    pub function: FunctionId,
    pub globals: HeapId,
}

/// Every callable shape, classified once at construction.
///
/// Dispatch is a match over this tag; nothing is ever probed for shape at
/// call time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Callable {
    /// A host-registered function.
    Native(ExtFunctionId),
    /// An interpreted function with no receiver.
    Interpreted(InterpretedFn),
    /// A method already paired with its receiver. `owner` is the declaring
    /// class when known; receivers are checked against it by `isinstance`.
    Bound {
        receiver: Value,
        function: InterpretedFn,
        owner: Option<HeapId>,
    },
    /// A method fetched off a class, not yet paired with a receiver. The
    /// first positional argument must be an instance of exactly `owner`.
    Unbound {
        function: InterpretedFn,
        owner: HeapId,
    },
    /// A class used as a callable: invocation allocates an instance and
    /// runs `__init__` on it.
    Constructor(HeapId),
    /// A suspended generator: invocation resumes it one step.
    GeneratorHandle(HeapId),
}

/// The caller-side context of an invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CallContext {
    /// The machine itself is calling, e.g. a plain function call site.
    Machine,
    /// A plain object is calling, i.e. a method fetched off this value is
    /// being invoked. Interpreted callables are lazily bound to it.
    Object(Value),
}

/// Wraps an interpreted code object into a callable value.
pub fn make_callable<T: ResourceTracker, Tr: VmTracer>(
    rt: &mut Runtime<T, Tr>,
    function: FunctionId,
    globals: HeapId,
) -> RunResult<Value> {
    let id = rt.heap.allocate(HeapData::Callable(Callable::Interpreted(InterpretedFn {
        function,
        globals,
    })))?;
    Ok(Value::Ref(id))
}

/// Pairs a method with its receiver, producing a bound-method value.
pub fn bind_method<T: ResourceTracker, Tr: VmTracer>(
    rt: &mut Runtime<T, Tr>,
    receiver: Value,
    function: InterpretedFn,
    owner: Option<HeapId>,
) -> RunResult<Value> {
    let id = rt.heap.allocate(HeapData::Callable(Callable::Bound {
        receiver,
        function,
        owner,
    }))?;
    Ok(Value::Ref(id))
}

/// Produces an unbound-method value for a method fetched off its class.
pub fn unbound_method<T: ResourceTracker, Tr: VmTracer>(
    rt: &mut Runtime<T, Tr>,
    function: InterpretedFn,
    owner: HeapId,
) -> RunResult<Value> {
    let id = rt
        .heap
        .allocate(HeapData::Callable(Callable::Unbound { function, owner }))?;
    Ok(Value::Ref(id))
}

/// Classifies a value as a callable.
///
/// Classes dispatch as their constructor and generators as a resume handle;
/// anything else that is not a callable slot fails with `TypeMismatch`.
pub fn resolve_callable<T: ResourceTracker>(
    heap: &Heap<T>,
    interns: &Interns,
    value: Value,
) -> RunResult<Callable> {
    if let Value::Ref(id) = value {
        match heap.get(id) {
            HeapData::Callable(callable) => return Ok(*callable),
            HeapData::Class(_) => return Ok(Callable::Constructor(id)),
            HeapData::Generator(_) => return Ok(Callable::GeneratorHandle(id)),
            _ => {}
        }
    }
    Err(RunError::type_mismatch(format!(
        "'{name}' object is not callable",
        name = value.type_name(heap, interns),
    )))
}

/// The uniform invocation entry point.
///
/// Resolves the callable tag, lazily binds an interpreted function to an
/// object context, and dispatches. The result passes through unmodified; in
/// particular [`CallFlow::Exhausted`] from a generator is not an error here.
pub fn run_callable<T: ResourceTracker, Tr: VmTracer, M: MachineContext<T, Tr>>(
    rt: &mut Runtime<T, Tr>,
    mach: &mut M,
    context: CallContext,
    callable: Value,
    args: ArgValues,
) -> RunResult<CallFlow> {
    let mut resolved = resolve_callable(&rt.heap, &rt.interns, callable)?;
    // Mirror what attribute access performs at method-fetch time: a bare
    // interpreted function invoked through an object context becomes a
    // bound method.
    if let (CallContext::Object(receiver), Callable::Interpreted(function)) = (context, resolved) {
        resolved = Callable::Bound {
            receiver,
            function,
            owner: None,
        };
    }
    dispatch(rt, mach, resolved, args)
}

pub(crate) fn dispatch<T: ResourceTracker, Tr: VmTracer, M: MachineContext<T, Tr>>(
    rt: &mut Runtime<T, Tr>,
    mach: &mut M,
    callable: Callable,
    args: ArgValues,
) -> RunResult<CallFlow> {
    match callable {
        Callable::Native(id) => {
            let f = rt.native(id)?;
            rt.enter_call(None)?;
            let result = f(rt, args);
            rt.exit_call();
            result
        }
        Callable::Interpreted(function) => invoke_interpreted(rt, mach, function, args, None),
        Callable::Bound {
            receiver,
            function,
            owner,
        } => {
            if let Some(owner) = owner {
                check_receiver(rt, receiver, function.function, owner, false)?;
            }
            invoke_interpreted(rt, mach, function, args.with_receiver(receiver), None)
        }
        Callable::Unbound { function, owner } => {
            let Some(receiver) = args.first_positional() else {
                let name = rt.interns.get_str(rt.interns.function(function.function).name());
                return Err(RunError::type_mismatch(format!(
                    "{name}() missing required receiver argument"
                )));
            };
            check_receiver(rt, receiver, function.function, owner, true)?;
            invoke_interpreted(rt, mach, function, args, None)
        }
        Callable::Constructor(class_id) => instantiate(rt, mach, class_id, args),
        Callable::GeneratorHandle(generator_id) => resume_generator(rt, mach, generator_id),
    }
}

/// Verifies a method receiver against the method's declared owner class.
///
/// Unbound methods demand the exact class; bound methods accept any
/// instance of it.
fn check_receiver<T: ResourceTracker, Tr: VmTracer>(
    rt: &Runtime<T, Tr>,
    receiver: Value,
    method: FunctionId,
    owner: HeapId,
    exact: bool,
) -> RunResult<()> {
    let matches = match receiver {
        Value::Ref(id) => match rt.heap.get(id) {
            HeapData::Instance(instance) => {
                if exact {
                    instance.class_id() == owner
                } else {
                    rt.heap.class(instance.class_id())?.is_subclass_of(owner)
                }
            }
            _ => false,
        },
        _ => false,
    };
    if matches {
        return Ok(());
    }
    let method_name = rt.interns.get_str(rt.interns.function(method).name());
    let expected = rt.interns.get_str(rt.heap.class(owner)?.name());
    let actual = receiver.type_name(&rt.heap, &rt.interns);
    Err(RunError::receiver_mismatch(method_name, expected, &actual))
}

/// Binds arguments, builds a frame, and either runs it or suspends it as a
/// generator.
///
/// `locals` overrides the frame's locals dict; the class factory passes the
/// class namespace here.
pub(crate) fn invoke_interpreted<T: ResourceTracker, Tr: VmTracer, M: MachineContext<T, Tr>>(
    rt: &mut Runtime<T, Tr>,
    mach: &mut M,
    f: InterpretedFn,
    args: ArgValues,
    locals: Option<HeapId>,
) -> RunResult<CallFlow> {
    let function = rt.interns.function(f.function).clone();
    let name = rt.interns.get_str(function.name()).to_owned();
    let callargs = function.signature().bind(&name, args, &rt.interns)?;
    let config = FrameConfig {
        function: f.function,
        globals: f.globals,
        callargs,
        locals,
    };
    let frame = mach.make_frame(&mut rt.heap, config)?;

    if function.is_generator() {
        // A generator call never runs the body; it returns a handle over
        // the suspended frame.
        let generator_id = rt
            .heap
            .allocate(HeapData::Generator(Generator::new(frame)))?;
        rt.heap.generator_mut(generator_id)?.set_backlink(generator_id);
        return Ok(CallFlow::Value(Value::Ref(generator_id)));
    }

    rt.enter_call(Some(&name))?;
    let result = mach.run_frame(rt, frame);
    rt.exit_call();
    result
}

/// Allocates an instance of a class and runs its initializer, if any.
fn instantiate<T: ResourceTracker, Tr: VmTracer, M: MachineContext<T, Tr>>(
    rt: &mut Runtime<T, Tr>,
    mach: &mut M,
    class_id: HeapId,
    args: ArgValues,
) -> RunResult<CallFlow> {
    let instance_id = rt
        .heap
        .allocate(HeapData::Instance(Instance::new(class_id)))?;
    let instance = Value::Ref(instance_id);
    let init = rt.heap.class(class_id)?.attr(StaticStrings::Init.into());
    if let Some(init) = init {
        call_method(rt, mach, instance, init, args)?;
    } else if !args.is_empty() {
        let name = rt.interns.get_str(rt.heap.class(class_id)?.name());
        return Err(RunError::type_mismatch(format!(
            "{name}() takes no arguments"
        )));
    }
    Ok(CallFlow::Value(instance))
}

/// Invokes a method value on a receiver, injecting the receiver as the
/// first argument.
pub fn call_method<T: ResourceTracker, Tr: VmTracer, M: MachineContext<T, Tr>>(
    rt: &mut Runtime<T, Tr>,
    mach: &mut M,
    receiver: Value,
    method: Value,
    args: ArgValues,
) -> RunResult<CallFlow> {
    match resolve_callable(&rt.heap, &rt.interns, method)? {
        Callable::Interpreted(function) => {
            invoke_interpreted(rt, mach, function, args.with_receiver(receiver), None)
        }
        Callable::Native(id) => {
            let f = rt.native(id)?;
            rt.enter_call(None)?;
            let result = f(rt, args.with_receiver(receiver));
            rt.exit_call();
            result
        }
        other => dispatch(rt, mach, other, args),
    }
}

/// Advances an iterator one step via the `__next__` protocol.
///
/// Generators resume directly; instances dispatch their `__next__` method.
/// Exhaustion is the `Exhausted` flow, never an error.
pub fn call_next<T: ResourceTracker, Tr: VmTracer, M: MachineContext<T, Tr>>(
    rt: &mut Runtime<T, Tr>,
    mach: &mut M,
    iterator: Value,
) -> RunResult<CallFlow> {
    if let Value::Ref(id) = iterator {
        match rt.heap.get(id) {
            HeapData::Generator(_) => return resume_generator(rt, mach, id),
            HeapData::Instance(instance) => {
                let next_name = StaticStrings::Next.into();
                let method = match instance.attr(next_name) {
                    Some(m) => Some(m),
                    None => rt.heap.class(instance.class_id())?.attr(next_name),
                };
                let Some(method) = method else {
                    return Err(RunError::type_mismatch(format!(
                        "'{name}' object is not an iterator",
                        name = iterator.type_name(&rt.heap, &rt.interns),
                    )));
                };
                return call_method(rt, mach, iterator, method, ArgValues::Empty);
            }
            _ => {}
        }
    }
    Err(RunError::type_mismatch(format!(
        "'{name}' object is not an iterator",
        name = iterator.type_name(&rt.heap, &rt.interns),
    )))
}

/// Resumes a generator one step.
///
/// A finished generator reports exhaustion forever. A yield becomes a
/// value; a return ends the generator and its return value is discarded in
/// favor of the exhaustion signal.
fn resume_generator<T: ResourceTracker, Tr: VmTracer, M: MachineContext<T, Tr>>(
    rt: &mut Runtime<T, Tr>,
    mach: &mut M,
    generator_id: HeapId,
) -> RunResult<CallFlow> {
    let generator = rt.heap.generator_mut(generator_id)?;
    if generator.state() == GeneratorState::Finished {
        return Ok(CallFlow::Exhausted);
    }
    let mut frame = generator.begin_resume()?;
    rt.tracer.on_generator_resume();

    let flow = match mach.resume_frame(rt, &mut frame) {
        Ok(flow) => flow,
        Err(err) => {
            // A failed resume kills the generator; later resumes report
            // exhaustion.
            rt.heap.generator_mut(generator_id)?.mark_finished();
            return Err(err);
        }
    };
    let (result, finished) = match flow {
        FrameFlow::Yield(value) => {
            rt.tracer.on_generator_suspend();
            (CallFlow::Value(value), false)
        }
        FrameFlow::Return(_) => (CallFlow::Exhausted, true),
    };
    rt.heap
        .generator_mut(generator_id)?
        .finish_resume(frame, finished);
    Ok(result)
}
