#![doc = include_str!("../../../README.md")]

mod args;
mod call;
mod error;
mod frame;
mod function;
mod heap;
mod intern;
mod isinstance;
mod iter;
mod machine;
mod object;
mod resource;
mod runtime;
mod signature;
mod super_proxy;
mod tracer;
mod types;
mod value;

pub use args::{ArgValues, KwargsValues};
pub use call::{
    CallContext, Callable, InterpretedFn, bind_method, call_method, call_next, make_callable,
    resolve_callable, run_callable, unbound_method,
};
pub use error::{CallFlow, ErrorKind, RunError, RunResult};
pub use frame::{Frame, FrameConfig};
pub use function::Function;
pub use heap::{Heap, HeapData, HeapId, HeapStats};
pub use intern::{ExtFunctionId, FunctionId, Interns, StaticStrings, StringId};
pub use isinstance::{is_runtime_value, isinstance, issubclass};
pub use iter::iter_for_each;
pub use machine::{FrameFlow, MachineContext};
pub use object::{Object, coerce_from_host};
pub use resource::{
    DEFAULT_MAX_RECURSION_DEPTH, LimitedTracker, MAX_DATA_RECURSION_DEPTH, NoLimitTracker,
    ResourceError, ResourceTracker,
};
pub use runtime::{NativeFn, Runtime};
pub use signature::Signature;
pub use super_proxy::{SuperProxy, make_super, super_init};
pub use tracer::{NoopTracer, RecordingTracer, StderrTracer, TraceEvent, VmTracer};
pub use types::{
    ClassObject, Dict, Generator, GeneratorState, Instance, List, Tuple, Type, TypeRegistry,
    make_class,
};
pub use value::Value;
