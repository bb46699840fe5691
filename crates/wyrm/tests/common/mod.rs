#![allow(dead_code)]

use std::collections::HashMap;
use std::rc::Rc;

use wyrm::{
    CallFlow, Callable, Dict, Frame, FrameFlow, Function, FunctionId, HeapData, HeapId,
    MachineContext, NoLimitTracker, NoopTracer, RunResult, Runtime, Signature, Value,
};

type Body = Rc<dyn Fn(&mut Runtime, &mut ScriptedMachine, &Frame) -> RunResult<CallFlow>>;
type GenBody = Rc<dyn Fn(&mut Runtime, &mut ScriptedMachine, &mut Frame) -> RunResult<FrameFlow>>;

/// A machine whose "bytecode" is a closure per code object.
///
/// Generator bodies use `frame.lasti` as their step counter, the same way a
/// real machine would use it as an instruction cursor.
#[derive(Default)]
pub struct ScriptedMachine {
    bodies: HashMap<FunctionId, Body>,
    gen_bodies: HashMap<FunctionId, GenBody>,
}

impl ScriptedMachine {
    pub fn script(
        &mut self,
        function: FunctionId,
        body: impl Fn(&mut Runtime, &mut Self, &Frame) -> RunResult<CallFlow> + 'static,
    ) {
        self.bodies.insert(function, Rc::new(body));
    }

    pub fn script_generator(
        &mut self,
        function: FunctionId,
        body: impl Fn(&mut Runtime, &mut Self, &mut Frame) -> RunResult<FrameFlow> + 'static,
    ) {
        self.gen_bodies.insert(function, Rc::new(body));
    }
}

impl MachineContext<NoLimitTracker, NoopTracer> for ScriptedMachine {
    fn run_frame(&mut self, rt: &mut Runtime, frame: Frame) -> RunResult<CallFlow> {
        let body = self
            .bodies
            .get(&frame.function)
            .cloned()
            .expect("no scripted body for function");
        body(rt, self, &frame)
    }

    fn resume_frame(&mut self, rt: &mut Runtime, frame: &mut Frame) -> RunResult<FrameFlow> {
        let body = self
            .gen_bodies
            .get(&frame.function)
            .cloned()
            .expect("no scripted generator body for function");
        body(rt, self, frame)
    }
}

/// Declares a code object with the given parameter names.
pub fn declare(rt: &mut Runtime, name: &str, params: &[&str], is_generator: bool) -> FunctionId {
    let name_id = rt.interns.intern(name);
    let params: Vec<_> = params.iter().map(|p| rt.interns.intern(p)).collect();
    rt.interns
        .declare_function(Function::new(name_id, Signature::new(params), is_generator))
}

/// Allocates an empty globals dict.
pub fn new_globals(rt: &mut Runtime) -> HeapId {
    rt.heap
        .allocate(HeapData::Dict(Dict::new()))
        .expect("globals allocation")
}

/// Interns a string into a value.
pub fn str_val(rt: &mut Runtime, s: &str) -> Value {
    Value::Str(rt.interns.intern(s))
}

/// Unwraps a class value (constructor or class object) to its class id.
pub fn class_id_of(rt: &Runtime, class: Value) -> HeapId {
    let Value::Ref(id) = class else {
        panic!("not a heap value: {class:?}")
    };
    match rt.heap.get(id) {
        HeapData::Callable(Callable::Constructor(class_id)) => *class_id,
        HeapData::Class(_) => id,
        other => panic!("not a class value: {}", other.variant_name()),
    }
}

/// Unwraps a `CallFlow` that must carry a value.
pub fn expect_value(flow: CallFlow) -> Value {
    flow.value().expect("expected a value, got exhaustion")
}
