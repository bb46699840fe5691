use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::args::{ArgValues, KwargsValues};
use crate::call::{Callable, invoke_interpreted, resolve_callable};
use crate::error::{RunError, RunResult};
use crate::heap::{HeapData, HeapId};
use crate::intern::StringId;
use crate::isinstance::resolve_class_value;
use crate::machine::MachineContext;
use crate::resource::ResourceTracker;
use crate::runtime::Runtime;
use crate::tracer::VmTracer;
use crate::types::Dict;
use crate::value::Value;

/// A user-defined (or builtin) class object.
///
/// Inheritance is copy-flattened: at class creation the base's namespace is
/// copied into the new class, then the body's own definitions are laid on
/// top. Attribute lookup therefore never walks the mro; the mro exists for
/// identity queries (`isinstance`, `issubclass`) and the super resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassObject {
    name: StringId,
    bases: SmallVec<[HeapId; 1]>,
    namespace: Dict,
    mro: Vec<HeapId>,
    constructor: Option<HeapId>,
}

impl ClassObject {
    /// Creates a class with an empty namespace and an unset mro.
    ///
    /// The mro must be set after the class is allocated, because it starts
    /// with the class's own heap id.
    #[must_use]
    pub fn new(name: StringId, bases: impl IntoIterator<Item = HeapId>) -> Self {
        Self {
            name,
            bases: bases.into_iter().collect(),
            namespace: Dict::new(),
            mro: Vec::new(),
            constructor: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> StringId {
        self.name
    }

    #[must_use]
    pub fn bases(&self) -> &[HeapId] {
        &self.bases
    }

    /// The linearization: this class first, then the base chain.
    #[must_use]
    pub fn mro(&self) -> &[HeapId] {
        &self.mro
    }

    pub fn set_mro(&mut self, mro: Vec<HeapId>) {
        self.mro = mro;
    }

    /// Whether `class_id` appears in this class's mro.
    #[must_use]
    pub fn is_subclass_of(&self, class_id: HeapId) -> bool {
        self.mro.contains(&class_id)
    }

    /// Looks up a name in the flattened namespace.
    #[must_use]
    pub fn attr(&self, name: StringId) -> Option<Value> {
        self.namespace.get_str(name)
    }

    pub fn set_attr(&mut self, name: StringId, value: Value) {
        self.namespace.insert_str(name, value);
    }

    pub(crate) fn namespace(&self) -> &Dict {
        &self.namespace
    }

    pub(crate) fn set_namespace(&mut self, namespace: Dict) {
        self.namespace = namespace;
    }

    /// The memoized constructor callable for this class.
    #[must_use]
    pub fn constructor(&self) -> Option<HeapId> {
        self.constructor
    }

    pub(crate) fn set_constructor(&mut self, ctor: HeapId) {
        self.constructor = Some(ctor);
    }
}

/// An instance of a user-defined class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    class_id: HeapId,
    attrs: Dict,
}

impl Instance {
    #[must_use]
    pub fn new(class_id: HeapId) -> Self {
        Self {
            class_id,
            attrs: Dict::new(),
        }
    }

    #[must_use]
    pub fn class_id(&self) -> HeapId {
        self.class_id
    }

    /// Looks up an attribute on the instance only; class lookup is the
    /// caller's second step.
    #[must_use]
    pub fn attr(&self, name: StringId) -> Option<Value> {
        self.attrs.get_str(name)
    }

    pub fn set_attr(&mut self, name: StringId, value: Value) {
        self.attrs.insert_str(name, value);
    }
}

/// Materializes a class from an executed class body.
///
/// `body` must be an interpreted function; it runs in a fresh namespace
/// dict, so its assignments become the class's own definitions. The base's
/// namespace (already flattened) is copied in underneath them. Returns the
/// class's constructor as a callable value.
///
/// `metaclass`, if given, must name a class but is otherwise ignored.
/// Class keywords are accepted and discarded; there is no keyword protocol
/// to hand them to yet. More than one base is rejected with `NotSupported`.
pub fn make_class<T: ResourceTracker, Tr: VmTracer, M: MachineContext<T, Tr>>(
    rt: &mut Runtime<T, Tr>,
    mach: &mut M,
    body: Value,
    name: &str,
    bases: &[Value],
    metaclass: Option<Value>,
    _keywords: &KwargsValues,
) -> RunResult<Value> {
    if bases.len() > 1 {
        return Err(RunError::not_supported(format!(
            "class {name}: multiple inheritance is not supported"
        )));
    }
    let base_id = match bases {
        [] => None,
        [base] => Some(resolve_class_value(rt, *base)?),
        _ => unreachable!(),
    };
    if let Some(meta) = metaclass {
        // Validated so a bogus metaclass fails loudly, then ignored.
        resolve_class_value(rt, meta)?;
    }

    let Callable::Interpreted(body_fn) = resolve_callable(&rt.heap, &rt.interns, body)? else {
        return Err(RunError::type_mismatch(format!(
            "class {name}: class body must be an interpreted function"
        )));
    };

    // Run the body with a fresh dict as locals; its assignments are the
    // class's own definitions.
    let body_locals = rt.heap.allocate(HeapData::Dict(Dict::new()))?;
    invoke_interpreted(rt, mach, body_fn, ArgValues::Empty, Some(body_locals))?;

    // Copy-flattening: the base namespace first, the body's definitions on
    // top.
    let mut namespace = match base_id {
        Some(id) => rt.heap.class(id)?.namespace().clone(),
        None => Dict::new(),
    };
    for (key, value) in rt.heap.dict(body_locals)?.iter().collect::<Vec<_>>() {
        namespace.insert(key, value);
    }

    let name_id = rt.interns.intern(name);
    let class_id = rt
        .heap
        .allocate(HeapData::Class(ClassObject::new(name_id, base_id)))?;
    let mut mro = vec![class_id];
    if let Some(id) = base_id {
        mro.extend_from_slice(rt.heap.class(id)?.mro());
    }
    {
        let class = rt.heap.class_mut(class_id)?;
        class.set_namespace(namespace);
        class.set_mro(mro);
    }

    let ctor_id = rt
        .heap
        .allocate(HeapData::Callable(Callable::Constructor(class_id)))?;
    rt.heap.class_mut(class_id)?.set_constructor(ctor_id);
    rt.tracer.on_class_created(name);
    Ok(Value::Ref(ctor_id))
}
