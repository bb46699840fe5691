mod common;

use pretty_assertions::assert_eq;
use wyrm::{
    ArgValues, CallContext, CallFlow, ClassObject, ErrorKind, Frame, FrameConfig, Instance,
    KwargsValues, RunError, Runtime, Type, Value, call_method, isinstance, issubclass,
    make_callable, make_class, make_super, run_callable,
};

use common::{ScriptedMachine, class_id_of, declare, expect_value, new_globals, str_val};

/// Defines a class whose body installs the given (name, function) methods.
fn define_class(
    rt: &mut Runtime,
    mach: &mut ScriptedMachine,
    name: &'static str,
    bases: &[Value],
    methods: Vec<(&'static str, wyrm::FunctionId)>,
) -> Value {
    let globals = new_globals(rt);
    let body = declare(rt, name, &[], false);
    mach.script(body, move |rt, _m, frame| {
        for &(method_name, function) in &methods {
            let callable = make_callable(rt, function, frame.globals)?;
            let method_name = rt.interns.intern(method_name);
            rt.heap.dict_mut(frame.locals)?.insert_str(method_name, callable);
        }
        Ok(CallFlow::Value(Value::None))
    });
    let body_v = make_callable(rt, body, globals).unwrap();
    make_class(rt, mach, body_v, name, bases, None, &KwargsValues::default()).unwrap()
}

fn instantiate(rt: &mut Runtime, mach: &mut ScriptedMachine, class: Value) -> Value {
    expect_value(run_callable(rt, mach, CallContext::Machine, class, ArgValues::Empty).unwrap())
}

fn call_named_method(
    rt: &mut Runtime,
    mach: &mut ScriptedMachine,
    instance: Value,
    name: &str,
) -> Result<CallFlow, RunError> {
    let Value::Ref(id) = instance else {
        panic!("not an instance: {instance:?}")
    };
    let class_id = rt.heap.instance(id).unwrap().class_id();
    let name = rt.interns.intern(name);
    let method = rt
        .heap
        .class(class_id)
        .unwrap()
        .attr(name)
        .expect("method present");
    call_method(rt, mach, instance, method, ArgValues::Empty)
}

/// The flattening property: a subclass overrides what it redefines, keeps
/// what it inherits, and is immune to later mutation of its base.
#[test]
fn copy_flattened_inheritance() {
    let mut rt = Runtime::new();
    let mut mach = ScriptedMachine::default();

    let base_speak = declare(&mut rt, "speak", &["self"], false);
    mach.script(base_speak, |rt, _m, _f| Ok(CallFlow::Value(str_val(rt, "base"))));
    let greet = declare(&mut rt, "greet", &["self"], false);
    mach.script(greet, |rt, _m, _f| Ok(CallFlow::Value(str_val(rt, "hello"))));
    let derived_speak = declare(&mut rt, "speak", &["self"], false);
    mach.script(derived_speak, |rt, _m, _f| Ok(CallFlow::Value(str_val(rt, "derived"))));

    let base = define_class(
        &mut rt,
        &mut mach,
        "Base",
        &[],
        vec![("speak", base_speak), ("greet", greet)],
    );
    let derived = define_class(
        &mut rt,
        &mut mach,
        "Derived",
        &[base],
        vec![("speak", derived_speak)],
    );

    assert!(issubclass(&mut rt, derived, base).unwrap());
    assert!(!issubclass(&mut rt, base, derived).unwrap());

    let obj = instantiate(&mut rt, &mut mach, derived);
    assert!(isinstance(&mut rt, obj, derived).unwrap());
    assert!(isinstance(&mut rt, obj, base).unwrap());

    let spoke = call_named_method(&mut rt, &mut mach, obj, "speak").unwrap();
    let expected = str_val(&mut rt, "derived");
    assert_eq!(spoke, CallFlow::Value(expected));

    let greeted = call_named_method(&mut rt, &mut mach, obj, "greet").unwrap();
    let expected = str_val(&mut rt, "hello");
    assert_eq!(greeted, CallFlow::Value(expected));

    // Mutating the base after the subclass exists changes nothing for the
    // subclass: its namespace was copied, not linked.
    let shout = declare(&mut rt, "greet", &["self"], false);
    mach.script(shout, |rt, _m, _f| Ok(CallFlow::Value(str_val(rt, "HEY"))));
    let base_id = class_id_of(&rt, base);
    let globals = new_globals(&mut rt);
    let shout_v = make_callable(&mut rt, shout, globals).unwrap();
    let greet_name = rt.interns.intern("greet");
    rt.heap.class_mut(base_id).unwrap().set_attr(greet_name, shout_v);

    let base_obj = instantiate(&mut rt, &mut mach, base);
    let base_greet = call_named_method(&mut rt, &mut mach, base_obj, "greet").unwrap();
    let expected = str_val(&mut rt, "HEY");
    assert_eq!(base_greet, CallFlow::Value(expected));

    let still = call_named_method(&mut rt, &mut mach, obj, "greet").unwrap();
    let expected = str_val(&mut rt, "hello");
    assert_eq!(still, CallFlow::Value(expected));
}

/// The mro is the class followed by its flattened base chain.
#[test]
fn mro_is_self_then_base_chain() {
    let mut rt = Runtime::new();
    let mut mach = ScriptedMachine::default();

    let a = define_class(&mut rt, &mut mach, "A", &[], vec![]);
    let b = define_class(&mut rt, &mut mach, "B", &[a], vec![]);
    let c = define_class(&mut rt, &mut mach, "C", &[b], vec![]);

    let a_id = class_id_of(&rt, a);
    let b_id = class_id_of(&rt, b);
    let c_id = class_id_of(&rt, c);
    assert_eq!(rt.heap.class(c_id).unwrap().mro(), [c_id, b_id, a_id]);
}

/// Multiple bases fail loudly.
#[test]
fn multiple_inheritance_is_rejected() {
    let mut rt = Runtime::new();
    let mut mach = ScriptedMachine::default();

    let a = define_class(&mut rt, &mut mach, "A", &[], vec![]);
    let b = define_class(&mut rt, &mut mach, "B", &[], vec![]);

    let globals = new_globals(&mut rt);
    let body = declare(&mut rt, "c_body", &[], false);
    mach.script(body, |_rt, _m, _f| Ok(CallFlow::Value(Value::None)));
    let body_v = make_callable(&mut rt, body, globals).unwrap();

    let err = make_class(&mut rt, &mut mach, body_v, "C", &[a, b], None, &KwargsValues::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotSupported);
    assert!(err.message().contains("multiple inheritance"));
}

/// A supplied metaclass is validated, then ignored.
#[test]
fn metaclass_is_accepted_and_ignored() {
    let mut rt = Runtime::new();
    let mut mach = ScriptedMachine::default();

    let meta = define_class(&mut rt, &mut mach, "Meta", &[], vec![]);

    let globals = new_globals(&mut rt);
    let body = declare(&mut rt, "with_meta_body", &[], false);
    mach.script(body, |_rt, _m, _f| Ok(CallFlow::Value(Value::None)));
    let body_v = make_callable(&mut rt, body, globals).unwrap();
    let class = make_class(
        &mut rt,
        &mut mach,
        body_v,
        "WithMeta",
        &[],
        Some(meta),
        &KwargsValues::default(),
    )
    .unwrap();
    let obj = instantiate(&mut rt, &mut mach, class);
    assert!(isinstance(&mut rt, obj, class).unwrap());
    assert!(!isinstance(&mut rt, obj, meta).unwrap());

    // A non-class metaclass is a loud failure.
    let body2 = declare(&mut rt, "bogus_body", &[], false);
    mach.script(body2, |_rt, _m, _f| Ok(CallFlow::Value(Value::None)));
    let body2_v = make_callable(&mut rt, body2, globals).unwrap();
    let err = make_class(
        &mut rt,
        &mut mach,
        body2_v,
        "Bogus",
        &[],
        Some(Value::Int(1)),
        &KwargsValues::default(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

/// Class keywords pass the shape check and leave no trace on the class.
#[test]
fn class_keywords_are_accepted_and_ignored() {
    let mut rt = Runtime::new();
    let mut mach = ScriptedMachine::default();

    let globals = new_globals(&mut rt);
    let body = declare(&mut rt, "keyed_body", &[], false);
    mach.script(body, |_rt, _m, _f| Ok(CallFlow::Value(Value::None)));
    let body_v = make_callable(&mut rt, body, globals).unwrap();

    let frozen = rt.interns.intern("frozen");
    let keywords = KwargsValues::new([(frozen, Value::Bool(true))]);
    let class = make_class(&mut rt, &mut mach, body_v, "Keyed", &[], None, &keywords).unwrap();

    let obj = instantiate(&mut rt, &mut mach, class);
    assert!(isinstance(&mut rt, obj, class).unwrap());
    let class_id = class_id_of(&rt, class);
    assert_eq!(rt.heap.class(class_id).unwrap().attr(frozen), None);
}

/// isinstance accepts tuples of targets as the any-of form, mixing builtin
/// types and user classes.
#[test]
fn isinstance_tuple_mixes_builtin_and_user_targets() {
    let mut rt = Runtime::new();
    let mut mach = ScriptedMachine::default();

    let dog = define_class(&mut rt, &mut mach, "Dog", &[], vec![]);
    let rex = instantiate(&mut rt, &mut mach, dog);

    let targets = rt
        .heap
        .allocate(wyrm::HeapData::Tuple(wyrm::Tuple::new(vec![
            Value::Type(Type::Int),
            dog,
        ])))
        .unwrap();
    assert!(isinstance(&mut rt, rex, Value::Ref(targets)).unwrap());
    assert!(isinstance(&mut rt, Value::Int(4), Value::Ref(targets)).unwrap());
    assert!(!isinstance(&mut rt, Value::Float(4.0), Value::Ref(targets)).unwrap());
}

/// super() delegates the initializer to the single base class.
#[test]
fn super_delegates_to_base_init() {
    let mut rt = Runtime::new();
    let mut mach = ScriptedMachine::default();

    let self_name = rt.interns.intern("self");
    let kind_name = rt.interns.intern("kind");
    let name_name = rt.interns.intern("name");

    let base_init = declare(&mut rt, "__init__", &["self"], false);
    mach.script(base_init, move |rt, _m, frame| {
        let receiver = frame.local(&rt.heap, self_name)?.expect("self bound");
        let Value::Ref(id) = receiver else { panic!("receiver") };
        let kind = str_val(rt, "animal");
        rt.heap.instance_mut(id)?.set_attr(kind_name, kind);
        Ok(CallFlow::Value(Value::None))
    });

    let derived_init = declare(&mut rt, "__init__", &["self"], false);
    mach.script(derived_init, move |rt, m, frame| {
        let proxy = make_super(rt, frame, &ArgValues::Empty)?;
        let Value::Ref(proxy_id) = proxy else { panic!("proxy") };
        let proxy = rt.heap.super_proxy(proxy_id)?;
        wyrm::super_init(rt, m, proxy, ArgValues::Empty)?;

        let receiver = frame.local(&rt.heap, self_name)?.expect("self bound");
        let Value::Ref(id) = receiver else { panic!("receiver") };
        let name = str_val(rt, "dog");
        rt.heap.instance_mut(id)?.set_attr(name_name, name);
        Ok(CallFlow::Value(Value::None))
    });

    let base = define_class(&mut rt, &mut mach, "Animal", &[], vec![("__init__", base_init)]);
    let derived =
        define_class(&mut rt, &mut mach, "Dog", &[base], vec![("__init__", derived_init)]);

    let rex = instantiate(&mut rt, &mut mach, derived);
    let Value::Ref(rex_id) = rex else { panic!("instance") };
    let kind = rt.heap.instance(rex_id).unwrap().attr(kind_name);
    let name = rt.heap.instance(rex_id).unwrap().attr(name_name);
    let animal = str_val(&mut rt, "animal");
    let dog = str_val(&mut rt, "dog");
    assert_eq!(kind, Some(animal));
    assert_eq!(name, Some(dog));
}

/// The unsupported super() shapes each fail with NotSupported.
#[test]
fn super_unsupported_shapes() {
    let mut rt = Runtime::new();
    let mut mach = ScriptedMachine::default();

    let base = define_class(&mut rt, &mut mach, "Base", &[], vec![]);
    let derived = define_class(&mut rt, &mut mach, "Derived", &[base], vec![]);
    let orphan = define_class(&mut rt, &mut mach, "Orphan", &[], vec![]);

    let self_name = rt.interns.intern("self");
    let init = declare(&mut rt, "__init__", &["self"], false);
    let speak = declare(&mut rt, "speak", &["self"], false);
    let globals = new_globals(&mut rt);

    let frame_for = |rt: &mut Runtime, function, instance| -> Frame {
        Frame::from_config(
            &mut rt.heap,
            FrameConfig {
                function,
                globals,
                callargs: vec![(self_name, instance)],
                locals: None,
            },
        )
        .unwrap()
    };

    let obj = instantiate(&mut rt, &mut mach, derived);
    let frame = frame_for(&mut rt, init, obj);

    // With arguments.
    let err = make_super(&mut rt, &frame, &ArgValues::One(obj)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotSupported);
    assert!(err.message().contains("zero-argument"));

    // Outside an initializer.
    let frame = frame_for(&mut rt, speak, obj);
    let err = make_super(&mut rt, &frame, &ArgValues::Empty).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotSupported);
    assert!(err.message().contains("__init__"));

    // A class with no base to delegate to.
    let lonely = instantiate(&mut rt, &mut mach, orphan);
    let frame = frame_for(&mut rt, init, lonely);
    let err = make_super(&mut rt, &frame, &ArgValues::Empty).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotSupported);
    assert!(err.message().contains("no base class"));

    // Two bases, assembled by hand since the class factory rejects them.
    let base_id = class_id_of(&rt, base);
    let orphan_id = class_id_of(&rt, orphan);
    let twin_name = rt.interns.intern("Twin");
    let twin_id = rt
        .heap
        .allocate(wyrm::HeapData::Class(ClassObject::new(twin_name, [base_id, orphan_id])))
        .unwrap();
    rt.heap
        .class_mut(twin_id)
        .unwrap()
        .set_mro(vec![twin_id, base_id, orphan_id]);
    let twin = rt
        .heap
        .allocate(wyrm::HeapData::Instance(Instance::new(twin_id)))
        .unwrap();
    let frame = frame_for(&mut rt, init, Value::Ref(twin));
    let err = make_super(&mut rt, &frame, &ArgValues::Empty).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotSupported);
    assert!(err.message().contains("multiple bases"));
}
