/// Observer hooks for runtime events.
///
/// Monomorphized through the runtime's type parameter; the default
/// [`NoopTracer`] compiles away entirely. Every hook has a no-op default so
/// implementors override only what they care about.
pub trait VmTracer: std::fmt::Debug {
    /// A callable is entered. `name` is `None` for anonymous natives.
    fn on_call(&mut self, name: Option<&str>, depth: usize) {
        let _ = (name, depth);
    }

    /// A callable returned (normally or with an error).
    fn on_return(&mut self, depth: usize) {
        let _ = depth;
    }

    /// A class object was materialized by the class factory.
    fn on_class_created(&mut self, name: &str) {
        let _ = name;
    }

    /// A generator is about to resume its frame.
    fn on_generator_resume(&mut self) {}

    /// A generator suspended at a yield point.
    fn on_generator_suspend(&mut self) {}
}

/// Tracer that does nothing. The default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoopTracer;

impl VmTracer for NoopTracer {}

/// Tracer that prints events to stderr, for ad-hoc debugging.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrTracer;

impl VmTracer for StderrTracer {
    fn on_call(&mut self, name: Option<&str>, depth: usize) {
        eprintln!("{:depth$}call {}", "", name.unwrap_or("<native>"));
    }

    fn on_return(&mut self, depth: usize) {
        eprintln!("{:depth$}return", "");
    }

    fn on_class_created(&mut self, name: &str) {
        eprintln!("class created: {name}");
    }

    fn on_generator_resume(&mut self) {
        eprintln!("generator resume");
    }

    fn on_generator_suspend(&mut self) {
        eprintln!("generator suspend");
    }
}

/// An event recorded by [`RecordingTracer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    Call { name: Option<String>, depth: usize },
    Return { depth: usize },
    ClassCreated { name: String },
    GeneratorResume,
    GeneratorSuspend,
}

/// Tracer that records events in memory. Used by the test suite to assert
/// on call and generator sequencing.
#[derive(Debug, Clone, Default)]
pub struct RecordingTracer {
    /// The recorded events, in order.
    pub events: Vec<TraceEvent>,
}

impl VmTracer for RecordingTracer {
    fn on_call(&mut self, name: Option<&str>, depth: usize) {
        self.events.push(TraceEvent::Call {
            name: name.map(str::to_owned),
            depth,
        });
    }

    fn on_return(&mut self, depth: usize) {
        self.events.push(TraceEvent::Return { depth });
    }

    fn on_class_created(&mut self, name: &str) {
        self.events.push(TraceEvent::ClassCreated {
            name: name.to_owned(),
        });
    }

    fn on_generator_resume(&mut self) {
        self.events.push(TraceEvent::GeneratorResume);
    }

    fn on_generator_suspend(&mut self) {
        self.events.push(TraceEvent::GeneratorSuspend);
    }
}
