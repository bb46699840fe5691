use crate::error::{CallFlow, RunResult};
use crate::frame::{Frame, FrameConfig};
use crate::heap::Heap;
use crate::resource::ResourceTracker;
use crate::tracer::VmTracer;

/// How a single resume step of a frame ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameFlow {
    /// The frame suspended at a yield point with a value.
    Yield(crate::value::Value),
    /// The frame ran to completion with a return value.
    Return(crate::value::Value),
}

/// The execution engine behind the dispatcher.
///
/// This crate owns values, classes, and calling conventions; the actual
/// fetch/decode loop lives behind this trait. Any bytecode engine (or a
/// scripted stub in tests) implements it to receive frames built by the
/// dispatcher.
///
/// The type parameters mirror the runtime's, so a machine can reach the
/// heap and interner without dynamic dispatch.
pub trait MachineContext<T: ResourceTracker, Tr: VmTracer> {
    /// Builds a frame. The default is plain construction; machines that
    /// intern extra per-frame state can override it.
    fn make_frame(&mut self, heap: &mut Heap<T>, config: FrameConfig) -> RunResult<Frame> {
        Frame::from_config(heap, config)
    }

    /// Runs a non-generator frame to completion.
    fn run_frame(
        &mut self,
        rt: &mut crate::runtime::Runtime<T, Tr>,
        frame: Frame,
    ) -> RunResult<CallFlow>;

    /// Advances a generator frame to its next yield point or completion.
    /// The frame's `lasti` must be updated so the next resume continues
    /// where this one stopped.
    fn resume_frame(
        &mut self,
        rt: &mut crate::runtime::Runtime<T, Tr>,
        frame: &mut Frame,
    ) -> RunResult<FrameFlow>;
}
