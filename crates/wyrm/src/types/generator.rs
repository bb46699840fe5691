use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

use crate::error::RunError;
use crate::frame::Frame;

/// Lifecycle of a generator object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr, Serialize, Deserialize)]
pub enum GeneratorState {
    /// Created but never resumed.
    New,
    /// Currently executing. Resuming in this state is rejected.
    Running,
    /// Suspended at a yield point.
    Suspended,
    /// Ran to completion or failed; resuming reports exhaustion forever.
    Finished,
}

/// A suspended computation: the paused frame plus its lifecycle state.
///
/// Generators are resumed through the callable dispatcher. The frame is
/// taken out for the duration of a resume so the heap borrow is released
/// while the machine runs it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generator {
    frame: Frame,
    state: GeneratorState,
}

impl Generator {
    #[must_use]
    pub fn new(frame: Frame) -> Self {
        Self {
            frame,
            state: GeneratorState::New,
        }
    }

    #[must_use]
    pub fn state(&self) -> GeneratorState {
        self.state
    }

    /// Marks the generator running and hands out a copy of its frame.
    ///
    /// Rejects reentrant resumption. The caller must pair this with
    /// [`finish_resume`](Self::finish_resume).
    pub fn begin_resume(&mut self) -> Result<Frame, RunError> {
        match self.state {
            GeneratorState::Running => Err(RunError::not_supported(
                "generator already executing, reentrant resumption is not supported",
            )),
            GeneratorState::New | GeneratorState::Suspended => {
                self.state = GeneratorState::Running;
                Ok(self.frame.clone())
            }
            GeneratorState::Finished => {
                unreachable!("finished generators are handled before begin_resume")
            }
        }
    }

    /// Stores the frame back and records whether the generator completed.
    pub fn finish_resume(&mut self, frame: Frame, finished: bool) {
        self.frame = frame;
        self.state = if finished {
            GeneratorState::Finished
        } else {
            GeneratorState::Suspended
        };
    }

    /// Marks the generator finished without a frame update, for resumes that
    /// failed inside the machine.
    pub fn mark_finished(&mut self) {
        self.state = GeneratorState::Finished;
    }

    /// Points the suspended frame back at its own heap slot. Called once,
    /// right after allocation, when the slot id becomes known.
    pub(crate) fn set_backlink(&mut self, id: crate::heap::HeapId) {
        self.frame.generator = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::ErrorKind;
    use crate::frame::{Frame, FrameConfig};
    use crate::function::Function;
    use crate::heap::{Heap, HeapData};
    use crate::intern::Interns;
    use crate::resource::NoLimitTracker;
    use crate::signature::Signature;
    use crate::types::Dict;

    fn test_frame(heap: &mut Heap<NoLimitTracker>, interns: &mut Interns) -> Frame {
        let name = interns.intern("count_up");
        let function = interns.declare_function(Function::new(name, Signature::default(), true));
        let globals = heap.allocate(HeapData::Dict(Dict::new())).unwrap();
        let config = FrameConfig {
            function,
            globals,
            callargs: vec![],
            locals: None,
        };
        Frame::from_config(heap, config).unwrap()
    }

    /// Resuming while running is rejected and leaves the state untouched.
    #[test]
    fn reentrant_resume_is_rejected() {
        let mut heap = Heap::new(8, NoLimitTracker);
        let mut interns = Interns::new();
        let frame = test_frame(&mut heap, &mut interns);
        let mut generator = Generator::new(frame);
        let taken = generator.begin_resume().unwrap();
        assert_eq!(generator.state(), GeneratorState::Running);
        let err = generator.begin_resume().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotSupported);
        generator.finish_resume(taken, false);
        assert_eq!(generator.state(), GeneratorState::Suspended);
    }

    /// Completion pins the state at Finished.
    #[test]
    fn finish_pins_state() {
        let mut heap = Heap::new(8, NoLimitTracker);
        let mut interns = Interns::new();
        let frame = test_frame(&mut heap, &mut interns);
        let mut generator = Generator::new(frame);
        let taken = generator.begin_resume().unwrap();
        generator.finish_resume(taken, true);
        assert_eq!(generator.state(), GeneratorState::Finished);
    }
}
