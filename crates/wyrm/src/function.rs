use serde::{Deserialize, Serialize};

use crate::intern::StringId;
use crate::signature::Signature;

/// A registered code object: name, parameter signature, and whether its body
/// contains yield points.
///
/// The body itself is owned by the machine behind [`MachineContext`]; this
/// crate only needs what argument binding and generator construction require.
///
/// [`MachineContext`]: crate::machine::MachineContext
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    name: StringId,
    signature: Signature,
    is_generator: bool,
}

impl Function {
    /// Creates a code-object descriptor.
    #[must_use]
    pub fn new(name: StringId, signature: Signature, is_generator: bool) -> Self {
        Self {
            name,
            signature,
            is_generator,
        }
    }

    /// The function's declared name.
    #[must_use]
    pub fn name(&self) -> StringId {
        self.name
    }

    /// The parameter signature used for argument binding.
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Whether calling this function produces a generator instead of running
    /// the body to completion.
    #[must_use]
    pub fn is_generator(&self) -> bool {
        self.is_generator
    }
}
