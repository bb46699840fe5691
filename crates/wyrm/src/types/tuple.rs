use serde::{Deserialize, Serialize};

use crate::value::Value;

/// An immutable sequence of values.
///
/// Tuples of builtin types double as the multi-target form of `isinstance`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tuple {
    items: Vec<Value>,
}

impl Tuple {
    #[must_use]
    pub fn new(items: Vec<Value>) -> Self {
        Self { items }
    }

    #[must_use]
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
