use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A mutable sequence of values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct List {
    items: Vec<Value>,
}

impl List {
    #[must_use]
    pub fn new(items: Vec<Value>) -> Self {
        Self { items }
    }

    #[must_use]
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn push(&mut self, value: Value) {
        self.items.push(value);
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
