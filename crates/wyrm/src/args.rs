use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::intern::StringId;
use crate::value::Value;

/// Keyword arguments for a call, in caller order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KwargsValues {
    pairs: SmallVec<[(StringId, Value); 2]>,
}

impl KwargsValues {
    #[must_use]
    pub fn new(pairs: impl IntoIterator<Item = (StringId, Value)>) -> Self {
        Self {
            pairs: pairs.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StringId, Value)> + '_ {
        self.pairs.iter().copied()
    }
}

/// Arguments passed to a callable.
///
/// The common zero/one/two-positional cases avoid allocating; anything with
/// more positionals or any keywords uses the general form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum ArgValues {
    #[default]
    Empty,
    One(Value),
    Two(Value, Value),
    ArgsKwargs {
        args: Vec<Value>,
        kwargs: KwargsValues,
    },
}

impl ArgValues {
    /// Builds the smallest representation for the given arguments.
    #[must_use]
    pub fn from_args(
        args: Vec<Value>,
        kwargs: impl IntoIterator<Item = (StringId, Value)>,
    ) -> Self {
        let kwargs = KwargsValues::new(kwargs);
        if kwargs.is_empty() {
            match args.len() {
                0 => return Self::Empty,
                1 => return Self::One(args[0]),
                2 => return Self::Two(args[0], args[1]),
                _ => {}
            }
        }
        Self::ArgsKwargs { args, kwargs }
    }

    /// Number of positional arguments.
    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::One(_) => 1,
            Self::Two(..) => 2,
            Self::ArgsKwargs { args, .. } => args.len(),
        }
    }

    /// Whether there are no arguments at all, positional or keyword.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::One(_) | Self::Two(..) => false,
            Self::ArgsKwargs { args, kwargs } => args.is_empty() && kwargs.is_empty(),
        }
    }

    /// The first positional argument, if any.
    #[must_use]
    pub fn first_positional(&self) -> Option<Value> {
        match self {
            Self::Empty => None,
            Self::One(v) | Self::Two(v, _) => Some(*v),
            Self::ArgsKwargs { args, .. } => args.first().copied(),
        }
    }

    /// Prepends a receiver as the new first positional argument. This is how
    /// bound methods inject `self`.
    #[must_use]
    pub fn with_receiver(self, receiver: Value) -> Self {
        match self {
            Self::Empty => Self::One(receiver),
            Self::One(a) => Self::Two(receiver, a),
            Self::Two(a, b) => Self::ArgsKwargs {
                args: vec![receiver, a, b],
                kwargs: KwargsValues::default(),
            },
            Self::ArgsKwargs { mut args, kwargs } => {
                args.insert(0, receiver);
                Self::ArgsKwargs { args, kwargs }
            }
        }
    }

    /// Decomposes into a positional list and keyword pairs.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Value>, KwargsValues) {
        match self {
            Self::Empty => (vec![], KwargsValues::default()),
            Self::One(a) => (vec![a], KwargsValues::default()),
            Self::Two(a, b) => (vec![a, b], KwargsValues::default()),
            Self::ArgsKwargs { args, kwargs } => (args, kwargs),
        }
    }
}
