use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, EnumString, IntoStaticStr};

use crate::value::Value;

/// Result type alias for operations that can produce a runtime error.
pub type RunResult<T> = Result<T, RunError>;

/// The error kinds raised by the object-model core.
///
/// Errors are raised and caught by kind, not by type identity. Uses strum
/// derives for automatic `Display`, `FromStr`, and `Into<&'static str>`
/// implementations; the string representation matches the variant name
/// exactly (e.g. `TypeMismatch` -> "TypeMismatch").
///
/// Iteration exhaustion is deliberately *not* an error kind: it is the
/// [`CallFlow::Exhausted`] result tag, consumed exactly once by the
/// iteration bridge.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumString, IntoStaticStr, Serialize, Deserialize,
)]
pub enum ErrorKind {
    /// A receiver or argument does not match the expected class. Messages
    /// include both the offending and the expected class names.
    TypeMismatch,
    /// A deliberately unimplemented capability: multiple inheritance,
    /// `super()` outside an initializer or with arguments, metaclass
    /// customization, reentrant generator resumption.
    NotSupported,
    /// Coercion of a host value whose kind the runtime does not recognize.
    UnsupportedType,
}

/// A runtime error carrying its kind and a human-readable message.
///
/// None of these are retried or silently downgraded; they surface
/// immediately to the caller. Recovery, if any, happens above the machine
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunError {
    kind: ErrorKind,
    message: String,
}

impl RunError {
    /// Creates a new error of the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Creates a `TypeMismatch` error.
    #[must_use]
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeMismatch, message)
    }

    /// Creates a `NotSupported` error.
    #[must_use]
    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotSupported, message)
    }

    /// Creates an `UnsupportedType` error.
    #[must_use]
    pub fn unsupported_type(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedType, message)
    }

    /// Creates the `TypeMismatch` raised when a method receiver's class does
    /// not match the method's declared owner. Names both classes.
    #[must_use]
    pub(crate) fn receiver_mismatch(method: &str, expected: &str, actual: &str) -> Self {
        Self::type_mismatch(format!(
            "{method}() must be called with {expected} instance as first argument (got {actual} instance instead)"
        ))
    }

    /// Returns the error kind, for catch-by-kind matching.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the diagnostic message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for RunError {}

/// Result of a uniform callable invocation.
///
/// Distinguishes a normal value from the iteration-exhaustion signal so
/// exhaustion never travels as an error. Only the iteration bridge consumes
/// `Exhausted`; every other caller passes it through unmodified.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CallFlow {
    /// The invocation produced a value.
    Value(Value),
    /// The invocation signalled iteration exhaustion.
    Exhausted,
}

impl CallFlow {
    /// Returns the produced value, or `None` for exhaustion.
    #[must_use]
    pub fn value(self) -> Option<Value> {
        match self {
            Self::Value(v) => Some(v),
            Self::Exhausted => None,
        }
    }
}
