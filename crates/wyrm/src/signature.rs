use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::args::ArgValues;
use crate::error::{RunError, RunResult};
use crate::intern::{Interns, StringId};
use crate::value::Value;

/// The positional parameter list of a code object.
///
/// Only plain positional-or-keyword parameters exist; no defaults, no
/// varargs. Binding fills parameters left to right from positionals, then
/// matches keywords by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    params: SmallVec<[StringId; 4]>,
}

impl Signature {
    /// Creates a signature from parameter names, in declaration order.
    #[must_use]
    pub fn new(params: impl IntoIterator<Item = StringId>) -> Self {
        Self {
            params: params.into_iter().collect(),
        }
    }

    /// The first parameter, conventionally the receiver of a method.
    #[must_use]
    pub fn first_param(&self) -> Option<StringId> {
        self.params.first().copied()
    }

    /// Number of declared parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether the signature declares no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Binds call arguments to parameters, producing the initial local
    /// bindings of a frame.
    ///
    /// `func_name` is used in diagnostics only. Errors are `TypeMismatch`:
    /// too many positionals, an unknown or duplicate keyword, or a parameter
    /// left unbound.
    pub fn bind(
        &self,
        func_name: &str,
        args: ArgValues,
        interns: &Interns,
    ) -> RunResult<Vec<(StringId, Value)>> {
        let (positional, kwargs) = args.into_parts();
        if positional.len() > self.params.len() {
            return Err(RunError::type_mismatch(format!(
                "{func_name}() takes {expected} positional arguments but {got} were given",
                expected = self.params.len(),
                got = positional.len(),
            )));
        }

        let mut bound: Vec<(StringId, Option<Value>)> =
            self.params.iter().map(|&p| (p, None)).collect();
        for (slot, value) in bound.iter_mut().zip(positional) {
            slot.1 = Some(value);
        }

        for (name, value) in kwargs.iter() {
            let Some(slot) = bound.iter_mut().find(|(p, _)| *p == name) else {
                return Err(RunError::type_mismatch(format!(
                    "{func_name}() got an unexpected keyword argument '{kw}'",
                    kw = interns.get_str(name),
                )));
            };
            if slot.1.is_some() {
                return Err(RunError::type_mismatch(format!(
                    "{func_name}() got multiple values for argument '{kw}'",
                    kw = interns.get_str(name),
                )));
            }
            slot.1 = Some(value);
        }

        bound
            .into_iter()
            .map(|(param, value)| {
                value.map(|v| (param, v)).ok_or_else(|| {
                    RunError::type_mismatch(format!(
                        "{func_name}() missing required argument '{param}'",
                        param = interns.get_str(param),
                    ))
                })
            })
            .collect()
    }
}
