use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::function::Function;

/// Identifier of an interned string.
///
/// To get the actual string content, use [`Interns::get_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StringId(u32);

/// Identifier of a registered code object.
///
/// Code objects are registered once (by the compiler sitting outside this
/// crate) and referenced by id everywhere else, so callables stay small and
/// copyable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionId(u32);

/// Identifier of a host-registered native function.
///
/// The function table itself lives on the runtime; callables carry only the
/// id so dispatch stays a match over plain data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtFunctionId(pub(crate) u32);

/// Names the runtime needs constantly, pre-interned at fixed ids so lookups
/// never have to intern at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StaticStrings {
    /// `__init__` — the initializer method name.
    Init,
    /// `__next__` — the iterator-step method name.
    Next,
    /// `self` — the conventional first parameter of a method.
    SelfArg,
}

impl StaticStrings {
    /// All static strings, in the order they occupy the interner's first slots.
    pub const ALL: [Self; 3] = [Self::Init, Self::Next, Self::SelfArg];

    /// Returns the string content.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "__init__",
            Self::Next => "__next__",
            Self::SelfArg => "self",
        }
    }
}

impl From<StaticStrings> for StringId {
    fn from(s: StaticStrings) -> Self {
        // Static strings are interned first, so their ids equal their ordinal.
        StringId(s as u32)
    }
}

/// The string interner and code-object table.
///
/// Strings are deduplicated, so two `StringId`s are equal iff their contents
/// are equal; this is what lets attribute names and dict keys compare by id.
#[derive(Debug)]
pub struct Interns {
    strings: Vec<Box<str>>,
    lookup: AHashMap<Box<str>, StringId>,
    functions: Vec<Function>,
}

impl Default for Interns {
    fn default() -> Self {
        Self::new()
    }
}

impl Interns {
    /// Creates an interner with the static strings pre-interned.
    #[must_use]
    pub fn new() -> Self {
        let mut interns = Self {
            strings: Vec::new(),
            lookup: AHashMap::new(),
            functions: Vec::new(),
        };
        for s in StaticStrings::ALL {
            let id = interns.intern(s.as_str());
            debug_assert_eq!(id, StringId::from(s), "static string interned out of order");
        }
        interns
    }

    /// Interns a string, returning the existing id if already present.
    pub fn intern(&mut self, s: &str) -> StringId {
        if let Some(id) = self.lookup.get(s) {
            return *id;
        }
        let id = StringId(u32::try_from(self.strings.len()).expect("interner overflow"));
        self.strings.push(s.into());
        self.lookup.insert(s.into(), id);
        id
    }

    /// Returns the content of an interned string.
    ///
    /// # Panics
    /// Panics if the id did not come from this interner.
    #[must_use]
    pub fn get_str(&self, id: StringId) -> &str {
        &self.strings[id.0 as usize]
    }

    /// Number of dynamically interned strings (excludes the static set).
    #[must_use]
    pub fn dynamic_count(&self) -> usize {
        self.strings.len() - StaticStrings::ALL.len()
    }

    /// Registers a code object, returning its id.
    pub fn declare_function(&mut self, function: Function) -> FunctionId {
        let id = FunctionId(u32::try_from(self.functions.len()).expect("function table overflow"));
        self.functions.push(function);
        id
    }

    /// Returns a registered code object.
    ///
    /// # Panics
    /// Panics if the id did not come from this interner.
    #[must_use]
    pub fn function(&self, id: FunctionId) -> &Function {
        &self.functions[id.0 as usize]
    }
}
