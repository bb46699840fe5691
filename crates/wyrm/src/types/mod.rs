//! Runtime data types stored on the heap, plus the builtin type lattice.

mod class;
mod dict;
mod generator;
mod list;
mod tuple;
mod r#type;

pub use class::{ClassObject, Instance, make_class};
pub use dict::Dict;
pub use generator::{Generator, GeneratorState};
pub use list::List;
pub use tuple::Tuple;
pub use r#type::{Type, TypeRegistry};
