pub mod func_types;
pub mod manager;
pub mod traits;
mod types;

#[cfg(test)]
mod manager_test;

pub use func_types::{FUNC_TYPES, FuncShape, Prim, typed_func_index};
pub use manager::TypeManager;
pub use traits::{Kind, Signature, TypeView};
pub use types::{Fact, Type};
