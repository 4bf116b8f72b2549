//! Runtime values.
//!
//! Everything the VM pushes on its stack is a [`Value`]. Composite values are
//! reference counted so that copying a value onto the stack is cheap and values
//! can be shared across threads.

mod function;
mod json;
mod value;


pub use function::{Function, HostError, HostFn};
pub use value::{Record, Value};
