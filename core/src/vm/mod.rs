//! The virtual machine.

mod debug;
mod error;
mod instruction_set;
pub mod operators;
mod program;
mod runtime;
mod stack;


pub use debug::{Debugger, Positions};
pub use error::{RuntimeError, RuntimeErrorKind};
pub use instruction_set::Instruction;
pub use program::Program;
pub use runtime::Vm;
