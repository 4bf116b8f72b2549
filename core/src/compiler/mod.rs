//! Bytecode compiler.
//!
//! Transforms a checked (and usually optimized) tree into a
//! [`Program`](crate::vm::Program) for the VM.
//!
//! ## Design
//!
//! - Single recursive pass, fail-fast on the first node it cannot lower
//! - Jump patching for short-circuit operators, conditionals and `?.`
//! - Predicate builtins become inline loops over a VM loop scope
//! - Typed fast paths (`IntBinOp`, `FloatBinOp`, `CallTyped`) chosen from the
//!   checker's facts

mod bytecode;
mod error;


pub use bytecode::BytecodeCompiler;
pub use error::CompileError;

use crate::ast::NodeRef;
use crate::types::Type;
use crate::vm::Program;

/// Compiles the tree rooted at `root` for the environment type `env`.
pub fn compile<'a>(root: NodeRef<'a>, env: Option<&'a Type<'a>>) -> Result<Program, CompileError> {
    BytecodeCompiler::compile(root, env)
}
