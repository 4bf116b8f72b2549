//! Public API for the Sift expression language.
//!
//! The host builds an expression tree (usually with its own parser and a
//! [`TreeBuilder`](crate::ast::TreeBuilder)), declares the environment type,
//! and lets the [`Engine`] run the pipeline:
//!
//! 1. Visitors (host patchers, [`ValueGetter`](crate::patcher::ValueGetter))
//! 2. Checker
//! 3. Optimizer
//! 4. Compiler
//!
//! The resulting [`Program`](crate::vm::Program) owns its data and can be run
//! any number of times, from any thread.

pub mod engine;
pub mod error;
pub mod options;

#[cfg(test)]
mod engine_test;

pub use engine::Engine;
pub use error::{Diagnostic, Error, RelatedInfo, Severity, Span};
pub use options::EngineOptions;
