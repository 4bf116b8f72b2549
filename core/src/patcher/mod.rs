//! Stock tree visitors.
//!
//! Patchers are ordinary [`Visitor`](crate::ast::Visitor)s handed to
//! [`Engine::compile`](crate::api::Engine::compile). They run before the
//! checker's final pass, so the trees they produce are checked like any other.

mod value_getter;

#[cfg(test)]
mod value_getter_test;

pub use value_getter::{GETTERS, ValueGetter};
