//! Sift - an embeddable expression language
//!
//! # Overview
//!
//! Sift compiles expression trees built by a host application into bytecode
//! and runs them against a host-provided environment. Common use cases include:
//!
//! - Filters and routing rules
//! - Feature flags and conditional logic
//! - Business rules engines
//!
//! The host owns the surface syntax: it builds trees with a [`TreeBuilder`]
//! (usually from its own parser) and records source offsets on the nodes, so
//! errors can be rendered against its source text.
//!
//! # Quick Start
//!
//! ```
//! use bumpalo::Bump;
//! use sift::ast::{BinaryOp, Tree, TreeBuilder};
//! use sift::{Engine, EngineOptions, Record, Value};
//!
//! let arena = Bump::new();
//! let engine = Engine::new(&arena, EngineOptions::default(), |types| {
//!     Some(types.structure("Env", &[("Age", types.int())], &[]))
//! });
//!
//! // Age >= 18
//! let b = TreeBuilder::new(&arena);
//! let tree = Tree::new(b.binary(BinaryOp::Ge, b.ident("Age"), b.int(18)));
//! let program = engine.compile(&tree, &mut []).unwrap();
//!
//! let env = Value::record(Record::new("Env").with_field("Age", 21i64));
//! assert_eq!(engine.run(&program, &env).unwrap(), Value::Bool(true));
//! ```
//!
//! # Host Functions
//!
//! Methods are plain closures attached to a [`Record`]; the first argument is
//! the receiver:
//!
//! ```
//! use sift::{Function, Record, Value};
//!
//! let greet = Function::new("Greet", |args| {
//!     Ok(Value::from(format!("hello {}", args[1])))
//! });
//! let user = Record::new("User").with_method("Greet", greet);
//! ```

// Hosts build trees in this arena.
pub use bumpalo;

// Re-export public API from sift_core
pub use sift_core::api::{
    Diagnostic, Engine, EngineOptions, Error, RelatedInfo, Severity, Span,
};

// Re-export commonly used types and values
pub use sift_core::types::{self, Type, TypeManager, TypeView};
pub use sift_core::values::{self, Function, HostError, Record, Value};

pub use sift_core::ast;
pub use sift_core::patcher::ValueGetter;
pub use sift_core::vm::{Debugger, Positions, Program, Vm};

mod error_renderer;

pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};
