//! Static type checking.
//!
//! The checker annotates every node with a [`Fact`](crate::types::Fact) and
//! collects all type errors in one pass rather than stopping at the first.

#[allow(clippy::module_inception)]
mod checker;
mod error;


pub use checker::check;
pub use error::{TypeError, TypeErrorKind};
pub use crate::types::typed_func_index;
