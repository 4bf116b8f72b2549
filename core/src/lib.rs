//! Core of the Sift expression language.
//!
//! Trees built by the host go through the checker, the optimizer and the
//! bytecode compiler, and the resulting programs run on a stack VM. See
//! [`api::Engine`] for the usual entry point.

pub mod api;
pub mod ast;
pub mod builtins;
pub mod checker;
pub mod compiler;
pub mod optimizer;
pub mod patcher;
pub mod types;
pub mod values;
pub mod vm;

/// Test utilities for enabling logging in tests
#[cfg(test)]
pub mod test_utils {
    /// Initialize tracing subscriber for tests with DEBUG level
    /// Call this at the start of tests where you want to see logging output
    ///
    /// # Example
    /// ```ignore
    /// #[test]
    /// fn test_predicate_loops() {
    ///     test_utils::init_test_logging();
    ///     // ... your test code
    /// }
    /// ```
    pub fn init_test_logging() {
        use tracing_subscriber::{EnvFilter, fmt};

        // Try to initialize, ignore error if already initialized
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }
}
