//! Configuration options for the Sift engine.

use crate::optimizer::MAX_PASSES;

/// Configuration options for the Sift engine.
///
/// # Example
///
/// ```
/// use sift_core::api::EngineOptions;
///
/// let options = EngineOptions {
///     strict: false,
///     ..EngineOptions::default()
/// };
/// assert!(options.optimize);
/// ```
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Reject identifiers the environment type does not declare.
    ///
    /// Only meaningful for struct environments; map and untyped environments
    /// resolve names at run time.
    ///
    /// Default: true
    pub strict: bool,

    /// Run constant folding and call fusion before compiling.
    ///
    /// Default: true
    pub optimize: bool,

    /// Upper bound on passes of a visitor that keeps asking to repeat.
    ///
    /// Default: 1000
    pub max_visitor_passes: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            strict: true,
            optimize: true,
            max_visitor_passes: MAX_PASSES,
        }
    }
}
