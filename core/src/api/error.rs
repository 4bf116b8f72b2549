//! Public error types for the Sift API.
//!
//! This module defines the stable error types exposed to library users.
//! Internal errors (type, compile and runtime) are converted to these public
//! types at API boundaries.

use core::fmt;
use core::ops::Range;

use crate::checker::TypeError;
use crate::compiler::CompileError;
use crate::vm::RuntimeError;

/// Public error type for all Sift operations.
///
/// This is the stable error type exposed to library users. Internal error
/// representations may change, but this public API remains stable.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Compilation errors (type errors, compiler invariants).
    ///
    /// Contains one or more diagnostics with source locations and context.
    #[error("compilation failed with {} error(s)", count_errors(.diagnostics))]
    Compilation { diagnostics: Vec<Diagnostic> },

    /// Runtime errors during evaluation (e.g., division by zero, index out of bounds).
    #[error("runtime error: {}", .diagnostic.message)]
    Runtime { diagnostic: Diagnostic },
}

fn count_errors(diagnostics: &[Diagnostic]) -> usize {
    diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count()
}

impl Error {
    /// All diagnostics carried by this error.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Error::Compilation { diagnostics } => diagnostics,
            Error::Runtime { diagnostic } => core::slice::from_ref(diagnostic),
        }
    }
}

/// Byte range in the host's source text.
///
/// Trees are built by the host, so positions are whatever offsets its parser
/// recorded; a node knows a single offset and spans one byte from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Span(pub Range<usize>);

impl Span {
    pub fn at(pos: usize) -> Self {
        Span(pos..pos + 1)
    }

    pub fn start(&self) -> usize {
        self.0.start
    }

    pub fn end(&self) -> usize {
        self.0.end
    }
}

/// A diagnostic message (error, warning, or info) with source location.
///
/// Maps cleanly to LSP diagnostics for IDE integration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level (error, warning, info).
    pub severity: Severity,

    /// Primary diagnostic message.
    pub message: String,

    /// Source location of the primary issue.
    pub span: Span,

    /// Related locations that provide additional context.
    pub related: Vec<RelatedInfo>,

    /// Optional help text suggesting how to fix the issue.
    pub help: Option<String>,

    /// Optional error code (e.g., "E001") for documentation lookup.
    pub code: Option<String>,
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - compilation cannot succeed.
    Error,
    /// Warning - suspicious code that might be wrong.
    Warning,
    /// Info - informational message.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Related information for a diagnostic (e.g., "defined here").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    /// Source location of the related information.
    pub span: Span,

    /// Message explaining the relevance.
    pub message: String,
}

// ============================================================================
// Conversion from internal errors
// ============================================================================

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::Compilation {
            diagnostics: vec![err.to_diagnostic()],
        }
    }
}

impl From<Vec<TypeError>> for Error {
    fn from(errors: Vec<TypeError>) -> Self {
        Error::Compilation {
            diagnostics: errors.iter().map(TypeError::to_diagnostic).collect(),
        }
    }
}

impl From<CompileError> for Error {
    fn from(err: CompileError) -> Self {
        Error::Compilation {
            diagnostics: vec![err.to_diagnostic()],
        }
    }
}

impl From<RuntimeError> for Error {
    fn from(err: RuntimeError) -> Self {
        Error::Runtime {
            diagnostic: err.to_diagnostic(),
        }
    }
}
