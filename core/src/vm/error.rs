//! Runtime errors.
//!
//! A run stops at the first error. The error carries the source offset of the
//! instruction that failed, taken from the program's position table.

use crate::api::{Diagnostic, Severity, Span};

/// What went wrong during execution.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeErrorKind {
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("integer divide by zero")]
    DivisionByZero,

    #[error("index out of range: {index} with length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("cannot fetch {property} from {from}")]
    CannotFetch { from: String, property: String },

    #[error("cannot fetch {0} from nil")]
    NilDereference(String),

    #[error("unknown name {0}")]
    UnknownName(String),

    #[error("{0} is not callable")]
    NotCallable(String),

    #[error("{0}")]
    Host(String),

    #[error("host function {name} panicked: {message}")]
    HostPanic { name: String, message: String },

    #[error("debugger detached")]
    DebuggerDetached,

    #[error("stack underflow")]
    StackUnderflow,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl RuntimeErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            RuntimeErrorKind::InvalidOperation(_) => "R001",
            RuntimeErrorKind::DivisionByZero => "R002",
            RuntimeErrorKind::IndexOutOfRange { .. } => "R003",
            RuntimeErrorKind::CannotFetch { .. } => "R004",
            RuntimeErrorKind::NilDereference(_) => "R005",
            RuntimeErrorKind::UnknownName(_) => "R006",
            RuntimeErrorKind::NotCallable(_) => "R007",
            RuntimeErrorKind::Host(_) => "R008",
            RuntimeErrorKind::HostPanic { .. } => "R009",
            RuntimeErrorKind::DebuggerDetached => "R010",
            RuntimeErrorKind::StackUnderflow => "R011",
            RuntimeErrorKind::InvalidArgument(_) => "R012",
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        RuntimeErrorKind::InvalidOperation(message.into())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}")]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    /// Byte offset of the expression that failed.
    pub pos: usize,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, pos: usize) -> Self {
        Self { kind, pos }
    }

    /// Convert to a Diagnostic for API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic {
            severity: Severity::Error,
            message: self.kind.to_string(),
            span: Span::at(self.pos),
            related: Vec::new(),
            help: None,
            code: Some(self.kind.code().to_string()),
        }
    }
}
