//! Compilation errors.

use crate::api::{Diagnostic, Severity, Span};

/// Errors that stop compilation.
///
/// The compiler fails fast: the first offending node is reported. Type
/// errors are caught by the checker before compilation; an `InvalidNode`
/// means a tree with recorded type errors reached the compiler anyway.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("node at offset {pos} failed type checking")]
    InvalidNode { pos: usize },

    #[error("predicate outside of a builtin call")]
    UnexpectedPredicate { pos: usize },

    #[error("#{name} used outside of a predicate")]
    PointerOutsidePredicate { name: String, pos: usize },

    #[error("unknown builtin {name}")]
    UnknownBuiltin { name: String, pos: usize },

    /// Too many constants in the constant pool (limit: ~4 billion)
    #[error("too many constants")]
    TooManyConstants,

    /// Jump distance exceeds the operand range.
    #[error("jump distance too large")]
    JumpTooFar,

    /// A rewrite produced a tree the compiler cannot accept.
    #[error("internal invariant violated: {message}")]
    Invariant { message: String, pos: usize },
}

impl CompileError {
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::InvalidNode { .. } => "C001",
            CompileError::UnexpectedPredicate { .. } => "C002",
            CompileError::PointerOutsidePredicate { .. } => "C003",
            CompileError::UnknownBuiltin { .. } => "C004",
            CompileError::TooManyConstants => "C005",
            CompileError::JumpTooFar => "C006",
            CompileError::Invariant { .. } => "C007",
        }
    }

    pub fn pos(&self) -> usize {
        match self {
            CompileError::InvalidNode { pos }
            | CompileError::UnexpectedPredicate { pos }
            | CompileError::PointerOutsidePredicate { pos, .. }
            | CompileError::UnknownBuiltin { pos, .. }
            | CompileError::Invariant { pos, .. } => *pos,
            CompileError::TooManyConstants | CompileError::JumpTooFar => 0,
        }
    }

    /// Convert to a Diagnostic for API boundary.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic {
            severity: Severity::Error,
            message: self.to_string(),
            span: Span::at(self.pos()),
            related: Vec::new(),
            help: None,
            code: Some(self.code().to_string()),
        }
    }
}
