use crate::api::{Diagnostic, Severity, Span};

/// A type error, positioned at the offending node.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct TypeError {
    pub kind: TypeErrorKind,
    pub pos: usize,
}

/// Specific kinds of type errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeErrorKind {
    #[error("invalid operation: {left} {op} {right}")]
    Mismatch {
        op: String,
        left: String,
        right: String,
    },

    #[error("invalid operation: {op}{operand}")]
    UnaryMismatch { op: String, operand: String },

    #[error("unknown name {name}")]
    UnknownName { name: String },

    #[error("type {ty} has no field {field}")]
    UnknownField {
        field: String,
        ty: String,
        available: Vec<String>,
    },

    #[error("type {ty} cannot be indexed by {property}")]
    NotIndexable { ty: String, property: String },

    #[error("{ty} is not callable")]
    NotCallable { ty: String },

    #[error("{name} expects {expected} argument(s), got {found}")]
    ArgumentCount {
        name: String,
        expected: String,
        found: usize,
    },

    #[error("argument {index} of {name}: expected {expected}, got {found}")]
    ArgumentType {
        name: String,
        index: usize,
        expected: String,
        found: String,
    },

    #[error("#{name} used outside of a predicate")]
    PointerOutsidePredicate { name: String },

    #[error("#acc used outside of reduce")]
    AccumulatorOutsideReduce,

    #[error("unknown pointer #{name}")]
    UnknownPointer { name: String },

    #[error("unknown builtin {name}")]
    UnknownBuiltin { name: String },

    #[error("{name} expects a predicate as argument {index}")]
    PredicateExpected { name: String, index: usize },

    #[error("{context} must be bool, got {found}")]
    NotBool { context: String, found: String },

    #[error("predicate outside of a builtin call")]
    UnexpectedPredicate,

    #[error("map keys must be strings, got {found}")]
    InvalidMapKey { found: String },
}

impl TypeErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            TypeErrorKind::Mismatch { .. } => "E001",
            TypeErrorKind::UnaryMismatch { .. } => "E002",
            TypeErrorKind::UnknownName { .. } => "E003",
            TypeErrorKind::UnknownField { .. } => "E004",
            TypeErrorKind::NotIndexable { .. } => "E005",
            TypeErrorKind::NotCallable { .. } => "E006",
            TypeErrorKind::ArgumentCount { .. } => "E007",
            TypeErrorKind::ArgumentType { .. } => "E008",
            TypeErrorKind::PointerOutsidePredicate { .. } => "E009",
            TypeErrorKind::AccumulatorOutsideReduce => "E010",
            TypeErrorKind::UnknownPointer { .. } => "E011",
            TypeErrorKind::UnknownBuiltin { .. } => "E012",
            TypeErrorKind::PredicateExpected { .. } => "E013",
            TypeErrorKind::NotBool { .. } => "E014",
            TypeErrorKind::UnexpectedPredicate => "E015",
            TypeErrorKind::InvalidMapKey { .. } => "E016",
        }
    }

    fn help(&self) -> Option<String> {
        match self {
            TypeErrorKind::UnknownField { available, .. } if !available.is_empty() => {
                Some(format!("available fields: {}", available.join(", ")))
            }
            TypeErrorKind::PointerOutsidePredicate { .. } => {
                Some("pointers are only valid inside a predicate such as all(xs, {# > 0})".into())
            }
            TypeErrorKind::AccumulatorOutsideReduce => {
                Some("#acc is only defined in the predicate of reduce".into())
            }
            TypeErrorKind::UnknownName { .. } => {
                Some("the environment does not declare this name".into())
            }
            _ => None,
        }
    }
}

impl TypeError {
    pub fn new(kind: TypeErrorKind, pos: usize) -> Self {
        Self { kind, pos }
    }

    /// Convert to a Diagnostic for API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic {
            severity: Severity::Error,
            message: self.kind.to_string(),
            span: Span::at(self.pos),
            related: Vec::new(),
            help: self.kind.help(),
            code: Some(self.kind.code().to_string()),
        }
    }
}
