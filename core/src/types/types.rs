use core::fmt::{self, Display};

/// A host type as seen by the checker.
///
/// Types are interned by [`TypeManager`](super::manager::TypeManager), so
/// structurally equal types share one allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type<'a> {
    Nil,
    Bool,
    Int,
    Float,
    Str,
    Duration,
    /// Statically unconstrained: checked at runtime.
    Any,

    Array(&'a Type<'a>),
    Map(&'a Type<'a>, &'a Type<'a>),

    /// Struct-like host type. Field order is the runtime field order; method
    /// signatures include the receiver as their first parameter.
    Struct {
        name: &'a str,
        fields: &'a [(&'a str, &'a Type<'a>)],
        methods: &'a [(&'a str, &'a Type<'a>)],
    },

    Function {
        /// Set for nominal function types (`type Handler = fn() -> Duration`).
        name: Option<&'a str>,
        params: &'a [&'a Type<'a>],
        ret: &'a Type<'a>,
        /// The last parameter is an array collecting the trailing arguments.
        variadic: bool,
    },
}

impl Type<'_> {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    /// Whether `nil` is a valid value of this type.
    pub fn is_nilable(&self) -> bool {
        matches!(
            self,
            Type::Nil
                | Type::Any
                | Type::Array(_)
                | Type::Map(..)
                | Type::Struct { .. }
                | Type::Function { .. }
        )
    }
}

impl Display for Type<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Nil => write!(f, "nil"),
            Type::Bool => write!(f, "bool"),
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::Str => write!(f, "string"),
            Type::Duration => write!(f, "duration"),
            Type::Any => write!(f, "any"),
            Type::Array(elem) => write!(f, "[]{}", elem),
            Type::Map(key, value) => write!(f, "map[{}]{}", key, value),
            Type::Struct { name, .. } => write!(f, "{}", name),
            Type::Function { name: Some(name), .. } => write!(f, "{}", name),
            Type::Function {
                name: None,
                params,
                ret,
                variadic,
            } => {
                write!(f, "func(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    if *variadic && i + 1 == params.len() {
                        match param {
                            Type::Array(elem) => write!(f, "...{}", elem)?,
                            other => write!(f, "...{}", other)?,
                        }
                    } else {
                        write!(f, "{}", param)?;
                    }
                }
                write!(f, ") {}", ret)
            }
        }
    }
}

/// What the checker knows about a node's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fact<'a> {
    Known(&'a Type<'a>),
    /// Dynamic: the VM checks it at runtime.
    Unknown,
    /// A type error was reported for this node (or one of its children).
    Invalid,
}

impl<'a> Fact<'a> {
    /// `Any` carries no static information, so it becomes `Unknown`.
    pub fn of(ty: &'a Type<'a>) -> Self {
        match ty {
            Type::Any => Fact::Unknown,
            _ => Fact::Known(ty),
        }
    }

    pub fn ty(self) -> Option<&'a Type<'a>> {
        match self {
            Fact::Known(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn is(self, expected: &Type<'_>) -> bool {
        matches!(self, Fact::Known(ty) if ty == expected)
    }

    pub fn is_unknown(self) -> bool {
        matches!(self, Fact::Unknown)
    }

    pub fn is_invalid(self) -> bool {
        matches!(self, Fact::Invalid)
    }
}

impl Display for Fact<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fact::Known(ty) => write!(f, "{}", ty),
            Fact::Unknown => write!(f, "any"),
            Fact::Invalid => write!(f, "<invalid>"),
        }
    }
}
