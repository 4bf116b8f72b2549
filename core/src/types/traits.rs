//! The type-descriptor capability.
//!
//! The checker, compiler and VM only look at host types through [`TypeView`]:
//! the kind of a type, its fields and methods, its element/key/value types and
//! its function signature. Nothing else about the host object model leaks in.

use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Nil,
    Bool,
    Int,
    Float,
    Str,
    Duration,
    Any,
    Array,
    Map,
    Struct,
    Function,
}

/// A function signature as declared by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature<'a> {
    pub params: &'a [&'a Type<'a>],
    pub ret: &'a Type<'a>,
    pub variadic: bool,
}

impl<'a> Signature<'a> {
    /// Number of arguments accepted, as `(min, max)`; `max` is `None` for
    /// variadic signatures.
    pub fn arity(&self) -> (usize, Option<usize>) {
        if self.variadic {
            (self.params.len().saturating_sub(1), None)
        } else {
            (self.params.len(), Some(self.params.len()))
        }
    }

    /// Expected type of the argument at `index`.
    pub fn param(&self, index: usize) -> Option<&'a Type<'a>> {
        if self.variadic && index + 1 >= self.params.len() {
            return match self.params.last() {
                Some(Type::Array(elem)) => Some(*elem),
                other => other.copied(),
            };
        }
        self.params.get(index).copied()
    }
}

pub trait TypeView<'a>: Copy {
    fn kind(self) -> Kind;

    /// Nominal name, for structs and named function types.
    fn name(self) -> Option<&'a str>;

    fn elem(self) -> Option<&'a Type<'a>>;

    fn key(self) -> Option<&'a Type<'a>>;

    fn value(self) -> Option<&'a Type<'a>>;

    fn fields(self) -> &'a [(&'a str, &'a Type<'a>)];

    fn methods(self) -> &'a [(&'a str, &'a Type<'a>)];

    fn signature(self) -> Option<Signature<'a>>;

    /// Field lookup: position in the runtime field order and declared type.
    fn field(self, name: &str) -> Option<(usize, &'a Type<'a>)> {
        self.fields()
            .iter()
            .position(|(n, _)| *n == name)
            .map(|i| (i, self.fields()[i].1))
    }

    /// Method lookup: position in the method table and declared type
    /// (receiver included).
    fn method(self, name: &str) -> Option<(usize, &'a Type<'a>)> {
        self.methods()
            .iter()
            .position(|(n, _)| *n == name)
            .map(|i| (i, self.methods()[i].1))
    }
}

impl<'a> TypeView<'a> for &'a Type<'a> {
    fn kind(self) -> Kind {
        match self {
            Type::Nil => Kind::Nil,
            Type::Bool => Kind::Bool,
            Type::Int => Kind::Int,
            Type::Float => Kind::Float,
            Type::Str => Kind::Str,
            Type::Duration => Kind::Duration,
            Type::Any => Kind::Any,
            Type::Array(_) => Kind::Array,
            Type::Map(..) => Kind::Map,
            Type::Struct { .. } => Kind::Struct,
            Type::Function { .. } => Kind::Function,
        }
    }

    fn name(self) -> Option<&'a str> {
        match self {
            Type::Struct { name, .. } => Some(name),
            Type::Function { name, .. } => *name,
            _ => None,
        }
    }

    fn elem(self) -> Option<&'a Type<'a>> {
        match self {
            Type::Array(elem) => Some(elem),
            _ => None,
        }
    }

    fn key(self) -> Option<&'a Type<'a>> {
        match self {
            Type::Map(key, _) => Some(key),
            _ => None,
        }
    }

    fn value(self) -> Option<&'a Type<'a>> {
        match self {
            Type::Map(_, value) => Some(value),
            _ => None,
        }
    }

    fn fields(self) -> &'a [(&'a str, &'a Type<'a>)] {
        match self {
            Type::Struct { fields, .. } => fields,
            _ => &[],
        }
    }

    fn methods(self) -> &'a [(&'a str, &'a Type<'a>)] {
        match self {
            Type::Struct { methods, .. } => methods,
            _ => &[],
        }
    }

    fn signature(self) -> Option<Signature<'a>> {
        match self {
            Type::Function {
                params,
                ret,
                variadic,
                ..
            } => Some(Signature {
                params,
                ret,
                variadic: *variadic,
            }),
            _ => None,
        }
    }
}
