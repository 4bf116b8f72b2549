//! Fast-call signature table.
//!
//! Host functions whose static signature appears in [`FUNC_TYPES`] are called
//! with `CallTyped(index)`: the VM knows the arity from the table and skips
//! the generic argument marshalling of `Call`.

use crate::types::{Type, TypeView};

/// Scalar types that can appear in a fast-call signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prim {
    Bool,
    Int,
    Float,
    Str,
    Duration,
    Any,
}

impl Prim {
    fn matches(self, ty: &Type<'_>) -> bool {
        matches!(
            (self, ty),
            (Prim::Bool, Type::Bool)
                | (Prim::Int, Type::Int)
                | (Prim::Float, Type::Float)
                | (Prim::Str, Type::Str)
                | (Prim::Duration, Type::Duration)
                | (Prim::Any, Type::Any)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuncShape {
    pub params: &'static [Prim],
    pub ret: Prim,
}

impl FuncShape {
    const fn new(params: &'static [Prim], ret: Prim) -> Option<Self> {
        Some(Self { params, ret })
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Slot 0 is reserved so that a zero index always means "not found".
pub const FUNC_TYPES: [Option<FuncShape>; 16] = [
    None,
    FuncShape::new(&[], Prim::Duration),
    FuncShape::new(&[], Prim::Int),
    FuncShape::new(&[], Prim::Float),
    FuncShape::new(&[], Prim::Str),
    FuncShape::new(&[], Prim::Bool),
    FuncShape::new(&[Prim::Int], Prim::Int),
    FuncShape::new(&[Prim::Float], Prim::Float),
    FuncShape::new(&[Prim::Str], Prim::Str),
    FuncShape::new(&[Prim::Str], Prim::Bool),
    FuncShape::new(&[Prim::Str], Prim::Int),
    FuncShape::new(&[Prim::Int, Prim::Int], Prim::Int),
    FuncShape::new(&[Prim::Float, Prim::Float], Prim::Float),
    FuncShape::new(&[Prim::Str, Prim::Str], Prim::Bool),
    FuncShape::new(&[Prim::Str, Prim::Str], Prim::Str),
    FuncShape::new(&[Prim::Any], Prim::Any),
];

/// Looks up the fast-call slot of a function type.
///
/// Returns `(index, true)` on a match and `(0, false)` otherwise. Nominal
/// function types only match when `allow_named` is set; variadic functions
/// and non-function types never match.
pub fn typed_func_index(ty: &Type<'_>, allow_named: bool) -> (usize, bool) {
    let Some(signature) = ty.signature() else {
        return (0, false);
    };
    if signature.variadic || (ty.name().is_some() && !allow_named) {
        return (0, false);
    }
    for (index, shape) in FUNC_TYPES.iter().enumerate() {
        let Some(shape) = shape else { continue };
        if shape.params.len() == signature.params.len()
            && shape.ret.matches(signature.ret)
            && shape
                .params
                .iter()
                .zip(signature.params)
                .all(|(prim, param)| prim.matches(param))
        {
            return (index, true);
        }
    }
    (0, false)
}
