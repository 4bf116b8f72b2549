//! The builtin function table.
//!
//! Builtins are addressed by their position in [`BUILTINS`]. Predicate
//! builtins (`all`, `filter`, `reduce`, ...) have no runtime implementation:
//! the compiler turns them into inline loops.

mod functions;

#[cfg(test)]
mod builtins_test;

use crate::values::Value;
use crate::vm::RuntimeErrorKind;

pub use functions::parse_duration;

pub type BuiltinFn = fn(&[Value]) -> Result<Value, RuntimeErrorKind>;

#[derive(Debug, Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub min_args: usize,
    /// `None` for variadic builtins.
    pub max_args: Option<usize>,
    /// Position of the predicate argument, for builtins compiled to loops.
    pub predicate: Option<usize>,
    pub imp: Option<BuiltinFn>,
}

impl Builtin {
    const fn call(name: &'static str, min_args: usize, max_args: usize, imp: BuiltinFn) -> Self {
        Self {
            name,
            min_args,
            max_args: Some(max_args),
            predicate: None,
            imp: Some(imp),
        }
    }

    const fn variadic(name: &'static str, min_args: usize, imp: BuiltinFn) -> Self {
        Self {
            name,
            min_args,
            max_args: None,
            predicate: None,
            imp: Some(imp),
        }
    }

    const fn looping(name: &'static str, min_args: usize, max_args: usize) -> Self {
        Self {
            name,
            min_args,
            max_args: Some(max_args),
            predicate: Some(1),
            imp: None,
        }
    }

    pub fn accepts(&self, argc: usize) -> bool {
        argc >= self.min_args && self.max_args.is_none_or(|max| argc <= max)
    }

    pub fn is_predicate(&self) -> bool {
        self.predicate.is_some()
    }
}

pub static BUILTINS: &[Builtin] = &[
    Builtin::call("len", 1, 1, functions::len),
    Builtin::call("abs", 1, 1, functions::abs),
    Builtin::call("int", 1, 1, functions::int),
    Builtin::call("float", 1, 1, functions::float),
    Builtin::call("string", 1, 1, functions::string),
    Builtin::call("upper", 1, 1, functions::upper),
    Builtin::call("lower", 1, 1, functions::lower),
    Builtin::call("trim", 1, 1, functions::trim),
    Builtin::call("keys", 1, 1, functions::keys),
    Builtin::call("values", 1, 1, functions::values),
    Builtin::variadic("max", 1, functions::max),
    Builtin::variadic("min", 1, functions::min),
    Builtin::call("first", 1, 1, functions::first),
    Builtin::call("last", 1, 1, functions::last),
    Builtin::call("fromJSON", 1, 1, functions::from_json),
    Builtin::call("toJSON", 1, 1, functions::to_json),
    Builtin::call("duration", 1, 1, functions::duration),
    Builtin::looping("all", 2, 2),
    Builtin::looping("none", 2, 2),
    Builtin::looping("any", 2, 2),
    Builtin::looping("one", 2, 2),
    Builtin::looping("filter", 2, 2),
    Builtin::looping("map", 2, 2),
    Builtin::looping("count", 2, 2),
    Builtin::looping("find", 2, 2),
    Builtin::looping("findIndex", 2, 2),
    Builtin::looping("sum", 1, 2),
    Builtin::looping("reduce", 2, 3),
];

pub fn lookup(name: &str) -> Option<(usize, &'static Builtin)> {
    BUILTINS
        .iter()
        .enumerate()
        .find(|(_, builtin)| builtin.name == name)
}

pub fn get(id: usize) -> Option<&'static Builtin> {
    BUILTINS.get(id)
}
