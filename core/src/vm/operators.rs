//! Operator semantics shared by the VM and the constant folder.
//!
//! Integer arithmetic wraps on overflow. `/` and `**` always produce floats;
//! `%` is integer-only.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::ast::{BinaryOp, UnaryOp};
use crate::values::Value;
use crate::vm::RuntimeErrorKind;

type OpResult = Result<Value, RuntimeErrorKind>;

/// Upper bound on the length of an array produced by `..`.
pub const MAX_RANGE: i64 = 1_000_000;

fn mismatch(op: BinaryOp, a: &Value, b: &Value) -> RuntimeErrorKind {
    RuntimeErrorKind::invalid(format!(
        "{} {} {}",
        a.type_name(),
        op.symbol(),
        b.type_name()
    ))
}

// ============================================================================
// Unary
// ============================================================================

pub fn unary(op: UnaryOp, value: &Value) -> OpResult {
    match op {
        UnaryOp::Neg => negate(value),
        UnaryOp::Not => not(value),
    }
}

pub fn negate(value: &Value) -> OpResult {
    match value {
        Value::Int(i) => Ok(Value::Int(i.wrapping_neg())),
        Value::Float(f) => Ok(Value::Float(-f)),
        other => Err(RuntimeErrorKind::invalid(format!(
            "-{}",
            other.type_name()
        ))),
    }
}

pub fn not(value: &Value) -> OpResult {
    match value {
        Value::Bool(b) => Ok(Value::Bool(!b)),
        other => Err(RuntimeErrorKind::invalid(format!(
            "!{}",
            other.type_name()
        ))),
    }
}

// ============================================================================
// Typed fast paths
// ============================================================================

pub fn int_binary(op: BinaryOp, a: i64, b: i64) -> OpResult {
    Ok(match op {
        BinaryOp::Add => Value::Int(a.wrapping_add(b)),
        BinaryOp::Sub => Value::Int(a.wrapping_sub(b)),
        BinaryOp::Mul => Value::Int(a.wrapping_mul(b)),
        BinaryOp::Div => Value::Float(a as f64 / b as f64),
        BinaryOp::Mod => {
            if b == 0 {
                return Err(RuntimeErrorKind::DivisionByZero);
            }
            Value::Int(a.wrapping_rem(b))
        }
        BinaryOp::Pow => Value::Float((a as f64).powf(b as f64)),
        BinaryOp::Eq => Value::Bool(a == b),
        BinaryOp::Ne => Value::Bool(a != b),
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::Le => Value::Bool(a <= b),
        BinaryOp::Ge => Value::Bool(a >= b),
        BinaryOp::Range => return range(a, b),
        _ => return Err(mismatch(op, &Value::Int(a), &Value::Int(b))),
    })
}

pub fn float_binary(op: BinaryOp, a: f64, b: f64) -> OpResult {
    Ok(match op {
        BinaryOp::Add => Value::Float(a + b),
        BinaryOp::Sub => Value::Float(a - b),
        BinaryOp::Mul => Value::Float(a * b),
        BinaryOp::Div => Value::Float(a / b),
        BinaryOp::Pow => Value::Float(a.powf(b)),
        BinaryOp::Eq => Value::Bool(a == b),
        BinaryOp::Ne => Value::Bool(a != b),
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::Le => Value::Bool(a <= b),
        BinaryOp::Ge => Value::Bool(a >= b),
        _ => return Err(mismatch(op, &Value::Float(a), &Value::Float(b))),
    })
}

// ============================================================================
// Polymorphic
// ============================================================================

/// Evaluates any binary operator on two already-evaluated operands.
///
/// `&&`, `||` and `??` are accepted here for constant folding; compiled
/// programs short-circuit them with jumps instead.
pub fn binary(op: BinaryOp, a: &Value, b: &Value) -> OpResult {
    match op {
        BinaryOp::Eq => return Ok(Value::Bool(equal(a, b))),
        BinaryOp::Ne => return Ok(Value::Bool(!equal(a, b))),
        BinaryOp::In => return contains_element(b, a).map(Value::Bool),
        BinaryOp::Contains => return string_test(op, a, b, |s, t| s.contains(t)),
        BinaryOp::StartsWith => return string_test(op, a, b, |s, t| s.starts_with(t)),
        BinaryOp::EndsWith => return string_test(op, a, b, |s, t| s.ends_with(t)),
        BinaryOp::Matches => {
            let (Some(s), Some(pattern)) = (a.as_str(), b.as_str()) else {
                return Err(mismatch(op, a, b));
            };
            let re = regex::Regex::new(pattern)
                .map_err(|err| RuntimeErrorKind::InvalidArgument(err.to_string()))?;
            return Ok(Value::Bool(re.is_match(s)));
        }
        BinaryOp::Coalesce => return Ok(if a.is_nil() { b.clone() } else { a.clone() }),
        BinaryOp::And | BinaryOp::Or => {
            return match (a, b) {
                (Value::Bool(x), Value::Bool(y)) => Ok(Value::Bool(if op == BinaryOp::And {
                    *x && *y
                } else {
                    *x || *y
                })),
                _ => Err(mismatch(op, a, b)),
            };
        }
        _ => {}
    }

    match (a, b) {
        (Value::Int(x), Value::Int(y)) => int_binary(op, *x, *y),
        (Value::Int(x), Value::Float(y)) => float_binary(op, *x as f64, *y),
        (Value::Float(x), Value::Int(y)) => float_binary(op, *x, *y as f64),
        (Value::Float(x), Value::Float(y)) => float_binary(op, *x, *y),
        (Value::Str(x), Value::Str(y)) => match op {
            BinaryOp::Add => {
                let mut out = String::with_capacity(x.len() + y.len());
                out.push_str(x);
                out.push_str(y);
                Ok(Value::Str(Arc::from(out)))
            }
            _ if op.is_ordering() => Ok(Value::Bool(ordering_holds(op, x.cmp(y)))),
            _ => Err(mismatch(op, a, b)),
        },
        (Value::Duration(x), Value::Duration(y)) => match op {
            BinaryOp::Add => x
                .checked_add(*y)
                .map(Value::Duration)
                .ok_or_else(|| RuntimeErrorKind::invalid("duration overflow")),
            BinaryOp::Sub => x
                .checked_sub(*y)
                .map(Value::Duration)
                .ok_or_else(|| RuntimeErrorKind::invalid("negative duration")),
            _ if op.is_ordering() => Ok(Value::Bool(ordering_holds(op, x.cmp(y)))),
            _ => Err(mismatch(op, a, b)),
        },
        _ => Err(mismatch(op, a, b)),
    }
}

fn ordering_holds(op: BinaryOp, ordering: Ordering) -> bool {
    match op {
        BinaryOp::Lt => ordering == Ordering::Less,
        BinaryOp::Gt => ordering == Ordering::Greater,
        BinaryOp::Le => ordering != Ordering::Greater,
        BinaryOp::Ge => ordering != Ordering::Less,
        _ => false,
    }
}

fn string_test(op: BinaryOp, a: &Value, b: &Value, test: fn(&str, &str) -> bool) -> OpResult {
    match (a, b) {
        (Value::Str(s), Value::Str(t)) => Ok(Value::Bool(test(s, t))),
        _ => Err(mismatch(op, a, b)),
    }
}

/// `==` semantics: numbers compare by value across int and float, everything
/// else structurally.
pub fn equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(x), Value::Float(y)) | (Value::Float(y), Value::Int(x)) => *x as f64 == *y,
        _ => a == b,
    }
}

/// Numeric ordering used by `max`/`min`.
pub fn compare_numbers(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Int(x), Value::Float(y)) => (*x as f64).partial_cmp(y),
        (Value::Float(x), Value::Int(y)) => x.partial_cmp(&(*y as f64)),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y),
        _ => None,
    }
}

/// `needle in haystack`: array element, map key or struct field name.
pub fn contains_element(haystack: &Value, needle: &Value) -> Result<bool, RuntimeErrorKind> {
    match haystack {
        Value::Array(items) => Ok(items.iter().any(|item| equal(item, needle))),
        Value::Map(map) => match needle {
            Value::Str(key) => Ok(map.contains_key(&**key)),
            _ => Ok(false),
        },
        Value::Struct(record) => match needle {
            Value::Str(name) => Ok(record.get(name).is_some()),
            _ => Ok(false),
        },
        _ => Err(mismatch(BinaryOp::In, needle, haystack)),
    }
}

/// `from..to`, inclusive on both ends; empty when `from > to`.
pub fn range(from: i64, to: i64) -> OpResult {
    if to >= from && to.saturating_sub(from) >= MAX_RANGE {
        return Err(RuntimeErrorKind::InvalidArgument(format!(
            "range {}..{} is too large",
            from, to
        )));
    }
    Ok(Value::array((from..=to).map(Value::Int).collect()))
}

// ============================================================================
// Member access
// ============================================================================

/// Resolves a possibly negative index against a length.
pub fn resolve_index(index: i64, len: usize) -> Result<usize, RuntimeErrorKind> {
    let resolved = if index < 0 { index + len as i64 } else { index };
    if resolved < 0 || resolved >= len as i64 {
        return Err(RuntimeErrorKind::IndexOutOfRange { index, len });
    }
    Ok(resolved as usize)
}

/// `object[property]` and `object.property` on dynamically typed values.
///
/// Missing map keys yield `nil`; struct methods come back bound to their
/// receiver.
pub fn fetch(object: &Value, property: &Value) -> OpResult {
    let cannot = || RuntimeErrorKind::CannotFetch {
        from: object.type_name().to_string(),
        property: property.to_string(),
    };
    match (object, property) {
        (Value::Nil, _) => Err(RuntimeErrorKind::NilDereference(property.to_string())),
        (Value::Array(items), Value::Int(i)) => {
            let index = resolve_index(*i, items.len())?;
            Ok(items[index].clone())
        }
        (Value::Str(s), Value::Int(i)) => {
            let chars: Vec<char> = s.chars().collect();
            let index = resolve_index(*i, chars.len())?;
            Ok(Value::from(chars[index].to_string()))
        }
        (Value::Map(map), Value::Str(key)) => Ok(map.get(&**key).cloned().unwrap_or_default()),
        (Value::Struct(record), Value::Str(name)) => {
            if let Some(value) = record.get(name) {
                Ok(value.clone())
            } else if let Some(method) = record.method(name) {
                Ok(Value::Func(method.bind(object.clone())))
            } else {
                Err(cannot())
            }
        }
        _ => Err(cannot()),
    }
}

/// `object[from:to]` on arrays and strings. Negative bounds count from the
/// end; bounds are clamped, and `from > to` gives an empty result.
pub fn slice(object: &Value, from: &Value, to: &Value) -> OpResult {
    let bound = |value: &Value, default: usize, len: usize| -> Result<usize, RuntimeErrorKind> {
        match value {
            Value::Nil => Ok(default),
            Value::Int(i) => {
                let resolved = if *i < 0 { *i + len as i64 } else { *i };
                Ok(resolved.clamp(0, len as i64) as usize)
            }
            other => Err(RuntimeErrorKind::invalid(format!(
                "slice index of type {}",
                other.type_name()
            ))),
        }
    };
    match object {
        Value::Array(items) => {
            let len = items.len();
            let (start, end) = (bound(from, 0, len)?, bound(to, len, len)?);
            let items = if start < end {
                items[start..end].to_vec()
            } else {
                Vec::new()
            };
            Ok(Value::array(items))
        }
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let len = chars.len();
            let (start, end) = (bound(from, 0, len)?, bound(to, len, len)?);
            let out: String = if start < end {
                chars[start..end].iter().collect()
            } else {
                String::new()
            };
            Ok(Value::from(out))
        }
        Value::Nil => Err(RuntimeErrorKind::NilDereference("slice".to_string())),
        other => Err(RuntimeErrorKind::invalid(format!(
            "cannot slice {}",
            other.type_name()
        ))),
    }
}
