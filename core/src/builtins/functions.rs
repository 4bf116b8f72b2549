use std::cmp::Ordering;
use std::time::Duration;

use crate::values::Value;
use crate::vm::RuntimeErrorKind;
use crate::vm::operators::compare_numbers;

type BuiltinResult = Result<Value, RuntimeErrorKind>;

fn argument_error(name: &str, expected: &str, got: &Value) -> RuntimeErrorKind {
    RuntimeErrorKind::InvalidArgument(format!(
        "{}: expected {}, got {}",
        name,
        expected,
        got.type_name()
    ))
}

fn single<'v>(name: &str, args: &'v [Value]) -> Result<&'v Value, RuntimeErrorKind> {
    match args {
        [arg] => Ok(arg),
        _ => Err(RuntimeErrorKind::InvalidArgument(format!(
            "{}: expected 1 argument, got {}",
            name,
            args.len()
        ))),
    }
}

fn single_str<'v>(name: &str, args: &'v [Value]) -> Result<&'v str, RuntimeErrorKind> {
    let arg = single(name, args)?;
    arg.as_str().ok_or_else(|| argument_error(name, "string", arg))
}

// ============================================================================
// Inspection
// ============================================================================

/// Number of characters of a string, elements of an array or entries of a map.
pub(super) fn len(args: &[Value]) -> BuiltinResult {
    let arg = single("len", args)?;
    let n = match arg {
        Value::Str(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Map(map) => map.len(),
        other => return Err(argument_error("len", "string, array or map", other)),
    };
    Ok(Value::Int(n as i64))
}

pub(super) fn first(args: &[Value]) -> BuiltinResult {
    match single("first", args)? {
        Value::Array(items) => Ok(items.first().cloned().unwrap_or_default()),
        other => Err(argument_error("first", "array", other)),
    }
}

pub(super) fn last(args: &[Value]) -> BuiltinResult {
    match single("last", args)? {
        Value::Array(items) => Ok(items.last().cloned().unwrap_or_default()),
        other => Err(argument_error("last", "array", other)),
    }
}

/// Map keys in sorted order.
pub(super) fn keys(args: &[Value]) -> BuiltinResult {
    match single("keys", args)? {
        Value::Map(map) => Ok(Value::array(
            map.keys().map(|k| Value::str(k)).collect(),
        )),
        other => Err(argument_error("keys", "map", other)),
    }
}

/// Map values, in key order.
pub(super) fn values(args: &[Value]) -> BuiltinResult {
    match single("values", args)? {
        Value::Map(map) => Ok(Value::array(map.values().cloned().collect())),
        other => Err(argument_error("values", "map", other)),
    }
}

// ============================================================================
// Numbers
// ============================================================================

pub(super) fn abs(args: &[Value]) -> BuiltinResult {
    match single("abs", args)? {
        Value::Int(i) => Ok(Value::Int(i.wrapping_abs())),
        Value::Float(f) => Ok(Value::Float(f.abs())),
        other => Err(argument_error("abs", "number", other)),
    }
}

/// Floats truncate toward zero; strings are parsed.
pub(super) fn int(args: &[Value]) -> BuiltinResult {
    match single("int", args)? {
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::Float(f) => Ok(Value::Int(f.trunc() as i64)),
        Value::Duration(d) => Ok(Value::Int(d.as_nanos() as i64)),
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|err| RuntimeErrorKind::InvalidArgument(format!("int({:?}): {}", s, err))),
        other => Err(argument_error("int", "number or string", other)),
    }
}

pub(super) fn float(args: &[Value]) -> BuiltinResult {
    match single("float", args)? {
        Value::Int(i) => Ok(Value::Float(*i as f64)),
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Str(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|err| {
            RuntimeErrorKind::InvalidArgument(format!("float({:?}): {}", s, err))
        }),
        other => Err(argument_error("float", "number or string", other)),
    }
}

/// `max(a, b, ...)`, or `max(array)` over the elements of a single array.
pub(super) fn max(args: &[Value]) -> BuiltinResult {
    extremum("max", args, Ordering::Greater)
}

pub(super) fn min(args: &[Value]) -> BuiltinResult {
    extremum("min", args, Ordering::Less)
}

fn extremum(name: &str, args: &[Value], keep: Ordering) -> BuiltinResult {
    let candidates = match args {
        [Value::Array(items)] => &items[..],
        _ => args,
    };
    let mut best: Option<&Value> = None;
    for candidate in candidates {
        let better = match best {
            None => {
                if !matches!(candidate, Value::Int(_) | Value::Float(_)) {
                    return Err(argument_error(name, "number", candidate));
                }
                true
            }
            Some(current) => compare_numbers(candidate, current)
                .ok_or_else(|| argument_error(name, "number", candidate))?
                == keep,
        };
        if better {
            best = Some(candidate);
        }
    }
    best.cloned().ok_or_else(|| {
        RuntimeErrorKind::InvalidArgument(format!("{}: no values to compare", name))
    })
}

// ============================================================================
// Strings
// ============================================================================

pub(super) fn string(args: &[Value]) -> BuiltinResult {
    match single("string", args)? {
        s @ Value::Str(_) => Ok(s.clone()),
        other => Ok(Value::from(other.to_string())),
    }
}

pub(super) fn upper(args: &[Value]) -> BuiltinResult {
    Ok(Value::from(single_str("upper", args)?.to_uppercase()))
}

pub(super) fn lower(args: &[Value]) -> BuiltinResult {
    Ok(Value::from(single_str("lower", args)?.to_lowercase()))
}

pub(super) fn trim(args: &[Value]) -> BuiltinResult {
    Ok(Value::str(single_str("trim", args)?.trim()))
}

// ============================================================================
// JSON
// ============================================================================

pub(super) fn from_json(args: &[Value]) -> BuiltinResult {
    let text = single_str("fromJSON", args)?;
    let json: serde_json::Value = serde_json::from_str(text)
        .map_err(|err| RuntimeErrorKind::InvalidArgument(format!("fromJSON: {}", err)))?;
    Ok(Value::from(json))
}

pub(super) fn to_json(args: &[Value]) -> BuiltinResult {
    let value = single("toJSON", args)?;
    serde_json::to_string(value)
        .map(Value::from)
        .map_err(|err| RuntimeErrorKind::InvalidArgument(format!("toJSON: {}", err)))
}

// ============================================================================
// Durations
// ============================================================================

pub(super) fn duration(args: &[Value]) -> BuiltinResult {
    let text = single_str("duration", args)?;
    parse_duration(text)
        .map(Value::Duration)
        .ok_or_else(|| RuntimeErrorKind::InvalidArgument(format!("invalid duration {:?}", text)))
}

/// Parses durations such as `300ms`, `1.5h` or `2h45m`.
///
/// Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. A bare `0`
/// is accepted; negative durations are not.
pub fn parse_duration(text: &str) -> Option<Duration> {
    if text == "0" {
        return Some(Duration::ZERO);
    }
    let mut rest = text;
    let mut total_nanos = 0f64;
    if rest.is_empty() {
        return None;
    }
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return None;
        }
        let number: f64 = rest[..number_len].parse().ok()?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = match &rest[..unit_len] {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return None,
        };
        rest = &rest[unit_len..];
        total_nanos += number * scale;
    }
    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return None;
    }
    Some(Duration::from_nanos(total_nanos.round() as u64))
}
