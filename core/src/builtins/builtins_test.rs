use std::time::Duration;

use super::*;
use crate::values::Value;
use crate::vm::RuntimeErrorKind;

fn call(name: &str, args: &[Value]) -> Result<Value, RuntimeErrorKind> {
    let (_, builtin) = lookup(name).unwrap();
    (builtin.imp.unwrap())(args)
}

#[test]
fn test_lookup() {
    let (id, len) = lookup("len").unwrap();
    assert_eq!(id, 0);
    assert_eq!(len.name, "len");
    assert!(lookup("nope").is_none());
    assert!(get(id).is_some());
}

#[test]
fn test_arity() {
    let (_, sum) = lookup("sum").unwrap();
    assert!(sum.accepts(1) && sum.accepts(2) && !sum.accepts(3));
    assert!(sum.is_predicate());
    let (_, max) = lookup("max").unwrap();
    assert!(max.accepts(7) && !max.accepts(0));
    assert!(!max.is_predicate());
}

#[test]
fn test_predicate_builtins_have_no_implementation() {
    for builtin in BUILTINS {
        assert_eq!(builtin.is_predicate(), builtin.imp.is_none(), "{}", builtin.name);
    }
}

#[test]
fn test_len() {
    assert_eq!(call("len", &[Value::str("héllo")]), Ok(Value::Int(5)));
    assert_eq!(
        call("len", &[Value::array(vec![Value::Nil, Value::Nil])]),
        Ok(Value::Int(2))
    );
    assert!(call("len", &[Value::Int(1)]).is_err());
}

#[test]
fn test_conversions() {
    assert_eq!(call("int", &[Value::Float(-2.7)]), Ok(Value::Int(-2)));
    assert_eq!(call("int", &[Value::str(" 42 ")]), Ok(Value::Int(42)));
    assert!(call("int", &[Value::str("4x")]).is_err());
    assert_eq!(call("float", &[Value::Int(3)]), Ok(Value::Float(3.0)));
    assert_eq!(call("string", &[Value::Int(3)]), Ok(Value::str("3")));
    assert_eq!(call("abs", &[Value::Int(-3)]), Ok(Value::Int(3)));
}

#[test]
fn test_strings() {
    assert_eq!(call("upper", &[Value::str("abc")]), Ok(Value::str("ABC")));
    assert_eq!(call("lower", &[Value::str("ABC")]), Ok(Value::str("abc")));
    assert_eq!(call("trim", &[Value::str("  x ")]), Ok(Value::str("x")));
}

#[test]
fn test_max_min() {
    let args = [Value::Int(3), Value::Float(4.5), Value::Int(-1)];
    assert_eq!(call("max", &args), Ok(Value::Float(4.5)));
    assert_eq!(call("min", &args), Ok(Value::Int(-1)));
    let arr = Value::array(vec![Value::Int(2), Value::Int(9)]);
    assert_eq!(call("max", &[arr]), Ok(Value::Int(9)));
    assert!(call("max", &[Value::array(vec![])]).is_err());
    assert!(call("min", &[Value::Int(1), Value::str("a")]).is_err());
}

#[test]
fn test_map_helpers() {
    let map = Value::map([("b", Value::Int(2)), ("a", Value::Int(1))]);
    assert_eq!(
        call("keys", &[map.clone()]),
        Ok(Value::array(vec![Value::str("a"), Value::str("b")]))
    );
    assert_eq!(
        call("values", &[map]),
        Ok(Value::array(vec![Value::Int(1), Value::Int(2)]))
    );
    assert_eq!(call("first", &[Value::array(vec![])]), Ok(Value::Nil));
}

#[test]
fn test_json() {
    let parsed = call("fromJSON", &[Value::str(r#"{"Num": 1}"#)]).unwrap();
    assert_eq!(parsed.as_map().unwrap().get("Num"), Some(&Value::Int(1)));
    assert!(call("fromJSON", &[Value::str("{")]).is_err());
    assert_eq!(
        call("toJSON", &[Value::array(vec![Value::Int(1), Value::Nil])]),
        Ok(Value::str("[1,null]"))
    );
}

#[test]
fn test_parse_duration() {
    assert_eq!(parse_duration("1h30m"), Some(Duration::from_secs(5400)));
    assert_eq!(parse_duration("1.5s"), Some(Duration::from_millis(1500)));
    assert_eq!(parse_duration("300ms"), Some(Duration::from_millis(300)));
    assert_eq!(parse_duration("0"), Some(Duration::ZERO));
    assert_eq!(parse_duration(""), None);
    assert_eq!(parse_duration("5"), None);
    assert_eq!(parse_duration("-1s"), None);
    assert_eq!(parse_duration("3d"), None);
}
