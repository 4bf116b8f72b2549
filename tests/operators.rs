#[macro_use]
mod cases;

use sift::Value;
use sift::ast::{BinaryOp, UnaryOp};

test_case!(
    int_arithmetic_wraps,
    tree: |b| b.binary(BinaryOp::Add, b.int(i64::MAX), b.int(1)),
    result: Ok(Value::Int(i64::MIN)),
);

test_case!(
    division_is_float,
    tree: |b| b.binary(BinaryOp::Div, b.int(7), b.int(2)),
    result: Ok(Value::Float(3.5)),
);

test_case!(
    power_is_float,
    tree: |b| b.binary(BinaryOp::Pow, b.int(2), b.int(10)),
    result: Ok(Value::Float(1024.0)),
);

test_case!(
    mixed_arithmetic,
    tree: |b| b.binary(BinaryOp::Mul, b.ident("Ratio"), b.int(4)),
    result: Ok(Value::Float(2.0)),
);

test_case!(
    modulo_by_zero,
    tree: |b| b.binary(
        BinaryOp::Mod,
        b.int(1),
        b.binary(BinaryOp::Sub, b.member(b.ident("Tags"), "a"), b.int(1)),
    ),
    result: Err("R002"),
);

test_case!(
    string_concatenation,
    tree: |b| b.binary(BinaryOp::Add, b.ident("Name"), b.string("!")),
    result: Ok(Value::str("sift!")),
);

test_case!(
    string_predicates,
    tree: |b| b.binary(
        BinaryOp::And,
        b.binary(BinaryOp::StartsWith, b.ident("Name"), b.string("si")),
        b.binary(BinaryOp::Matches, b.ident("Name"), b.string("^s.f")),
    ),
    result: Ok(Value::Bool(true)),
);

test_case!(
    negation,
    tree: |b| b.unary(UnaryOp::Not, b.binary(BinaryOp::Lt, b.ident("Ratio"), b.float(0.25))),
    result: Ok(Value::Bool(true)),
);

test_case!(
    numbers_compare_across_types,
    tree: |b| b.binary(BinaryOp::Eq, b.int(2), b.float(2.0)),
    result: Ok(Value::Bool(true)),
);

test_case!(
    membership_in_map_and_array,
    tree: |b| b.binary(
        BinaryOp::And,
        b.binary(BinaryOp::In, b.string("a"), b.ident("Tags")),
        b.binary(BinaryOp::In, b.int(3), b.binary(BinaryOp::Range, b.int(1), b.int(5))),
    ),
    result: Ok(Value::Bool(true)),
);

test_case!(
    missing_map_key_coalesces,
    tree: |b| b.binary(BinaryOp::Coalesce, b.member(b.ident("Tags"), "z"), b.int(9)),
    result: Ok(Value::Int(9)),
);

test_case!(
    durations_add,
    tree: |b| b.binary(
        BinaryOp::Gt,
        b.binary(BinaryOp::Add, b.ident("Timeout"), b.builtin("duration", &[b.string("30s")])),
        b.builtin("duration", &[b.string("1m59s")]),
    ),
    result: Ok(Value::Bool(true)),
);

test_case!(
    negative_index,
    tree: |b| b.member(b.index(b.ident("Users"), b.int(-1)), "Name"),
    result: Ok(Value::str("Cid")),
);

test_case!(
    index_out_of_range,
    tree: |b| b.index(b.ident("Users"), b.int(3)),
    result: Err("R003"),
);

test_case!(
    clamped_slice,
    tree: |b| b.slice(b.ident("Name"), Some(b.int(-3)), Some(b.int(100))),
    result: Ok(Value::str("ift")),
);

test_case!(
    conditional,
    tree: |b| b.conditional(
        b.binary(BinaryOp::Gt, b.builtin("len", &[b.ident("Users")]), b.int(2)),
        b.string("many"),
        b.string("few"),
    ),
    result: Ok(Value::str("many")),
);

test_case!(
    type_mismatch,
    tree: |b| b.binary(BinaryOp::Sub, b.ident("Name"), b.int(1)),
    result: Err("E001"),
);

test_case!(
    unknown_name,
    tree: |b| b.ident("Nope"),
    result: Err("E003"),
);

test_case!(
    durations_cannot_be_negated,
    tree: |b| b.unary(UnaryOp::Neg, b.ident("Timeout")),
    result: Err("E002"),
);
