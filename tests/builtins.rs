#[macro_use]
mod cases;

use sift::Value;
use sift::ast::BinaryOp;

fn ints(values: &[i64]) -> Value {
    Value::array(values.iter().map(|&i| Value::Int(i)).collect())
}

test_case!(
    sum_of_mapped_fields,
    tree: |b| b.builtin(
        "sum",
        &[b.builtin("map", &[b.ident("Users"), b.predicate(b.member(b.pointer(), "Age"))])],
    ),
    result: Ok(Value::Int(89)),
);

test_case!(
    count_of_filtered,
    tree: |b| b.builtin(
        "len",
        &[b.builtin(
            "filter",
            &[
                b.ident("Users"),
                b.predicate(b.binary(BinaryOp::Ge, b.member(b.pointer(), "Age"), b.int(18))),
            ],
        )],
    ),
    result: Ok(Value::Int(2)),
);

test_case!(
    all_adults,
    tree: |b| b.builtin(
        "all",
        &[
            b.ident("Users"),
            b.predicate(b.binary(BinaryOp::Ge, b.member(b.pointer(), "Age"), b.int(18))),
        ],
    ),
    result: Ok(Value::Bool(false)),
);

test_case!(
    one_minor,
    tree: |b| b.builtin(
        "one",
        &[
            b.ident("Users"),
            b.predicate(b.binary(BinaryOp::Lt, b.member(b.pointer(), "Age"), b.int(18))),
        ],
    ),
    result: Ok(Value::Bool(true)),
);

test_case!(
    find_by_name,
    tree: |b| b.member(
        b.builtin(
            "find",
            &[
                b.ident("Users"),
                b.predicate(b.binary(BinaryOp::EndsWith, b.member(b.pointer(), "Name"), b.string("b"))),
            ],
        ),
        "Age",
    ),
    result: Ok(Value::Int(17)),
);

test_case!(
    find_nothing_then_optional_member,
    tree: |b| b.optional_member(
        b.builtin(
            "find",
            &[
                b.ident("Users"),
                b.predicate(b.binary(BinaryOp::Gt, b.member(b.pointer(), "Age"), b.int(99))),
            ],
        ),
        "Age",
    ),
    result: Ok(Value::Nil),
);

test_case!(
    find_index,
    tree: |b| b.builtin(
        "findIndex",
        &[
            b.ident("Users"),
            b.predicate(b.binary(BinaryOp::Eq, b.member(b.pointer(), "Name"), b.string("Cid"))),
        ],
    ),
    result: Ok(Value::Int(2)),
);

test_case!(
    map_with_index,
    tree: |b| b.builtin(
        "map",
        &[
            b.ident("Users"),
            b.predicate(b.binary(BinaryOp::Mul, b.named_pointer("index"), b.int(10))),
        ],
    ),
    result: Ok(ints(&[0, 10, 20])),
);

test_case!(
    reduce_with_initial_value,
    tree: |b| b.builtin(
        "reduce",
        &[
            b.ident("Users"),
            b.predicate(b.binary(
                BinaryOp::Add,
                b.named_pointer("acc"),
                b.member(b.pointer(), "Age"),
            )),
            b.int(11),
        ],
    ),
    result: Ok(Value::Int(100)),
);

test_case!(
    reduce_of_empty_array,
    tree: |b| b.builtin(
        "reduce",
        &[
            b.array(&[]),
            b.predicate(b.binary(BinaryOp::Add, b.named_pointer("acc"), b.pointer())),
        ],
    ),
    result: Err("R003"),
);

test_case!(
    nested_predicates,
    tree: |b| b.builtin(
        "map",
        &[
            b.binary(BinaryOp::Range, b.int(1), b.int(3)),
            b.predicate(b.builtin(
                "count",
                &[
                    b.ident("Users"),
                    b.predicate(b.binary(BinaryOp::Gt, b.member(b.pointer(), "Age"), b.int(20))),
                ],
            )),
        ],
    ),
    result: Ok(ints(&[2, 2, 2])),
);

test_case!(
    max_and_min,
    tree: |b| b.binary(
        BinaryOp::Sub,
        b.builtin("max", &[b.int(3), b.int(9), b.int(4)]),
        b.builtin("min", &[b.binary(BinaryOp::Range, b.int(2), b.int(5))]),
    ),
    result: Ok(Value::Int(7)),
);

test_case!(
    string_builtins,
    tree: |b| b.builtin("upper", &[b.builtin("trim", &[b.string("  ok ")])]),
    result: Ok(Value::str("OK")),
);

test_case!(
    keys_of_map,
    tree: |b| b.builtin("keys", &[b.ident("Tags")]),
    result: Ok(Value::array(vec![Value::str("a"), Value::str("b")])),
);

test_case!(
    json_round_trip,
    tree: |b| b.builtin("toJSON", &[b.builtin("fromJSON", &[b.string(r#"{"b":[1,2.5,null]}"#)])]),
    result: Ok(Value::str(r#"{"b":[1,2.5,null]}"#)),
);

test_case!(
    method_call,
    tree: |b| b.call(
        b.member(b.index(b.ident("Users"), b.int(0)), "Greet"),
        &[b.string("Hi")],
    ),
    result: Ok(Value::str("Hi, Ann")),
);

test_case!(
    environment_method,
    tree: |b| b.call(b.ident("Double"), &[b.int(21)]),
    result: Ok(Value::Int(42)),
);

test_case!(
    wrong_argument_count,
    tree: |b| b.call(b.ident("Double"), &[b.int(1), b.int(2)]),
    result: Err("E007"),
);

test_case!(
    unknown_builtin,
    tree: |b| b.builtin("shuffle", &[b.ident("Users")]),
    result: Err("E012"),
);

test_case!(
    predicate_must_be_bool,
    tree: |b| b.builtin("filter", &[b.ident("Users"), b.predicate(b.member(b.pointer(), "Age"))]),
    result: Err("E014"),
);
