use super::*;
use crate::ast::{BinaryOp, TreeBuilder, Visitor, dump, walk};
use crate::checker::check;
use crate::compiler::compile;
use crate::types::{Fact, Type, TypeManager};
use crate::values::{Function, Record, Value};
use crate::vm::Vm;
use bumpalo::Bump;
use indoc::indoc;
use pretty_assertions::assert_eq;

fn wrapper<'a>(
    types: &'a TypeManager<'a>,
    name: &str,
    getter: &str,
    ret: &'a Type<'a>,
) -> &'a Type<'a> {
    let receiver = types.structure(name, &[], &[]);
    types.structure(name, &[], &[(getter, types.function(&[receiver], ret))])
}

fn wrapped(name: &str, getter: &str, value: Value) -> Record {
    Record::new(name).with_method(getter, Function::new(getter, move |_| Ok(value.clone())))
}

#[test]
fn test_wrapped_ints_add() {
    let bump = Bump::new();
    let types = TypeManager::new(&bump);
    let b = TreeBuilder::new(&bump);

    let int_value = wrapper(types, "IntValue", "AsInt", types.int());
    let env_ty = types.structure(
        "Env",
        &[("ValueOne", int_value), ("ValueTwo", int_value)],
        &[],
    );
    let env = Value::record(
        Record::new("Env")
            .with_field("ValueOne", wrapped("IntValue", "AsInt", Value::Int(1)))
            .with_field("ValueTwo", wrapped("IntValue", "AsInt", Value::Int(2))),
    );

    let root = b.binary(BinaryOp::Add, b.ident("ValueOne"), b.ident("ValueTwo"));
    // Without unwrapping, struct + struct does not check.
    assert!(check(types, root, Some(env_ty), true).is_err());

    let mut getter = ValueGetter::new(&b);
    walk(root, &mut getter);
    assert_eq!(getter.patched(), 2);
    assert_eq!(
        dump(root),
        indoc! {r#"
            Binary +
              Call
                Member
                  Identifier ValueOne
                  String "AsInt"
              Call
                Member
                  Identifier ValueTwo
                  String "AsInt"
        "#}
    );

    assert_eq!(check(types, root, Some(env_ty), true), Ok(Fact::Known(types.int())));
    let program = compile(root, Some(env_ty)).unwrap();
    assert_eq!(Vm::new().run(&program, &env).unwrap(), Value::Int(3));
}

#[test]
fn test_getter_lookup_order() {
    let bump = Bump::new();
    let types = TypeManager::new(&bump);
    let b = TreeBuilder::new(&bump);

    let receiver = types.structure("Both", &[], &[]);
    let both = types.structure(
        "Both",
        &[],
        &[
            ("AsAny", types.function(&[receiver], types.any())),
            ("AsString", types.function(&[receiver], types.str())),
        ],
    );
    let env_ty = types.structure("Env", &[("X", both)], &[]);

    let root = b.ident("X");
    check(types, root, Some(env_ty), true).unwrap();
    walk(root, &mut ValueGetter::new(&b));
    assert!(dump(root).contains(r#"String "AsString""#));
    assert_eq!(root.fact(), Some(Fact::Known(types.str())));
}

#[test]
fn test_plain_structs_are_untouched() {
    let bump = Bump::new();
    let types = TypeManager::new(&bump);
    let b = TreeBuilder::new(&bump);

    let user = types.structure("User", &[("Name", types.str())], &[]);
    let env_ty = types.structure("Env", &[("User", user)], &[]);

    let root = b.member(b.ident("User"), "Name");
    check(types, root, Some(env_ty), true).unwrap();
    let before = dump(root);
    let mut getter = ValueGetter::new(&b);
    walk(root, &mut getter);
    assert_eq!(getter.patched(), 0);
    assert_eq!(dump(root), before);
}

#[test]
fn test_unchecked_trees_are_untouched() {
    let bump = Bump::new();
    let b = TreeBuilder::new(&bump);

    let root = b.ident("ValueOne");
    let mut getter = ValueGetter::new(&b);
    assert!(getter.needs_types());
    walk(root, &mut getter);
    assert_eq!(dump(root), "Identifier ValueOne\n");
}

#[test]
fn test_member_objects_stay_wrapped() {
    let bump = Bump::new();
    let types = TypeManager::new(&bump);
    let b = TreeBuilder::new(&bump);

    let receiver = types.structure("IntValue", &[], &[]);
    let int_value = types.structure(
        "IntValue",
        &[("Int", types.int())],
        &[("AsInt", types.function(&[receiver], types.int()))],
    );
    let env_ty = types.structure(
        "Env",
        &[("ValueOne", int_value), ("ValueTwo", int_value)],
        &[],
    );

    // ValueOne.Int + ValueOne.AsInt() + ValueTwo
    let field = b.member(b.ident("ValueOne"), "Int");
    let call = b.call(b.member(b.ident("ValueOne"), "AsInt"), &[]);
    let root = b.binary(
        BinaryOp::Add,
        b.binary(BinaryOp::Add, field, call),
        b.ident("ValueTwo"),
    );
    let _ = check(types, root, Some(env_ty), true);

    let mut getter = ValueGetter::new(&b);
    walk(root, &mut getter);
    assert_eq!(getter.patched(), 1);
    assert_eq!(
        dump(root),
        indoc! {r#"
            Binary +
              Binary +
                Member
                  Identifier ValueOne
                  String "Int"
                Call
                  Member
                    Identifier ValueOne
                    String "AsInt"
              Call
                Member
                  Identifier ValueTwo
                  String "AsInt"
        "#}
    );

    assert_eq!(check(types, root, Some(env_ty), true), Ok(Fact::Known(types.int())));
    let program = compile(root, Some(env_ty)).unwrap();
    let value = |n: i64| {
        Record::new("IntValue")
            .with_field("Int", n)
            .with_method("AsInt", Function::new("AsInt", move |_| Ok(Value::Int(n))))
    };
    let env = Value::record(
        Record::new("Env")
            .with_field("ValueOne", value(1))
            .with_field("ValueTwo", value(40)),
    );
    assert_eq!(Vm::new().run(&program, &env).unwrap(), Value::Int(42));
}
