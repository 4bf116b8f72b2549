//! Shared environment and the `test_case!` macro for end-to-end tests.
//!
//! Every case compiles one tree against the same `Env` struct and compares the
//! result with an expected value, or with the code of the first diagnostic.

use std::time::Duration;

use bumpalo::Bump;
use sift::{Engine, EngineOptions, Function, HostError, Record, Value};

/// ```text
/// Env {
///     Users   []User
///     Tags    map[string]int
///     Name    string
///     Ratio   float
///     Timeout duration
///     Double  func(int) int
/// }
/// User { Name string, Age int, Greet func(string) string }
/// ```
pub fn engine(arena: &Bump) -> Engine<'_> {
    Engine::new(arena, EngineOptions::default(), |types| {
        let user_receiver = types.structure("User", &[], &[]);
        let user = types.structure(
            "User",
            &[("Name", types.str()), ("Age", types.int())],
            &[(
                "Greet",
                types.function(&[user_receiver, types.str()], types.str()),
            )],
        );
        let env_receiver = types.structure("Env", &[], &[]);
        Some(types.structure(
            "Env",
            &[
                ("Users", types.array(user)),
                ("Tags", types.map(types.str(), types.int())),
                ("Name", types.str()),
                ("Ratio", types.float()),
                ("Timeout", types.duration()),
            ],
            &[(
                "Double",
                types.function(&[env_receiver, types.int()], types.int()),
            )],
        ))
    })
}

fn user(name: &str, age: i64) -> Value {
    let greet = Function::new("Greet", |args| {
        let receiver = args[0].as_record().ok_or("Greet needs a receiver")?;
        let name = receiver.get("Name").cloned().unwrap_or_default();
        Ok(Value::from(format!("{}, {}", args[1], name)))
    });
    Value::record(
        Record::new("User")
            .with_field("Name", name)
            .with_field("Age", age)
            .with_method("Greet", greet),
    )
}

pub fn env() -> Value {
    let double = Function::new("Double", |args| match args.get(1) {
        Some(Value::Int(i)) => Ok(Value::Int(i * 2)),
        _ => Err(HostError::new("Double expects an int")),
    });
    Value::record(
        Record::new("Env")
            .with_field(
                "Users",
                vec![user("Ann", 30), user("Bob", 17), user("Cid", 42)],
            )
            .with_field("Tags", Value::map([("a", Value::Int(1)), ("b", Value::Int(2))]))
            .with_field("Name", "sift")
            .with_field("Ratio", 0.5)
            .with_field("Timeout", Duration::from_secs(90))
            .with_method("Double", double),
    )
}

/// `test_case!(name, tree: |b| <tree>, result: Ok(value) | Err("CODE"))`
macro_rules! test_case {
    ($name:ident, tree: |$b:ident| $tree:expr, result: $result:expr $(,)?) => {
        #[test]
        fn $name() {
            let arena = bumpalo::Bump::new();
            let engine = cases::engine(&arena);
            let $b = sift::ast::TreeBuilder::new(&arena);
            let tree = sift::ast::Tree::new($tree);
            let result = engine
                .compile(&tree, &mut [])
                .and_then(|program| engine.run(&program, &cases::env()))
                .map_err(|err| err.diagnostics()[0].code.clone().unwrap_or_default());
            let expected: Result<sift::Value, &str> = $result;
            pretty_assertions::assert_eq!(result, expected.map_err(str::to_string));
        }
    };
}
