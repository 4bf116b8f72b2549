use super::*;
use crate::ast::{BinaryOp, NodeKind, NodeRef, Tree, TreeBuilder, Visitor, patch};
use crate::patcher::ValueGetter;
use crate::types::Fact;
use crate::values::{Function, Record, Value};
use bumpalo::Bump;

fn user_engine(arena: &Bump, options: EngineOptions) -> Engine<'_> {
    Engine::new(arena, options, |types| {
        let fields = [("Name", types.str()), ("Age", types.int())];
        let user = types.structure("User", &fields, &[]);
        Some(types.structure(
            "Env",
            &[("User", user), ("Users", types.array(user))],
            &[],
        ))
    })
}

fn user(name: &str, age: i64) -> Value {
    Value::record(Record::new("User").with_field("Name", name).with_field("Age", age))
}

fn user_env() -> Value {
    Value::record(
        Record::new("Env")
            .with_field("User", user("Ann", 30))
            .with_field("Users", Value::array(vec![user("Ann", 30), user("Bob", 12)])),
    )
}

#[test]
fn test_compile_and_run() {
    crate::test_utils::init_test_logging();
    let arena = Bump::new();
    let engine = user_engine(&arena, EngineOptions::default());
    let b = TreeBuilder::new(&arena);

    // sum(map(Users, {.Age})) + 1
    let age = b.predicate(b.member(b.pointer(), "Age"));
    let mapped = b.builtin("map", &[b.ident("Users"), age]);
    let tree = Tree::new(b.binary(BinaryOp::Add, b.builtin("sum", &[mapped]), b.int(1)));
    let program = engine.compile(&tree, &mut []).unwrap();
    assert_eq!(engine.run(&program, &user_env()).unwrap(), Value::Int(43));
    // The map was fused away.
    let map = tree.find(|node| matches!(node.kind, NodeKind::Builtin { name: "map", .. }));
    assert!(map.is_none());
}

#[test]
fn test_type_errors_become_diagnostics() {
    let arena = Bump::new();
    let engine = user_engine(&arena, EngineOptions::default());
    let b = TreeBuilder::new(&arena);

    let tree = Tree::new(b.binary(
        BinaryOp::Add,
        b.member(b.ident("User"), "Name").at(0),
        b.ident("Nobody").at(12),
    ));
    let err = engine.compile(&tree, &mut []).unwrap_err();
    let Error::Compilation { diagnostics } = &err else {
        panic!("expected a compilation error, got {:?}", err);
    };
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code.as_deref(), Some("E003"));
    assert_eq!(diagnostics[0].span, Span(12..13));
    assert_eq!(err.to_string(), "compilation failed with 1 error(s)");
}

#[test]
fn test_lenient_names_resolve_at_run_time() {
    let arena = Bump::new();
    let options = EngineOptions {
        strict: false,
        ..EngineOptions::default()
    };
    let engine = Engine::new(&arena, options, |_| None);
    let b = TreeBuilder::new(&arena);

    let tree = Tree::new(b.binary(BinaryOp::Mul, b.ident("x"), b.ident("y")));
    let program = engine.compile(&tree, &mut []).unwrap();
    let env = Value::map([("x", Value::Int(6)), ("y", Value::Int(7))]);
    assert_eq!(engine.run(&program, &env).unwrap(), Value::Int(42));
}

#[test]
fn test_runtime_errors_become_diagnostics() {
    let arena = Bump::new();
    let engine = user_engine(&arena, EngineOptions::default());
    let b = TreeBuilder::new(&arena);

    let age = b.member(b.ident("User"), "Age");
    let tree = Tree::new(b.binary(BinaryOp::Mod, age, b.int(0)).at(9));
    let program = engine.compile(&tree, &mut []).unwrap();
    let err = engine.run(&program, &user_env()).unwrap_err();
    let Error::Runtime { diagnostic } = &err else {
        panic!("expected a runtime error, got {:?}", err);
    };
    assert_eq!(diagnostic.code.as_deref(), Some("R002"));
    assert_eq!(diagnostic.span.start(), 9);
    assert_eq!(err.diagnostics().len(), 1);
}

#[test]
fn test_without_optimizer() {
    let arena = Bump::new();
    let options = EngineOptions {
        optimize: false,
        ..EngineOptions::default()
    };
    let engine = Engine::new(&arena, options, |_| None);
    let b = TreeBuilder::new(&arena);

    let tree = Tree::new(b.binary(BinaryOp::Add, b.int(1), b.int(2)));
    let program = engine.compile(&tree, &mut []).unwrap();
    assert_eq!(program.len(), 4);
    assert_eq!(engine.run(&program, &Value::Nil).unwrap(), Value::Int(3));
}

// ============================================================================
// Visitors
// ============================================================================

/// Replaces `String.length` with `len(String)`, one node per pass.
struct LengthPatcher<'b, 'a> {
    builder: &'b TreeBuilder<'a>,
    patched: bool,
    passes: usize,
}

impl<'a> Visitor<'a> for LengthPatcher<'_, 'a> {
    fn visit(&mut self, slot: NodeRef<'a>) {
        if self.patched {
            return;
        }
        if let NodeKind::Member { object, property, .. } = slot.kind()
            && let NodeKind::String("length") = property.kind()
        {
            patch(slot, self.builder.builtin_kind("len", &[object]));
            self.patched = true;
        }
    }

    fn should_repeat(&mut self) -> bool {
        self.passes += 1;
        std::mem::take(&mut self.patched)
    }
}

#[test]
fn test_visitor_repeats_until_done() {
    let arena = Bump::new();
    let engine = Engine::new(&arena, EngineOptions::default(), |types| {
        Some(types.structure("Env", &[("Name", types.str())], &[]))
    });
    let b = TreeBuilder::new(&arena);

    // Name.length + Name.length == 10
    let sum = b.binary(
        BinaryOp::Add,
        b.member(b.ident("Name"), "length"),
        b.member(b.ident("Name"), "length"),
    );
    let tree = Tree::new(b.binary(BinaryOp::Eq, sum, b.int(10)));
    let mut patcher = LengthPatcher {
        builder: &b,
        patched: false,
        passes: 0,
    };
    let program = engine.compile(&tree, &mut [&mut patcher]).unwrap();
    assert_eq!(patcher.passes, 3);

    let env = Value::record(Record::new("Env").with_field("Name", "hello"));
    assert_eq!(engine.run(&program, &env).unwrap(), Value::Bool(true));
}

#[test]
fn test_visitor_passes_are_bounded() {
    let arena = Bump::new();
    let options = EngineOptions {
        max_visitor_passes: 5,
        ..EngineOptions::default()
    };
    let engine = Engine::new(&arena, options, |_| None);
    let b = TreeBuilder::new(&arena);

    struct Forever(usize);
    impl<'a> Visitor<'a> for Forever {
        fn visit(&mut self, _: NodeRef<'a>) {
            self.0 += 1;
        }

        fn should_repeat(&mut self) -> bool {
            true
        }
    }

    let tree = Tree::new(b.int(1));
    let mut forever = Forever(0);
    engine.compile(&tree, &mut [&mut forever]).unwrap();
    assert_eq!(forever.0, 5);
}

#[test]
fn test_typed_visitors_see_facts() {
    let arena = Bump::new();
    let engine = user_engine(&arena, EngineOptions::default());
    let b = TreeBuilder::new(&arena);

    struct FactCounter {
        known: usize,
    }
    impl<'a> Visitor<'a> for FactCounter {
        fn visit(&mut self, slot: NodeRef<'a>) {
            if matches!(slot.fact(), Some(Fact::Known(_))) {
                self.known += 1;
            }
        }

        fn needs_types(&self) -> bool {
            true
        }
    }

    let tree = Tree::new(b.member(b.ident("User"), "Age"));
    let mut counter = FactCounter { known: 0 };
    engine.compile(&tree, &mut [&mut counter]).unwrap();
    assert_eq!(counter.known, 3);
}

#[test]
fn test_value_getter_through_engine() {
    let arena = Bump::new();
    let engine = Engine::new(&arena, EngineOptions::default(), |types| {
        let receiver = types.structure("Wrapped", &[], &[]);
        let wrapped = types.structure(
            "Wrapped",
            &[],
            &[("AsFloat", types.function(&[receiver], types.float()))],
        );
        Some(types.structure("Env", &[("Price", wrapped)], &[]))
    });
    let b = TreeBuilder::new(&arena);

    let tree = Tree::new(b.binary(BinaryOp::Mul, b.ident("Price"), b.float(2.0)));
    let mut getter = ValueGetter::new(&b);
    let program = engine.compile(&tree, &mut [&mut getter]).unwrap();

    let price = Record::new("Wrapped")
        .with_method("AsFloat", Function::new("AsFloat", |_| Ok(Value::Float(1.25))));
    let env = Value::record(Record::new("Env").with_field("Price", price));
    assert_eq!(engine.run(&program, &env).unwrap(), Value::Float(2.5));
}
