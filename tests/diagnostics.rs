mod cases;

use sift::bumpalo::Bump;
use sift::ast::{BinaryOp, Tree, TreeBuilder};
use sift::{Error, Severity, render_error_to_string_no_color};

// Users.Age > "x" && Nope
fn broken_tree<'a>(b: &TreeBuilder<'a>) -> Tree<'a> {
    let age = b.member(b.ident("Users").at(0), "Age").at(5);
    let comparison = b.binary(BinaryOp::Gt, age, b.string("x").at(12)).at(10);
    Tree::new(b.binary(BinaryOp::And, comparison, b.ident("Nope").at(19)).at(16))
}

#[test]
fn test_all_type_errors_are_reported() {
    let arena = Bump::new();
    let engine = cases::engine(&arena);
    let b = TreeBuilder::new(&arena);

    let err = engine.compile(&broken_tree(&b), &mut []).unwrap_err();
    let Error::Compilation { diagnostics } = &err else {
        panic!("expected a compilation error, got {:?}", err);
    };
    let summary: Vec<(Option<&str>, usize)> = diagnostics
        .iter()
        .map(|d| (d.code.as_deref(), d.span.start()))
        .collect();
    pretty_assertions::assert_eq!(summary, vec![(Some("E005"), 5), (Some("E003"), 19)]);
    assert!(diagnostics.iter().all(|d| d.severity == Severity::Error));
}

#[test]
fn test_rendered_against_source() {
    let arena = Bump::new();
    let engine = cases::engine(&arena);
    let b = TreeBuilder::new(&arena);

    let source = r#"Users.Age > "x" && Nope"#;
    let err = engine.compile(&broken_tree(&b), &mut []).unwrap_err();
    let output = render_error_to_string_no_color(source, &err);
    assert!(output.contains("[E005]"));
    assert!(output.contains("[E003]"));
    assert!(output.contains("unknown name Nope"));
    assert!(output.contains(source));
}
