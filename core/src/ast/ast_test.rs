use super::*;
use crate::types::{Fact, TypeManager};
use bumpalo::Bump;
use indoc::indoc;
use pretty_assertions::assert_eq;

#[test]
fn test_find_returns_root() {
    let bump = Bump::new();
    let b = TreeBuilder::new(&bump);

    let root = b.binary(BinaryOp::Add, b.int(1), b.int(2));
    let found = find(root, |_| true).unwrap();
    assert!(core::ptr::eq(found, root));
}

#[test]
fn test_find_returns_none() {
    let bump = Bump::new();
    let b = TreeBuilder::new(&bump);

    let root = b.array(&[b.int(1), b.string("two")]);
    assert!(find(root, |node| matches!(node.kind, NodeKind::Identifier(_))).is_none());
}

#[test]
fn test_find_returns_the_slot_itself() {
    let bump = Bump::new();
    let b = TreeBuilder::new(&bump);

    let target = b.ident("needle");
    let root = b.builtin(
        "filter",
        &[b.ident("haystack"), b.predicate(b.binary(BinaryOp::Eq, b.pointer(), target))],
    );
    let found = find(root, |node| matches!(node.kind, NodeKind::Identifier("needle"))).unwrap();
    assert!(core::ptr::eq(found, target));
}

#[test]
fn test_find_is_pre_order() {
    let bump = Bump::new();
    let b = TreeBuilder::new(&bump);

    let first = b.ident("a");
    let root = b.call(b.ident("f"), &[first, b.ident("b")]);
    let mut seen = Vec::new();
    find(root, |node| {
        seen.push(dump_kind(node));
        false
    });
    assert_eq!(seen, ["Call", "f", "a", "b"]);
    let found = find(root, |node| matches!(node.kind, NodeKind::Identifier(name) if name != "f"));
    assert!(core::ptr::eq(found.unwrap(), first));
}

fn dump_kind(node: &Node<'_>) -> String {
    match node.kind {
        NodeKind::Identifier(name) => name.to_string(),
        NodeKind::Call { .. } => "Call".to_string(),
        _ => "?".to_string(),
    }
}

#[test]
fn test_walk_is_post_order() {
    let bump = Bump::new();
    let b = TreeBuilder::new(&bump);

    let root = b.unary(UnaryOp::Neg, b.binary(BinaryOp::Mul, b.int(2), b.int(3)));
    let mut order = Vec::new();
    walk(root, &mut |slot: NodeRef<'_>| order.push(dump(slot).lines().next().map(str::to_string)));
    let order: Vec<String> = order.into_iter().flatten().collect();
    assert_eq!(order, ["Integer 2", "Integer 3", "Binary *", "Unary -"]);
}

#[test]
fn test_patch_replaces_in_place() {
    let bump = Bump::new();
    let types = TypeManager::new(&bump);
    let b = TreeBuilder::new(&bump);

    let length = b.member(b.ident("Name").at(0), "length").at(4);
    length.set_fact(Fact::Known(types.int()));
    let root = b.binary(BinaryOp::Eq, length, b.int(5));

    let NodeKind::Member { object, .. } = length.kind() else {
        panic!("expected a member node");
    };
    patch(length, b.builtin_kind("len", &[object]));

    assert_eq!(
        dump(root),
        indoc! {"
            Binary ==
              Builtin len
                Identifier Name
              Integer 5
        "}
    );
    // Position and fact survive; only the variant changed.
    assert_eq!(length.pos(), 4);
    assert_eq!(length.fact(), Some(Fact::Known(types.int())));
}

#[test]
fn test_patch_during_walk_is_not_revisited() {
    let bump = Bump::new();
    let b = TreeBuilder::new(&bump);

    let root = b.array(&[b.int(1), b.int(2)]);
    let mut visits = 0;
    walk(root, &mut |slot| {
        let slot: NodeRef<'_> = slot;
        visits += 1;
        if let NodeKind::Integer(i) = slot.kind() {
            patch(slot, NodeKind::Array(b.arena().alloc_slice_copy(&[b.int(i * 10)])));
        }
    });
    assert_eq!(visits, 3);
    assert_eq!(
        dump(root),
        indoc! {"
            Array
              Array
                Integer 10
              Array
                Integer 20
        "}
    );
}

#[test]
fn test_dump_shapes() {
    let bump = Bump::new();
    let b = TreeBuilder::new(&bump);

    let root = b.conditional(
        b.unary(UnaryOp::Not, b.bool(false)),
        b.slice(b.ident("xs"), Some(b.int(1)), None),
        b.map(&[(b.string("k"), b.float(2.0))]),
    );
    assert_eq!(
        dump(root),
        indoc! {r#"
            Conditional
              Unary !
                Bool false
              Slice [_:]
                Identifier xs
                Integer 1
              Map
                String "k"
                Float 2.0
        "#}
    );

    let tree = Tree::new(b.optional_member(b.named_pointer("acc"), "x"));
    assert_eq!(
        tree.dump(),
        indoc! {r#"
            Member optional
              Pointer #acc
              String "x"
        "#}
    );
}

#[test]
fn test_dump_ignores_positions_and_facts() {
    let bump = Bump::new();
    let types = TypeManager::new(&bump);
    let b = TreeBuilder::new(&bump);

    let left = b.binary(BinaryOp::Sub, b.int(1).at(0), b.nil().at(4)).at(2);
    left.set_fact(Fact::Invalid);
    let right = b.binary(BinaryOp::Sub, b.int(1), b.nil());
    right.set_fact(Fact::Known(types.int()));
    assert_eq!(dump(left), dump(right));
}
