use super::{Node, NodeKind, NodeRef};

/// A callback driven over every node of a tree by [`walk`].
///
/// Visitors are the only external way to mutate a tree: `visit` receives the
/// slot of the node being visited and may overwrite it with [`patch`].
pub trait Visitor<'a> {
    fn visit(&mut self, slot: NodeRef<'a>);

    /// Asked after every full pass; returning `true` requests another pass.
    fn should_repeat(&mut self) -> bool {
        false
    }

    /// Visitors that inspect type facts get a check pass run before them.
    fn needs_types(&self) -> bool {
        false
    }
}

impl<'a, F> Visitor<'a> for F
where
    F: FnMut(NodeRef<'a>),
{
    fn visit(&mut self, slot: NodeRef<'a>) {
        self(slot)
    }
}

/// Post-order traversal: children first, then the node itself.
///
/// Children are read before the visitor sees the parent, and a replacement
/// written by `patch` is not descended into during the same walk.
pub fn walk<'a, V>(slot: NodeRef<'a>, visitor: &mut V)
where
    V: Visitor<'a> + ?Sized,
{
    for child in slot.kind().children() {
        walk(child, visitor);
    }
    visitor.visit(slot);
}

/// Pre-order depth-first search for the first node matching `predicate`.
pub fn find<'a, P>(root: NodeRef<'a>, mut predicate: P) -> Option<NodeRef<'a>>
where
    P: FnMut(&Node<'a>) -> bool,
{
    fn go<'a, P>(slot: NodeRef<'a>, predicate: &mut P) -> Option<NodeRef<'a>>
    where
        P: FnMut(&Node<'a>) -> bool,
    {
        if predicate(&slot.node()) {
            return Some(slot);
        }
        slot.kind()
            .children()
            .into_iter()
            .find_map(|child| go(child, predicate))
    }
    go(root, &mut predicate)
}

/// Overwrite the node held by `slot`.
///
/// The slot keeps its source position and type fact; only the variant (and
/// therefore the children) change.
pub fn patch<'a>(slot: NodeRef<'a>, kind: NodeKind<'a>) {
    slot.replace_kind(kind);
}
