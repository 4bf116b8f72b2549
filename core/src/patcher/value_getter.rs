use std::ptr;

use tracing::debug;

use crate::ast::{NodeKind, NodeRef, TreeBuilder, Visitor, patch};
use crate::types::{Fact, Type, TypeView};

/// Getter methods recognized on wrapper structs, in lookup order.
pub const GETTERS: [&str; 5] = ["AsInt", "AsFloat", "AsString", "AsBool", "AsAny"];

/// Unwraps host wrapper values.
///
/// An expression whose static type is a struct with one of the [`GETTERS`]
/// methods is rewritten into a call of that method, so `ValueOne + ValueTwo`
/// behaves like `ValueOne.AsInt() + ValueTwo.AsInt()`. The object of a member
/// access is left wrapped, so `ValueOne.Int` still reads the wrapper's field.
pub struct ValueGetter<'b, 'a> {
    builder: &'b TreeBuilder<'a>,
    patched: usize,
    unwrapped: Vec<NodeRef<'a>>,
}

impl<'b, 'a> ValueGetter<'b, 'a> {
    pub fn new(builder: &'b TreeBuilder<'a>) -> Self {
        Self {
            builder,
            patched: 0,
            unwrapped: Vec::new(),
        }
    }

    /// Number of expressions rewritten so far.
    pub fn patched(&self) -> usize {
        self.patched
    }

    /// Undoes the rewrite of `slot`, if this getter made one.
    fn rewrap(&mut self, slot: NodeRef<'a>) {
        let Some(at) = self.unwrapped.iter().position(|s| ptr::eq(*s, slot)) else {
            return;
        };
        self.unwrapped.swap_remove(at);
        if let NodeKind::Call { callee, .. } = slot.kind()
            && let NodeKind::Member { object: inner, .. } = callee.kind()
        {
            patch(slot, inner.kind());
            if let Some(fact) = inner.fact() {
                slot.set_fact(fact);
            }
            self.patched -= 1;
            debug!(pos = slot.pos(), "kept member object wrapped");
        }
    }
}

impl<'a> Visitor<'a> for ValueGetter<'_, 'a> {
    fn visit(&mut self, slot: NodeRef<'a>) {
        // Children are visited first; a member access needs its object as is.
        if let NodeKind::Member { object, .. } = slot.kind() {
            self.rewrap(object);
        }
        // A predicate slot carries its body's fact but is not a value.
        if matches!(slot.kind(), NodeKind::Predicate(_)) {
            return;
        }
        let Some(fact @ Fact::Known(ty @ Type::Struct { .. })) = slot.fact() else {
            return;
        };
        let Some((getter, method)) = GETTERS
            .iter()
            .find_map(|&name| ty.method(name).map(|(_, method)| (name, method)))
        else {
            return;
        };

        let pos = slot.pos();
        let inner = self.builder.node(slot.kind()).at(pos);
        inner.set_fact(fact);
        let callee = self.builder.member(inner, getter).at(pos);
        patch(slot, NodeKind::Call { callee, args: &[] });
        if let Some(signature) = method.signature() {
            slot.set_fact(Fact::of(signature.ret));
        }
        self.patched += 1;
        self.unwrapped.push(slot);
        debug!(getter, pos, "unwrapped value getter");
    }

    fn needs_types(&self) -> bool {
        true
    }
}
