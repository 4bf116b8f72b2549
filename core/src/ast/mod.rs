//! Expression trees.
//!
//! A tree is a set of arena-allocated [`Slot`]s. Parents refer to their
//! children through slot references, which is what lets [`patch`] replace any
//! node in place while other passes hold references into the same tree.

mod builder;
mod dump;
mod node;
mod walk;

#[cfg(test)]
mod ast_test;

pub use builder::TreeBuilder;
pub use dump::dump;
pub use node::{BinaryOp, Children, Node, NodeKind, NodeRef, Slot, UnaryOp};
pub use walk::{Visitor, find, patch, walk};

/// Owner of the root slot.
#[derive(Debug, Clone, Copy)]
pub struct Tree<'a> {
    root: NodeRef<'a>,
}

impl<'a> Tree<'a> {
    pub fn new(root: NodeRef<'a>) -> Self {
        Self { root }
    }

    pub fn root(&self) -> NodeRef<'a> {
        self.root
    }

    pub fn find<P>(&self, predicate: P) -> Option<NodeRef<'a>>
    where
        P: FnMut(&Node<'a>) -> bool,
    {
        find(self.root, predicate)
    }

    pub fn walk<V>(&self, visitor: &mut V)
    where
        V: Visitor<'a> + ?Sized,
    {
        walk(self.root, visitor)
    }

    pub fn dump(&self) -> String {
        dump(self.root)
    }
}
