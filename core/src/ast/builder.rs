use bumpalo::Bump;

use super::{BinaryOp, NodeKind, NodeRef, Slot, UnaryOp};

/// Allocates tree nodes in an arena.
///
/// This is what a parser (or a patching visitor) uses to produce slots. All
/// constructors place the node at offset 0; chain [`Slot::at`] to record the
/// real source position.
///
/// # Example
///
/// ```
/// use bumpalo::Bump;
/// use sift_core::ast::{BinaryOp, TreeBuilder, dump};
///
/// let arena = Bump::new();
/// let b = TreeBuilder::new(&arena);
/// let node = b.binary(BinaryOp::Add, b.int(1), b.ident("x").at(4));
/// assert_eq!(dump(node), "Binary +\n  Integer 1\n  Identifier x\n");
/// ```
#[derive(Clone, Copy)]
pub struct TreeBuilder<'a> {
    arena: &'a Bump,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(arena: &'a Bump) -> Self {
        Self { arena }
    }

    pub fn arena(&self) -> &'a Bump {
        self.arena
    }

    pub fn node(&self, kind: NodeKind<'a>) -> NodeRef<'a> {
        self.arena.alloc(Slot::new(kind, 0))
    }

    pub fn str(&self, s: &str) -> &'a str {
        self.arena.alloc_str(s)
    }

    pub fn nil(&self) -> NodeRef<'a> {
        self.node(NodeKind::Nil)
    }

    pub fn bool(&self, value: bool) -> NodeRef<'a> {
        self.node(NodeKind::Bool(value))
    }

    pub fn int(&self, value: i64) -> NodeRef<'a> {
        self.node(NodeKind::Integer(value))
    }

    pub fn float(&self, value: f64) -> NodeRef<'a> {
        self.node(NodeKind::Float(value))
    }

    pub fn string(&self, value: &str) -> NodeRef<'a> {
        self.node(NodeKind::String(self.str(value)))
    }

    pub fn ident(&self, name: &str) -> NodeRef<'a> {
        self.node(NodeKind::Identifier(self.str(name)))
    }

    pub fn unary(&self, op: UnaryOp, operand: NodeRef<'a>) -> NodeRef<'a> {
        self.node(NodeKind::Unary { op, operand })
    }

    pub fn binary(&self, op: BinaryOp, left: NodeRef<'a>, right: NodeRef<'a>) -> NodeRef<'a> {
        self.node(NodeKind::Binary { op, left, right })
    }

    /// `object.name`
    pub fn member(&self, object: NodeRef<'a>, name: &str) -> NodeRef<'a> {
        let property = self.string(name);
        self.node(NodeKind::Member {
            object,
            property,
            optional: false,
        })
    }

    /// `object?.name`
    pub fn optional_member(&self, object: NodeRef<'a>, name: &str) -> NodeRef<'a> {
        let property = self.string(name);
        self.node(NodeKind::Member {
            object,
            property,
            optional: true,
        })
    }

    /// `object[property]`
    pub fn index(&self, object: NodeRef<'a>, property: NodeRef<'a>) -> NodeRef<'a> {
        self.node(NodeKind::Member {
            object,
            property,
            optional: false,
        })
    }

    /// `#`
    pub fn pointer(&self) -> NodeRef<'a> {
        self.node(NodeKind::Pointer(""))
    }

    /// `#index`, `#acc`
    pub fn named_pointer(&self, name: &str) -> NodeRef<'a> {
        self.node(NodeKind::Pointer(self.str(name)))
    }

    pub fn slice(
        &self,
        object: NodeRef<'a>,
        from: Option<NodeRef<'a>>,
        to: Option<NodeRef<'a>>,
    ) -> NodeRef<'a> {
        self.node(NodeKind::Slice { object, from, to })
    }

    pub fn array(&self, items: &[NodeRef<'a>]) -> NodeRef<'a> {
        self.node(NodeKind::Array(self.arena.alloc_slice_copy(items)))
    }

    pub fn map(&self, entries: &[(NodeRef<'a>, NodeRef<'a>)]) -> NodeRef<'a> {
        self.node(NodeKind::Map(self.arena.alloc_slice_copy(entries)))
    }

    pub fn call(&self, callee: NodeRef<'a>, args: &[NodeRef<'a>]) -> NodeRef<'a> {
        self.node(NodeKind::Call {
            callee,
            args: self.arena.alloc_slice_copy(args),
        })
    }

    pub fn builtin(&self, name: &str, args: &[NodeRef<'a>]) -> NodeRef<'a> {
        self.node(NodeKind::Builtin {
            name: self.str(name),
            args: self.arena.alloc_slice_copy(args),
        })
    }

    pub fn predicate(&self, body: NodeRef<'a>) -> NodeRef<'a> {
        self.node(NodeKind::Predicate(body))
    }

    pub fn conditional(
        &self,
        cond: NodeRef<'a>,
        then: NodeRef<'a>,
        otherwise: NodeRef<'a>,
    ) -> NodeRef<'a> {
        self.node(NodeKind::Conditional {
            cond,
            then,
            otherwise,
        })
    }

    /// Builds the `NodeKind` of a builtin call without allocating a slot for it,
    /// for use with [`patch`](super::patch).
    pub fn builtin_kind(&self, name: &str, args: &[NodeRef<'a>]) -> NodeKind<'a> {
        NodeKind::Builtin {
            name: self.str(name),
            args: self.arena.alloc_slice_copy(args),
        }
    }
}
