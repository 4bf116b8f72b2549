use core::cell::Cell;
use core::fmt;

use smallvec::SmallVec;

use crate::types::Fact;

/// Reference to a node slot. Slots are arena-allocated, so references are
/// `Copy` and stay valid for the whole lifetime of the tree.
pub type NodeRef<'a> = &'a Slot<'a>;

/// Children of a node in evaluation order.
pub type Children<'a> = SmallVec<[NodeRef<'a>; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    In,
    Contains,
    StartsWith,
    EndsWith,
    Matches,
    Range,
    Coalesce,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::In => "in",
            BinaryOp::Contains => "contains",
            BinaryOp::StartsWith => "startsWith",
            BinaryOp::EndsWith => "endsWith",
            BinaryOp::Matches => "matches",
            BinaryOp::Range => "..",
            BinaryOp::Coalesce => "??",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add
                | BinaryOp::Sub
                | BinaryOp::Mul
                | BinaryOp::Div
                | BinaryOp::Mod
                | BinaryOp::Pow
        )
    }

    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// The closed set of node variants.
///
/// Every variant only holds plain values and references to child slots, so the
/// whole enum is `Copy`. Replacing a node means writing a new `NodeKind` into
/// its slot (see [`patch`](super::patch)).
#[derive(Debug, Clone, Copy)]
pub enum NodeKind<'a> {
    Nil,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(&'a str),
    Identifier(&'a str),
    Unary {
        op: UnaryOp,
        operand: NodeRef<'a>,
    },
    Binary {
        op: BinaryOp,
        left: NodeRef<'a>,
        right: NodeRef<'a>,
    },
    Member {
        object: NodeRef<'a>,
        property: NodeRef<'a>,
        optional: bool,
    },
    /// `#` (empty name), `#index` or `#acc`.
    Pointer(&'a str),
    Slice {
        object: NodeRef<'a>,
        from: Option<NodeRef<'a>>,
        to: Option<NodeRef<'a>>,
    },
    Array(&'a [NodeRef<'a>]),
    Map(&'a [(NodeRef<'a>, NodeRef<'a>)]),
    Call {
        callee: NodeRef<'a>,
        args: &'a [NodeRef<'a>],
    },
    Builtin {
        name: &'a str,
        args: &'a [NodeRef<'a>],
    },
    Predicate(NodeRef<'a>),
    Conditional {
        cond: NodeRef<'a>,
        then: NodeRef<'a>,
        otherwise: NodeRef<'a>,
    },
}

impl<'a> NodeKind<'a> {
    pub fn children(&self) -> Children<'a> {
        let mut out = Children::new();
        match *self {
            NodeKind::Nil
            | NodeKind::Bool(_)
            | NodeKind::Integer(_)
            | NodeKind::Float(_)
            | NodeKind::String(_)
            | NodeKind::Identifier(_)
            | NodeKind::Pointer(_) => {}
            NodeKind::Unary { operand, .. } => out.push(operand),
            NodeKind::Binary { left, right, .. } => {
                out.push(left);
                out.push(right);
            }
            NodeKind::Member {
                object, property, ..
            } => {
                out.push(object);
                out.push(property);
            }
            NodeKind::Slice { object, from, to } => {
                out.push(object);
                out.extend(from);
                out.extend(to);
            }
            NodeKind::Array(items) => out.extend(items.iter().copied()),
            NodeKind::Map(entries) => {
                for &(key, value) in entries {
                    out.push(key);
                    out.push(value);
                }
            }
            NodeKind::Call { callee, args } => {
                out.push(callee);
                out.extend(args.iter().copied());
            }
            NodeKind::Builtin { args, .. } => out.extend(args.iter().copied()),
            NodeKind::Predicate(body) => out.push(body),
            NodeKind::Conditional {
                cond,
                then,
                otherwise,
            } => {
                out.push(cond);
                out.push(then);
                out.push(otherwise);
            }
        }
        out
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            NodeKind::Nil
                | NodeKind::Bool(_)
                | NodeKind::Integer(_)
                | NodeKind::Float(_)
                | NodeKind::String(_)
        )
    }
}

/// A node: its variant, the byte offset it was parsed from, and the type fact
/// filled in by the checker.
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    pub kind: NodeKind<'a>,
    pub pos: usize,
    pub fact: Option<Fact<'a>>,
}

/// The indirection cell every node lives in.
///
/// Parents point at slots, never at node values, so overwriting a slot is
/// visible through every reference to it and leaves the rest of the tree alone.
pub struct Slot<'a> {
    node: Cell<Node<'a>>,
}

impl<'a> Slot<'a> {
    pub(crate) fn new(kind: NodeKind<'a>, pos: usize) -> Self {
        Self {
            node: Cell::new(Node {
                kind,
                pos,
                fact: None,
            }),
        }
    }

    pub fn node(&self) -> Node<'a> {
        self.node.get()
    }

    pub fn kind(&self) -> NodeKind<'a> {
        self.node.get().kind
    }

    pub fn pos(&self) -> usize {
        self.node.get().pos
    }

    pub fn fact(&self) -> Option<Fact<'a>> {
        self.node.get().fact
    }

    pub fn set_fact(&self, fact: Fact<'a>) {
        let mut node = self.node.get();
        node.fact = Some(fact);
        self.node.set(node);
    }

    /// Set the source offset. Returns `self` so builders can chain it.
    pub fn at(&self, pos: usize) -> &Self {
        let mut node = self.node.get();
        node.pos = pos;
        self.node.set(node);
        self
    }

    pub(crate) fn replace_kind(&self, kind: NodeKind<'a>) {
        let mut node = self.node.get();
        node.kind = kind;
        self.node.set(node);
    }
}

impl fmt::Debug for Slot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.node.get();
        f.debug_struct("Slot")
            .field("kind", &node.kind)
            .field("pos", &node.pos)
            .finish()
    }
}
