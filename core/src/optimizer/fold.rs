use crate::ast::{BinaryOp, NodeKind, NodeRef, TreeBuilder, Visitor, patch};
use crate::values::Value;
use crate::vm::operators;

/// Constant folding: evaluate operators whose operands are literals.
///
/// Folding uses the same operator functions as the VM. A fold that fails
/// (say `1 % 0`) is left for the VM to report at runtime, and results with no
/// literal form (arrays from `..`, durations) are not folded.
pub struct ConstantFolder<'b, 'a> {
    builder: &'b TreeBuilder<'a>,
    folded: usize,
}

impl<'b, 'a> ConstantFolder<'b, 'a> {
    pub fn new(builder: &'b TreeBuilder<'a>) -> Self {
        Self { builder, folded: 0 }
    }

    pub fn folded(&self) -> usize {
        self.folded
    }

    fn fold(&self, kind: NodeKind<'a>) -> Option<NodeKind<'a>> {
        match kind {
            NodeKind::Unary { op, operand } => {
                let value = literal_value(operand)?;
                let result = operators::unary(op, &value).ok()?;
                self.literal(result)
            }
            NodeKind::Binary { op, left, right } => self.fold_binary(op, left, right),
            NodeKind::Conditional {
                cond,
                then,
                otherwise,
            } => match cond.kind() {
                NodeKind::Bool(true) => Some(then.kind()),
                NodeKind::Bool(false) => Some(otherwise.kind()),
                _ => None,
            },
            _ => None,
        }
    }

    fn fold_binary(
        &self,
        op: BinaryOp,
        left: NodeRef<'a>,
        right: NodeRef<'a>,
    ) -> Option<NodeKind<'a>> {
        // Short-circuits: the right operand is never evaluated.
        match (op, left.kind()) {
            (BinaryOp::And, NodeKind::Bool(false)) => return Some(NodeKind::Bool(false)),
            (BinaryOp::Or, NodeKind::Bool(true)) => return Some(NodeKind::Bool(true)),
            (BinaryOp::Coalesce, NodeKind::Nil) => return Some(right.kind()),
            (BinaryOp::Coalesce, kind) if kind.is_literal() => return Some(kind),
            _ => {}
        }
        let left = literal_value(left)?;
        let right = literal_value(right)?;
        let result = operators::binary(op, &left, &right).ok()?;
        self.literal(result)
    }

    fn literal(&self, value: Value) -> Option<NodeKind<'a>> {
        Some(match value {
            Value::Nil => NodeKind::Nil,
            Value::Bool(b) => NodeKind::Bool(b),
            Value::Int(i) => NodeKind::Integer(i),
            Value::Float(f) => NodeKind::Float(f),
            Value::Str(s) => NodeKind::String(self.builder.str(&s)),
            _ => return None,
        })
    }
}

impl<'a> Visitor<'a> for ConstantFolder<'_, 'a> {
    fn visit(&mut self, slot: NodeRef<'a>) {
        if let Some(kind) = self.fold(slot.kind()) {
            patch(slot, kind);
            self.folded += 1;
        }
    }
}

fn literal_value(slot: NodeRef<'_>) -> Option<Value> {
    Some(match slot.kind() {
        NodeKind::Nil => Value::Nil,
        NodeKind::Bool(b) => Value::Bool(b),
        NodeKind::Integer(i) => Value::Int(i),
        NodeKind::Float(f) => Value::Float(f),
        NodeKind::String(s) => Value::str(s),
        _ => return None,
    })
}
