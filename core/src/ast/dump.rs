use core::fmt::Write;

use super::{NodeKind, NodeRef};

/// Render a tree in a canonical indented form.
///
/// Only the structure is rendered: positions and type facts are left out, so
/// two trees dump identically exactly when they have the same shape and
/// literal values.
pub fn dump(node: NodeRef<'_>) -> String {
    let mut out = String::new();
    dump_into(&mut out, node, 0);
    out
}

fn dump_into(out: &mut String, node: NodeRef<'_>, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    let kind = node.kind();
    // Writing into a String cannot fail.
    let _ = match kind {
        NodeKind::Nil => writeln!(out, "Nil"),
        NodeKind::Bool(b) => writeln!(out, "Bool {b}"),
        NodeKind::Integer(i) => writeln!(out, "Integer {i}"),
        NodeKind::Float(x) => writeln!(out, "Float {x:?}"),
        NodeKind::String(s) => writeln!(out, "String {s:?}"),
        NodeKind::Identifier(name) => writeln!(out, "Identifier {name}"),
        NodeKind::Unary { op, .. } => writeln!(out, "Unary {op}"),
        NodeKind::Binary { op, .. } => writeln!(out, "Binary {op}"),
        NodeKind::Member { optional, .. } => {
            if optional {
                writeln!(out, "Member optional")
            } else {
                writeln!(out, "Member")
            }
        }
        NodeKind::Pointer(name) => writeln!(out, "Pointer #{name}"),
        NodeKind::Slice { from, to, .. } => {
            let bound = |present: bool| if present { "_" } else { "" };
            writeln!(out, "Slice [{}:{}]", bound(from.is_some()), bound(to.is_some()))
        }
        NodeKind::Array(_) => writeln!(out, "Array"),
        NodeKind::Map(_) => writeln!(out, "Map"),
        NodeKind::Call { .. } => writeln!(out, "Call"),
        NodeKind::Builtin { name, .. } => writeln!(out, "Builtin {name}"),
        NodeKind::Predicate(_) => writeln!(out, "Predicate"),
        NodeKind::Conditional { .. } => writeln!(out, "Conditional"),
    };
    for child in kind.children() {
        dump_into(out, child, depth + 1);
    }
}
