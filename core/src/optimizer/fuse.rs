use tracing::debug;

use crate::ast::{NodeKind, NodeRef, TreeBuilder, Visitor, patch};
use crate::builtins;
use crate::compiler::CompileError;

/// `(outer, inner, fused)`: `outer(inner(c, p))` becomes `fused(c, p)`.
const FUSIONS: &[(&str, &str, &str)] = &[("sum", "map", "sum"), ("len", "filter", "count")];

/// Builtin call fusion.
///
/// Replaces a builtin applied to the result of a predicate loop with a single
/// loop, so no intermediate array is built.
pub struct Fusion<'b, 'a> {
    builder: &'b TreeBuilder<'a>,
    fused: usize,
    error: Option<CompileError>,
}

impl<'b, 'a> Fusion<'b, 'a> {
    pub fn new(builder: &'b TreeBuilder<'a>) -> Self {
        Self {
            builder,
            fused: 0,
            error: None,
        }
    }

    pub fn fused(&self) -> usize {
        self.fused
    }

    /// The first invariant violation found during the walk, if any.
    pub fn finish(&mut self) -> Result<(), CompileError> {
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn fuse(&self, slot: NodeRef<'a>) -> Result<Option<NodeKind<'a>>, CompileError> {
        let NodeKind::Builtin { name, args } = slot.kind() else {
            return Ok(None);
        };
        let [inner] = args else {
            return Ok(None);
        };
        let NodeKind::Builtin {
            name: inner_name,
            args: inner_args,
        } = inner.kind()
        else {
            return Ok(None);
        };
        for &(outer, looped, fused) in FUSIONS {
            if name != outer || inner_name != looped || inner_args.len() != 2 {
                continue;
            }
            check_arity(slot, fused, inner_args.len())?;
            debug!(from = outer, to = fused, pos = slot.pos(), "fusing builtin calls");
            return Ok(Some(self.builder.builtin_kind(fused, inner_args)));
        }
        Ok(None)
    }
}

impl<'a> Visitor<'a> for Fusion<'_, 'a> {
    fn visit(&mut self, slot: NodeRef<'a>) {
        if self.error.is_some() {
            return;
        }
        match self.fuse(slot) {
            Ok(Some(kind)) => {
                patch(slot, kind);
                self.fused += 1;
            }
            Ok(None) => {}
            Err(err) => self.error = Some(err),
        }
    }
}

/// A rewrite must never produce a builtin call the builtin table rejects.
pub(crate) fn check_arity(slot: NodeRef<'_>, name: &str, argc: usize) -> Result<(), CompileError> {
    match builtins::lookup(name) {
        Some((_, builtin)) if builtin.accepts(argc) => Ok(()),
        _ => Err(CompileError::Invariant {
            message: format!("rewrite produced {}() with {} argument(s)", name, argc),
            pos: slot.pos(),
        }),
    }
}
