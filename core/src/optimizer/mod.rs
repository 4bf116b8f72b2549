//! Tree rewrites run between checking and compilation.
//!
//! Two passes alternate until neither changes anything: constant folding and
//! builtin call fusion. Both rewrite slots in place with
//! [`patch`](crate::ast::patch), so facts recorded by the checker stay
//! attached to the rewritten nodes.

mod fold;
mod fuse;


use bumpalo::Bump;
use tracing::debug;

use crate::ast::{NodeRef, TreeBuilder, walk};
use crate::compiler::CompileError;

pub use fold::ConstantFolder;
pub use fuse::Fusion;

/// Upper bound on fold/fuse rounds.
pub const MAX_PASSES: usize = 1000;

/// Optimizes the tree rooted at `root` in place.
///
/// Returns the number of rewrites performed.
pub fn optimize<'a>(arena: &'a Bump, root: NodeRef<'a>) -> Result<usize, CompileError> {
    let builder = TreeBuilder::new(arena);
    let mut rewrites = 0;
    let mut passes = 0;
    loop {
        let mut folder = ConstantFolder::new(&builder);
        walk(root, &mut folder);

        let mut fusion = Fusion::new(&builder);
        walk(root, &mut fusion);
        fusion.finish()?;

        passes += 1;
        let changed = folder.folded() + fusion.fused();
        rewrites += changed;
        if changed == 0 || passes >= MAX_PASSES {
            break;
        }
    }
    debug!(passes, rewrites, "optimizer finished");
    Ok(rewrites)
}
