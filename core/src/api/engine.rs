//! The Sift compilation engine.

use bumpalo::Bump;
use tracing::debug;

use super::{EngineOptions, Error};
use crate::ast::{Tree, Visitor, walk};
use crate::types::{Type, TypeManager};
use crate::values::Value;
use crate::vm::{Program, Vm};
use crate::{checker, compiler, optimizer};

/// The Sift compilation and execution engine.
///
/// The engine manages:
/// - Type system (TypeManager)
/// - Environment type the expressions are checked against
/// - Pipeline configuration (EngineOptions)
///
/// # Lifetimes
///
/// - `'arena`: Lifetime of the arena holding types and trees. Trees compiled
///   by the engine must be allocated for the same lifetime, because the
///   checker records facts that point into the engine's types.
///
/// # Example
///
/// ```
/// use bumpalo::Bump;
/// use sift_core::api::{Engine, EngineOptions};
/// use sift_core::ast::{BinaryOp, Tree, TreeBuilder};
/// use sift_core::values::{Record, Value};
///
/// let arena = Bump::new();
/// let engine = Engine::new(&arena, EngineOptions::default(), |types| {
///     Some(types.structure("Env", &[("x", types.int())], &[]))
/// });
///
/// let b = TreeBuilder::new(&arena);
/// let tree = Tree::new(b.binary(BinaryOp::Mul, b.ident("x"), b.int(2)));
/// let program = engine.compile(&tree, &mut []).unwrap();
///
/// let env = Value::record(Record::new("Env").with_field("x", 21i64));
/// assert_eq!(engine.run(&program, &env).unwrap(), Value::Int(42));
/// ```
pub struct Engine<'arena> {
    arena: &'arena Bump,
    type_manager: &'arena TypeManager<'arena>,
    env: Option<&'arena Type<'arena>>,
    options: EngineOptions,
}

impl<'arena> Engine<'arena> {
    /// Create a new engine.
    ///
    /// The initialization closure receives the type manager and returns the
    /// environment type, or `None` for an untyped environment whose names are
    /// resolved at run time.
    pub fn new(
        arena: &'arena Bump,
        options: EngineOptions,
        init: impl FnOnce(&'arena TypeManager<'arena>) -> Option<&'arena Type<'arena>>,
    ) -> Self {
        let type_manager = TypeManager::new(arena);
        let env = init(type_manager);

        Self {
            arena,
            type_manager,
            env,
            options,
        }
    }

    /// Access the type manager.
    ///
    /// Useful for creating types when building environments programmatically.
    pub fn type_manager(&self) -> &'arena TypeManager<'arena> {
        self.type_manager
    }

    /// The environment type, if one was declared.
    pub fn env(&self) -> Option<&'arena Type<'arena>> {
        self.env
    }

    /// Access the engine options.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Compile a tree to a program.
    ///
    /// # Pipeline
    ///
    /// 1. Each visitor walks the tree in turn. A visitor that needs types gets
    ///    a check pass before every walk (its errors are discarded); one that
    ///    asks to repeat is walked again, up to `max_visitor_passes` times.
    /// 2. The checker runs over the final tree; any type error stops here.
    /// 3. The optimizer folds constants and fuses calls (if enabled).
    /// 4. The compiler lowers the tree to bytecode.
    pub fn compile(
        &self,
        tree: &Tree<'arena>,
        visitors: &mut [&mut dyn Visitor<'arena>],
    ) -> Result<Program, Error> {
        let root = tree.root();

        for (index, visitor) in visitors.iter_mut().enumerate() {
            let mut passes = 0;
            loop {
                if visitor.needs_types() {
                    let _ = checker::check(self.type_manager, root, self.env, self.options.strict);
                }
                walk(root, &mut **visitor);
                passes += 1;
                if passes >= self.options.max_visitor_passes || !visitor.should_repeat() {
                    break;
                }
            }
            debug!(visitor = index, passes, "visitor finished");
        }

        let result = checker::check(self.type_manager, root, self.env, self.options.strict)?;
        debug!(result = ?result, "checked tree");

        if self.options.optimize {
            let rewrites = optimizer::optimize(self.arena, root)?;
            debug!(rewrites, "optimized tree");
        }

        let program = compiler::compile(root, self.env)?;
        debug!(instructions = program.len(), "compiled tree");
        Ok(program)
    }

    /// Execute a program against an environment value.
    pub fn run(&self, program: &Program, env: &Value) -> Result<Value, Error> {
        Ok(Vm::new().run(program, env)?)
    }
}
