//! Bytecode compiler implementation.

use hashbrown::HashMap;
use tracing::debug;

use crate::ast::{BinaryOp, NodeKind, NodeRef, UnaryOp};
use crate::builtins;
use crate::compiler::CompileError;
use crate::types::{Fact, Type, TypeView, typed_func_index};
use crate::values::Value;
use crate::vm::{Instruction, Program};

type CompileResult<T = ()> = Result<T, CompileError>;

/// Constant pool key: floats by bit pattern so `NaN` and `-0.0` dedup safely.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ConstKey {
    Nil,
    Bool(bool),
    Int(i64),
    Float(u64),
    Str(String),
}

/// Lowers a checked tree to a [`Program`].
///
/// Compilation is a single recursive pass over the tree. Forward jumps are
/// emitted as placeholders and patched once their target is known; predicate
/// builtins are expanded to inline loops.
pub struct BytecodeCompiler<'a> {
    env: Option<&'a Type<'a>>,

    /// Constant pool for literal values and names.
    constants: Vec<Value>,

    /// Constant deduplication map: key -> index in `constants`.
    constant_map: HashMap<ConstKey, u32>,

    instructions: Vec<Instruction>,

    /// Source offset of every emitted instruction.
    positions: Vec<usize>,

    /// Offset of the node being compiled.
    pos: usize,

    /// Names of the enclosing predicate builtins, innermost last.
    loops: Vec<&'static str>,
}

impl<'a> BytecodeCompiler<'a> {
    pub fn new(env: Option<&'a Type<'a>>) -> Self {
        Self {
            env,
            constants: Vec::new(),
            constant_map: HashMap::new(),
            instructions: Vec::new(),
            positions: Vec::new(),
            pos: 0,
            loops: Vec::new(),
        }
    }

    /// Convenience method to compile a tree in one call.
    pub fn compile(root: NodeRef<'a>, env: Option<&'a Type<'a>>) -> CompileResult<Program> {
        let mut compiler = Self::new(env);
        compiler.compile_node(root)?;
        // Emit Return instruction to signal end of execution
        compiler.pos = root.pos();
        compiler.emit(Instruction::Return);
        let program = compiler.finalize();
        debug!(
            instructions = program.instructions.len(),
            constants = program.constants.len(),
            "compiled program"
        );
        Ok(program)
    }

    pub fn finalize(self) -> Program {
        Program {
            instructions: self.instructions,
            constants: self.constants,
            positions: self.positions,
        }
    }

    // === Instruction Emission ===

    fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
        self.positions.push(self.pos);
    }

    // === Constant Pool Management ===

    /// Add a constant to the pool (or reuse existing) and return its index.
    fn add_constant(&mut self, value: Value) -> CompileResult<u32> {
        let key = match &value {
            Value::Nil => ConstKey::Nil,
            Value::Bool(b) => ConstKey::Bool(*b),
            Value::Int(i) => ConstKey::Int(*i),
            Value::Float(f) => ConstKey::Float(f.to_bits()),
            Value::Str(s) => ConstKey::Str(s.to_string()),
            // Only literals and names are ever pooled.
            _ => {
                return Err(CompileError::Invariant {
                    message: format!("cannot pool a {} constant", value.type_name()),
                    pos: self.pos,
                });
            }
        };
        if let Some(&existing_index) = self.constant_map.get(&key) {
            return Ok(existing_index);
        }
        let index =
            u32::try_from(self.constants.len()).map_err(|_| CompileError::TooManyConstants)?;
        self.constants.push(value);
        self.constant_map.insert(key, index);
        Ok(index)
    }

    fn push_constant(&mut self, value: Value) -> CompileResult {
        let index = self.add_constant(value)?;
        self.emit(Instruction::Push(index));
        Ok(())
    }

    fn name_constant(&mut self, name: &str) -> CompileResult<u32> {
        self.add_constant(Value::str(name))
    }

    // === Jump Patching Infrastructure ===

    /// Reserve space for a forward jump and return its index.
    ///
    /// The jump target will be patched later with `patch_jump`.
    fn jump_placeholder(&mut self) -> usize {
        let placeholder_index = self.label();
        self.emit(Instruction::Jump(0));
        placeholder_index
    }

    /// Get the current instruction index (for use as a jump label).
    fn label(&self) -> usize {
        self.instructions.len()
    }

    /// Patch a jump placeholder with the actual jump instruction.
    ///
    /// Offsets are relative to the instruction after the jump.
    fn patch_jump<F>(
        &mut self,
        placeholder_index: usize,
        target_label: usize,
        make_jump: F,
    ) -> CompileResult
    where
        F: FnOnce(u32) -> Instruction,
    {
        let offset = target_label
            .checked_sub(placeholder_index + 1)
            .ok_or_else(|| CompileError::Invariant {
                message: "forward jump to an earlier instruction".into(),
                pos: self.pos,
            })?;
        let offset = u32::try_from(offset).map_err(|_| CompileError::JumpTooFar)?;
        self.instructions[placeholder_index] = make_jump(offset);
        Ok(())
    }

    /// Patch a placeholder to jump to the current position.
    fn patch_here<F>(&mut self, placeholder_index: usize, make_jump: F) -> CompileResult
    where
        F: FnOnce(u32) -> Instruction,
    {
        let here = self.label();
        self.patch_jump(placeholder_index, here, make_jump)
    }

    fn jump_back(&mut self, target_label: usize) -> CompileResult {
        let offset = self.label() + 1 - target_label;
        let offset = u32::try_from(offset).map_err(|_| CompileError::JumpTooFar)?;
        self.emit(Instruction::JumpBackward(offset));
        Ok(())
    }

    // === Nodes ===

    fn compile_node(&mut self, slot: NodeRef<'a>) -> CompileResult {
        if slot.fact() == Some(Fact::Invalid) {
            return Err(CompileError::InvalidNode { pos: slot.pos() });
        }
        let saved_pos = self.pos;
        self.pos = slot.pos();
        self.compile_kind(slot)?;
        self.pos = saved_pos;
        Ok(())
    }

    fn compile_kind(&mut self, slot: NodeRef<'a>) -> CompileResult {
        match slot.kind() {
            // === Constants ===
            NodeKind::Nil => self.push_constant(Value::Nil)?,
            NodeKind::Bool(b) => self.push_constant(Value::Bool(b))?,
            NodeKind::Integer(i) => self.push_constant(Value::Int(i))?,
            NodeKind::Float(f) => self.push_constant(Value::Float(f))?,
            NodeKind::String(s) => self.push_constant(Value::str(s))?,

            NodeKind::Identifier(name) => self.identifier(name)?,
            NodeKind::Pointer(name) => self.pointer(slot, name)?,

            // === Operators ===
            NodeKind::Unary { op, operand } => {
                self.compile_node(operand)?;
                match op {
                    UnaryOp::Neg => self.emit(Instruction::Negate),
                    UnaryOp::Not => self.emit(Instruction::Not),
                }
            }
            NodeKind::Binary { op, left, right } => self.binary(op, left, right)?,

            // === Member Access ===
            NodeKind::Member {
                object,
                property,
                optional,
            } => {
                self.compile_node(object)?;
                let skip = if optional {
                    Some(self.jump_placeholder())
                } else {
                    None
                };
                self.fetch(object, property)?;
                if let Some(skip) = skip {
                    self.patch_here(skip, Instruction::JumpIfNil)?;
                }
            }
            NodeKind::Slice { object, from, to } => {
                self.compile_node(object)?;
                for bound in [from, to] {
                    match bound {
                        Some(bound) => self.compile_node(bound)?,
                        None => self.push_constant(Value::Nil)?,
                    }
                }
                self.emit(Instruction::Slice);
            }

            // === Collections ===
            NodeKind::Array(items) => {
                for &item in items {
                    self.compile_node(item)?;
                }
                self.emit(Instruction::Array(count(items.len())?));
            }
            NodeKind::Map(entries) => {
                for &(key, value) in entries {
                    self.compile_node(key)?;
                    self.compile_node(value)?;
                }
                self.emit(Instruction::Map(count(entries.len())?));
            }

            // === Calls ===
            NodeKind::Call { callee, args } => {
                self.compile_node(callee)?;
                for &arg in args {
                    self.compile_node(arg)?;
                }
                let typed = match callee.fact() {
                    Some(Fact::Known(ty)) => match typed_func_index(ty, false) {
                        (index, true) => Some(index),
                        _ => None,
                    },
                    _ => None,
                };
                match typed {
                    Some(index) => self.emit(Instruction::CallTyped(count(index)?)),
                    None => self.emit(Instruction::Call(count(args.len())?)),
                }
            }
            NodeKind::Builtin { name, args } => self.builtin(slot, name, args)?,

            NodeKind::Predicate(_) => {
                return Err(CompileError::UnexpectedPredicate { pos: slot.pos() });
            }

            // === Conditionals ===
            NodeKind::Conditional {
                cond,
                then,
                otherwise,
            } => {
                self.compile_node(cond)?;
                let else_jump = self.jump_placeholder();
                self.compile_node(then)?;
                let end_jump = self.jump_placeholder();
                self.patch_here(else_jump, Instruction::PopJumpIfFalse)?;
                self.compile_node(otherwise)?;
                self.patch_here(end_jump, Instruction::Jump)?;
            }
        }
        Ok(())
    }

    fn identifier(&mut self, name: &str) -> CompileResult {
        let name_index = self.name_constant(name)?;
        let instruction = match self.env {
            Some(env @ Type::Struct { .. }) => {
                if let Some((index, _)) = env.field(name) {
                    Instruction::LoadField {
                        index: count(index)?,
                        name: name_index,
                    }
                } else if let Some((index, _)) = env.method(name) {
                    Instruction::LoadMethod {
                        index: count(index)?,
                        name: name_index,
                    }
                } else {
                    Instruction::LoadName(name_index)
                }
            }
            Some(Type::Map(..)) => Instruction::LoadKey(name_index),
            _ => Instruction::LoadName(name_index),
        };
        self.emit(instruction);
        Ok(())
    }

    fn pointer(&mut self, slot: NodeRef<'a>, name: &str) -> CompileResult {
        if self.loops.is_empty() {
            return Err(CompileError::PointerOutsidePredicate {
                name: name.to_string(),
                pos: slot.pos(),
            });
        }
        let instruction = match name {
            "" => Instruction::Pointer,
            "index" => Instruction::PointerIndex,
            "acc" => Instruction::PointerAcc,
            other => {
                return Err(CompileError::Invariant {
                    message: format!("unknown pointer #{}", other),
                    pos: slot.pos(),
                });
            }
        };
        self.emit(instruction);
        Ok(())
    }

    /// `object.property` with `object` already on the stack.
    fn fetch(&mut self, object: NodeRef<'a>, property: NodeRef<'a>) -> CompileResult {
        if let (Some(Fact::Known(ty @ Type::Struct { .. })), NodeKind::String(name)) =
            (object.fact(), property.kind())
        {
            let name_index = self.name_constant(name)?;
            if let Some((index, _)) = ty.field(name) {
                self.emit(Instruction::FetchField {
                    index: count(index)?,
                    name: name_index,
                });
                return Ok(());
            }
            if let Some((index, _)) = ty.method(name) {
                self.emit(Instruction::FetchMethod {
                    index: count(index)?,
                    name: name_index,
                });
                return Ok(());
            }
        }
        self.compile_node(property)?;
        self.emit(Instruction::Fetch);
        Ok(())
    }

    fn binary(&mut self, op: BinaryOp, left: NodeRef<'a>, right: NodeRef<'a>) -> CompileResult {
        // Short-circuit operators keep the left value when they jump.
        let short_circuit: Option<fn(u32) -> Instruction> = match op {
            BinaryOp::And => Some(Instruction::JumpIfFalse),
            BinaryOp::Or => Some(Instruction::JumpIfTrue),
            BinaryOp::Coalesce => Some(Instruction::JumpIfNotNil),
            _ => None,
        };
        if let Some(make_jump) = short_circuit {
            self.compile_node(left)?;
            let end_jump = self.jump_placeholder();
            self.emit(Instruction::Pop);
            self.compile_node(right)?;
            return self.patch_here(end_jump, make_jump);
        }

        self.compile_node(left)?;
        self.compile_node(right)?;
        match op {
            BinaryOp::Eq => self.emit(Instruction::Equal),
            BinaryOp::Ne => {
                self.emit(Instruction::Equal);
                self.emit(Instruction::Not);
            }
            BinaryOp::In => self.emit(Instruction::In),
            BinaryOp::Contains => self.emit(Instruction::Contains),
            BinaryOp::StartsWith => self.emit(Instruction::StartsWith),
            BinaryOp::EndsWith => self.emit(Instruction::EndsWith),
            BinaryOp::Matches => self.emit(Instruction::Matches),
            BinaryOp::Range => self.emit(Instruction::Range),
            _ if op.is_arithmetic() || op.is_ordering() => {
                let instruction = match (left.fact(), right.fact()) {
                    (Some(Fact::Known(Type::Int)), Some(Fact::Known(Type::Int))) => {
                        Instruction::IntBinOp(op)
                    }
                    (Some(Fact::Known(Type::Float)), Some(Fact::Known(Type::Float))) => {
                        Instruction::FloatBinOp(op)
                    }
                    _ => Instruction::BinOp(op),
                };
                self.emit(instruction);
            }
            _ => self.emit(Instruction::BinOp(op)),
        }
        Ok(())
    }

    // === Builtins ===

    fn builtin(
        &mut self,
        slot: NodeRef<'a>,
        name: &str,
        args: &'a [NodeRef<'a>],
    ) -> CompileResult {
        let Some((id, builtin)) = builtins::lookup(name) else {
            return Err(CompileError::UnknownBuiltin {
                name: name.to_string(),
                pos: slot.pos(),
            });
        };
        if !builtin.accepts(args.len()) {
            return Err(CompileError::Invariant {
                message: format!("{}() called with {} argument(s)", name, args.len()),
                pos: slot.pos(),
            });
        }
        if builtin.is_predicate() {
            return self.predicate_loop(slot, builtin.name, args);
        }
        for &arg in args {
            self.compile_node(arg)?;
        }
        self.emit(Instruction::CallBuiltin {
            id: count(id)?,
            argc: count(args.len())?,
        });
        Ok(())
    }

    /// Expands a predicate builtin into an inline loop:
    ///
    /// ```text
    ///         <collection>
    ///         Begin
    /// start:  JumpIfEnd(exit)
    ///         <body>
    ///         IncrementIndex
    ///         JumpBackward(start)
    /// exit:   <epilogue>
    ///         End
    /// ```
    fn predicate_loop(
        &mut self,
        slot: NodeRef<'a>,
        name: &'static str,
        args: &'a [NodeRef<'a>],
    ) -> CompileResult {
        use Instruction::*;

        // The initial accumulator is evaluated outside of the loop scope.
        let init = if name == "reduce" { args.get(2).copied() } else { None };
        if let Some(init) = init {
            self.compile_node(init)?;
        }
        self.compile_node(args[0])?;
        self.emit(Begin);

        let body = match args.get(1) {
            Some(&predicate) => Some(self.predicate_body(predicate)?),
            None => None,
        };

        match name {
            "all" | "none" | "any" => {
                let (invert, make_jump, default): (bool, fn(u32) -> Instruction, bool) =
                    match name {
                        "all" => (false, JumpIfFalse, true),
                        "none" => (true, JumpIfFalse, true),
                        _ => (false, JumpIfTrue, false),
                    };
                let exit = self.emit_loop(name, |c| {
                    c.compile_body(body)?;
                    if invert {
                        c.emit(Not);
                    }
                    let exit = c.jump_placeholder();
                    c.emit(Pop);
                    Ok(exit)
                })?;
                self.push_constant(Value::Bool(default))?;
                self.patch_here(exit, make_jump)?;
                self.emit(End);
            }
            "one" | "count" => {
                self.emit_loop(name, |c| c.count_matches(body, false))?;
                self.emit(GetCount);
                if name == "one" {
                    self.push_constant(Value::Int(1))?;
                    self.emit(Equal);
                }
                self.emit(End);
            }
            "filter" => {
                self.emit_loop(name, |c| c.count_matches(body, true))?;
                self.emit(GetCount);
                self.emit(End);
                self.emit(Collect);
            }
            "map" => {
                self.emit_loop(name, |c| c.compile_body(body))?;
                self.emit(GetLen);
                self.emit(End);
                self.emit(Collect);
            }
            "find" | "findIndex" => {
                let (found, missing) = if name == "find" {
                    (Pointer, Value::Nil)
                } else {
                    (PointerIndex, Value::Int(-1))
                };
                let exit = self.emit_loop(name, |c| {
                    c.compile_body(body)?;
                    let skip = c.jump_placeholder();
                    c.emit(found);
                    let exit = c.jump_placeholder();
                    c.patch_here(skip, PopJumpIfFalse)?;
                    Ok(exit)
                })?;
                self.push_constant(missing)?;
                self.patch_here(exit, Jump)?;
                self.emit(End);
            }
            "sum" => {
                self.push_constant(Value::Int(0))?;
                self.emit(SetAcc);
                self.emit_loop(name, |c| {
                    c.emit(PointerAcc);
                    match body {
                        Some(_) => c.compile_body(body)?,
                        None => c.emit(Pointer),
                    }
                    c.emit(BinOp(BinaryOp::Add));
                    c.emit(SetAcc);
                    Ok(())
                })?;
                self.emit(PointerAcc);
                self.emit(End);
            }
            "reduce" => {
                if init.is_some() {
                    self.emit(SetAcc);
                } else {
                    // The first element seeds the accumulator.
                    self.emit(Pointer);
                    self.emit(SetAcc);
                    self.emit(IncrementIndex);
                }
                self.emit_loop(name, |c| {
                    c.compile_body(body)?;
                    c.emit(SetAcc);
                    Ok(())
                })?;
                self.emit(PointerAcc);
                self.emit(End);
            }
            other => {
                return Err(CompileError::Invariant {
                    message: format!("no loop form for {}()", other),
                    pos: slot.pos(),
                });
            }
        }
        Ok(())
    }

    fn emit_loop<R, F>(&mut self, name: &'static str, body: F) -> CompileResult<R>
    where
        F: FnOnce(&mut Self) -> CompileResult<R>,
    {
        let start = self.label();
        let exit = self.jump_placeholder();
        self.loops.push(name);
        let result = body(self);
        self.loops.pop();
        let result = result?;
        self.emit(Instruction::IncrementIndex);
        self.jump_back(start)?;
        self.patch_here(exit, Instruction::JumpIfEnd)?;
        Ok(result)
    }

    /// Body of `one`, `count` and `filter`: bump the counter (and keep the
    /// element, for `filter`) when the predicate holds.
    fn count_matches(&mut self, body: Option<NodeRef<'a>>, keep: bool) -> CompileResult {
        self.compile_body(body)?;
        let skip = self.jump_placeholder();
        self.emit(Instruction::IncrementCount);
        if keep {
            self.emit(Instruction::Pointer);
        }
        self.patch_here(skip, Instruction::PopJumpIfFalse)
    }

    fn compile_body(&mut self, body: Option<NodeRef<'a>>) -> CompileResult {
        match body {
            Some(body) => self.compile_node(body),
            None => Err(CompileError::Invariant {
                message: "predicate builtin without a predicate".into(),
                pos: self.pos,
            }),
        }
    }

    fn predicate_body(&self, predicate: NodeRef<'a>) -> CompileResult<NodeRef<'a>> {
        match predicate.kind() {
            NodeKind::Predicate(body) => {
                if predicate.fact() == Some(Fact::Invalid) {
                    return Err(CompileError::InvalidNode {
                        pos: predicate.pos(),
                    });
                }
                Ok(body)
            }
            _ => Err(CompileError::Invariant {
                message: "expected a predicate".into(),
                pos: predicate.pos(),
            }),
        }
    }
}

fn count(n: usize) -> CompileResult<u32> {
    u32::try_from(n).map_err(|_| CompileError::TooManyConstants)
}
