//! VM instructions.
//!
//! Every instruction is an opcode with zero, one or two operands. Operands
//! that name values (constants, identifiers, field names) are indexes into the
//! program's constant pool.
//!
//! # Jumps
//!
//! Jump offsets are relative to the *next* instruction: a forward jump at
//! address `a` with offset `n` lands on `a + 1 + n`, a `JumpBackward(n)` lands
//! on `a + 1 - n`.
//!
//! # Stack Discipline
//!
//! Stack effect notation: `[..., operand1, operand2] -> [..., result]`

use crate::ast::BinaryOp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    // ========================================================================
    // Stack & Constants
    // ========================================================================
    /// Push constant from pool.
    /// Stack: [...] -> [..., value]
    Push(u32),

    /// Stack: [..., a] -> [...]
    Pop,

    // ========================================================================
    // Environment
    // ========================================================================
    /// Field of a struct environment, by position. `name` is the constant
    /// holding the field name.
    LoadField { index: u32, name: u32 },

    /// Method of a struct environment, bound to the environment.
    LoadMethod { index: u32, name: u32 },

    /// Key of a map environment; missing keys load `nil`.
    LoadKey(u32),

    /// Name lookup on an environment of unknown shape.
    LoadName(u32),

    // ========================================================================
    // Member Access
    // ========================================================================
    /// Stack: [..., object, property] -> [..., value]
    Fetch,

    /// Stack: [..., struct] -> [..., field]
    FetchField { index: u32, name: u32 },

    /// Stack: [..., struct] -> [..., bound method]
    FetchMethod { index: u32, name: u32 },

    /// Stack: [..., object, from, to] -> [..., slice]
    /// Absent bounds are pushed as `nil`.
    Slice,

    // ========================================================================
    // Operators
    // ========================================================================
    /// Stack: [..., a] -> [..., -a]
    Negate,

    /// Stack: [..., a: Bool] -> [..., !a]
    Not,

    /// Both operands statically known to be `int`.
    /// Stack: [..., a: Int, b: Int] -> [..., result]
    IntBinOp(BinaryOp),

    /// Both operands statically known to be `float`.
    /// Stack: [..., a: Float, b: Float] -> [..., result]
    FloatBinOp(BinaryOp),

    /// Operand kinds resolved at runtime.
    /// Stack: [..., a, b] -> [..., result]
    BinOp(BinaryOp),

    /// Stack: [..., a, b] -> [..., a == b]
    Equal,

    /// Stack: [..., needle, haystack] -> [..., Bool]
    In,

    /// Stack: [..., a: Str, b: Str] -> [..., Bool]
    Contains,
    StartsWith,
    EndsWith,

    /// Stack: [..., s: Str, pattern: Str] -> [..., Bool]
    Matches,

    /// Stack: [..., from: Int, to: Int] -> [..., Array]
    Range,

    // ========================================================================
    // Control Flow
    // ========================================================================
    Jump(u32),

    /// Jump if top is `true`; the condition stays on the stack.
    JumpIfTrue(u32),

    /// Jump if top is `false`; the condition stays on the stack.
    JumpIfFalse(u32),

    /// Stack: [..., cond: Bool] -> [...]
    PopJumpIfFalse(u32),

    /// Jump if top is `nil`; the value stays on the stack.
    JumpIfNil(u32),

    /// Jump if top is not `nil`; the value stays on the stack.
    JumpIfNotNil(u32),

    /// Jump when the innermost loop has visited every element.
    JumpIfEnd(u32),

    JumpBackward(u32),

    // ========================================================================
    // Collections
    // ========================================================================
    /// Stack: [..., a1, ..., aN] -> [..., Array]
    Array(u32),

    /// Stack: [..., k1, v1, ..., kN, vN] -> [..., Map]
    Map(u32),

    /// Like `Array`, with the element count taken from the stack.
    /// Stack: [..., a1, ..., aN, N: Int] -> [..., Array]
    Collect,

    // ========================================================================
    // Calls
    // ========================================================================
    /// Stack: [..., callee, a1, ..., aN] -> [..., result]
    Call(u32),

    /// Call through the fast-call table; arity comes from the table entry.
    /// Stack: [..., callee, a1, ..., aN] -> [..., result]
    CallTyped(u32),

    /// Stack: [..., a1, ..., aN] -> [..., result]
    CallBuiltin { id: u32, argc: u32 },

    // ========================================================================
    // Predicate Loops
    // ========================================================================
    /// Open a loop scope over an array.
    /// Stack: [..., array] -> [...]
    Begin,

    /// Close the innermost loop scope.
    End,

    /// Push the current element (`#`).
    Pointer,

    /// Push the current index (`#index`).
    PointerIndex,

    /// Push the accumulator (`#acc`).
    PointerAcc,

    /// Stack: [..., value] -> [...]
    SetAcc,

    IncrementIndex,
    IncrementCount,

    /// Push the matched-element count.
    GetCount,

    /// Push the length of the array being iterated.
    GetLen,

    // ========================================================================
    // Special
    // ========================================================================
    /// Stop and yield the top of the stack.
    Return,
}

impl Instruction {
    /// Target address of a jump located at `addr`.
    pub fn jump_target(&self, addr: usize) -> Option<usize> {
        match *self {
            Instruction::Jump(offset)
            | Instruction::JumpIfTrue(offset)
            | Instruction::JumpIfFalse(offset)
            | Instruction::PopJumpIfFalse(offset)
            | Instruction::JumpIfNil(offset)
            | Instruction::JumpIfNotNil(offset)
            | Instruction::JumpIfEnd(offset) => Some(addr + 1 + offset as usize),
            Instruction::JumpBackward(offset) => (addr + 1).checked_sub(offset as usize),
            _ => None,
        }
    }
}
