use core::fmt;

use hashbrown::HashMap;

use crate::values::Value;
use crate::vm::Instruction;

/// Compiled bytecode.
///
/// `positions[i]` is the source offset of the expression that emitted
/// `instructions[i]`. Programs are immutable once built and can be shared
/// between threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub instructions: Vec<Instruction>,
    pub constants: Vec<Value>,
    pub positions: Vec<usize>,
}

impl Program {
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Source offset of the instruction at `ip`, or 0 if out of range.
    pub fn position(&self, ip: usize) -> usize {
        self.positions.get(ip).copied().unwrap_or(0)
    }

    pub fn constant(&self, index: u32) -> Option<&Value> {
        self.constants.get(index as usize)
    }
}

/// Disassembly listing with jump targets rendered as labels.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.constants.is_empty() {
            writeln!(f, "constants: []")?;
        } else {
            writeln!(f, "constants:")?;
            for (i, constant) in self.constants.iter().enumerate() {
                writeln!(f, "  [{}] = {:?}", i, constant)?;
            }
        }

        // First pass: collect jump targets so they can be labelled.
        let mut targets: Vec<usize> = self
            .instructions
            .iter()
            .enumerate()
            .filter_map(|(addr, instr)| instr.jump_target(addr))
            .collect();
        targets.sort_unstable();
        targets.dedup();
        let labels: HashMap<usize, usize> = targets
            .into_iter()
            .enumerate()
            .map(|(i, addr)| (addr, i))
            .collect();

        writeln!(f, "instructions:")?;
        for (addr, instr) in self.instructions.iter().enumerate() {
            let label = labels
                .get(&addr)
                .map(|l| format!("L{}:", l))
                .unwrap_or_default();
            match instr.jump_target(addr) {
                Some(target) => {
                    let target = labels
                        .get(&target)
                        .map(|l| format!("L{}", l))
                        .unwrap_or_else(|| format!("@{}", target));
                    writeln!(f, "  {:4} {:>4}  {:?} (to {})", addr, label, instr, target)?;
                }
                None => writeln!(f, "  {:4} {:>4}  {:?}", addr, label, instr)?,
            }
        }
        Ok(())
    }
}
