use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::instruction::Instruction;

/// Immutable, non-empty instruction sequence.
///
/// Executes 0-indexed; each instruction also remembers the 1-based source
/// line it was parsed from, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
    lines: Vec<usize>,
}

impl Program {
    /// Build a program from already-validated instructions. Line numbers are
    /// assigned as `1..=len`.
    pub fn new(instructions: Vec<Instruction>) -> Result<Self, ParseError> {
        let lines = (1..=instructions.len()).collect();
        Self::with_lines(instructions, lines)
    }

    pub(crate) fn with_lines(
        instructions: Vec<Instruction>,
        lines: Vec<usize>,
    ) -> Result<Self, ParseError> {
        debug_assert_eq!(instructions.len(), lines.len());
        if instructions.is_empty() {
            return Err(ParseError::EmptyProgram);
        }
        Ok(Self {
            instructions,
            lines,
        })
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// Source line of the instruction at `index`.
    pub fn line(&self, index: usize) -> Option<usize> {
        self.lines.get(index).copied()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Instruction)> {
        self.lines.iter().copied().zip(self.instructions.iter())
    }
}

impl FromStr for Program {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::mnemonic::parse(s)
    }
}

/// One instruction per line, prefixed with its source line.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (line, instr) in self.iter() {
            writeln!(f, "{line:4}: {instr}")?;
        }
        Ok(())
    }
}
