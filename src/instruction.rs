use std::fmt;

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// The ladder-logic opcode catalog.
///
/// Every opcode has a fixed argument shape (see [`Opcode::arg_shape`]) and a
/// stack precondition (see [`Opcode::stack_rule`]). The mnemonic spelling is
/// the upper-case name used in source text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
pub enum Opcode {
    /// Reset the program counter to 0, ending the scan.
    #[strum(serialize = "END")]
    End,
    /// Push the cell.
    #[strum(serialize = "LD")]
    Ld,
    /// Push the complement of the cell.
    #[strum(serialize = "LDNOT")]
    LdNot,
    /// Pop the single chain result into the cell.
    #[strum(serialize = "OUT")]
    Out,
    /// `top = top | cell`
    #[strum(serialize = "OR")]
    Or,
    /// `top = !(top | cell)`
    #[strum(serialize = "ORNOT")]
    OrNot,
    /// `top = top & cell`
    #[strum(serialize = "AND")]
    And,
    /// `top = !(top & cell)`
    #[strum(serialize = "ANDNOT")]
    AndNot,
    /// Merge the two topmost branches with OR.
    #[strum(serialize = "ORSTACK")]
    OrStack,
    /// Merge the two topmost branches with AND.
    #[strum(serialize = "ANDSTACK")]
    AndStack,
}

/// Whether an opcode takes a memory operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgShape {
    None,
    Memory,
}

/// Stack depth an opcode requires before it executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackRule {
    Any,
    Exactly(usize),
    AtLeast(usize),
}

impl StackRule {
    pub fn admits(self, depth: usize) -> bool {
        match self {
            StackRule::Any => true,
            StackRule::Exactly(n) => depth == n,
            StackRule::AtLeast(n) => depth >= n,
        }
    }
}

impl fmt::Display for StackRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackRule::Any => write!(f, "any depth"),
            StackRule::Exactly(n) => write!(f, "exactly {n}"),
            StackRule::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

impl Opcode {
    pub fn arg_shape(self) -> ArgShape {
        match self {
            Opcode::End | Opcode::OrStack | Opcode::AndStack => ArgShape::None,
            Opcode::Ld
            | Opcode::LdNot
            | Opcode::Out
            | Opcode::Or
            | Opcode::OrNot
            | Opcode::And
            | Opcode::AndNot => ArgShape::Memory,
        }
    }

    pub fn stack_rule(self) -> StackRule {
        match self {
            Opcode::End | Opcode::Ld | Opcode::LdNot => StackRule::Any,
            Opcode::Out => StackRule::Exactly(1),
            Opcode::Or | Opcode::OrNot | Opcode::And | Opcode::AndNot => StackRule::AtLeast(1),
            Opcode::OrStack | Opcode::AndStack => StackRule::AtLeast(2),
        }
    }
}

/// Symbolic bank named in source text. Which physical buffer is touched is
/// decided by the read/write mode at execution time, not by this letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BankSelector {
    Memory,
}

impl BankSelector {
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'M' => Some(BankSelector::Memory),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            BankSelector::Memory => 'M',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Argument {
    pub bank: BankSelector,
    pub address: usize,
}

impl Argument {
    pub fn memory(address: usize) -> Self {
        Self {
            bank: BankSelector::Memory,
            address,
        }
    }
}

/// One decoded instruction. Argument presence is not checked here; the
/// engine faults when it does not match [`Opcode::arg_shape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub opcode: Opcode,
    pub arg: Option<Argument>,
}

impl Instruction {
    pub fn new(opcode: Opcode, arg: Option<Argument>) -> Self {
        Self { opcode, arg }
    }

    /// Instruction without an operand.
    pub fn bare(opcode: Opcode) -> Self {
        Self { opcode, arg: None }
    }

    /// Instruction addressing `M<address>`.
    pub fn mem(opcode: Opcode, address: usize) -> Self {
        Self {
            opcode,
            arg: Some(Argument::memory(address)),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.arg {
            Some(arg) => write!(f, "{} {}{:03X}", self.opcode, arg.bank.letter(), arg.address),
            None => write!(f, "{}", self.opcode),
        }
    }
}
