//! Error types for laddersim

use thiserror::Error;

use crate::instruction::{Instruction, StackRule};
use crate::memory::BoundsPolicy;

/// Rejection of a whole mnemonic program. No partial program is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Line does not match `OPCODE [ BANKLETTER HEXADDRESS ]`
    #[error("Syntax Error [Line: {line}]")]
    Syntax { line: usize },

    /// Well-formed mnemonic that names no known opcode
    #[error("Unknown opcode `{name}` [Line: {line}]")]
    UnknownOpcode { line: usize, name: String },

    /// Bank letter other than `M`
    #[error("Unknown memory bank `{letter}` [Line: {line}]")]
    UnknownBank { line: usize, letter: char },

    /// Hex address does not fit in `usize`
    #[error("Address overflow [Line: {line}]")]
    AddressOverflow { line: usize },

    /// Source contained no instructions
    #[error("Program has no instructions")]
    EmptyProgram,
}

/// Address outside the addressable range of a bank pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("address {address:#05X} out of bounds for bank size {size:#05X} ({bounds:?})")]
pub struct OutOfBounds {
    pub address: usize,
    pub size: usize,
    pub bounds: BoundsPolicy,
}

/// Stack depth did not satisfy an opcode's arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("stack depth {depth} violates {rule}")]
pub struct StackError {
    pub rule: StackRule,
    pub depth: usize,
}

/// Which precondition an instruction violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FaultKind {
    #[error("memory argument required")]
    MissingArgument,

    #[error("no argument expected")]
    UnexpectedArgument,

    #[error(transparent)]
    AddressOutOfBounds(#[from] OutOfBounds),

    #[error(transparent)]
    Stack(#[from] StackError),
}

/// A precondition violation raised while executing a program.
///
/// `index` is the 0-based position in the program, `line` the 1-based
/// source line the instruction came from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("logic fault at line {line} (`{instruction}`): {kind}")]
pub struct Fault {
    pub index: usize,
    pub line: usize,
    pub instruction: Instruction,
    pub kind: FaultKind,
}

/// Laddersim error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LadderError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Fault(#[from] Fault),

    /// Engine refused to run because an earlier fault is latched
    #[error("engine halted: {0}")]
    Halted(Box<Fault>),

    /// Scan did not return to instruction 0 within the step budget
    #[error("scan exceeded step limit of {limit}")]
    StepLimit { limit: usize },

    #[error(transparent)]
    OutOfBounds(#[from] OutOfBounds),

    #[error("truth table over {inputs} inputs exceeds the maximum of {max}")]
    TableTooWide { inputs: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, LadderError>;
