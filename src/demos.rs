//! Demonstration programs.

use crate::error::ParseError;
use crate::program::Program;

/// Copies M000 to M001, then inverts M000. Oscillates from scan to scan.
pub const SELF_TOGGLE: &str = "\
LD M000
OUT M001
LDNOT M000
OUT M000
";

/// Three branches merged with ORSTACK/ANDSTACK, gated by M004, into M100.
pub const LOGIC_CHAIN: &str = "\
LD M000
ANDNOT M001
LD M010
AND M011
ORSTACK
LDNOT M002
AND M003
LDNOT M012
AND M013
LD M022
AND M023
ORSTACK
ORSTACK
ANDSTACK
AND M004
OUT M100
";

/// Cells [`LOGIC_CHAIN`] reads.
pub const LOGIC_CHAIN_INPUTS: [usize; 11] = [
    0x000, 0x001, 0x002, 0x003, 0x004, 0x010, 0x011, 0x012, 0x013, 0x022, 0x023,
];

/// Cell [`LOGIC_CHAIN`] writes.
pub const LOGIC_CHAIN_OUTPUT: usize = 0x100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demo {
    SelfToggle,
    LogicChain,
}

impl Demo {
    pub fn source(self) -> &'static str {
        match self {
            Demo::SelfToggle => SELF_TOGGLE,
            Demo::LogicChain => LOGIC_CHAIN,
        }
    }

    pub fn program(self) -> Result<Program, ParseError> {
        self.source().parse()
    }
}
