pub mod error;
pub mod instruction;
pub mod memory;
pub mod stack;
pub mod program;
pub mod mnemonic;
pub mod engine;
pub mod dump;
pub mod batch;
pub mod stimulus;
pub mod demos;
