use crate::error::{Fault, FaultKind, LadderError, Result};
use crate::instruction::{ArgShape, Instruction, Opcode};
use crate::memory::{BoundsPolicy, DEFAULT_BANK_SIZE, MemoryBanks};
use crate::program::Program;
use crate::stack::EvalStack;

/// When the read and write banks swap roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToggleMode {
    /// After every executed instruction, END included.
    #[default]
    PerInstruction,
    /// Once per scan, when the program counter returns to 0. Writes made
    /// during a scan are only visible to reads in the following scan.
    PerScan,
}

/// Configuration for a scan engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Addressable cells per bank (one more under `BoundsPolicy::Inclusive`).
    pub bank_size: usize,
    pub bounds: BoundsPolicy,
    pub toggle: ToggleMode,
    /// Maximum steps `scan()` may take before giving up (`None` = unbounded).
    pub step_limit: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bank_size: DEFAULT_BANK_SIZE,
            bounds: BoundsPolicy::Inclusive,
            toggle: ToggleMode::PerInstruction,
            step_limit: None,
        }
    }
}

/// Executes a ladder program one instruction or one scan at a time.
///
/// The engine owns its program, memory and stack; independent engines share
/// nothing. A precondition violation latches a [`Fault`]: the current scan
/// is abandoned and every further `step`/`scan` fails with
/// [`LadderError::Halted`] until [`ScanEngine::reset`].
#[derive(Debug, Clone)]
pub struct ScanEngine {
    program: Program,
    banks: MemoryBanks,
    stack: EvalStack,
    pc: usize,
    toggle: ToggleMode,
    step_limit: Option<usize>,
    steps: u64,
    scans: u64,
    fault: Option<Box<Fault>>,
}

impl ScanEngine {
    pub fn new(program: Program) -> Self {
        Self::with_config(program, EngineConfig::default())
    }

    pub fn with_config(program: Program, config: EngineConfig) -> Self {
        Self {
            program,
            banks: MemoryBanks::new(config.bank_size, config.bounds),
            stack: EvalStack::new(),
            pc: 0,
            toggle: config.toggle,
            step_limit: config.step_limit,
            steps: 0,
            scans: 0,
            fault: None,
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn banks(&self) -> &MemoryBanks {
        &self.banks
    }

    /// Index of the next instruction to execute. 0 between scans.
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Current read/write selector; `false` means bank A is the read bank.
    pub fn mode(&self) -> bool {
        self.banks.mode()
    }

    pub fn toggle_mode(&self) -> ToggleMode {
        self.toggle
    }

    /// Evaluation stack, bottom to top.
    pub fn stack(&self) -> &[bool] {
        self.stack.as_slice()
    }

    /// Instructions executed since construction or the last reset.
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    /// Scans completed since construction or the last reset.
    pub fn scan_count(&self) -> u64 {
        self.scans
    }

    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_deref()
    }

    pub fn is_halted(&self) -> bool {
        self.fault.is_some()
    }

    /// Read a cell from the current read bank without changing any state.
    pub fn read(&self, address: usize) -> Result<bool> {
        Ok(self.banks.read(address)?)
    }

    /// Force an input cell in both banks.
    pub fn set_input(&mut self, address: usize, value: bool) -> Result<()> {
        Ok(self.banks.set_input(address, value)?)
    }

    pub fn clear_memory(&mut self) {
        self.banks.clear();
    }

    /// Return to the initial execution state and release a latched fault.
    /// Memory contents are kept.
    pub fn reset(&mut self) {
        self.pc = 0;
        self.stack.clear();
        self.banks.reset_mode();
        self.steps = 0;
        self.scans = 0;
        self.fault = None;
        tracing::debug!("engine reset");
    }

    /// Execute the instruction at the program counter.
    pub fn step(&mut self) -> Result<()> {
        if let Some(fault) = &self.fault {
            return Err(LadderError::Halted(fault.clone()));
        }

        let index = self.pc;
        let instr = self.program.instructions()[index];
        self.pc = (self.pc + 1) % self.program.len();

        if let Err(kind) = self.execute(instr) {
            let fault = Fault {
                index,
                line: self.program.line(index).unwrap_or(index + 1),
                instruction: instr,
                kind,
            };
            tracing::warn!(%fault, "engine halted");
            self.fault = Some(Box::new(fault.clone()));
            return Err(fault.into());
        }

        match self.toggle {
            ToggleMode::PerInstruction => self.banks.toggle(),
            ToggleMode::PerScan => {
                if self.pc == 0 {
                    self.banks.commit();
                }
            }
        }

        self.steps += 1;
        if self.pc == 0 {
            self.scans += 1;
        }

        tracing::trace!(
            index,
            %instr,
            mode = self.banks.mode(),
            depth = self.stack.depth(),
            "step"
        );
        Ok(())
    }

    /// Run steps until the program counter returns to 0.
    ///
    /// Honors the configured step limit. Returns the number of steps taken.
    pub fn scan(&mut self) -> Result<usize> {
        self.run_scan(self.step_limit)
    }

    /// Like [`ScanEngine::scan`], but stops with [`LadderError::StepLimit`]
    /// once `limit` steps are taken without completing the scan. The engine
    /// is left mid-scan and a later call continues from there.
    pub fn scan_with_limit(&mut self, limit: usize) -> Result<usize> {
        self.run_scan(Some(limit))
    }

    fn run_scan(&mut self, limit: Option<usize>) -> Result<usize> {
        let mut steps = 0;
        loop {
            if let Some(limit) = limit {
                if steps >= limit {
                    return Err(LadderError::StepLimit { limit });
                }
            }
            self.step()?;
            steps += 1;
            if self.pc == 0 {
                break;
            }
        }
        tracing::debug!(scan = self.scans, steps, "scan complete");
        Ok(steps)
    }

    /// Validate the operand against the opcode's shape and the bank bounds.
    fn operand(&self, instr: Instruction) -> std::result::Result<Option<usize>, FaultKind> {
        match (instr.opcode.arg_shape(), instr.arg) {
            (ArgShape::Memory, Some(arg)) => Ok(Some(self.banks.check(arg.address)?)),
            (ArgShape::Memory, None) => Err(FaultKind::MissingArgument),
            (ArgShape::None, Some(_)) => Err(FaultKind::UnexpectedArgument),
            (ArgShape::None, None) => Ok(None),
        }
    }

    fn cell(&self, operand: Option<usize>) -> std::result::Result<bool, FaultKind> {
        let address = operand.ok_or(FaultKind::MissingArgument)?;
        Ok(self.banks.read(address)?)
    }

    /// Pop the chain result and replace it with `f(top, cell)`.
    fn combine(
        &mut self,
        operand: Option<usize>,
        f: impl Fn(bool, bool) -> bool,
    ) -> std::result::Result<(), FaultKind> {
        let top = self.stack.pop()?;
        let cell = self.cell(operand)?;
        self.stack.push(f(top, cell));
        Ok(())
    }

    /// Pop two branches and push `f(v1, v2)`.
    fn merge(&mut self, f: impl Fn(bool, bool) -> bool) -> std::result::Result<(), FaultKind> {
        let v1 = self.stack.pop()?;
        let v2 = self.stack.pop()?;
        self.stack.push(f(v1, v2));
        Ok(())
    }

    fn execute(&mut self, instr: Instruction) -> std::result::Result<(), FaultKind> {
        let operand = self.operand(instr)?;
        self.stack.check(instr.opcode.stack_rule())?;

        match instr.opcode {
            Opcode::End => self.pc = 0,
            Opcode::Ld => {
                let value = self.cell(operand)?;
                self.stack.push(value);
            }
            Opcode::LdNot => {
                let value = self.cell(operand)?;
                self.stack.push(!value);
            }
            Opcode::Out => {
                let address = operand.ok_or(FaultKind::MissingArgument)?;
                let value = self.stack.pop()?;
                self.banks.write(address, value)?;
            }
            Opcode::Or => self.combine(operand, |v, c| v | c)?,
            Opcode::OrNot => self.combine(operand, |v, c| !(v | c))?,
            Opcode::And => self.combine(operand, |v, c| v & c)?,
            Opcode::AndNot => self.combine(operand, |v, c| !(v & c))?,
            Opcode::OrStack => self.merge(|v1, v2| v1 | v2)?,
            Opcode::AndStack => self.merge(|v1, v2| v1 & v2)?,
        }
        Ok(())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::demos::{LOGIC_CHAIN, LOGIC_CHAIN_INPUTS, LOGIC_CHAIN_OUTPUT};
    use proptest::prelude::*;
    use strum::IntoEnumIterator;

    fn arb_instruction() -> impl Strategy<Value = Instruction> {
        let opcodes: Vec<Opcode> = Opcode::iter().collect();
        (
            prop::sample::select(opcodes),
            prop::option::of(0usize..0x110),
        )
            .prop_map(|(opcode, address)| match address {
                Some(address) => Instruction::mem(opcode, address),
                None => Instruction::bare(opcode),
            })
    }

    proptest! {
        #[test]
        fn random_programs_never_panic(
            instrs in prop::collection::vec(arb_instruction(), 1..32)
        ) {
            let program = Program::new(instrs).unwrap();
            let len = program.len();
            let mut sim = ScanEngine::new(program);
            for _ in 0..4 {
                match sim.scan_with_limit(len) {
                    Ok(steps) => prop_assert!(steps <= len),
                    Err(LadderError::Fault(_)) => {
                        prop_assert!(sim.is_halted());
                        break;
                    }
                    Err(other) => prop_assert!(false, "unexpected error {other:?}"),
                }
            }
        }

        #[test]
        fn mode_parity_matches_step_count(n in 0usize..200) {
            let mut sim = ScanEngine::new("LD M000\nOUT M001\nEND\nLD M002".parse().unwrap());
            for _ in 0..n {
                sim.step().unwrap();
            }
            prop_assert_eq!(sim.mode(), n % 2 == 1);
        }

        #[test]
        fn logic_chain_matches_boolean_formula(inputs in prop::array::uniform11(any::<bool>())) {
            let mut sim = ScanEngine::new(LOGIC_CHAIN.parse().unwrap());
            for (&addr, &value) in LOGIC_CHAIN_INPUTS.iter().zip(inputs.iter()) {
                sim.set_input(addr, value).unwrap();
            }
            sim.scan().unwrap();
            let [m0, m1, m2, m3, m4, m10, m11, m12, m13, m22, m23] = inputs;
            let expected = (!(m0 & m1) | (m10 & m11))
                & ((!m2 & m3) | (!m12 & m13) | (m22 & m23))
                & m4;
            prop_assert_eq!(sim.read(LOGIC_CHAIN_OUTPUT).unwrap(), expected);
        }
    }
}
