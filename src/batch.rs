//! Many independent simulations of one program, run in parallel.
//!
//! Every case gets a fresh [`ScanEngine`] with zeroed memory, so results do
//! not depend on scheduling order.

use rayon::prelude::*;

use crate::engine::{EngineConfig, ScanEngine};
use crate::error::{LadderError, Result};
use crate::program::Program;

/// Widest truth table [`truth_table`] will enumerate.
pub const MAX_TABLE_INPUTS: usize = 20;

/// Cells to force before the first scan of a case.
pub type InputCase = Vec<(usize, bool)>;

/// One row of a truth table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub inputs: Vec<bool>,
    pub outputs: Vec<bool>,
}

/// Run `scans` scans for a single case and read `outputs`.
pub fn run_case(
    program: &Program,
    config: EngineConfig,
    case: &[(usize, bool)],
    scans: usize,
    outputs: &[usize],
) -> Result<Vec<bool>> {
    let mut engine = ScanEngine::with_config(program.clone(), config);
    for &(address, value) in case {
        engine.set_input(address, value)?;
    }
    for _ in 0..scans {
        engine.scan()?;
    }
    outputs.iter().map(|&address| engine.read(address)).collect()
}

/// Evaluate every case in parallel. Results are in case order.
pub fn evaluate(
    program: &Program,
    config: EngineConfig,
    cases: &[InputCase],
    scans: usize,
    outputs: &[usize],
) -> Vec<Result<Vec<bool>>> {
    cases
        .par_iter()
        .map(|case| run_case(program, config, case, scans, outputs))
        .collect()
}

/// Enumerate every combination of `inputs` and evaluate each in parallel.
///
/// Rows are in binary counting order with the first input as the most
/// significant bit. Any failing row fails the whole table.
pub fn truth_table(
    program: &Program,
    config: EngineConfig,
    inputs: &[usize],
    outputs: &[usize],
    scans: usize,
) -> Result<Vec<Row>> {
    if inputs.len() > MAX_TABLE_INPUTS {
        return Err(LadderError::TableTooWide {
            inputs: inputs.len(),
            max: MAX_TABLE_INPUTS,
        });
    }
    let width = inputs.len();
    let rows = 1usize << width;
    tracing::debug!(rows, outputs = outputs.len(), "evaluating truth table");

    (0..rows)
        .into_par_iter()
        .map(|combo| -> Result<Row> {
            let values: Vec<bool> = (0..width)
                .map(|j| (combo >> (width - 1 - j)) & 1 == 1)
                .collect();
            let case: InputCase = inputs.iter().copied().zip(values.iter().copied()).collect();
            let outputs = run_case(program, config, &case, scans, outputs)?;
            Ok(Row {
                inputs: values,
                outputs,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demos::{LOGIC_CHAIN, LOGIC_CHAIN_INPUTS, LOGIC_CHAIN_OUTPUT, SELF_TOGGLE};
    use crate::error::FaultKind;
    use crate::memory::BoundsPolicy;

    #[test]
    fn test_and_gate_table() {
        let program: Program = "LD M000\nAND M001\nOUT M002".parse().unwrap();
        let table = truth_table(&program, EngineConfig::default(), &[0, 1], &[2], 1).unwrap();
        let outputs: Vec<bool> = table.iter().map(|row| row.outputs[0]).collect();
        assert_eq!(outputs, vec![false, false, false, true]);
        assert_eq!(table[2].inputs, vec![true, false]);
    }

    #[test]
    fn test_or_gate_table() {
        let program: Program = "LD M000\nOR M001\nOUT M002".parse().unwrap();
        let table = truth_table(&program, EngineConfig::default(), &[0, 1], &[2], 1).unwrap();
        let outputs: Vec<bool> = table.iter().map(|row| row.outputs[0]).collect();
        assert_eq!(outputs, vec![false, true, true, true]);
    }

    #[test]
    fn test_ornot_gate_table() {
        let program: Program = "LD M000\nORNOT M001\nOUT M002".parse().unwrap();
        let table = truth_table(&program, EngineConfig::default(), &[0, 1], &[2], 1).unwrap();
        let outputs: Vec<bool> = table.iter().map(|row| row.outputs[0]).collect();
        assert_eq!(outputs, vec![true, false, false, false]);
    }

    #[test]
    fn test_andnot_gate_table() {
        let program: Program = "LD M000\nANDNOT M001\nOUT M002".parse().unwrap();
        let table = truth_table(&program, EngineConfig::default(), &[0, 1], &[2], 1).unwrap();
        let outputs: Vec<bool> = table.iter().map(|row| row.outputs[0]).collect();
        assert_eq!(outputs, vec![true, true, true, false]);
    }

    #[test]
    fn test_empty_input_list_is_one_row() {
        let program: Program = SELF_TOGGLE.parse().unwrap();
        let table = truth_table(&program, EngineConfig::default(), &[], &[0, 1], 1).unwrap();
        assert_eq!(
            table,
            vec![Row {
                inputs: vec![],
                outputs: vec![true, false]
            }]
        );
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let program: Program = LOGIC_CHAIN.parse().unwrap();
        let config = EngineConfig::default();
        let table = truth_table(
            &program,
            config,
            &LOGIC_CHAIN_INPUTS[..6],
            &[LOGIC_CHAIN_OUTPUT],
            1,
        )
        .unwrap();
        assert_eq!(table.len(), 64);
        for row in &table {
            let case: InputCase = LOGIC_CHAIN_INPUTS[..6]
                .iter()
                .copied()
                .zip(row.inputs.iter().copied())
                .collect();
            let expected = run_case(&program, config, &case, 1, &[LOGIC_CHAIN_OUTPUT]).unwrap();
            assert_eq!(row.outputs, expected);
        }
    }

    #[test]
    fn test_evaluate_keeps_case_order() {
        let program: Program = SELF_TOGGLE.parse().unwrap();
        let cases: Vec<InputCase> = vec![vec![], vec![(0, true)], vec![]];
        let results = evaluate(&program, EngineConfig::default(), &cases, 1, &[0]);
        assert_eq!(results, vec![Ok(vec![true]), Ok(vec![false]), Ok(vec![true])]);
    }

    #[test]
    fn test_fault_fails_table() {
        let program: Program = LOGIC_CHAIN.parse().unwrap();
        let config = EngineConfig {
            bounds: BoundsPolicy::Strict,
            ..Default::default()
        };
        match truth_table(&program, config, &[0], &[0], 1) {
            Err(LadderError::Fault(fault)) => {
                assert!(matches!(fault.kind, FaultKind::AddressOutOfBounds(_)))
            }
            other => panic!("expected fault, got {other:?}"),
        }
    }

    #[test]
    fn test_table_too_wide() {
        let program: Program = SELF_TOGGLE.parse().unwrap();
        let inputs: Vec<usize> = (0..=MAX_TABLE_INPUTS).collect();
        assert_eq!(
            truth_table(&program, EngineConfig::default(), &inputs, &[0], 1),
            Err(LadderError::TableTooWide {
                inputs: MAX_TABLE_INPUTS + 1,
                max: MAX_TABLE_INPUTS
            })
        );
    }
}
