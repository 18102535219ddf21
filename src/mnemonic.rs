//! Mnemonic source text to [`Program`].
//!
//! One instruction per line, `OPCODE [ BANKLETTER HEXADDRESS ]`, for example
//! `LDNOT M00A`. Lines are trimmed and blank lines skipped; line numbers in
//! errors count every line of the source, blank ones included.
//!
//! Only the text is validated here. Whether an opcode got the operand it
//! needs is checked by the engine when the instruction runs.

use std::str::FromStr;

use nom::{
    IResult,
    bytes::complete::take_while1,
    character::complete::{hex_digit1, satisfy, space1},
    combinator::{all_consuming, opt},
    sequence::{pair, preceded},
};

use crate::error::ParseError;
use crate::instruction::{Argument, BankSelector, Instruction, Opcode};
use crate::program::Program;

/// Lexed line: mnemonic, then optional bank letter and hex digits.
type RawLine<'a> = (&'a str, Option<(char, &'a str)>);

fn raw_line(input: &str) -> IResult<&str, RawLine<'_>> {
    all_consuming(pair(
        take_while1(|c: char| c.is_ascii_uppercase()),
        opt(preceded(
            space1,
            pair(satisfy(|c| c.is_ascii_uppercase()), hex_digit1),
        )),
    ))(input)
}

/// Parse a single trimmed, non-empty line.
pub fn parse_line(text: &str, line: usize) -> Result<Instruction, ParseError> {
    let (_, (name, operand)) = raw_line(text).map_err(|_| ParseError::Syntax { line })?;

    let opcode = Opcode::from_str(name).map_err(|_| ParseError::UnknownOpcode {
        line,
        name: name.to_string(),
    })?;

    let arg = match operand {
        Some((letter, digits)) => {
            let bank = BankSelector::from_letter(letter)
                .ok_or(ParseError::UnknownBank { line, letter })?;
            let address = usize::from_str_radix(digits, 16)
                .map_err(|_| ParseError::AddressOverflow { line })?;
            Some(Argument { bank, address })
        }
        None => None,
    };

    Ok(Instruction::new(opcode, arg))
}

/// Parse a whole program. Any bad line rejects the program.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    let mut instructions = Vec::new();
    let mut lines = Vec::new();

    for (i, raw) in source.split('\n').enumerate() {
        let text = raw.trim();
        if text.is_empty() {
            continue;
        }
        let line = i + 1;
        instructions.push(parse_line(text, line)?);
        lines.push(line);
    }

    Program::with_lines(instructions, lines)
}
