//! Operator prompt for the simulation size

use std::io::{BufRead, Write};

use crate::error::{Error, Result};

pub const PROMPT: &str = "Enter number of operations to simulate: ";

/// Prompt on `output` and read one operation count from `input`.
pub fn read_operation_count<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<i64> {
    output.write_all(PROMPT.as_bytes())?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    parse_operation_count(&line)
}

/// Parse the first whitespace-separated word as a signed count.
///
/// Negative values are accepted here; the pool treats them as a no-op.
pub fn parse_operation_count(raw: &str) -> Result<i64> {
    let word = raw
        .split_whitespace()
        .next()
        .ok_or_else(|| Error::Input("no value entered".into()))?;
    word.parse::<i64>()
        .map_err(|e| Error::Input(format!("{word:?}: {e}")))
}
