//! Interactive user prompting

use std::io::{self, BufRead, Write};

use crate::error::Result;

/// Prompt user for yes/no confirmation
///
/// Returns `true` only if the user answers `y` or `Y`.
pub fn confirm(prompt: &str) -> Result<bool> {
    let stdin = io::stdin();
    confirm_with(prompt, &mut stdin.lock(), &mut io::stdout())
}

pub fn confirm_with<R: BufRead, W: Write>(prompt: &str, input: &mut R, out: &mut W) -> Result<bool> {
    write!(out, "{}? [y/N] ", prompt)?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;

    Ok(answer.trim().eq_ignore_ascii_case("y"))
}
