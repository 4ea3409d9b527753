pub mod diff;
pub mod fingerprint;

use crate::output::{self, Verbosity};
use anyhow::{Result, bail};
use colored::Colorize;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

pub fn print_success(message: &str) {
    if output::get_verbosity() == Verbosity::Quiet {
        return;
    }
    eprintln!("{} {}", "✓".green().bold(), message);
}

pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Ask `question` on stderr and read one line from `input`.
///
/// Returns `None` on an empty answer or end of input.
///
/// # Errors
///
/// Returns an error if reading from `input` fails.
pub fn prompt(input: &mut dyn BufRead, question: &str) -> Result<Option<String>> {
    eprint!("{question}");
    std::io::stderr().flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim();
    Ok((!answer.is_empty()).then(|| answer.to_string()))
}

/// Ask a yes/no question; anything but `y`/`yes` counts as no.
///
/// # Errors
///
/// Returns an error if reading from `input` fails.
pub fn confirm(input: &mut dyn BufRead, question: &str) -> Result<bool> {
    Ok(prompt(input, question)?
        .is_some_and(|answer| matches!(answer.to_lowercase().as_str(), "y" | "yes")))
}

/// Turn a user-supplied path into a validated value.
///
/// `check` is applied to `initial` first. When it fails (or nothing was
/// given) an interactive run asks again with `question` until `check`
/// accepts an answer; an empty answer aborts. A batch run fails
/// immediately.
///
/// # Errors
///
/// Returns the last check failure in batch mode, or an error if the user
/// aborts.
pub fn resolve_path<T>(
    interactive: bool,
    input: &mut dyn BufRead,
    initial: Option<PathBuf>,
    what: &str,
    question: &str,
    mut check: impl FnMut(&Path) -> Result<T>,
) -> Result<T> {
    let mut candidate = initial.filter(|path| !path.as_os_str().is_empty());

    loop {
        if let Some(path) = candidate.take() {
            match check(&path) {
                Ok(value) => return Ok(value),
                Err(e) if interactive => print_warning(&format!("{e:#}, try again")),
                Err(e) => return Err(e),
            }
        } else if !interactive {
            bail!("No {what} given");
        }

        match prompt(input, question)? {
            Some(answer) => candidate = Some(PathBuf::from(answer)),
            None => bail!("Aborted: no {what} given"),
        }
    }
}
