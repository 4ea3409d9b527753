use super::fingerprint::resolve_result_path;
use super::{print_success, resolve_path};
use crate::FpContext;
use crate::diff::{DiffEngine, DiffSummary};
use crate::logging;
use crate::output;
use crate::storage::snapshots::{load_snapshot, save_snapshot};
use crate::utils::paths::{expand_tilde, log_path_for};
use anyhow::{Result, bail};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::info;

/// Execute diff command - compare two fingerprints
///
/// Reads answers to prompts from stdin; see [`execute_with_input`].
///
/// # Errors
///
/// See [`execute_with_input`].
pub fn execute(
    ctx: &FpContext,
    fp1: Option<PathBuf>,
    fp2: Option<PathBuf>,
    resultfile: Option<PathBuf>,
) -> Result<()> {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    execute_with_input(ctx, &mut input, fp1, fp2, resultfile)
}

/// Execute diff command, answering prompts from `input`
///
/// `fp1` is the earlier fingerprint. Both are loaded completely before the
/// result file is written, so a malformed input leaves no output behind.
///
/// # Errors
///
/// Returns an error if:
/// - a fingerprint file is missing or malformed
/// - the result file is not writable (batch mode) or a prompt is aborted
/// - the result cannot be written
pub fn execute_with_input(
    ctx: &FpContext,
    input: &mut dyn BufRead,
    fp1: Option<PathBuf>,
    fp2: Option<PathBuf>,
    resultfile: Option<PathBuf>,
) -> Result<()> {
    let fp1 = resolve_path(
        ctx.interactive,
        input,
        fp1,
        "first fingerprint",
        "first (older) fingerprint file: ",
        readable_file,
    )?;
    let fp2 = resolve_path(
        ctx.interactive,
        input,
        fp2,
        "second fingerprint",
        "second (newer) fingerprint file: ",
        readable_file,
    )?;
    let result_path = resolve_result_path(ctx, input, resultfile)?;

    let log_path = log_path_for(&result_path);
    let _log_guard = logging::init(&log_path, output::get_verbosity())?;

    info!("fpf {} diff", crate::VERSION);
    info!("fingerprint 1            : {}", fp1.display());
    info!("fingerprint 2            : {}", fp2.display());
    info!("results filename         : {}", result_path.display());

    let baseline = load_snapshot(&fp1)?;
    let current = load_snapshot(&fp2)?;
    output::action(
        "Comparing",
        &format!("{} -> {}", fp1.display(), fp2.display()),
    );

    let changes = DiffEngine::new().diff(&baseline, &current);
    save_snapshot(&result_path, &changes)?;

    let summary = DiffSummary::from_changes(&changes);
    info!(
        added = summary.added,
        deleted = summary.deleted,
        changed = summary.changed,
        changed_silent = summary.changed_silent,
        "{summary}"
    );
    info!("Finished");

    output::diff_summary(&summary);
    print_success(&format!(
        "Wrote {} changes to {}",
        summary.total(),
        result_path.display()
    ));
    Ok(())
}

fn readable_file(path: &Path) -> Result<PathBuf> {
    let path = expand_tilde(path)?;
    if !path.is_file() {
        bail!("Cannot read fingerprint file {}", path.display());
    }
    Ok(path)
}
