use super::{confirm, print_success, print_warning, resolve_path};
use crate::FpContext;
use crate::fingerprint::{FingerprintEngine, FingerprintOptions};
use crate::logging;
use crate::output;
use crate::scanner::TreeWalker;
use crate::storage::snapshots::save_snapshot;
use crate::utils::paths::{check_output_writable, expand_tilde, log_path_for, with_csv_extension};
use crate::utils::format_size;
use crate::utils::privileges::is_elevated;
use anyhow::{Context, Result, bail};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Execute fingerprint command - record every file below a directory
///
/// Reads answers to prompts from stdin; see [`execute_with_input`].
///
/// # Errors
///
/// See [`execute_with_input`].
#[allow(clippy::fn_params_excessive_bools)]
pub fn execute(
    ctx: &FpContext,
    fp_dir: Option<PathBuf>,
    resultfile: Option<PathBuf>,
    no_admin: bool,
    no_hashing: bool,
    no_mp: bool,
) -> Result<()> {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    execute_with_input(
        ctx,
        &mut input,
        fp_dir,
        resultfile,
        no_admin,
        no_hashing,
        no_mp,
    )
}

/// Execute fingerprint command, answering prompts from `input`
///
/// Privileges, the directory and the result file are checked in that order
/// before any file is read. The log file is opened once the result path is
/// known.
///
/// # Errors
///
/// Returns an error if:
/// - the process lacks administrator rights in batch mode (unless `no_admin`)
/// - the directory is not readable or the result file not writable in batch
///   mode, or the user aborts a prompt
/// - the configuration is invalid
/// - the snapshot cannot be written
#[allow(clippy::fn_params_excessive_bools)]
pub fn execute_with_input(
    ctx: &FpContext,
    input: &mut dyn BufRead,
    fp_dir: Option<PathBuf>,
    resultfile: Option<PathBuf>,
    no_admin: bool,
    no_hashing: bool,
    no_mp: bool,
) -> Result<()> {
    if !no_admin {
        check_privileges(ctx, input)?;
    }

    let root = resolve_path(
        ctx.interactive,
        input,
        fp_dir,
        "directory to fingerprint",
        "directory to fingerprint (e.g. /srv/data): ",
        readable_directory,
    )?;
    let result_path = resolve_result_path(ctx, input, resultfile)?;

    let log_path = log_path_for(&result_path);
    let _log_guard = logging::init(&log_path, output::get_verbosity())?;

    let mut options = FingerprintOptions::from_config(&root, &ctx.config)?;
    if no_hashing {
        options = options.with_hashing(false);
    }
    if no_mp {
        options = options.with_parallel(false);
    }

    info!("fpf {} fingerprint", crate::VERSION);
    info!("fingerprinting directory : {}", root.display());
    info!("results filename         : {}", result_path.display());
    info!("file hashing             : {}", options.hash_enabled);
    info!("multiprocessing          : {}", options.parallel);

    output::action("Fingerprinting", &root.display().to_string());
    let snapshot = FingerprintEngine::new(options).fingerprint()?;

    save_snapshot(&result_path, snapshot.entries())?;
    info!("Finished");

    let errors = snapshot.error_count();
    if errors > 0 {
        print_warning(&format!(
            "{errors} file(s) could not be fingerprinted, see {}",
            log_path.display()
        ));
    }
    let bytes: u64 = snapshot.iter().filter_map(|info| info.size).sum();
    print_success(&format!(
        "Fingerprinted {} files ({}) into {}",
        snapshot.len(),
        format_size(bytes),
        result_path.display()
    ));
    Ok(())
}

/// Resolve and validate the result path shared by both commands: `~` is
/// expanded, the extension forced to `.csv`, and writability probed.
pub(crate) fn resolve_result_path(
    ctx: &FpContext,
    input: &mut dyn BufRead,
    resultfile: Option<PathBuf>,
) -> Result<PathBuf> {
    resolve_path(
        ctx.interactive,
        input,
        resultfile,
        "result filename",
        "result filename (e.g. /tmp/fingerprint1.csv): ",
        writable_result,
    )
}

fn readable_directory(path: &Path) -> Result<PathBuf> {
    let path = expand_tilde(path)?;
    TreeWalker::new(&path).check_root()?;
    Ok(path)
}

fn writable_result(path: &Path) -> Result<PathBuf> {
    let path = with_csv_extension(&expand_tilde(path)?);
    check_output_writable(&path)?;
    Ok(path)
}

fn check_privileges(ctx: &FpContext, input: &mut dyn BufRead) -> Result<()> {
    match is_elevated() {
        Some(true) => Ok(()),
        None => {
            debug!("Privilege check not available on this platform, skipping");
            Ok(())
        }
        Some(false) => {
            print_warning(
                "Not running as administrator; some files may not be readable \
                 (use --no_admin to run with limited rights)",
            );
            if !ctx.interactive {
                bail!("Administrator rights required in batch mode");
            }
            if confirm(input, "Continue with limited rights? [y/N] ")
                .context("Failed to read answer")?
            {
                Ok(())
            } else {
                bail!("Aborted by user")
            }
        }
    }
}
