use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use colored::Colorize;
use fpfiles::cli::{Cli, Commands};
use fpfiles::output::{self, Verbosity};
use fpfiles::{FpContext, commands};
use std::io;
use std::process;

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    output::set_verbosity(Verbosity::from_flags(cli.verbose, cli.quiet));

    match cli.command {
        Commands::Fingerprint {
            fp_dir,
            resultfile,
            batchmode,
            no_admin,
            no_hashing,
            no_mp,
        } => {
            let ctx = FpContext::new(!batchmode)?;
            commands::fingerprint::execute(&ctx, fp_dir, resultfile, no_admin, no_hashing, no_mp)?;
        }
        Commands::Diff {
            fp1,
            fp2,
            resultfile,
            batchmode,
        } => {
            let ctx = FpContext::new(!batchmode)?;
            commands::diff::execute(&ctx, fp1, fp2, resultfile)?;
        }
        Commands::Completion { shell } => {
            print_completions(shell, &mut Cli::command());
        }
    }

    Ok(())
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
