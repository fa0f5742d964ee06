//! Tally - Skill Lifecycle & Temporal Scoring Engine
//!
//! CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use tally::cli::{run, status_cmd, validate, RunOptions, StatusOptions, ValidateOptions};

/// Tally - skill ledger lifecycle engine for Claude Code operators
#[derive(Parser)]
#[command(name = "tally")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one engine pass: merge evidence, rescore, decay, repartition
    Run {
        /// Ledger directory (default: ~/.tally/ledger)
        #[arg(long)]
        ledger_dir: Option<PathBuf>,
        /// JSON file with this pass's evidence observations
        #[arg(long)]
        observations: Option<PathBuf>,
        /// Compute and report without persisting
        #[arg(long)]
        dry_run: bool,
        /// Date override (YYYY-MM-DD) for reproducible passes
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Check level claims against their evidence gates
    Validate {
        /// Ledger directory (default: ~/.tally/ledger)
        #[arg(long)]
        ledger_dir: Option<PathBuf>,
        /// Validate a single skill
        #[arg(long)]
        skill: Option<String>,
        /// Only show warn/fail verdicts
        #[arg(long)]
        problems_only: bool,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Summarize the ledger: partitions, levels, frequencies, trends
    Status {
        /// Ledger directory (default: ~/.tally/ledger)
        #[arg(long)]
        ledger_dir: Option<PathBuf>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            ledger_dir,
            observations,
            dry_run,
            today,
            json,
            quiet,
        } => {
            let options = RunOptions {
                ledger_dir,
                observations,
                dry_run,
                today,
                json,
                quiet,
            };
            run::execute(&options).map(|output| {
                if !options.quiet {
                    println!("{}", run::render(&output, options.json));
                }
                output.success
            })
        }
        Commands::Validate {
            ledger_dir,
            skill,
            problems_only,
            json,
            quiet,
        } => {
            let options = ValidateOptions {
                ledger_dir,
                skill,
                problems_only,
                json,
                quiet,
            };
            validate::execute(&options).map(|output| {
                if !options.quiet {
                    println!("{}", validate::render(&output, options.json));
                }
                // Gate failures are reported, not fatal
                true
            })
        }
        Commands::Status {
            ledger_dir,
            json,
            quiet,
        } => {
            let options = StatusOptions {
                ledger_dir,
                json,
                quiet,
            };
            status_cmd::execute(&options).map(|output| {
                if !options.quiet {
                    println!("{}", status_cmd::render(&output, options.json));
                }
                true
            })
        }
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
