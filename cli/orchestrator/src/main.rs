//! servergen command-line front end
//!
//! Runs one openapi-generator pass outside of a build script and writes the
//! harvested sources into a directory.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use servergen_cli::{run_generate, GenerateArgs};

/// Command-line interface configuration for servergen.
#[derive(Parser, Debug)]
#[command(name = "servergen", about = "Generate ASP.NET Core server sources with openapi-generator", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

/// Available servergen commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one generation pass and write the sources to --out
    Generate(GenerateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Generate(args) => {
            let report = match run_generate(&args) {
                Ok(report) => report,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            };

            if args.json {
                match report.to_json() {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error: Failed to render report: {}", e);
                        return ExitCode::FAILURE;
                    }
                }
            } else if report.is_success() {
                println!(
                    "Wrote {} generated file(s) to {}",
                    report.files().len(),
                    args.out.display()
                );
            }

            if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
