//! `cbx` command-line interface

use anyhow::Result;
use cbx_cli::{builtin_constraints, run_check};
use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Command::new("cbx")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Constraint-box validation for document snapshots")
        .subcommand_required(true)
        .subcommand(
            Command::new("check")
                .about("Run a submission guard pass over a JSON snapshot")
                .arg(
                    Arg::new("snapshot")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON document snapshot"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML engine configuration"),
                )
                .arg(
                    Arg::new("fields")
                        .long("fields")
                        .help("Selector for the fields to validate (default: field_selector)"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(Command::new("constraints").about("List built-in constraints"));

    let matches = cli.get_matches();

    match matches.subcommand() {
        Some(("check", args)) => {
            let snapshot = args
                .get_one::<PathBuf>("snapshot")
                .ok_or_else(|| anyhow::anyhow!("missing snapshot"))?;
            let config = args.get_one::<PathBuf>("config");
            let fields = args.get_one::<String>("fields");

            let report = run_check(
                snapshot,
                config.map(PathBuf::as_path),
                fields.map(String::as_str),
            )?;

            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.generate_text());
            }

            std::process::exit(report.exit_code());
        }
        Some(("constraints", _)) => {
            for name in builtin_constraints() {
                println!("{name}");
            }
        }
        _ => {}
    }

    Ok(())
}
