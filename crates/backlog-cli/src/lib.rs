//! Backlog CLI - run the import pipeline from the command line
//!
//! The CLI analyzes nothing itself: analyzer output comes from a fixture
//! file (JSON or YAML) and records go to an in-memory store.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod commands;
pub mod logging;
pub mod render;

use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;

/// Command line definition
#[must_use]
pub fn cli() -> Command {
    let fixture = Arg::new("fixture")
        .long("fixture")
        .short('f')
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Analyzer output (JSON or YAML)");
    let config = Arg::new("config")
        .long("config")
        .short('c')
        .value_parser(value_parser!(PathBuf))
        .help("Pipeline configuration (TOML)");
    let json = Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON");

    Command::new("backlog")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Import specification documents into a project backlog")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("import")
                .about("Run the full import pipeline")
                .arg(fixture.clone())
                .arg(
                    Arg::new("document")
                        .long("document")
                        .short('d')
                        .value_parser(value_parser!(PathBuf))
                        .help("Specification document passed to the analyzer"),
                )
                .arg(
                    Arg::new("uploader")
                        .long("uploader")
                        .value_parser(value_parser!(backlog_model::UserId))
                        .help("Uploader id; random when absent"),
                )
                .arg(
                    Arg::new("assignee")
                        .long("assignee")
                        .value_parser(value_parser!(backlog_model::UserId))
                        .help("Requested assignee for tasks"),
                )
                .arg(config.clone())
                .arg(json.clone()),
        )
        .subcommand(
            Command::new("plan")
                .about("Print the sprint plan for the epics of a fixture")
                .arg(fixture.clone())
                .arg(
                    Arg::new("today")
                        .long("today")
                        .value_parser(value_parser!(chrono::NaiveDate))
                        .help("Plan as of this date (YYYY-MM-DD)"),
                )
                .arg(config.clone())
                .arg(json.clone()),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate the epics, stories and tasks of a fixture")
                .arg(fixture)
                .arg(config)
                .arg(json),
        )
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
