use backlog_cli::commands::{self, ImportArgs};
use backlog_cli::{cli, logging, render};
use backlog_model::UserId;
use chrono::NaiveDate;
use clap::ArgMatches;
use serde::Serialize;
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();
    logging::init(matches.get_flag("log-json"));

    let code = match run(&matches).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            2
        }
    };
    std::process::exit(code);
}

async fn run(matches: &ArgMatches) -> anyhow::Result<i32> {
    match matches.subcommand() {
        Some(("import", sub)) => {
            let args = ImportArgs {
                fixture: path(sub, "fixture")?,
                document: sub.get_one::<PathBuf>("document").cloned(),
                uploader: sub.get_one::<UserId>("uploader").copied(),
                assignee: sub.get_one::<UserId>("assignee").copied(),
                config: sub.get_one::<PathBuf>("config").cloned(),
            };
            let result = commands::import(&args).await?;
            if sub.get_flag("json") {
                print_json(&result)?;
            } else {
                print!("{}", render::import_text(&result));
            }
            Ok(if result.success { 0 } else { 1 })
        }
        Some(("plan", sub)) => {
            let today = sub
                .get_one::<NaiveDate>("today")
                .copied()
                .unwrap_or_else(|| chrono::Local::now().date_naive());
            let rows = commands::plan(
                &path(sub, "fixture")?,
                sub.get_one::<PathBuf>("config").map(PathBuf::as_path),
                today,
            )?;
            if sub.get_flag("json") {
                print_json(&rows)?;
            } else {
                print!("{}", render::plan_text(&rows));
            }
            Ok(0)
        }
        Some(("validate", sub)) => {
            let outcome = commands::validate(
                &path(sub, "fixture")?,
                sub.get_one::<PathBuf>("config").map(PathBuf::as_path),
            )?;
            if sub.get_flag("json") {
                print_json(&outcome)?;
            } else {
                print!("{}", render::validation_text(&outcome));
            }
            Ok(if outcome.iter().all(|e| e.is_valid()) { 0 } else { 1 })
        }
        _ => anyhow::bail!("unknown command"),
    }
}

fn path(matches: &ArgMatches, id: &str) -> anyhow::Result<PathBuf> {
    matches
        .get_one::<PathBuf>(id)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("missing --{id}"))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
