//! Test Case Studio - command-line entry point.
//!
//! Usage:
//!   test-case-studio [--overwrite] [--out-dir DIR] export <inputs...>
//!   test-case-studio [--overwrite] [--out-dir DIR] allure <inputs...>
//!   test-case-studio [--overwrite] [--out-dir DIR] backup <inputs...>
//!   test-case-studio [--overwrite] list [--search T] [--status S] [--severity V] <inputs...>
//!
//! Every input (JSON document or zip archive) is imported into a fresh
//! workspace before the command runs.

use std::env;
use std::path::{Path, PathBuf};

use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use test_case_studio_lib::config::Config;
use test_case_studio_lib::error::AppResult;
use test_case_studio_lib::services::{
    Archive, ExportedFile, ProgressEvent, SeverityFilter, StatusFilter, TestCaseFilter, Workspace,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Export,
    Allure,
    Backup,
    List(TestCaseFilter),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Cli {
    command: Command,
    inputs: Vec<PathBuf>,
    overwrite: Option<bool>,
    out_dir: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<Cli, String> {
    let mut command: Option<Command> = None;
    let mut filter = TestCaseFilter::default();
    let mut inputs = Vec::new();
    let mut overwrite = None;
    let mut out_dir = None;

    let mut i = 1;
    while i < args.len() {
        let arg = args[i].as_str();
        match arg {
            "--overwrite" => overwrite = Some(true),
            "--out-dir" | "-o" => {
                i += 1;
                let dir = args.get(i).ok_or("--out-dir needs a value")?;
                out_dir = Some(PathBuf::from(dir));
            }
            "--search" | "-s" => {
                i += 1;
                filter.term = args.get(i).ok_or("--search needs a value")?.clone();
            }
            "--status" => {
                i += 1;
                let raw = args.get(i).ok_or("--status needs a value")?;
                filter.status = StatusFilter::parse(raw).ok_or_else(|| {
                    format!("Invalid status '{}'. Must be: any, passed, failed, mixed", raw)
                })?;
            }
            "--severity" => {
                i += 1;
                let raw = args.get(i).ok_or("--severity needs a value")?;
                filter.severity = SeverityFilter::parse(raw).ok_or_else(|| {
                    format!(
                        "Invalid severity '{}'. Must be: any, BLOCKER, CRITICAL, NORMAL, MINOR, TRIVIAL",
                        raw
                    )
                })?;
            }
            flag if flag.starts_with('-') => return Err(format!("Unknown argument: {}", flag)),
            word if command.is_none() => {
                command = Some(match word {
                    "export" => Command::Export,
                    "allure" => Command::Allure,
                    "backup" => Command::Backup,
                    "list" => Command::List(TestCaseFilter::default()),
                    other => return Err(format!("Unknown command: {}", other)),
                });
            }
            path => inputs.push(PathBuf::from(path)),
        }
        i += 1;
    }

    let command = match command.ok_or("A command is required")? {
        Command::List(_) => Command::List(filter),
        other if filter != TestCaseFilter::default() => {
            return Err(format!(
                "--search, --status and --severity only apply to list, not {:?}",
                other
            ));
        }
        other => other,
    };

    Ok(Cli {
        command,
        inputs,
        overwrite,
        out_dir,
    })
}

fn print_usage() {
    eprintln!(
        "Usage: test-case-studio [--overwrite] [--out-dir DIR] <command> [options] <inputs...>"
    );
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  export    Write test-cases-<ts>.zip with every test case");
    eprintln!("  allure    Write allure-results-<ts>.zip with Allure result documents");
    eprintln!("  backup    Write backup-<ts>.json");
    eprintln!("  list      Print test cases [--search T] [--status S] [--severity V]");
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_usage();
        return;
    }

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli, config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: Config) -> AppResult<()> {
    let overwrite = cli.overwrite.unwrap_or(config.overwrite_existing);
    let out_dir = cli.out_dir.unwrap_or_else(|| config.output_dir.clone());

    let mut workspace = Workspace::from_config(&config);
    let mut events = workspace.progress().subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                ProgressEvent::Started(op) => debug!("{} started", op.as_str()),
                ProgressEvent::Advanced { operation, .. } => {
                    if let Some(fraction) = event.fraction() {
                        debug!("{}: {:.0}%", operation.as_str(), fraction * 100.0);
                    }
                }
                ProgressEvent::Finished { operation, success } => {
                    debug!("{} finished (success: {})", operation.as_str(), success)
                }
            }
        }
    });

    for input in &cli.inputs {
        let summary = workspace.import_file(input, overwrite).await?;
        info!(
            "{}: imported {}, skipped {}",
            input.display(),
            summary.imported,
            summary.skipped()
        );
    }

    match cli.command {
        Command::Export => match workspace.export_archive().await? {
            Some(archive) => write_archive(&out_dir, archive).await?,
            None => println!("No test cases to export"),
        },
        Command::Allure => match workspace.export_allure().await? {
            Some(archive) => write_archive(&out_dir, archive).await?,
            None => println!("No test cases to export"),
        },
        Command::Backup => write_document(&out_dir, workspace.backup()?).await?,
        Command::List(filter) => {
            let records = workspace.filtered(&filter);
            if records.is_empty() {
                println!("No test cases found");
            }
            for record in records {
                println!(
                    "{:<8} {:<9} {}",
                    record.derive_status().as_str(),
                    record.severity.as_str(),
                    record.name
                );
            }
        }
    }

    Ok(())
}

async fn write_archive(out_dir: &Path, archive: Archive) -> AppResult<()> {
    write_output(out_dir, &archive.file_name, &archive.bytes).await
}

async fn write_document(out_dir: &Path, file: ExportedFile) -> AppResult<()> {
    write_output(out_dir, &file.file_name, file.content.as_bytes()).await
}

async fn write_output(out_dir: &Path, file_name: &str, bytes: &[u8]) -> AppResult<()> {
    tokio::fs::create_dir_all(out_dir).await?;
    let path = out_dir.join(file_name);
    if tokio::fs::try_exists(&path).await.unwrap_or(false) {
        warn!("Overwriting {}", path.display());
    }
    tokio::fs::write(&path, bytes).await?;
    println!("{}", path.display());
    Ok(())
}
