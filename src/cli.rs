use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

use ceurspt::spt::config::{ConfigOverrides, load_config};

use crate::commands::paper::{PaperFormat, PaperOptions};
use crate::commands::papers::PapersOptions;
use crate::commands::volume::{VolumeFormat, VolumeOptions};
use crate::commands::{self, CommandReport};
use crate::logging;

#[derive(Debug, Parser)]
#[command(
    name = "ceurspt",
    version,
    about = "CEUR-WS single point of truth for proceedings metadata"
)]
pub struct Cli {
    /// Root of the proceedings mirror.
    #[arg(long, global = true)]
    base_path: Option<PathBuf>,
    /// Remote metadata endpoint for snapshot collections.
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Directory holding cached snapshot collections.
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,
    #[arg(short, long, global = true)]
    verbose: bool,
    #[arg(short, long, global = true)]
    debug: bool,
    /// Print reports as JSON.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Refetch all snapshot collections and overwrite the cache.
    Recreate,
    /// Show configuration and cache state.
    Status,
    /// Render one volume.
    Volume {
        number: u32,
        #[arg(long, value_enum, default_value_t)]
        format: VolumeFormat,
    },
    /// Render one paper.
    Paper {
        volume: u32,
        stem: String,
        #[arg(long, value_enum, default_value_t)]
        format: PaperFormat,
    },
    /// List the papers of a volume.
    Papers { volume: u32 },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.debug);

    let overrides = ConfigOverrides {
        base_path: cli.base_path.clone(),
        base_url: cli.base_url.clone(),
        cache_dir: cli.cache_dir.clone(),
    };
    let config = load_config(&overrides)?;
    tracing::debug!(?config, "configuration resolved");

    let verbose = cli.verbose || cli.debug;
    let report = match cli.command {
        Command::Recreate => commands::recreate::run(&config)?,
        Command::Status => commands::status::run(&config)?,
        Command::Volume { number, format } => commands::volume::run(
            &config,
            &VolumeOptions {
                number,
                format,
                verbose,
            },
        )?,
        Command::Paper {
            volume,
            stem,
            format,
        } => commands::paper::run(
            &config,
            &PaperOptions {
                volume,
                stem,
                format,
                verbose,
            },
        )?,
        Command::Papers { volume } => commands::papers::run(
            &config,
            &PapersOptions {
                volume,
                json: cli.json,
                verbose,
            },
        )?,
    };

    print_report(&report, cli.json)?;
    if !report.ok {
        bail!("{} reported {} issue(s)", report.command, report.issues.len());
    }
    Ok(())
}

fn print_report(report: &CommandReport, json: bool) -> Result<()> {
    if let Some(output) = &report.output {
        print!("{output}");
        if !output.ends_with('\n') {
            println!();
        }
        for issue in &report.issues {
            eprintln!("issue: {issue}");
        }
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let state = if report.ok { "ok" } else { "failed" };
    println!("{}: {state}", report.command);
    for detail in &report.details {
        println!("  {detail}");
    }
    for issue in &report.issues {
        println!("  issue: {issue}");
    }
    Ok(())
}
