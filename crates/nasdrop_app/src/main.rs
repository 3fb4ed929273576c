use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use nasdrop_app::config::{load_config, write_config, AppConfig, DEFAULT_CONFIG_FILE};
use nasdrop_app::runner::{build_services, describe, run_to_completion};
use nasdrop_engine::{EngineHandle, Request};
use nasdrop_logging::{LogDestination, DEFAULT_LOG_FILE};

/// Queue downloads on a Synology NAS, mirroring the source folder layout.
#[derive(Debug, Parser)]
#[command(name = "nasdrop", version)]
struct Cli {
    /// RON configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogTarget::Terminal)]
    log: LogTarget,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogTarget {
    Terminal,
    File,
    Both,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Queue direct file URLs.
    Urls {
        /// Put everything in the base download folder instead of mirroring source folders.
        #[arg(long)]
        flat: bool,

        /// Put everything in this folder under the base download folder. Implies --flat.
        #[arg(long, value_name = "NAME")]
        into: Option<String>,

        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Crawl folder-index pages (URLs ending in '/') and queue every file found.
    Folders {
        #[arg(required = true)]
        roots: Vec<String>,
    },

    /// Hand a magnet link to the configured torrent client.
    Magnet { uri: String },

    /// Write a default configuration file.
    InitConfig {
        /// Replace an existing file.
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log, cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("nasdrop error: {:#}", err);
        std::process::exit(1);
    }
}

fn init_logging(target: LogTarget, verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let log_file = PathBuf::from(DEFAULT_LOG_FILE);
    let destination = match target {
        LogTarget::Terminal => LogDestination::Terminal,
        LogTarget::File => LogDestination::File(log_file),
        LogTarget::Both => LogDestination::Both(log_file),
    };
    nasdrop_logging::initialize(destination, level);
}

fn run(cli: Cli) -> Result<()> {
    let request = match cli.command {
        Command::InitConfig { force } => {
            write_config(&cli.config, &AppConfig::default(), force)?;
            println!("Wrote {}", cli.config.display());
            return Ok(());
        }
        Command::Urls { flat, into, urls } => Request::Urls {
            make_folders: !flat && into.is_none(),
            custom_folder: into,
            urls,
        },
        Command::Folders { roots } => Request::Folders { roots },
        Command::Magnet { uri } => Request::Magnet { uri },
    };

    let config = load_config(&cli.config)?;
    let services = build_services(&config)?;
    let engine = EngineHandle::new(services).context("failed to start engine")?;

    let outcome = run_to_completion(&engine, request, |message| println!("{message}"))?;
    println!("{}", describe(&outcome));
    Ok(())
}
