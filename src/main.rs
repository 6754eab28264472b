use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use log::LevelFilter;

use td_memory_carver::error::{require, EmptyRes};
use td_memory_carver::offsets::Offsets;
use td_memory_carver::report;
use td_memory_carver::carve_dump_directory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "UPPER")]
enum Platform {
    TelegramDesktop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
}

/// Recovers instant-messaging artifacts from a directory of raw memory
/// dump files.
#[derive(Parser, Debug)]
#[command(name = "td-memory-carver")]
struct Cli {
    /// Directory containing `<hex_base>_<hex_size>.dmp` region dump files.
    memory_data_path: PathBuf,

    /// The IM client whose memory layout to carve.
    platform: Platform,

    /// Report output format.
    #[arg(short = 'f', long, default_value = "json")]
    format: OutputFormat,

    /// Copy the dump directory here before processing, and remove it
    /// afterwards. Refuses to run if the directory already exists.
    #[arg(short = 't', long)]
    tmp: Option<PathBuf>,

    /// Increase log verbosity.
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new().filter(None, level).init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> EmptyRes {
    require!(cli.memory_data_path.is_dir(), "{} is not a directory", cli.memory_data_path.display());
    require!(cli.platform == Platform::TelegramDesktop, "Unsupported platform");
    require!(cli.format == OutputFormat::Json, "Unsupported format");

    let dump_dir = match &cli.tmp {
        Some(tmp) => {
            require!(!tmp.exists(), "{} already exists", tmp.display());
            copy_dumps_to(&cli.memory_data_path, tmp)?;
            tmp.clone()
        }
        None => cli.memory_data_path.clone(),
    };

    let result = carve_dump_directory(&dump_dir, Offsets::default());

    if cli.tmp.is_some() {
        std::fs::remove_dir_all(&dump_dir)?;
    }

    let account = result?;
    report::write_report(&account, Path::new("."))?;
    log::info!("Wrote report.json ({} user(s), {} conversation(s))", account.users.len(), account.conversations.len());
    Ok(())
}

fn copy_dumps_to(src: &Path, dst: &Path) -> EmptyRes {
    std::fs::create_dir_all(dst)?;
    let mut options = fs_extra::dir::CopyOptions::new();
    options.content_only = true;
    fs_extra::dir::copy(src, dst, &options)?;
    Ok(())
}
