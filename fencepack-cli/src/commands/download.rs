//! Download command - package the latest assistant module as a zip archive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use fencepack_core::{
    download_module, ArchiveSink, Compression, DirectorySink, DownloadOutcome, FencepackConfig,
    FileSink,
};
use tracing::info;

use super::{read_messages, EXIT_NOTHING_TO_DOWNLOAD};
use crate::ui::SpinnerIndicator;

#[derive(Parser, Debug)]
pub struct DownloadArgs {
    /// Transcript file (JSON array, object with `messages`, or NDJSON); `-` reads stdin
    #[arg(long = "in", value_name = "PATH")]
    pub input: PathBuf,

    /// Directory to write the archive into [default: config output_dir or .]
    #[arg(long = "out", value_name = "DIR", conflicts_with = "file")]
    pub output: Option<PathBuf>,

    /// Exact archive path (ignores the archive name)
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Archive file name [default: software_module.zip]
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Store entries without compression
    #[arg(long)]
    pub stored: bool,
}

pub fn run_download(args: DownloadArgs) -> Result<ExitCode> {
    let mut config = FencepackConfig::load().context("failed to load config")?;
    if let Some(name) = args.name {
        config.archive_name = name;
    }
    if args.stored {
        config.compression = Compression::Stored;
    }
    config.validate()?;

    let messages = read_messages(&args.input)?;
    info!("read {} messages from {:?}", messages.len(), args.input);

    let mut sink: Box<dyn ArchiveSink> = match args.file {
        Some(path) => Box::new(FileSink::new(path)),
        None => {
            let dir = args
                .output
                .or(config.output_dir.clone())
                .unwrap_or_else(|| PathBuf::from("."));
            Box::new(DirectorySink::new(dir))
        }
    };

    let mut busy = SpinnerIndicator::new("Downloading...");
    let outcome = download_module(
        &messages,
        sink.as_mut(),
        &mut busy,
        &config.download_options(),
    );

    Ok(report(&outcome))
}

fn report(outcome: &DownloadOutcome) -> ExitCode {
    match outcome {
        DownloadOutcome::Downloaded {
            path,
            entries,
            notice,
        } => {
            println!("✅ {}: {}", notice.title, notice.description);
            println!("   {}", path.display());
            for entry in entries {
                println!("   - {}", entry);
            }
            ExitCode::SUCCESS
        }
        DownloadOutcome::NoModuleGenerated | DownloadOutcome::NoModuleCode => {
            eprintln!("{}", outcome.user_message());
            ExitCode::from(EXIT_NOTHING_TO_DOWNLOAD)
        }
        DownloadOutcome::Failed => {
            eprintln!("{}", outcome.user_message());
            ExitCode::FAILURE
        }
    }
}
