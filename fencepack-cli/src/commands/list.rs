//! List command - preview which files a download would contain

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use fencepack_core::download::{NO_MODULE_CODE, NO_MODULE_GENERATED};
use fencepack_core::{extract_files, select_latest_assistant_message, ExtractedFile};
use serde::Serialize;

use super::{read_messages, EXIT_NOTHING_TO_DOWNLOAD};

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Transcript file (JSON array, object with `messages`, or NDJSON); `-` reads stdin
    #[arg(long = "in", value_name = "PATH")]
    pub input: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: ListFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    Table,
    Json,
}

#[derive(Debug, Serialize)]
struct FileSummary<'a> {
    language: &'a str,
    filename: &'a str,
    bytes: usize,
    /// A later block with the same filename wins in the archive
    overwritten: bool,
}

fn summarize(files: &[ExtractedFile]) -> Vec<FileSummary<'_>> {
    let last: HashMap<&str, usize> = files
        .iter()
        .enumerate()
        .map(|(idx, file)| (file.filename.as_str(), idx))
        .collect();

    files
        .iter()
        .enumerate()
        .map(|(idx, file)| FileSummary {
            language: &file.language,
            filename: &file.filename,
            bytes: file.content.len(),
            overwritten: last.get(file.filename.as_str()) != Some(&idx),
        })
        .collect()
}

pub fn run_list(args: ListArgs) -> Result<ExitCode> {
    let messages = read_messages(&args.input)?;

    let Some(message) = select_latest_assistant_message(&messages) else {
        eprintln!("{}", NO_MODULE_GENERATED);
        return Ok(ExitCode::from(EXIT_NOTHING_TO_DOWNLOAD));
    };

    let files = extract_files(message);
    if files.is_empty() {
        eprintln!("{}", NO_MODULE_CODE);
        return Ok(ExitCode::from(EXIT_NOTHING_TO_DOWNLOAD));
    }

    let summaries = summarize(&files);
    match args.format {
        ListFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
        ListFormat::Table => {
            println!("{:<12} {:>8}  FILE", "LANGUAGE", "BYTES");
            for summary in &summaries {
                let note = if summary.overwritten { "  (overwritten)" } else { "" };
                println!(
                    "{:<12} {:>8}  {}{}",
                    summary.language, summary.bytes, summary.filename, note
                );
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
