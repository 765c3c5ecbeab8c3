//! Command implementations for the fencepack CLI

pub mod download;
pub mod list;

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use fencepack_core::{load_transcript, read_transcript, ChatMessage};

pub use download::run_download;
pub use list::run_list;

/// Exit code for the two "nothing to download" outcomes
pub const EXIT_NOTHING_TO_DOWNLOAD: u8 = 2;

/// Read a transcript from a path, or from stdin when the path is `-`.
pub fn read_messages(input: &Path) -> Result<Vec<ChatMessage>> {
    if input == Path::new("-") {
        return read_transcript(io::stdin().lock()).context("failed to read transcript from stdin");
    }
    load_transcript(input).with_context(|| format!("failed to load transcript {:?}", input))
}
