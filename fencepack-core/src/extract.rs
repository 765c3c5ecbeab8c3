use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::message::ChatMessage;

/// Opening fence with a lowercase language tag, whitespace, a `file="..."`
/// annotation ending the line, then a non-greedy body up to the next fence.
static FILE_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)```([a-z]+)\s+file="([^"]+)"\n(.*?)```"#).expect("file block regex")
});

/// A deliverable file pulled out of an annotated fenced block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFile {
    pub language: String,
    pub filename: String,
    pub content: String,
}

/// Last assistant-authored message in the transcript, if any.
pub fn select_latest_assistant_message(messages: &[ChatMessage]) -> Option<&ChatMessage> {
    messages.iter().rev().find(|message| message.is_assistant())
}

pub fn extract_files(message: &ChatMessage) -> Vec<ExtractedFile> {
    extract_files_from_str(&message.content)
}

/// Every `file="..."` annotated block in document order. Fences without the
/// annotation are illustrative snippets and are skipped.
pub fn extract_files_from_str(input: &str) -> Vec<ExtractedFile> {
    FILE_BLOCK_RE
        .captures_iter(input)
        .map(|capture| {
            let file = ExtractedFile {
                language: capture[1].to_owned(),
                filename: capture[2].to_owned(),
                content: capture[3].to_owned(),
            };
            debug!(
                language = %file.language,
                filename = %file.filename,
                bytes = file.content.len(),
                "extracted file block"
            );
            file
        })
        .collect()
}
