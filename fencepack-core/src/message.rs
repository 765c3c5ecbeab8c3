use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{FencepackError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
    /// A human support agent who joined the chat. Never treated as assistant output.
    Agent,
}

/// One entry of a chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    #[serde(default)]
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn is_assistant(&self) -> bool {
        self.role == MessageRole::Assistant
    }
}

/// Load a transcript from a file.
///
/// Accepts a JSON array of messages, an object with a `messages` array, or
/// NDJSON with one message per line.
pub fn load_transcript(path: impl AsRef<Path>) -> Result<Vec<ChatMessage>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| FencepackError::io(path, err))?;
    let mut raw = String::new();
    BufReader::new(file)
        .read_to_string(&mut raw)
        .map_err(|err| FencepackError::io(path, err))?;
    parse_transcript(&raw)
}

/// Read a transcript from any reader (stdin in the CLI).
pub fn read_transcript(mut reader: impl Read) -> Result<Vec<ChatMessage>> {
    let mut raw = String::new();
    reader
        .read_to_string(&mut raw)
        .map_err(|err| FencepackError::io("<stdin>", err))?;
    parse_transcript(&raw)
}

pub fn parse_transcript(raw: &str) -> Result<Vec<ChatMessage>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    // A whole-document parse fails on NDJSON with more than one line, which is
    // the signal to fall back to line-by-line reading.
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => messages_from_value(value),
        Err(_) if trimmed.starts_with('{') => parse_ndjson(trimmed),
        Err(err) => Err(FencepackError::json("transcript", err)),
    }
}

fn messages_from_value(value: Value) -> Result<Vec<ChatMessage>> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| message_from_value(idx, item))
            .collect(),
        Value::Object(mut map) => match map.remove("messages") {
            Some(Value::Array(items)) => {
                debug!(count = items.len(), "reading transcript from messages field");
                items
                    .into_iter()
                    .enumerate()
                    .map(|(idx, item)| message_from_value(idx, item))
                    .collect()
            }
            Some(_) => Err(FencepackError::transcript("`messages` is not an array")),
            // A lone object is a one-line NDJSON transcript
            None => Ok(vec![message_from_value(0, Value::Object(map))?]),
        },
        _ => Err(FencepackError::transcript(
            "expected a JSON array, an object with `messages`, or NDJSON",
        )),
    }
}

fn message_from_value(idx: usize, value: Value) -> Result<ChatMessage> {
    serde_json::from_value(value).map_err(|err| FencepackError::json(format!("message #{idx}"), err))
}

fn parse_ndjson(raw: &str) -> Result<Vec<ChatMessage>> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(line_no, line)| {
            serde_json::from_str::<ChatMessage>(line)
                .map_err(|err| FencepackError::json(format!("line {}", line_no + 1), err))
        })
        .collect()
}
