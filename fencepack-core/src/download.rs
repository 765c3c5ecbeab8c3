//! The "download module" action: latest assistant message -> annotated files
//! -> zip -> sink.
//!
//! [`download_module`] never fails. Every exit path maps to a
//! [`DownloadOutcome`] carrying the text shown to the user, and the busy
//! indicator is cleared by a drop guard, so an unwinding panic clears it too.

use std::path::PathBuf;

use tracing::{error, info, instrument};

use crate::archive::{build_archive, ArchiveSink, Compression};
use crate::error::{FencepackError, Result};
use crate::extract::{extract_files, select_latest_assistant_message};
use crate::message::ChatMessage;

pub const DEFAULT_ARCHIVE_NAME: &str = "software_module.zip";

pub const NO_MODULE_GENERATED: &str = "No module has been generated yet.";
pub const NO_MODULE_CODE: &str = "No module code available for download.";
pub const DOWNLOAD_FAILED: &str = "Failed to download the module. Please try again.";

/// Success notification shown after the archive is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
    pub title: &'static str,
    pub description: &'static str,
}

pub const DOWNLOADED_NOTICE: Notice = Notice {
    title: "Module Downloaded",
    description: "Your module has been downloaded successfully.",
};

/// Something that shows the user an action is in progress.
pub trait BusyIndicator {
    fn set_busy(&mut self, busy: bool);
}

/// Indicator for callers with nothing to show.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBusyIndicator;

impl BusyIndicator for NoBusyIndicator {
    fn set_busy(&mut self, _busy: bool) {}
}

struct BusyGuard<'a, B: BusyIndicator + ?Sized> {
    indicator: &'a mut B,
}

impl<'a, B: BusyIndicator + ?Sized> BusyGuard<'a, B> {
    fn engage(indicator: &'a mut B) -> Self {
        indicator.set_busy(true);
        Self { indicator }
    }
}

impl<B: BusyIndicator + ?Sized> Drop for BusyGuard<'_, B> {
    fn drop(&mut self) {
        self.indicator.set_busy(false);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    pub archive_name: String,
    pub compression: Compression,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            archive_name: DEFAULT_ARCHIVE_NAME.to_owned(),
            compression: Compression::default(),
        }
    }
}

/// What a packaging run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedModule {
    pub path: PathBuf,
    /// Entry paths in archive order
    pub entries: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Downloaded {
        path: PathBuf,
        entries: Vec<String>,
        notice: Notice,
    },
    NoModuleGenerated,
    NoModuleCode,
    Failed,
}

impl DownloadOutcome {
    pub fn user_message(&self) -> &'static str {
        match self {
            DownloadOutcome::Downloaded { notice, .. } => notice.description,
            DownloadOutcome::NoModuleGenerated => NO_MODULE_GENERATED,
            DownloadOutcome::NoModuleCode => NO_MODULE_CODE,
            DownloadOutcome::Failed => DOWNLOAD_FAILED,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DownloadOutcome::Downloaded { .. })
    }
}

/// Whether the download action should be offered at all.
pub fn can_download(messages: &[ChatMessage]) -> bool {
    messages.iter().any(ChatMessage::is_assistant)
}

/// Fallible core of the workflow, for callers that want the error itself.
pub fn package_latest_module<S: ArchiveSink + ?Sized>(
    messages: &[ChatMessage],
    sink: &mut S,
    options: &DownloadOptions,
) -> Result<PackagedModule> {
    let message =
        select_latest_assistant_message(messages).ok_or(FencepackError::NoAssistantMessage)?;

    let files = extract_files(message);
    if files.is_empty() {
        return Err(FencepackError::NoExtractableFiles);
    }

    let archive = build_archive(&files)?;
    let bytes = archive.to_zip_bytes(options.compression)?;
    let path = sink.write_archive(&bytes, &options.archive_name)?;

    Ok(PackagedModule {
        path,
        entries: archive.paths(),
    })
}

/// Run the download action end to end.
#[instrument(skip_all, fields(messages = messages.len()))]
pub fn download_module<S, B>(
    messages: &[ChatMessage],
    sink: &mut S,
    busy: &mut B,
    options: &DownloadOptions,
) -> DownloadOutcome
where
    S: ArchiveSink + ?Sized,
    B: BusyIndicator + ?Sized,
{
    let _busy = BusyGuard::engage(busy);

    match package_latest_module(messages, sink, options) {
        Ok(module) => {
            info!(
                path = %module.path.display(),
                entries = module.entries.len(),
                "module downloaded"
            );
            DownloadOutcome::Downloaded {
                path: module.path,
                entries: module.entries,
                notice: DOWNLOADED_NOTICE,
            }
        }
        Err(FencepackError::NoAssistantMessage) => DownloadOutcome::NoModuleGenerated,
        Err(FencepackError::NoExtractableFiles) => DownloadOutcome::NoModuleCode,
        Err(err) => {
            error!(error = %err, "failed to download module");
            DownloadOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[derive(Default)]
    struct MemorySink {
        writes: Vec<(String, Vec<u8>)>,
    }

    impl ArchiveSink for MemorySink {
        fn write_archive(&mut self, bytes: &[u8], suggested_name: &str) -> Result<PathBuf> {
            self.writes.push((suggested_name.to_owned(), bytes.to_vec()));
            Ok(PathBuf::from(suggested_name))
        }
    }

    struct FailingSink;

    impl ArchiveSink for FailingSink {
        fn write_archive(&mut self, _bytes: &[u8], suggested_name: &str) -> Result<PathBuf> {
            Err(FencepackError::io(
                suggested_name,
                io::Error::new(io::ErrorKind::Other, "quota exceeded"),
            ))
        }
    }

    struct PanickingSink;

    impl ArchiveSink for PanickingSink {
        fn write_archive(&mut self, _bytes: &[u8], _suggested_name: &str) -> Result<PathBuf> {
            panic!("platform download API exploded");
        }
    }

    #[derive(Default)]
    struct RecordingIndicator {
        states: Vec<bool>,
    }

    impl BusyIndicator for RecordingIndicator {
        fn set_busy(&mut self, busy: bool) {
            self.states.push(busy);
        }
    }

    fn module_message() -> ChatMessage {
        ChatMessage::assistant("Done:\n```python file=\"main.py\"\nprint(\"hello\")\n```\n")
    }

    fn run<S: ArchiveSink>(messages: &[ChatMessage], sink: &mut S) -> (DownloadOutcome, Vec<bool>) {
        let mut busy = RecordingIndicator::default();
        let outcome = download_module(messages, sink, &mut busy, &DownloadOptions::default());
        (outcome, busy.states)
    }

    #[test]
    fn test_success_uses_default_name_and_notice() {
        let mut sink = MemorySink::default();
        let (outcome, states) = run(&[ChatMessage::user("go"), module_message()], &mut sink);

        assert_eq!(
            outcome,
            DownloadOutcome::Downloaded {
                path: PathBuf::from("software_module.zip"),
                entries: vec!["main.py".to_owned()],
                notice: DOWNLOADED_NOTICE,
            }
        );
        assert_eq!(outcome.user_message(), "Your module has been downloaded successfully.");
        assert_eq!(sink.writes.len(), 1);
        assert_eq!(sink.writes[0].0, DEFAULT_ARCHIVE_NAME);
        assert_eq!(states, vec![true, false]);
    }

    #[test]
    fn test_no_assistant_message_skips_sink() {
        let mut sink = MemorySink::default();
        let (outcome, states) = run(&[ChatMessage::user("hi"), ChatMessage::system("hello")], &mut sink);

        assert_eq!(outcome, DownloadOutcome::NoModuleGenerated);
        assert_eq!(outcome.user_message(), "No module has been generated yet.");
        assert!(sink.writes.is_empty());
        assert_eq!(states, vec![true, false]);
    }

    #[test]
    fn test_empty_transcript() {
        let mut sink = MemorySink::default();
        let (outcome, states) = run(&[], &mut sink);

        assert_eq!(outcome, DownloadOutcome::NoModuleGenerated);
        assert!(sink.writes.is_empty());
        assert_eq!(states, vec![true, false]);
    }

    #[test]
    fn test_no_module_code() {
        let mut sink = MemorySink::default();
        let (outcome, states) = run(&[ChatMessage::assistant("```python\nprint(1)\n```")], &mut sink);

        assert_eq!(outcome, DownloadOutcome::NoModuleCode);
        assert_eq!(outcome.user_message(), "No module code available for download.");
        assert!(sink.writes.is_empty());
        assert_eq!(states, vec![true, false]);
    }

    #[test]
    fn test_sink_failure_reports_generic_message() {
        let (outcome, states) = run(&[module_message()], &mut FailingSink);

        assert_eq!(outcome, DownloadOutcome::Failed);
        assert_eq!(outcome.user_message(), "Failed to download the module. Please try again.");
        assert!(!outcome.is_success());
        assert_eq!(states, vec![true, false]);
    }

    #[test]
    fn test_busy_cleared_when_sink_panics() {
        let mut busy = RecordingIndicator::default();
        let messages = [module_message()];

        let result = catch_unwind(AssertUnwindSafe(|| {
            download_module(&messages, &mut PanickingSink, &mut busy, &DownloadOptions::default())
        }));

        assert!(result.is_err());
        assert_eq!(busy.states, vec![true, false]);
    }

    #[test]
    fn test_only_latest_assistant_message_counts() {
        let messages = [
            ChatMessage::assistant("```python file=\"old.py\"\nold()\n```"),
            ChatMessage::user("again"),
            ChatMessage::assistant("Sorry, I can't help with that."),
        ];
        let mut sink = MemorySink::default();
        let (outcome, _) = run(&messages, &mut sink);
        assert_eq!(outcome, DownloadOutcome::NoModuleCode);

        let mut module = package_latest_module(
            &[messages[0].clone(), module_message()],
            &mut MemorySink::default(),
            &DownloadOptions::default(),
        )
        .unwrap();
        assert_eq!(module.entries.pop().as_deref(), Some("main.py"));
        assert!(module.entries.is_empty());
    }

    #[test]
    fn test_custom_archive_name() {
        let mut sink = MemorySink::default();
        let options = DownloadOptions {
            archive_name: "bundle.zip".into(),
            compression: Compression::Stored,
        };
        let outcome = download_module(&[module_message()], &mut sink, &mut NoBusyIndicator, &options);

        assert!(outcome.is_success());
        assert_eq!(sink.writes[0].0, "bundle.zip");
    }

    #[test]
    fn test_can_download() {
        assert!(!can_download(&[]));
        assert!(!can_download(&[ChatMessage::user("hi")]));
        assert!(can_download(&[ChatMessage::user("hi"), ChatMessage::assistant("")]));
    }
}
