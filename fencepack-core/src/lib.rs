pub mod archive;
pub mod config;
pub mod download;
pub mod error;
pub mod extract;
pub mod message;

pub use archive::{build_archive, Archive, ArchiveEntry, ArchiveSink, Compression, DirectorySink, FileSink};
pub use config::FencepackConfig;
pub use download::{
    can_download, download_module, package_latest_module, BusyIndicator, DownloadOptions,
    DownloadOutcome, NoBusyIndicator, Notice, PackagedModule, DEFAULT_ARCHIVE_NAME,
};
pub use error::{FencepackError, Result};
pub use extract::{extract_files, extract_files_from_str, select_latest_assistant_message, ExtractedFile};
pub use message::{load_transcript, parse_transcript, read_transcript, ChatMessage, MessageRole};
