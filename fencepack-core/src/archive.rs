use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{FencepackError, Result};
use crate::extract::ExtractedFile;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    Deflate,
    Stored,
}

impl Compression {
    fn method(self) -> CompressionMethod {
        match self {
            Compression::Deflate => CompressionMethod::Deflated,
            Compression::Stored => CompressionMethod::Stored,
        }
    }
}

impl std::str::FromStr for Compression {
    type Err = FencepackError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deflate" | "deflated" => Ok(Compression::Deflate),
            "stored" | "store" | "none" => Ok(Compression::Stored),
            other => Err(FencepackError::config(format!(
                "unknown compression '{other}' (expected deflate or stored)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: String,
    pub bytes: Vec<u8>,
}

/// In-memory `filename -> bytes` mapping.
///
/// Inserting an existing path replaces its bytes but keeps the position of the
/// first insertion, so iteration follows first-occurrence order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Archive {
    entries: Vec<ArchiveEntry>,
    positions: HashMap<String, usize>,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an entry. Returns the bytes that were replaced.
    pub fn insert(&mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Option<Vec<u8>> {
        let path = path.into();
        let bytes = bytes.into();
        match self.positions.get(&path) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].bytes, bytes)),
            None => {
                self.positions.insert(path.clone(), self.entries.len());
                self.entries.push(ArchiveEntry { path, bytes });
                None
            }
        }
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.positions
            .get(path)
            .map(|&pos| self.entries[pos].bytes.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &ArchiveEntry> {
        self.entries.iter()
    }

    pub fn paths(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.path.clone()).collect()
    }

    /// Serialize to zip bytes.
    pub fn to_zip_bytes(&self, compression: Compression) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(compression.method());

        for entry in &self.entries {
            writer.start_file(entry.path.as_str(), options)?;
            writer.write_all(&entry.bytes).map_err(ZipError::from)?;
        }

        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }
}

/// Build an archive from extracted files, last write wins per filename.
pub fn build_archive(files: &[ExtractedFile]) -> Result<Archive> {
    if files.is_empty() {
        return Err(FencepackError::NoExtractableFiles);
    }

    let mut archive = Archive::new();
    for file in files {
        if archive
            .insert(file.filename.as_str(), file.content.as_bytes())
            .is_some()
        {
            debug!(filename = %file.filename, "later block overwrites earlier entry");
        }
    }
    Ok(archive)
}

/// Destination for serialized archive bytes.
pub trait ArchiveSink {
    /// Deliver `bytes`, using `suggested_name` as the default file name.
    /// Returns where the archive ended up.
    fn write_archive(&mut self, bytes: &[u8], suggested_name: &str) -> Result<PathBuf>;
}

/// Writes `<dir>/<suggested_name>`, creating `dir` if needed.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArchiveSink for DirectorySink {
    fn write_archive(&mut self, bytes: &[u8], suggested_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|err| FencepackError::io(&self.dir, err))?;
        let path = self.dir.join(suggested_name);
        write_bytes(&path, bytes)?;
        Ok(path)
    }
}

/// Writes to an exact path; the suggested name is ignored.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ArchiveSink for FileSink {
    fn write_archive(&mut self, bytes: &[u8], _suggested_name: &str) -> Result<PathBuf> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| FencepackError::io(parent, err))?;
        }
        write_bytes(&self.path, bytes)?;
        Ok(self.path.clone())
    }
}

fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|err| FencepackError::io(path, err))?;
    info!(path = %path.display(), bytes = bytes.len(), "archive written");
    Ok(())
}
