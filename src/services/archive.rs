//! Zip packaging and unpacking of JSON payloads.

use std::io::{Cursor, Read, Write};

use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{AppError, AppResult};
use crate::services::progress::{Operation, ProgressBroadcaster};

/// Folder that holds record files inside a full export.
pub const EXPORT_FOLDER: &str = "test-cases";

/// Extension of importable archive members.
const JSON_EXTENSION: &str = ".json";

pub fn export_archive_name(timestamp: i64) -> String {
    format!("test-cases-{}.zip", timestamp)
}

pub fn allure_archive_name(timestamp: i64) -> String {
    format!("allure-results-{}.zip", timestamp)
}

/// A named JSON payload to place in an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: String,
    pub content: String,
}

impl ArchiveEntry {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        ArchiveEntry {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// A finished archive, ready to be written out.
#[derive(Debug, Clone)]
pub struct Archive {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Incremental zip writer over an in-memory buffer.
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        ArchiveBuilder {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
        }
    }

    pub fn add_directory(&mut self, name: &str) -> AppResult<()> {
        self.writer.add_directory(name, self.options)?;
        Ok(())
    }

    pub fn add_file(&mut self, path: &str, content: &[u8]) -> AppResult<()> {
        self.writer.start_file(path, self.options)?;
        self.writer
            .write_all(content)
            .map_err(|e| AppError::Packaging(format!("Failed to write {}: {}", path, e)))?;
        Ok(())
    }

    /// Close the archive and return its bytes.
    pub fn finish(self) -> AppResult<Vec<u8>> {
        let cursor = self.writer.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Bundle entries into one archive, reporting progress per entry.
///
/// With `folder` set, a directory entry is written first and every path is
/// placed beneath it.
pub fn package(
    file_name: String,
    folder: Option<&str>,
    entries: &[ArchiveEntry],
    progress: &ProgressBroadcaster,
    operation: Operation,
) -> AppResult<Archive> {
    let mut builder = ArchiveBuilder::new();
    if let Some(folder) = folder {
        builder.add_directory(folder)?;
    }

    let total = entries.len();
    for (index, entry) in entries.iter().enumerate() {
        let path = match folder {
            Some(folder) => format!("{}/{}", folder, entry.path),
            None => entry.path.clone(),
        };
        builder.add_file(&path, entry.content.as_bytes())?;
        progress.advance(operation, index + 1, total);
    }

    let bytes = builder.finish()?;
    debug!("Packaged {} entries into {} ({} bytes)", total, file_name, bytes.len());

    Ok(Archive { file_name, bytes })
}

/// A JSON member read from an archive.
#[derive(Debug)]
pub struct ArchiveMember {
    pub name: String,
    /// Text of the member, or why it could not be read
    pub content: AppResult<String>,
}

/// Read every `.json` member of a zip archive.
///
/// Directories and other files are ignored. A member that cannot be
/// decompressed or is not UTF-8 is returned with an error so the caller can
/// skip it; only an unreadable archive fails the whole call.
pub fn read_json_members(
    bytes: &[u8],
    progress: &ProgressBroadcaster,
) -> AppResult<Vec<ArchiveMember>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| AppError::Read(format!("Failed to read archive: {}", e)))?;

    let total = archive.len();
    let mut members = Vec::new();

    for index in 0..total {
        let member = match archive.by_index(index) {
            Ok(mut file) => {
                if file.is_dir() || !file.name().ends_with(JSON_EXTENSION) {
                    debug!("Ignoring archive entry {}", file.name());
                    None
                } else {
                    let name = file.name().to_string();
                    let mut content = String::new();
                    let content = file
                        .read_to_string(&mut content)
                        .map(|_| content)
                        .map_err(|e| AppError::Read(format!("{}: {}", name, e)));
                    Some(ArchiveMember { name, content })
                }
            }
            Err(e) => {
                warn!("Skipping unreadable archive entry #{}: {}", index, e);
                Some(ArchiveMember {
                    name: format!("#{}", index),
                    content: Err(AppError::Read(e.to_string())),
                })
            }
        };

        members.extend(member);
        progress.advance(Operation::Import, index + 1, total);
    }

    Ok(members)
}
