//! Memory bank store
//!
//! A categorized, file-backed document store. Records live at
//! `<root>/<category>/<file_name>`; `file_name` may contain sub-directories
//! but never escapes its category.
//!
//! Writes go through a temp file in the destination directory followed by a
//! rename, so readers never observe a half-written record.

pub mod initializer;

use chrono::{DateTime, Local, SecondsFormat, Utc};
use sdk::errors::EngineError;
use sdk::types::{ArchiveEntry, ArchiveStatus, AuditEntry, AuditReport, MemoryCategory, SearchHit};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tracing::{debug, info, warn};

/// Characters of context kept on each side of a search match
const PREVIEW_CONTEXT: usize = 50;

/// Sub-directory of auto_generated/ receiving imported media
const MULTIMEDIA_DIR: &str = "multimedia";

/// Current UTC time as a filesystem-safe stamp (`:` and `.` become `-`)
pub fn fs_safe_stamp() -> String {
    Utc::now()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace(|c: char| c == ':' || c == '.', "-")
}

/// Human-readable local time used in document footers and headers
pub fn local_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[derive(Debug, Clone)]
pub struct MemoryBank {
    root: PathBuf,
}

impl MemoryBank {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn category_dir(&self, category: MemoryCategory) -> PathBuf {
        self.root.join(category.as_str())
    }

    /// Resolve a record path, rejecting names that could leave the category
    pub fn record_path(&self, category: MemoryCategory, name: &str) -> Result<PathBuf, EngineError> {
        let relative = Path::new(name);
        if name.trim().is_empty() {
            return Err(EngineError::InvalidPath("empty file name".to_string()));
        }

        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(EngineError::InvalidPath(name.to_string()));
                }
            }
        }

        Ok(self.category_dir(category).join(relative))
    }

    /// Read a record's full text
    pub async fn read(&self, category: MemoryCategory, name: &str) -> Result<String, EngineError> {
        let path = self.record_path(category, name)?;
        debug!("Reading memory record {}/{}", category, name);

        fs::read_to_string(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => EngineError::RecordNotFound {
                category: category.to_string(),
                name: name.to_string(),
            },
            _ => EngineError::Io(e),
        })
    }

    /// Overwrite a record, creating parent directories as needed
    pub async fn write(
        &self,
        category: MemoryCategory,
        name: &str,
        content: &str,
    ) -> Result<PathBuf, EngineError> {
        let path = self.record_path(category, name)?;
        write_atomic(&path, content).await?;

        info!(
            "Wrote {} bytes to memory record {}/{}",
            content.len(),
            category,
            name
        );
        Ok(path)
    }

    /// Overwrite a record with `content` plus a "Last updated" footer
    ///
    /// Returns the timestamp written into the footer.
    pub async fn update(
        &self,
        category: MemoryCategory,
        name: &str,
        content: &str,
    ) -> Result<String, EngineError> {
        let timestamp = local_timestamp();
        let body = format!("{}\n\nLast updated: {}", content, timestamp);
        self.write(category, name, &body).await?;
        Ok(timestamp)
    }

    /// Move every file of a category into `archive/<category>/`
    ///
    /// Each file is reported independently; a failed rename never aborts the
    /// batch. A missing category directory yields an empty report.
    pub async fn archive(&self, category: MemoryCategory) -> Result<Vec<ArchiveEntry>, EngineError> {
        self.archive_with_stamp(category, &fs_safe_stamp()).await
    }

    pub(crate) async fn archive_with_stamp(
        &self,
        category: MemoryCategory,
        stamp: &str,
    ) -> Result<Vec<ArchiveEntry>, EngineError> {
        if category == MemoryCategory::Archive {
            return Err(EngineError::InvalidParameter(
                "the archive category cannot be archived".to_string(),
            ));
        }

        let source_dir = self.category_dir(category);
        let files = match list_files(&source_dir).await {
            Ok(files) => files,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Nothing to archive in {}: directory missing", category);
                return Ok(Vec::new());
            }
            Err(e) => return Err(EngineError::Io(e)),
        };

        let archive_dir = self
            .category_dir(MemoryCategory::Archive)
            .join(category.as_str());
        fs::create_dir_all(&archive_dir).await?;

        let mut results = Vec::with_capacity(files.len());
        for file in files {
            let source = source_dir.join(&file);
            let destination = archive_dir.join(format!("{}.{}", file, stamp));

            match fs::rename(&source, &destination).await {
                Ok(()) => results.push(ArchiveEntry {
                    file,
                    archived_path: Some(destination.display().to_string()),
                    status: ArchiveStatus::Success,
                    error: None,
                }),
                Err(e) => {
                    warn!("Failed to archive {}: {}", source.display(), e);
                    results.push(ArchiveEntry {
                        file,
                        archived_path: None,
                        status: ArchiveStatus::Failed,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        info!(
            "Archived {} file(s) from {}",
            results
                .iter()
                .filter(|r| r.status == ArchiveStatus::Success)
                .count(),
            category
        );
        Ok(results)
    }

    /// Substring search over the files of one category
    pub async fn search(
        &self,
        category: MemoryCategory,
        query: &str,
    ) -> Result<Vec<SearchHit>, EngineError> {
        if query.is_empty() {
            return Err(EngineError::MissingParameter("search_query".to_string()));
        }

        let dir = self.category_dir(category);
        let files = match list_files(&dir).await {
            Ok(files) => files,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(EngineError::Io(e)),
        };

        let mut hits = Vec::new();
        for file in files {
            let path = dir.join(&file);
            let content = match fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) => {
                    warn!("Could not read {} during search: {}", path.display(), e);
                    continue;
                }
            };

            if let Some(index) = content.find(query) {
                hits.push(SearchHit {
                    file,
                    category,
                    preview: preview_around(&content, index, query.len()),
                });
            }
        }

        debug!("Search for {:?} in {} matched {} file(s)", query, category, hits.len());
        Ok(hits)
    }

    /// Enumerate every category and write a Markdown audit report
    ///
    /// Unreadable directories or files are recorded as failed entries; the
    /// walk always continues and the report is always written.
    pub async fn audit_daily(&self, report_name: &str) -> Result<AuditReport, EngineError> {
        let mut entries = Vec::new();

        for category in MemoryCategory::ALL {
            let dir = self.category_dir(category);
            match walk_files(&dir).await {
                Ok(files) => {
                    entries.push(AuditEntry {
                        category,
                        file: None,
                        size_bytes: None,
                        modified: None,
                        ok: true,
                        error: None,
                    });
                    for file in files {
                        entries.push(audit_file(category, &dir, file).await);
                    }
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    entries.push(AuditEntry {
                        category,
                        file: None,
                        size_bytes: None,
                        modified: None,
                        ok: true,
                        error: None,
                    });
                }
                Err(e) => {
                    warn!("Audit could not read category {}: {}", category, e);
                    entries.push(AuditEntry {
                        category,
                        file: None,
                        size_bytes: None,
                        modified: None,
                        ok: false,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let failures = entries.iter().filter(|e| !e.ok).count();
        let files = entries.iter().filter(|e| e.file.is_some()).count();
        let success = failures == 0;
        let message = if success {
            format!("Audit completed: {} file(s) checked", files)
        } else {
            format!(
                "Audit completed with {} failure(s) across {} file(s)",
                failures, files
            )
        };

        let report = render_audit(&entries, &message);
        let path = self
            .write(MemoryCategory::AutoGenerated, report_name, &report)
            .await?;

        info!("{}", message);
        Ok(AuditReport {
            success,
            audit_log_path: path.display().to_string(),
            message,
            entries,
        })
    }

    /// Copy an external file into `auto_generated/multimedia/`
    pub async fn import_file(&self, source: &Path) -> Result<PathBuf, EngineError> {
        let metadata = fs::metadata(source).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => EngineError::FileNotFound(source.to_path_buf()),
            _ => EngineError::Io(e),
        })?;
        if !metadata.is_file() {
            return Err(EngineError::InvalidParameter(format!(
                "{} is not a regular file",
                source.display()
            )));
        }

        let file_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| EngineError::InvalidPath(source.display().to_string()))?;

        let destination = self.record_path(
            MemoryCategory::AutoGenerated,
            &format!("{}/{}", MULTIMEDIA_DIR, file_name),
        )?;
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await?;
        }
        let bytes = fs::copy(source, &destination).await?;

        info!("Imported {} ({} bytes) into the memory bank", file_name, bytes);
        Ok(destination)
    }
}

/// Write through a sibling temp file and rename over the destination
async fn write_atomic(path: &Path, content: &str) -> Result<(), EngineError> {
    let parent = path
        .parent()
        .ok_or_else(|| EngineError::InvalidPath(path.display().to_string()))?;
    fs::create_dir_all(parent).await?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| EngineError::InvalidPath(path.display().to_string()))?;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    let temp = parent.join(format!(".{}.{}-{}.tmp", file_name, std::process::id(), nanos));

    fs::write(&temp, content).await?;
    if let Err(e) = fs::rename(&temp, path).await {
        let _ = fs::remove_file(&temp).await;
        return Err(EngineError::Io(e));
    }
    Ok(())
}

/// Regular files directly inside `dir`, sorted by name
async fn list_files(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            files.push(entry.file_name().to_string_lossy().to_string());
        }
    }

    files.sort();
    Ok(files)
}

/// Every file below `dir`, as `/`-separated paths relative to it
async fn walk_files(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut files = Vec::new();
    let mut pending = vec![(dir.to_path_buf(), String::new())];

    while let Some((current, prefix)) = pending.pop() {
        let mut entries = fs::read_dir(&current).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            let relative = if prefix.is_empty() {
                name
            } else {
                format!("{}/{}", prefix, name)
            };

            if entry.file_type().await?.is_dir() {
                pending.push((entry.path(), relative));
            } else {
                files.push(relative);
            }
        }
    }

    files.sort();
    Ok(files)
}

async fn audit_file(category: MemoryCategory, dir: &Path, file: String) -> AuditEntry {
    match fs::metadata(dir.join(&file)).await {
        Ok(metadata) => AuditEntry {
            category,
            file: Some(file),
            size_bytes: Some(metadata.len()),
            modified: metadata.modified().ok().map(|time| {
                DateTime::<Local>::from(time).to_rfc3339_opts(SecondsFormat::Secs, false)
            }),
            ok: true,
            error: None,
        },
        Err(e) => AuditEntry {
            category,
            file: Some(file),
            size_bytes: None,
            modified: None,
            ok: false,
            error: Some(e.to_string()),
        },
    }
}

fn render_audit(entries: &[AuditEntry], message: &str) -> String {
    let mut out = format!("# Memory Audit - {}\n\n{}\n", local_timestamp(), message);

    for entry in entries {
        match (&entry.file, entry.ok) {
            (None, true) => out.push_str(&format!("\n## {}\n\n", entry.category)),
            (None, false) => out.push_str(&format!(
                "\n## {}\n\nFAILED: {}\n",
                entry.category,
                entry.error.as_deref().unwrap_or("unknown error")
            )),
            (Some(file), true) => out.push_str(&format!(
                "- {} ({} bytes, modified {})\n",
                file,
                entry.size_bytes.unwrap_or(0),
                entry.modified.as_deref().unwrap_or("unknown")
            )),
            (Some(file), false) => out.push_str(&format!(
                "- {} FAILED: {}\n",
                file,
                entry.error.as_deref().unwrap_or("unknown error")
            )),
        }
    }

    out
}

/// Up to `PREVIEW_CONTEXT` characters on each side of the match at `index`
fn preview_around(content: &str, index: usize, len: usize) -> String {
    let start = content[..index]
        .char_indices()
        .rev()
        .take(PREVIEW_CONTEXT)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(index);

    let end = index + len;
    let stop = content[end..]
        .char_indices()
        .nth(PREVIEW_CONTEXT)
        .map(|(i, _)| end + i)
        .unwrap_or(content.len());

    content[start..stop].to_string()
}
