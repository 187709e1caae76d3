//! Source discovery: find query files under a root directory.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{SqlGenError, SqlGenResult};

/// A query file found under the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlSource {
    /// Full path to the file.
    pub path: PathBuf,
    /// Path components relative to the root, file name last.
    pub segments: Vec<String>,
    pub content: String,
}

impl SqlSource {
    /// Path relative to the root, `/`-separated.
    pub fn relative(&self) -> PathBuf {
        self.segments.iter().collect()
    }
}

/// Walk `root` and read every file whose extension is `extension`.
///
/// Files come back in path order. Any walk or read failure aborts the whole
/// discovery with an error naming the offending path.
pub fn discover(
    root: &Path,
    extension: &str,
    max_file_bytes: Option<u64>,
) -> SqlGenResult<Vec<SqlSource>> {
    let extension = extension.trim_start_matches('.');
    let mut sources = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| SqlGenError::Walk {
            path: e.path().unwrap_or(root).to_path_buf(),
            source: e,
        })?;

        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != extension) {
            continue;
        }

        if let Some(limit) = max_file_bytes {
            let size = entry
                .metadata()
                .map_err(|e| SqlGenError::Walk {
                    path: path.to_path_buf(),
                    source: e,
                })?
                .len();
            if size > limit {
                return Err(SqlGenError::TooLarge {
                    path: path.to_path_buf(),
                    size,
                    limit,
                });
            }
        }

        let segments = relative_segments(root, path)?;
        let content = fs::read_to_string(path).map_err(|e| SqlGenError::read(path, e))?;
        debug!(path = %path.display(), bytes = content.len(), "discovered query file");

        sources.push(SqlSource {
            path: path.to_path_buf(),
            segments,
            content,
        });
    }

    Ok(sources)
}

fn relative_segments(root: &Path, path: &Path) -> SqlGenResult<Vec<String>> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| SqlGenError::invalid_path(path, "not under the root directory"))?;

    relative
        .components()
        .map(|component| match component {
            Component::Normal(part) => part
                .to_str()
                .map(str::to_string)
                .ok_or_else(|| SqlGenError::invalid_path(path, "path is not valid UTF-8")),
            _ => Err(SqlGenError::invalid_path(path, "unexpected path component")),
        })
        .collect()
}
