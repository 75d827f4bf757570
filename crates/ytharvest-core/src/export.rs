//! JSON export of a finished collection run.
//!
//! The file name is derived from the video title: every character outside
//! `[A-Za-z0-9]` becomes `_`, the result is lower-cased and suffixed with
//! `-comments.json`.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::records::{CollectionResult, CommentRecord, VideoMetadata};

const FALLBACK_TITLE: &str = "youtube-comments";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write export to {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// On-disk shape of an export.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument<'a> {
    pub video_info: Option<&'a VideoMetadata>,
    pub comments: &'a [CommentRecord],
    pub total_found: usize,
    pub reached_limit: bool,
    pub attempts: u32,
}

impl<'a> From<&'a CollectionResult> for ExportDocument<'a> {
    fn from(result: &'a CollectionResult) -> Self {
        Self {
            video_info: result.metadata.as_ref(),
            comments: &result.items,
            total_found: result.total_seen,
            reached_limit: result.exhausted_attempts,
            attempts: result.attempts_used,
        }
    }
}

/// Export file name for a video title.
#[must_use]
pub fn export_file_name(title: Option<&str>) -> String {
    let title = title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(FALLBACK_TITLE);
    let safe: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{safe}-comments.json")
}

/// Write `result` as pretty JSON into `dir`, returning the written path.
///
/// # Errors
///
/// Returns [`ExportError`] if serialization or the file write fails.
pub fn write_export(dir: &Path, result: &CollectionResult) -> Result<PathBuf, ExportError> {
    let title = result.metadata.as_ref().map(|m| m.title.as_str());
    let path = dir.join(export_file_name(title));
    let json = serde_json::to_string_pretty(&ExportDocument::from(result))?;
    std::fs::write(&path, json).map_err(|e| ExportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(path)
}
