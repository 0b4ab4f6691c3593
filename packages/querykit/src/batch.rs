//! Batch document: the ordered records plus count and model tag, and its on-disk form.
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AssembleError;
use crate::query_record::QueryRecord;

/// Model tag written when the caller does not choose one.
pub const DEFAULT_MODEL_TAG: &str = "non-private";

const JSON_INDENT: &[u8] = b"    ";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBatch")]
pub struct Batch {
    #[serde(rename = "numb_requests")]
    count: usize,
    model: String,
    #[serde(rename = "data")]
    records: Vec<QueryRecord>,
}

#[derive(Deserialize)]
struct RawBatch {
    numb_requests: usize,
    model: String,
    data: Vec<QueryRecord>,
}

impl TryFrom<RawBatch> for Batch {
    type Error = String;

    fn try_from(raw: RawBatch) -> Result<Self, Self::Error> {
        if raw.numb_requests != raw.data.len() {
            return Err(format!(
                "numb_requests is {} but data holds {} records",
                raw.numb_requests,
                raw.data.len()
            ));
        }
        Ok(Self {
            count: raw.numb_requests,
            model: raw.model,
            records: raw.data,
        })
    }
}

impl Batch {
    /// Wraps records in construction order. An empty batch is refused.
    pub fn assemble(
        records: Vec<QueryRecord>,
        model: impl Into<String>,
    ) -> Result<Self, AssembleError> {
        if records.is_empty() {
            return Err(AssembleError::EmptyBatch);
        }
        Ok(Self {
            count: records.len(),
            model: model.into(),
            records,
        })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn records(&self) -> &[QueryRecord] {
        &self.records
    }

    /// Pretty JSON with 4-space indentation and fixed key order.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENT);
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        String::from_utf8(buf).map_err(<serde_json::Error as serde::ser::Error>::custom)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Writes the document through a temporary file in the destination directory and renames
    /// it into place, so a failed write never leaves a truncated file behind.
    pub fn write_to(&self, path: &Path) -> Result<(), AssembleError> {
        let write_failure = |source: std::io::Error| AssembleError::OutputWriteFailure {
            path: path.to_path_buf(),
            source,
        };

        let json = self
            .to_json()
            .map_err(|e| write_failure(std::io::Error::other(e)))?;
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(write_failure)?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(write_failure)?;
        tmp.write_all(json.as_bytes()).map_err(write_failure)?;
        tmp.as_file().sync_all().map_err(write_failure)?;
        tmp.persist(path).map_err(|e| write_failure(e.error))?;
        Ok(())
    }
}

/// `<root>/<folder>/<batch_name>.json`. A blank batch name is refused.
pub fn output_path(root: &Path, folder: &str, batch_name: &str) -> Result<PathBuf, AssembleError> {
    let batch_name = batch_name.trim();
    if batch_name.is_empty() {
        return Err(AssembleError::InvalidInput("batch name must not be empty".into()));
    }
    Ok(root
        .join(folder.trim())
        .join(format!("{batch_name}.json")))
}
