//! Error taxonomy for batch assembly. Every variant aborts the run.
use std::path::PathBuf;

use querykit_ocr::{OcrError, RegionError};
use thiserror::Error;

use crate::image_encoder::EncodeError;

#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("cannot read image {path}: {reason}")]
    ImageUnreadable { path: String, reason: String },

    #[error("invalid region: {0}")]
    InvalidRegion(String),

    #[error("encoded image unavailable: {0}")]
    EncodingUnavailable(#[from] EncodeError),

    #[error("no query records to assemble")]
    EmptyBatch,

    #[error("failed to write {}: {source}", .path.display())]
    OutputWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ocr failed: {0}")]
    Ocr(OcrError),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<OcrError> for AssembleError {
    fn from(e: OcrError) -> Self {
        match e {
            OcrError::ImageUnreadable { path, reason } => {
                AssembleError::ImageUnreadable { path, reason }
            }
            other => AssembleError::Ocr(other),
        }
    }
}

impl From<RegionError> for AssembleError {
    fn from(e: RegionError) -> Self {
        AssembleError::InvalidRegion(e.to_string())
    }
}
