use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::region::{BoundingBox, TextRegion, Token};

#[derive(Debug, Clone)]
pub enum OcrInput {
    FilePath(PathBuf),
    Bytes(Vec<u8>),
}

impl OcrInput {
    /// Human readable origin, used in error messages.
    pub fn describe(&self) -> String {
        match self {
            OcrInput::FilePath(path) => path.display().to_string(),
            OcrInput::Bytes(data) => format!("<{} bytes>", data.len()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OcrOutput {
    pub text: String,
    pub regions: Vec<TextRegion>,
    pub image_width: u32,
    pub image_height: u32,
}

impl OcrOutput {
    pub fn new(regions: Vec<TextRegion>, image_width: u32, image_height: u32) -> Self {
        let text = regions
            .iter()
            .map(|r| r.text.as_str())
            .filter(|t| !t.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            text,
            regions,
            image_width,
            image_height,
        }
    }

    /// Tokens with normalized boxes, in emission order.
    ///
    /// Drops regions with blank text, a missing box, or a confidence that is missing,
    /// non-positive or NaN.
    pub fn tokens(&self) -> Vec<Token> {
        self.regions
            .iter()
            .filter(|r| !r.text.trim().is_empty())
            .filter(|r| r.confidence.is_some_and(|c| c > 0.0))
            .filter_map(|r| {
                let px = r.bounding_box.as_ref()?;
                let bbox = BoundingBox::from_pixels(px, self.image_width, self.image_height)?;
                Some(Token::new(r.text.clone(), bbox))
            })
            .collect()
    }
}

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("cannot read image {path}: {reason}")]
    ImageUnreadable { path: String, reason: String },
    #[error("engine error: {0}")]
    EngineError(String),
}

#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, input: &OcrInput) -> Result<OcrOutput, OcrError>;
}
