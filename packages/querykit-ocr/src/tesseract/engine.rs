use std::io::{Cursor, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use async_trait::async_trait;
use image::ImageReader;
use tracing::debug;

use crate::engine::{OcrEngine, OcrError, OcrInput, OcrOutput};

use super::tsv::parse_tsv;

/// OCR engine backed by the `tesseract` command line tool.
#[derive(Debug, Clone)]
pub struct TesseractOcrEngine {
    binary: PathBuf,
    languages: Option<String>,
    psm: Option<u32>,
}

impl TesseractOcrEngine {
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            languages: None,
            psm: None,
        }
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Language list in tesseract syntax, e.g. `eng+deu`.
    pub fn with_languages(mut self, languages: impl Into<String>) -> Self {
        self.languages = Some(languages.into());
        self
    }

    /// Page segmentation mode.
    pub fn with_psm(mut self, psm: u32) -> Self {
        self.psm = Some(psm);
        self
    }

    fn recognize_file(&self, path: &Path) -> Result<OcrOutput, OcrError> {
        let (width, height) =
            image::image_dimensions(path).map_err(|e| OcrError::ImageUnreadable {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        let tsv = self.run_tsv(path)?;
        let regions = parse_tsv(&tsv)?;
        debug!(
            path = %path.display(),
            width,
            height,
            regions = regions.len(),
            "tesseract finished"
        );
        Ok(OcrOutput::new(regions, width, height))
    }

    fn recognize_bytes(&self, data: &[u8]) -> Result<OcrOutput, OcrError> {
        let unreadable = |reason: String| OcrError::ImageUnreadable {
            path: format!("<{} bytes>", data.len()),
            reason,
        };
        let (width, height) = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| unreadable(e.to_string()))?
            .into_dimensions()
            .map_err(|e| unreadable(e.to_string()))?;

        let mut tmp = tempfile::NamedTempFile::new()
            .map_err(|e| OcrError::EngineError(format!("failed to create temp file: {e}")))?;
        tmp.write_all(data)
            .and_then(|_| tmp.flush())
            .map_err(|e| OcrError::EngineError(format!("failed to spool image: {e}")))?;

        let tsv = self.run_tsv(tmp.path())?;
        let regions = parse_tsv(&tsv)?;
        Ok(OcrOutput::new(regions, width, height))
    }

    fn run_tsv(&self, path: &Path) -> Result<String, OcrError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(path).arg("stdout");
        if let Some(languages) = &self.languages {
            cmd.arg("-l").arg(languages);
        }
        if let Some(psm) = self.psm {
            cmd.arg("--psm").arg(psm.to_string());
        }
        cmd.arg("tsv");

        let output = cmd.output().map_err(|e| match e.kind() {
            ErrorKind::NotFound => OcrError::EngineError(format!(
                "failed to run {} (is it installed?)",
                self.binary.display()
            )),
            _ => OcrError::EngineError(e.to_string()),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::EngineError(format!(
                "tesseract failed: {}",
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for TesseractOcrEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OcrEngine for TesseractOcrEngine {
    async fn recognize(&self, input: &OcrInput) -> Result<OcrOutput, OcrError> {
        let engine = self.clone();
        match input {
            OcrInput::FilePath(path) => {
                let path = path.clone();
                tokio::task::spawn_blocking(move || engine.recognize_file(&path))
                    .await
                    .map_err(|e| OcrError::EngineError(e.to_string()))?
            }
            OcrInput::Bytes(data) => {
                let data = data.clone();
                tokio::task::spawn_blocking(move || engine.recognize_bytes(&data))
                    .await
                    .map_err(|e| OcrError::EngineError(e.to_string()))?
            }
        }
    }
}
