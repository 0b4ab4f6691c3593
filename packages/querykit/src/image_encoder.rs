//! Image payload encoders: in-process base64, or an external encoder program that follows the
//! `--image_dir` / `--output_dir` convention.
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use thiserror::Error;
use tokio::fs;
use tokio::process::Command;
use tracing::debug;

/// Directory created next to the image when no output directory is configured.
pub const DEFAULT_ENCODED_DIR: &str = "encoded_output";

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("image path has no file name: {}", .0.display())]
    NoFileName(PathBuf),
    #[error("failed to read {}: {reason}", .path.display())]
    Unreadable { path: PathBuf, reason: String },
    #[error("could not start encoder {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("encoder exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("encoded file not found: {}", .0.display())]
    MissingOutput(PathBuf),
    #[error("encoded image data is empty for {}", .0.display())]
    EmptyPayload(PathBuf),
}

/// Turns an image into the opaque payload string carried by a query record.
#[async_trait]
pub trait ImageEncoder: Send + Sync {
    async fn encode(&self, image: &Path) -> Result<String, EncodeError>;
}

/// Base64 (standard alphabet, padded) of the raw image file bytes.
#[derive(Debug, Default, Clone)]
pub struct Base64ImageEncoder;

#[async_trait]
impl ImageEncoder for Base64ImageEncoder {
    async fn encode(&self, image: &Path) -> Result<String, EncodeError> {
        let bytes = fs::read(image).await.map_err(|e| EncodeError::Unreadable {
            path: image.to_path_buf(),
            reason: e.to_string(),
        })?;
        if bytes.is_empty() {
            return Err(EncodeError::EmptyPayload(image.to_path_buf()));
        }
        Ok(STANDARD.encode(bytes))
    }
}

#[derive(Debug, Deserialize)]
struct EncodedImageFile {
    #[serde(default)]
    encoded_image: String,
}

/// Runs an external encoder over the image's directory and reads back
/// `<output_dir>/<file name>.json`.
#[derive(Debug, Clone)]
pub struct ProcessImageEncoder {
    program: PathBuf,
    args: Vec<String>,
    output_dir: Option<PathBuf>,
}

impl ProcessImageEncoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            output_dir: None,
        }
    }

    /// Arguments placed before `--image_dir`, e.g. the script path for an interpreter.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    fn output_dir_for(&self, image_dir: &Path) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| image_dir.join(DEFAULT_ENCODED_DIR))
    }
}

#[async_trait]
impl ImageEncoder for ProcessImageEncoder {
    async fn encode(&self, image: &Path) -> Result<String, EncodeError> {
        let unreadable = |path: &Path, e: std::io::Error| EncodeError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        fs::metadata(image)
            .await
            .map_err(|e| unreadable(image, e))?;
        // Symlinks stay unresolved: the output file is keyed by the name the caller used.
        let image = std::path::absolute(image).map_err(|e| unreadable(image, e))?;
        let file_name = image
            .file_name()
            .ok_or_else(|| EncodeError::NoFileName(image.clone()))?
            .to_string_lossy()
            .into_owned();
        let image_dir = image
            .parent()
            .ok_or_else(|| EncodeError::NoFileName(image.clone()))?
            .to_path_buf();
        let output_dir = self.output_dir_for(&image_dir);
        fs::create_dir_all(&output_dir)
            .await
            .map_err(|e| unreadable(output_dir.as_path(), e))?;

        debug!(
            program = %self.program.display(),
            image_dir = %image_dir.display(),
            output_dir = %output_dir.display(),
            "running image encoder"
        );
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg("--image_dir")
            .arg(&image_dir)
            .arg("--output_dir")
            .arg(&output_dir)
            .output()
            .await
            .map_err(|source| EncodeError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(EncodeError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let encoded_path = output_dir.join(format!("{file_name}.json"));
        if !fs::try_exists(&encoded_path).await.unwrap_or(false) {
            return Err(EncodeError::MissingOutput(encoded_path));
        }
        let contents = fs::read_to_string(&encoded_path)
            .await
            .map_err(|e| unreadable(encoded_path.as_path(), e))?;
        let parsed: EncodedImageFile =
            serde_json::from_str(&contents).map_err(|e| EncodeError::Unreadable {
                path: encoded_path.clone(),
                reason: e.to_string(),
            })?;
        if parsed.encoded_image.is_empty() {
            return Err(EncodeError::EmptyPayload(encoded_path));
        }
        Ok(parsed.encoded_image)
    }
}
