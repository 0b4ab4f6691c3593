//! Sources for per-query input: an interactive prompt or a JSON manifest.
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use querykit_ocr::{BoundingBox, RegionError};
use serde::Deserialize;
use serde_json::Value;

use crate::error::AssembleError;

/// Supplies the values a batch run needs. Indices are zero-based.
pub trait QueryInputProvider {
    fn query_count(&mut self) -> Result<usize, AssembleError>;

    /// Called before the first value of each query is requested.
    fn begin_query(&mut self, _index: usize) -> Result<(), AssembleError> {
        Ok(())
    }

    fn image_path(&mut self, index: usize) -> Result<PathBuf, AssembleError>;
    fn question(&mut self, index: usize) -> Result<String, AssembleError>;
    fn region(&mut self, index: usize) -> Result<BoundingBox, AssembleError>;
    fn output_folder(&mut self) -> Result<String, AssembleError>;
    fn batch_name(&mut self) -> Result<String, AssembleError>;
}

/// Asks for every value on a line-oriented terminal.
pub struct PromptProvider<R, W> {
    input: R,
    output: W,
}

impl PromptProvider<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> PromptProvider<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn prompt(&mut self, message: &str) -> Result<String, AssembleError> {
        let io_err = |e: io::Error| AssembleError::InvalidInput(e.to_string());
        write!(self.output, "{message}").map_err(io_err)?;
        self.output.flush().map_err(io_err)?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).map_err(io_err)?;
        if read == 0 {
            return Err(AssembleError::InvalidInput(
                "unexpected end of input".into(),
            ));
        }
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead, W: Write> QueryInputProvider for PromptProvider<R, W> {
    fn query_count(&mut self) -> Result<usize, AssembleError> {
        let answer = self.prompt("Enter the number of queries you want to add: ")?;
        let count: i64 = answer
            .parse()
            .map_err(|_| AssembleError::InvalidInput(format!("invalid number: {answer:?}")))?;
        // Negative counts mean no queries.
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn begin_query(&mut self, index: usize) -> Result<(), AssembleError> {
        writeln!(self.output, "\n--- Query {} ---", index + 1)
            .map_err(|e| AssembleError::InvalidInput(e.to_string()))
    }

    fn image_path(&mut self, _index: usize) -> Result<PathBuf, AssembleError> {
        self.prompt("Enter full path of the image to process: ")
            .map(PathBuf::from)
    }

    fn question(&mut self, _index: usize) -> Result<String, AssembleError> {
        self.prompt("Enter the query question: ")
    }

    fn region(&mut self, _index: usize) -> Result<BoundingBox, AssembleError> {
        let answer = self.prompt("Example: [0.4, 0, 0.9, 0.15]. Please input bounding box: ")?;
        Ok(answer.parse::<BoundingBox>()?)
    }

    fn output_folder(&mut self) -> Result<String, AssembleError> {
        self.prompt("Enter the image folder name: ")
    }

    fn batch_name(&mut self) -> Result<String, AssembleError> {
        self.prompt("Enter the query name: ")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestQuery {
    pub image: PathBuf,
    #[serde(default)]
    pub question: String,
    /// Kept loose so malformed boxes surface as region errors.
    #[serde(default)]
    pub region: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub folder: String,
    pub batch_name: String,
    #[serde(default)]
    pub queries: Vec<ManifestQuery>,
}

/// Reads every value from a manifest file instead of prompting.
#[derive(Debug, Clone)]
pub struct ManifestProvider {
    manifest: Manifest,
}

impl ManifestProvider {
    pub fn new(manifest: Manifest) -> Self {
        Self { manifest }
    }

    pub fn from_path(path: &Path) -> Result<Self, AssembleError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AssembleError::InvalidInput(format!("cannot read manifest {}: {e}", path.display()))
        })?;
        let manifest = serde_json::from_str(&contents).map_err(|e| {
            AssembleError::InvalidInput(format!("invalid manifest {}: {e}", path.display()))
        })?;
        Ok(Self::new(manifest))
    }

    fn query(&self, index: usize) -> Result<&ManifestQuery, AssembleError> {
        self.manifest.queries.get(index).ok_or_else(|| {
            AssembleError::InvalidInput(format!("manifest has no query #{}", index + 1))
        })
    }
}

impl QueryInputProvider for ManifestProvider {
    fn query_count(&mut self) -> Result<usize, AssembleError> {
        Ok(self.manifest.queries.len())
    }

    fn image_path(&mut self, index: usize) -> Result<PathBuf, AssembleError> {
        Ok(self.query(index)?.image.clone())
    }

    fn question(&mut self, index: usize) -> Result<String, AssembleError> {
        Ok(self.query(index)?.question.clone())
    }

    fn region(&mut self, index: usize) -> Result<BoundingBox, AssembleError> {
        match &self.query(index)?.region {
            Some(value) => Ok(region_from_value(value)?),
            None => Err(AssembleError::InvalidRegion(format!(
                "query #{} has no region and no batch-wide bounding box is set",
                index + 1
            ))),
        }
    }

    fn output_folder(&mut self) -> Result<String, AssembleError> {
        Ok(self.manifest.folder.clone())
    }

    fn batch_name(&mut self) -> Result<String, AssembleError> {
        Ok(self.manifest.batch_name.clone())
    }
}

/// Accepts a 4-element numeric array, or a string in the prompt syntax.
pub fn region_from_value(value: &Value) -> Result<BoundingBox, RegionError> {
    match value {
        Value::String(s) => s.parse(),
        Value::Array(items) => {
            if items.len() != 4 {
                return Err(RegionError::WrongLength(items.len()));
            }
            let mut coords = [0.0f64; 4];
            for (index, item) in items.iter().enumerate() {
                coords[index] = item.as_f64().ok_or_else(|| RegionError::NotNumeric {
                    index,
                    value: item.to_string(),
                })?;
            }
            BoundingBox::try_from(coords)
        }
        other => Err(RegionError::NotNumeric {
            index: 0,
            value: other.to_string(),
        }),
    }
}
