use std::path::PathBuf;

use querykit_ocr::{BoundingBox, OcrEngine};
use tracing::{info, warn};

use crate::batch::{output_path, Batch, DEFAULT_MODEL_TAG};
use crate::error::AssembleError;
use crate::image_encoder::ImageEncoder;
use crate::input_provider::QueryInputProvider;
use crate::query_record::{QueryRecord, QueryRecordBuilder};

/// Options for a batch run
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Image reused for every query instead of asking per query
    pub image: Option<PathBuf>,
    /// Region reused verbatim for every query instead of asking per query
    pub region: Option<BoundingBox>,
    /// Substituted when a provided image path does not exist
    pub default_image: Option<PathBuf>,
    pub model: String,
    pub output_root: PathBuf,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            image: None,
            region: None,
            default_image: None,
            model: DEFAULT_MODEL_TAG.to_string(),
            output_root: PathBuf::from("queries"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssembleResult {
    /// `None` when no queries were requested and nothing was written
    pub output_path: Option<PathBuf>,
    pub total_records: usize,
}

/// Drives a batch run: collects input, builds each record in turn, writes the document.
pub struct QueryAssembler<'a> {
    options: AssembleOptions,
    builder: QueryRecordBuilder<'a>,
}

impl<'a> QueryAssembler<'a> {
    pub fn new(
        options: AssembleOptions,
        ocr: &'a dyn OcrEngine,
        encoder: &'a dyn ImageEncoder,
    ) -> Self {
        Self {
            options,
            builder: QueryRecordBuilder::new(ocr, encoder),
        }
    }

    pub fn options(&self) -> &AssembleOptions {
        &self.options
    }

    /// Builds every requested record, then assembles and writes the batch.
    ///
    /// The first failure aborts the run; no partial batch is written.
    pub async fn run(
        &self,
        input: &mut dyn QueryInputProvider,
    ) -> Result<AssembleResult, AssembleError> {
        let count = input.query_count()?;
        info!(count, "building query batch");

        let mut records: Vec<QueryRecord> = Vec::with_capacity(count);
        for index in 0..count {
            input.begin_query(index)?;
            let image = self.resolve_image(input, index)?;
            let question = input.question(index)?;
            let region = match self.options.region {
                Some(region) => region,
                None => input.region(index)?,
            };

            let record = self.builder.build(&image, &question, &region).await?;
            info!(
                query = index + 1,
                id = %record.question_id(),
                tokens = record.ocr_tokens().len(),
                "query record built"
            );
            records.push(record);
        }

        if records.is_empty() {
            info!("no queries were added");
            return Ok(AssembleResult {
                output_path: None,
                total_records: 0,
            });
        }

        let batch = Batch::assemble(records, self.options.model.as_str())?;
        let folder = input.output_folder()?;
        let batch_name = input.batch_name()?;
        let path = output_path(&self.options.output_root, &folder, &batch_name)?;
        batch.write_to(&path)?;
        info!(path = %path.display(), records = batch.count(), "batch written");

        Ok(AssembleResult {
            output_path: Some(path),
            total_records: batch.count(),
        })
    }

    fn resolve_image(
        &self,
        input: &mut dyn QueryInputProvider,
        index: usize,
    ) -> Result<PathBuf, AssembleError> {
        if let Some(image) = &self.options.image {
            return Ok(image.clone());
        }
        let image = input.image_path(index)?;
        match &self.options.default_image {
            Some(default) if !image.is_file() => {
                warn!(
                    missing = %image.display(),
                    fallback = %default.display(),
                    "image not found, using default image"
                );
                Ok(default.clone())
            }
            _ => Ok(image),
        }
    }
}
