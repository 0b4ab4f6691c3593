//! # querykit
//!
//! Builds batches of query records for a document-understanding model. Each record pairs a
//! question with the OCR tokens that lie inside a region of interest and an encoded copy of
//! the image.
//!
//! ## Features
//!
//! - **Region filtering**: keeps only tokens whose box lies entirely inside the region
//! - **Pluggable collaborators**: any [`OcrEngine`] and any [`ImageEncoder`]
//! - **Input providers**: interactive prompts or a JSON manifest
//! - **Stable output**: `numb_requests` / `model` / `data`, 4-space indented, written atomically
//!
//! ## Quick Start
//!
//! ```ignore
//! use querykit::prelude::*;
//!
//! let ocr = TesseractOcrEngine::new();
//! let encoder = Base64ImageEncoder;
//! let options = AssembleOptions {
//!     region: Some("[0.4, 0, 0.9, 0.15]".parse()?),
//!     ..Default::default()
//! };
//!
//! let assembler = QueryAssembler::new(options, &ocr, &encoder);
//! let mut input = ManifestProvider::from_path("manifest.json".as_ref())?;
//! let result = assembler.run(&mut input).await?;
//! println!("{:?}", result.output_path);
//! ```

pub mod assembler;
pub mod batch;
pub mod error;
pub mod image_encoder;
pub mod input_provider;
pub mod logging;
pub mod query_record;

// Re-export commonly used types at the root level
pub use assembler::{AssembleOptions, AssembleResult, QueryAssembler};
pub use batch::{output_path, Batch, DEFAULT_MODEL_TAG};
pub use error::AssembleError;
pub use image_encoder::{Base64ImageEncoder, EncodeError, ImageEncoder, ProcessImageEncoder};
pub use input_provider::{Manifest, ManifestProvider, ManifestQuery, PromptProvider, QueryInputProvider};
pub use query_record::{QueryRecord, QueryRecordBuilder, DEFAULT_QUESTION, REGION_OVERLAP_THRESHOLD};
pub use querykit_ocr::{
    filter_by_region, overlap_fraction, BoundingBox, OcrEngine, OcrError, OcrInput, OcrOutput,
    TesseractOcrEngine, Token,
};

/// Prelude module for convenient imports
///
/// ```ignore
/// use querykit::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        filter_by_region, output_path, overlap_fraction, AssembleError, AssembleOptions,
        AssembleResult, Base64ImageEncoder, Batch, BoundingBox, EncodeError, ImageEncoder,
        Manifest, ManifestProvider, ManifestQuery, OcrEngine, OcrError, OcrInput, OcrOutput,
        ProcessImageEncoder, PromptProvider, QueryAssembler, QueryInputProvider, QueryRecord,
        QueryRecordBuilder, TesseractOcrEngine, Token, DEFAULT_MODEL_TAG, DEFAULT_QUESTION,
        REGION_OVERLAP_THRESHOLD,
    };
}
