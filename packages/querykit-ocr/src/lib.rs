//! OCR adapter and region geometry for querykit.
//!
//! [`OcrEngine`] turns an image into raw [`TextRegion`]s; [`OcrOutput::tokens`] applies the
//! discard rules and normalizes boxes into [`BoundingBox`]es; [`filter_by_region`] keeps the
//! tokens that fall inside a region of interest.
pub mod engine;
pub mod region;
pub mod tesseract;

pub use engine::{OcrEngine, OcrError, OcrInput, OcrOutput};
pub use region::{
    filter_by_region, into_parallel, overlap_fraction, BoundingBox, PixelBox, RegionError,
    TextRegion, Token,
};
pub use tesseract::TesseractOcrEngine;
