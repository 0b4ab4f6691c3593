mod engine;
mod tsv;

pub use engine::TesseractOcrEngine;
pub use tsv::parse_tsv;
