//! Integration tests for the querykit library API

#[test]
fn test_prelude_imports() {
    use querykit::prelude::*;

    let region: BoundingBox = "[0.4, 0, 0.9, 0.15]".parse().unwrap();
    let token = BoundingBox::new(0.45, 0.02, 0.55, 0.10).unwrap();
    assert_eq!(overlap_fraction(&region, &token), 1.0);
    assert_eq!(REGION_OVERLAP_THRESHOLD, 1.0);
    assert_eq!(DEFAULT_MODEL_TAG, "non-private");
    assert!(!DEFAULT_QUESTION.is_empty());
}

#[test]
fn test_invoice_header_scenario() {
    use querykit::{filter_by_region, BoundingBox, Token};

    let bb = |a, b, c, d| BoundingBox::new(a, b, c, d).unwrap();
    let region = bb(0.4, 0.0, 0.9, 0.15);
    let tokens = vec![
        Token::new("Invoice", bb(0.45, 0.02, 0.55, 0.10)),
        Token::new("#12345", bb(0.56, 0.02, 0.70, 0.10)),
        Token::new("Date", bb(0.10, 0.50, 0.20, 0.55)),
    ];

    let kept = filter_by_region(&tokens, &region, 1.0);
    let texts: Vec<&str> = kept.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["Invoice", "#12345"]);
}

#[test]
fn test_batch_module() {
    use querykit::batch::{output_path, Batch};
    use querykit::{AssembleError, QueryRecord};
    use std::path::Path;

    let err = Batch::assemble(Vec::<QueryRecord>::new(), "non-private").unwrap_err();
    assert!(matches!(err, AssembleError::EmptyBatch));

    let path = output_path(Path::new("queries"), "invoices", "batch1").unwrap();
    assert!(path.ends_with("invoices/batch1.json"));
}

#[test]
fn test_assemble_options_defaults() {
    use querykit::AssembleOptions;
    use std::path::PathBuf;

    let options = AssembleOptions::default();
    assert_eq!(options.model, "non-private");
    assert_eq!(options.output_root, PathBuf::from("queries"));
    assert!(options.region.is_none());
    assert!(options.image.is_none());
}

#[test]
fn test_tesseract_engine_types() {
    use querykit::{OcrEngine, TesseractOcrEngine};

    fn assert_engine<E: OcrEngine>(_: &E) {}
    let engine = TesseractOcrEngine::new().with_languages("eng").with_psm(6);
    assert_engine(&engine);
}
