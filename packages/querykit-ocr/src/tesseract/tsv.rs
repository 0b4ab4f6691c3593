use crate::engine::OcrError;
use crate::region::{PixelBox, TextRegion};

/// Row level tesseract assigns to individual words.
const WORD_LEVEL: u32 = 5;

/// Parses `tesseract ... tsv` output into word regions, in emission order.
///
/// Confidence that does not parse is kept as `None` so the caller can discard it.
pub fn parse_tsv(tsv: &str) -> Result<Vec<TextRegion>, OcrError> {
    let mut lines = tsv.lines();
    match lines.next() {
        Some(header) if header.starts_with("level") => {}
        Some(_) => return Err(OcrError::EngineError("unexpected tsv header".into())),
        None => return Ok(Vec::new()),
    }

    let mut regions = Vec::new();
    for row in lines {
        let cols = row.split('\t').collect::<Vec<_>>();
        if cols.len() < 11 {
            continue;
        }
        let level: u32 = cols[0].parse().unwrap_or(0);
        if level != WORD_LEVEL {
            continue;
        }

        let dims = (
            cols[6].parse::<f32>(),
            cols[7].parse::<f32>(),
            cols[8].parse::<f32>(),
            cols[9].parse::<f32>(),
        );
        let bounding_box = match dims {
            (Ok(x), Ok(y), Ok(width), Ok(height)) => Some(PixelBox {
                x,
                y,
                width,
                height,
            }),
            _ => None,
        };

        regions.push(TextRegion {
            text: cols.get(11).copied().unwrap_or("").to_string(),
            bounding_box,
            confidence: cols[10].trim().parse::<f32>().ok(),
        });
    }

    Ok(regions)
}
