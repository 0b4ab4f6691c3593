//! Region geometry: normalized boxes, the token-relative overlap test and the region filter.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pixel-space box as reported by the OCR engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// One raw unit of OCR output before any discarding or normalization.
#[derive(Debug, Clone)]
pub struct TextRegion {
    pub text: String,
    pub bounding_box: Option<PixelBox>,
    pub confidence: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegionError {
    #[error("bounding box must have exactly 4 elements, got {0}")]
    WrongLength(usize),
    #[error("bounding box element {index} is not a number: {value:?}")]
    NotNumeric { index: usize, value: String },
    #[error("bounding box element {0} is not finite")]
    NotFinite(usize),
    #[error("bounding box corners are inverted: [{0}, {1}, {2}, {3}]")]
    Inverted(f64, f64, f64, f64),
}

/// Normalized rectangle `[x_min, y_min, x_max, y_max]` relative to image size.
///
/// Serializes as a bare 4-element array, which is the shape both the CLI input and the
/// output document use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl BoundingBox {
    /// Builds a box, rejecting non-finite coordinates and inverted corners.
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<Self, RegionError> {
        for (index, v) in [x_min, y_min, x_max, y_max].into_iter().enumerate() {
            if !v.is_finite() {
                return Err(RegionError::NotFinite(index));
            }
        }
        if x_min > x_max || y_min > y_max {
            return Err(RegionError::Inverted(x_min, y_min, x_max, y_max));
        }
        Ok(Self {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    /// Scales a pixel box into unit coordinates for an image of the given size.
    pub fn from_pixels(px: &PixelBox, image_width: u32, image_height: u32) -> Option<Self> {
        if image_width == 0 || image_height == 0 {
            return None;
        }
        let w = f64::from(image_width);
        let h = f64::from(image_height);
        let x = f64::from(px.x);
        let y = f64::from(px.y);
        Self::new(
            x / w,
            y / h,
            (x + f64::from(px.width)) / w,
            (y + f64::from(px.height)) / h,
        )
        .ok()
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// True when `other` lies entirely inside `self`.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.x_min >= self.x_min
            && other.y_min >= self.y_min
            && other.x_max <= self.x_max
            && other.y_max <= self.y_max
    }
}

impl TryFrom<[f64; 4]> for BoundingBox {
    type Error = RegionError;

    fn try_from(v: [f64; 4]) -> Result<Self, Self::Error> {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x_min, b.y_min, b.x_max, b.y_max]
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.x_min, self.y_min, self.x_max, self.y_max
        )
    }
}

/// Parses `[x_min, y_min, x_max, y_max]`. Parentheses are accepted in place of brackets and
/// integer literals are coerced to reals.
impl FromStr for BoundingBox {
    type Err = RegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix('[')
            .and_then(|r| r.strip_suffix(']'))
            .or_else(|| {
                trimmed
                    .strip_prefix('(')
                    .and_then(|r| r.strip_suffix(')'))
            })
            .unwrap_or(trimmed);

        let mut parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        // trailing comma, as in `[0.1, 0.2, 0.3, 0.4,]`
        if parts.last().is_some_and(|p| p.is_empty()) {
            parts.pop();
        }
        if parts.len() != 4 {
            return Err(RegionError::WrongLength(parts.len()));
        }

        let mut values = [0.0f64; 4];
        for (index, part) in parts.iter().enumerate() {
            values[index] = part.parse::<f64>().map_err(|_| RegionError::NotNumeric {
                index,
                value: part.to_string(),
            })?;
        }
        Self::try_from(values)
    }
}

/// A recognized word with its normalized box.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub bbox: BoundingBox,
}

impl Token {
    pub fn new(text: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }
}

/// Fraction of `token`'s area covered by `region`.
///
/// Relative to the token area only, so a large region fully containing a small token yields
/// `1.0`. A zero-area token always yields `0.0`.
pub fn overlap_fraction(region: &BoundingBox, token: &BoundingBox) -> f64 {
    let x_a = region.x_min.max(token.x_min);
    let y_a = region.y_min.max(token.y_min);
    let x_b = region.x_max.min(token.x_max);
    let y_b = region.y_max.min(token.y_max);

    let inter_w = (x_b - x_a).max(0.0);
    let inter_h = (y_b - y_a).max(0.0);
    let inter_area = inter_w * inter_h;

    let token_area = token.area();
    if token_area.is_nan() || token_area <= 0.0 {
        return 0.0;
    }
    (inter_area / token_area).min(1.0)
}

/// Keeps the tokens whose overlap with `region` reaches `threshold`, in input order.
pub fn filter_by_region(tokens: &[Token], region: &BoundingBox, threshold: f64) -> Vec<Token> {
    tokens
        .iter()
        .filter(|t| overlap_fraction(region, &t.bbox) >= threshold)
        .cloned()
        .collect()
}

/// Splits tokens into the parallel text/box sequences used by the output document.
pub fn into_parallel(tokens: Vec<Token>) -> (Vec<String>, Vec<BoundingBox>) {
    tokens.into_iter().map(|t| (t.text, t.bbox)).unzip()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bb(x0: f64, y0: f64, x1: f64, y1: f64) -> BoundingBox {
        BoundingBox::new(x0, y0, x1, y1).unwrap()
    }

    fn invoice_tokens() -> Vec<Token> {
        vec![
            Token::new("Invoice", bb(0.45, 0.02, 0.55, 0.10)),
            Token::new("#12345", bb(0.56, 0.02, 0.70, 0.10)),
            Token::new("Date", bb(0.10, 0.50, 0.20, 0.55)),
        ]
    }

    #[test]
    fn test_overlap_disjoint_is_zero() {
        let region = bb(0.0, 0.0, 0.2, 0.2);
        let token = bb(0.5, 0.5, 0.6, 0.6);
        assert_eq!(overlap_fraction(&region, &token), 0.0);
    }

    #[test]
    fn test_overlap_contained_is_one() {
        let region = bb(0.0, 0.0, 1.0, 1.0);
        let token = bb(0.3, 0.3, 0.31, 0.32);
        assert_eq!(overlap_fraction(&region, &token), 1.0);
    }

    #[test]
    fn test_overlap_is_token_relative() {
        // Token covers the whole region but only a quarter of it is inside.
        let region = bb(0.0, 0.0, 0.5, 0.5);
        let token = bb(0.0, 0.0, 1.0, 1.0);
        assert!((overlap_fraction(&region, &token) - 0.25).abs() < 1e-12);
        assert_eq!(overlap_fraction(&token, &region), 1.0);
    }

    #[test]
    fn test_overlap_half() {
        let region = bb(0.0, 0.0, 0.5, 1.0);
        let token = bb(0.4, 0.4, 0.6, 0.6);
        assert!((overlap_fraction(&region, &token) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_overlap_zero_area_token() {
        let region = bb(0.0, 0.0, 1.0, 1.0);
        assert_eq!(overlap_fraction(&region, &bb(0.2, 0.2, 0.2, 0.4)), 0.0);
        assert_eq!(overlap_fraction(&region, &bb(0.2, 0.2, 0.2, 0.2)), 0.0);
    }

    #[test]
    fn test_overlap_stays_in_unit_interval() {
        let boxes = [
            bb(0.0, 0.0, 1.0, 1.0),
            bb(0.1, 0.2, 0.3, 0.4),
            bb(0.25, 0.0, 0.75, 0.5),
            bb(0.9, 0.9, 1.0, 1.0),
            bb(0.5, 0.5, 0.5, 0.9),
        ];
        for a in &boxes {
            for b in &boxes {
                let f = overlap_fraction(a, b);
                assert!((0.0..=1.0).contains(&f), "{a} vs {b} gave {f}");
            }
        }
    }

    #[test]
    fn test_filter_invoice_header() {
        let region = bb(0.4, 0.0, 0.9, 0.15);
        let kept = filter_by_region(&invoice_tokens(), &region, 1.0);
        let (texts, boxes) = into_parallel(kept);
        assert_eq!(texts, vec!["Invoice", "#12345"]);
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0], bb(0.45, 0.02, 0.55, 0.10));
    }

    #[test]
    fn test_filter_full_containment_rejects_spillover() {
        let region = bb(0.4, 0.0, 0.9, 0.15);
        let tokens = vec![
            Token::new("edge", bb(0.4, 0.0, 0.9, 0.15)),
            Token::new("spill", bb(0.85, 0.05, 0.9000001, 0.10)),
        ];
        let kept = filter_by_region(&tokens, &region, 1.0);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].text, "edge");
    }

    #[test]
    fn test_filter_matches_containment() {
        let region = bb(0.2, 0.2, 0.7, 0.6);
        let tokens = vec![
            Token::new("a", bb(0.25, 0.25, 0.3, 0.3)),
            Token::new("b", bb(0.1, 0.25, 0.3, 0.3)),
            Token::new("c", bb(0.6, 0.5, 0.7, 0.6)),
            Token::new("d", bb(0.6, 0.5, 0.71, 0.6)),
        ];
        let kept = filter_by_region(&tokens, &region, 1.0);
        for t in &tokens {
            assert_eq!(kept.contains(t), region.contains(&t.bbox), "token {}", t.text);
        }
    }

    #[test]
    fn test_filter_is_idempotent() {
        let region = bb(0.4, 0.0, 0.9, 0.15);
        let once = filter_by_region(&invoice_tokens(), &region, 1.0);
        let twice = filter_by_region(&once, &region, 1.0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_filter_empty_and_zero_area_region() {
        let region = bb(0.4, 0.0, 0.9, 0.15);
        assert!(filter_by_region(&[], &region, 1.0).is_empty());

        let point = bb(0.5, 0.05, 0.5, 0.05);
        assert!(filter_by_region(&invoice_tokens(), &point, 1.0).is_empty());
    }

    #[test]
    fn test_filter_lower_threshold_keeps_partial() {
        let region = bb(0.0, 0.0, 0.5, 1.0);
        let tokens = vec![Token::new("half", bb(0.4, 0.4, 0.6, 0.6))];
        assert_eq!(filter_by_region(&tokens, &region, 0.5).len(), 1);
        assert!(filter_by_region(&tokens, &region, 1.0).is_empty());
    }

    #[test]
    fn test_parse_bounding_box() {
        let b: BoundingBox = "[0.4, 0, 0.9, 0.15]".parse().unwrap();
        assert_eq!(b, bb(0.4, 0.0, 0.9, 0.15));

        let t: BoundingBox = "(0.1,0.2,0.3,0.4)".parse().unwrap();
        assert_eq!(t, bb(0.1, 0.2, 0.3, 0.4));

        let trailing: BoundingBox = "[0.1, 0.2, 0.3, 0.4,]".parse().unwrap();
        assert_eq!(trailing, t);
    }

    #[test]
    fn test_parse_bounding_box_rejects_malformed() {
        assert_eq!(
            "[0.1, 0.2, 0.3]".parse::<BoundingBox>(),
            Err(RegionError::WrongLength(3))
        );
        assert_eq!(
            "[0.1, 0.2, 0.3, 0.4, 0.5]".parse::<BoundingBox>(),
            Err(RegionError::WrongLength(5))
        );
        assert!(matches!(
            "[0.1, 0.2, , 0.4]".parse::<BoundingBox>(),
            Err(RegionError::NotNumeric { index: 2, .. })
        ));
        assert_eq!("".parse::<BoundingBox>(), Err(RegionError::WrongLength(0)));
        assert!(matches!(
            "[0.1, 0.2, x, 0.4]".parse::<BoundingBox>(),
            Err(RegionError::NotNumeric { index: 2, .. })
        ));
        assert!(matches!(
            "[0.1, 0.2, nan, 0.4]".parse::<BoundingBox>(),
            Err(RegionError::NotFinite(2))
        ));
        assert!(matches!(
            "[0.9, 0.2, 0.1, 0.4]".parse::<BoundingBox>(),
            Err(RegionError::Inverted(..))
        ));
    }

    #[test]
    fn test_from_pixels_normalizes() {
        let px = PixelBox {
            x: 100.0,
            y: 50.0,
            width: 200.0,
            height: 25.0,
        };
        let b = BoundingBox::from_pixels(&px, 1000, 500).unwrap();
        assert_eq!(b, bb(0.1, 0.1, 0.3, 0.15));
        assert!(BoundingBox::from_pixels(&px, 0, 500).is_none());
    }

    #[test]
    fn test_serializes_as_array() {
        let b = bb(0.1, 0.2, 0.3, 0.4);
        assert_eq!(serde_json::to_string(&b).unwrap(), "[0.1,0.2,0.3,0.4]");
        let back: BoundingBox = serde_json::from_str("[0.1,0.2,0.3,0.4]").unwrap();
        assert_eq!(back, b);
        assert!(serde_json::from_str::<BoundingBox>("[0.1,0.2,0.3]").is_err());
    }
}
