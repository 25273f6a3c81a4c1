// Dimension token detection and expansion
//
// *La Dimension* - "2x4", "2 x 4", "2×4" and "2 × 4" all name the same brick

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

static EXACT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]+)\s*[xX×]\s*([0-9]+)$").expect("exact dimension pattern is valid")
});

static SCAN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9]+)\s*[xX×]\s*([0-9]+)").expect("dimension scan pattern is valid")
});

static CONTINUATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[xX×][0-9]+$").expect("continuation pattern is valid")
});

/// Two-number size such as the "2x4" in "Brick 2 x 4"
///
/// Both numbers are kept as written; "02x4" is not "2x4".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension {
    /// First number, verbatim
    pub first: String,
    /// Second number, verbatim
    pub second: String,
}

impl Dimension {
    /// Parse a string that is exactly one dimension
    pub fn parse(text: &str) -> Option<Self> {
        let captures = EXACT_PATTERN.captures(text)?;
        Some(Self {
            first: captures[1].to_string(),
            second: captures[2].to_string(),
        })
    }

    /// The four canonical spellings, compact ASCII first
    pub fn variants(&self) -> [String; 4] {
        let (a, b) = (&self.first, &self.second);
        [
            format!("{a}x{b}"),
            format!("{a} x {b}"),
            format!("{a}×{b}"),
            format!("{a} × {b}"),
        ]
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.first, self.second)
    }
}

/// A dimension found inside a longer string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionMatch {
    /// Parsed dimension
    pub dimension: Dimension,
    /// Byte range of the matched text
    pub span: Range<usize>,
}

/// Canonical variants when the whole string is a dimension
///
/// Returns `None` otherwise; callers then use the text unchanged.
pub fn normalize(text: &str) -> Option<[String; 4]> {
    Dimension::parse(text).map(|dimension| dimension.variants())
}

/// Every embedded dimension, leftmost first and non-overlapping
pub fn find_all(text: &str) -> Vec<DimensionMatch> {
    SCAN_PATTERN
        .captures_iter(text)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            Some(DimensionMatch {
                dimension: Dimension {
                    first: captures[1].to_string(),
                    second: captures[2].to_string(),
                },
                span: whole.range(),
            })
        })
        .collect()
}

/// Distinct dimensions embedded in the text, in order of first appearance
pub fn embedded_dimensions(text: &str) -> Vec<Dimension> {
    let mut dimensions: Vec<Dimension> = Vec::new();
    for found in find_all(text) {
        if !dimensions.contains(&found.dimension) {
            dimensions.push(found.dimension);
        }
    }
    dimensions
}

/// De-duplicated union of the variants of every embedded dimension
///
/// Empty when the text holds no dimension.
pub fn extract_all(text: &str) -> Vec<String> {
    let mut variants: Vec<String> = Vec::new();
    for dimension in embedded_dimensions(text) {
        for variant in dimension.variants() {
            if !variants.contains(&variant) {
                variants.push(variant);
            }
        }
    }
    variants
}

/// The text with every embedded dimension replaced by a space
pub fn strip_dimensions(text: &str) -> String {
    let mut stripped = String::with_capacity(text.len());
    let mut cursor = 0;
    for found in find_all(text) {
        stripped.push_str(&text[cursor..found.span.start]);
        stripped.push(' ');
        cursor = found.span.end;
    }
    stripped.push_str(&text[cursor..]);
    stripped
}

/// Words left once every embedded dimension is removed
///
/// Trailing size fragments such as the "x6" of "2x4x6" belong to the
/// matched dimension and are dropped.
pub fn remaining_terms(text: &str) -> Vec<String> {
    strip_dimensions(text)
        .split_whitespace()
        .filter(|word| !CONTINUATION_PATTERN.is_match(word))
        .map(str::to_string)
        .collect()
}
