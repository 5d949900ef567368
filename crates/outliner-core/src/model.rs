use serde::{Deserialize, Serialize};
use std::fmt;

/// One visually distinct run of text on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Trimmed text content.
    pub text: String,
    /// Font size in points, rounded to one decimal.
    pub size: f32,
    /// Font family/style identifier.
    #[serde(default)]
    pub font: String,
    #[serde(default)]
    pub bold: bool,
    /// 1-based page number.
    pub page: u32,
    /// Left edge of the bounding box.
    pub x: f32,
    /// Top edge of the bounding box (grows downward).
    pub y: f32,
}

impl Span {
    /// Size in tenths of a point, used wherever sizes are compared for equality.
    pub fn size_key(&self) -> i64 {
        size_key(self.size)
    }

    /// Number of characters (not bytes) in the text.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Round a raw font size to the fixed one-decimal precision used for grouping.
pub fn round_size(size: f32) -> f32 {
    (size * 10.0).round() / 10.0
}

pub fn size_key(size: f32) -> i64 {
    (size * 10.0).round() as i64
}

/// Heading level rank: 1 is `H1`, the most prominent tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Level(u8);

impl Level {
    pub fn new(rank: u8) -> Option<Level> {
        (rank >= 1).then_some(Level(rank))
    }

    /// Level for a 0-based position in a size-ranked list.
    pub fn from_index(index: usize) -> Level {
        Level(u8::try_from(index + 1).unwrap_or(u8::MAX))
    }

    pub fn rank(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.0)
    }
}

impl From<Level> for String {
    fn from(level: Level) -> String {
        level.to_string()
    }
}

impl TryFrom<String> for Level {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.strip_prefix('H')
            .and_then(|n| n.parse::<u8>().ok())
            .and_then(Level::new)
            .ok_or_else(|| format!("invalid heading level '{s}' (expected H1, H2, ...)"))
    }
}

/// A span with its assigned heading level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    #[serde(flatten)]
    pub span: Span,
    pub level: Level,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub level: Level,
    pub text: String,
    pub page: u32,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineMetadata {
    pub total_headings: usize,
    /// Highest page number among the headings (0 if none).
    pub pages_processed: u32,
    /// Distinct heading font sizes, largest first.
    pub font_sizes_detected: Vec<f32>,
}

/// Final per-document result, written once as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDocument {
    pub title: String,
    pub outline: Vec<OutlineEntry>,
    pub metadata: OutlineMetadata,
}
