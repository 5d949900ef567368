use crate::model::{Heading, OutlineEntry, OutlineMetadata, OutputDocument, Position};
use std::collections::BTreeSet;

/// Build the output document from the title and the filtered, ordered headings.
pub fn assemble(title: impl Into<String>, headings: &[Heading]) -> OutputDocument {
    let outline = headings
        .iter()
        .map(|h| OutlineEntry {
            level: h.level,
            text: h.span.text.clone(),
            page: h.span.page,
            position: Position {
                x: h.span.x,
                y: h.span.y,
            },
        })
        .collect();

    OutputDocument {
        title: title.into(),
        outline,
        metadata: metadata(headings),
    }
}

pub fn metadata(headings: &[Heading]) -> OutlineMetadata {
    let keys: BTreeSet<i64> = headings.iter().map(|h| h.span.size_key()).collect();
    OutlineMetadata {
        total_headings: headings.len(),
        pages_processed: headings.iter().map(|h| h.span.page).max().unwrap_or(0),
        font_sizes_detected: keys.into_iter().rev().map(|k| k as f32 / 10.0).collect(),
    }
}
