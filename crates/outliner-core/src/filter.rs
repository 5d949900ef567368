use crate::config::FilterConfig;
use crate::model::Heading;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Drop degenerate headings, sort into reading order and remove repeats.
///
/// 1. Drop texts of `min_chars` characters or fewer, or more than `max_words` words
/// 2. Sort by (page, y, x)
/// 3. Keep the first heading per (lowercased trimmed text, page)
pub fn filter_headings(headings: Vec<Heading>, config: &FilterConfig) -> Vec<Heading> {
    let mut kept: Vec<Heading> = headings
        .into_iter()
        .filter(|h| h.span.char_len() > config.min_chars && h.span.word_count() <= config.max_words)
        .collect();

    kept.sort_by(reading_order);

    let mut seen = HashSet::new();
    kept.retain(|h| seen.insert((h.span.text.trim().to_lowercase(), h.span.page)));
    kept
}

/// Top-to-bottom, left-to-right within a page; pages ascending.
pub fn reading_order(a: &Heading, b: &Heading) -> Ordering {
    a.span
        .page
        .cmp(&b.span.page)
        .then(a.span.y.total_cmp(&b.span.y))
        .then(a.span.x.total_cmp(&b.span.x))
}
