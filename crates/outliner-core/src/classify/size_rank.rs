use crate::model::{Heading, Level, Span};
use std::collections::HashMap;

/// How many of the largest sizes become heading tiers.
pub const RANKED_SIZES: usize = 3;
/// A span belongs to a tier when its size is within this many points of it.
pub const SIZE_TOLERANCE: f32 = 0.5;

/// Label spans by font size alone: the largest distinct size is H1, the
/// next H2, then H3. Spans matching none of the three are not headings.
pub fn assign_by_size_rank(spans: &[Span]) -> Vec<Heading> {
    let tiers = ranked_sizes(spans);
    spans
        .iter()
        .filter_map(|span| {
            tiers
                .iter()
                .position(|&size| (span.size - size).abs() < SIZE_TOLERANCE)
                .map(|index| Heading {
                    span: span.clone(),
                    level: Level::from_index(index),
                })
        })
        .collect()
}

/// Distinct sizes ordered largest first (more frequent first on equal size),
/// truncated to [`RANKED_SIZES`].
fn ranked_sizes(spans: &[Span]) -> Vec<f32> {
    let mut counts: HashMap<i64, (f32, usize)> = HashMap::new();
    for span in spans {
        counts.entry(span.size_key()).or_insert((span.size, 0)).1 += 1;
    }
    let mut sizes: Vec<(i64, f32, usize)> = counts
        .into_iter()
        .map(|(key, (size, count))| (key, size, count))
        .collect();
    sizes.sort_by(|a, b| b.0.cmp(&a.0).then(b.2.cmp(&a.2)));
    sizes
        .into_iter()
        .take(RANKED_SIZES)
        .map(|(_, size, _)| size)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, size: f32) -> Span {
        Span {
            text: text.into(),
            size,
            font: "Times".into(),
            bold: false,
            page: 1,
            x: 0.0,
            y: 0.0,
        }
    }

    #[test]
    fn test_top_three_sizes_become_levels() {
        let spans = vec![
            span("Title text", 24.0),
            span("Section one", 16.0),
            span("Subsection", 13.0),
            span("Body paragraph", 11.0),
            span("Another section", 16.2),
        ];
        let headings = assign_by_size_rank(&spans);
        let levels: Vec<(&str, String)> = headings
            .iter()
            .map(|h| (h.span.text.as_str(), h.level.to_string()))
            .collect();
        // 16.2 and 16.0 take the second and third tiers, pushing 13 pt out;
        // 16.0 is within tolerance of 16.2 so it matches H2 first
        assert_eq!(
            levels,
            vec![
                ("Title text", "H1".to_string()),
                ("Section one", "H2".to_string()),
                ("Another section", "H2".to_string()),
            ]
        );
    }

    #[test]
    fn test_drops_sizes_out_of_ranking() {
        let spans = vec![
            span("A heading", 20.0),
            span("Body text", 10.0),
            span("Footnote", 8.0),
            span("Tiny", 6.0),
        ];
        let headings = assign_by_size_rank(&spans);
        assert_eq!(headings.len(), 3);
        assert_eq!(headings[2].span.text, "Footnote");
        assert_eq!(headings[2].level.to_string(), "H3");
    }

    #[test]
    fn test_empty() {
        assert!(assign_by_size_rank(&[]).is_empty());
    }
}
