pub mod pdftohtml;

use crate::error::OutlineError;
use crate::model::Span;

/// Runs shorter than this many characters are layout noise.
pub const MIN_SPAN_CHARS: usize = 3;

/// Trait for layout extraction backends.
pub trait SpanSource: Send + Sync {
    /// Extract text spans from PDF bytes, in document order.
    fn extract_spans(&self, pdf_bytes: &[u8]) -> Result<Vec<Span>, OutlineError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Normalize raw runs from any backend: trim text, drop short runs, bare
/// page numbers and runs with no usable size.
pub fn clean_spans(raw: Vec<Span>) -> Vec<Span> {
    raw.into_iter()
        .filter_map(|mut span| {
            let trimmed = span.text.trim();
            if trimmed.chars().count() < MIN_SPAN_CHARS || is_all_digits(trimmed) {
                return None;
            }
            if span.size.is_nan() || span.size <= 0.0 || span.page == 0 {
                return None;
            }
            if trimmed.len() != span.text.len() {
                span.text = trimmed.to_string();
            }
            span.x = span.x.max(0.0);
            span.y = span.y.max(0.0);
            Some(span)
        })
        .collect()
}

/// Whether a font family name marks a bold face (e.g. "Helvetica-Bold", "Arial Black").
pub fn is_bold_font_name(font: &str) -> bool {
    let lower = font.to_lowercase();
    ["bold", "black", "heavy"]
        .iter()
        .any(|marker| lower.contains(marker))
}

/// Non-empty and made only of ASCII digits. Vulgar fractions and Roman
/// numeral characters do not count.
pub fn is_all_digits(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(text: &str, size: f32) -> Span {
        Span {
            text: text.to_string(),
            size,
            font: "Times".into(),
            bold: false,
            page: 1,
            x: 10.0,
            y: 20.0,
        }
    }

    #[test]
    fn test_clean_spans_drops_noise() {
        let spans = clean_spans(vec![
            raw("  Introduction  ", 14.0),
            raw("ab", 12.0),
            raw("  12 ", 10.0),
            raw("12345", 10.0),
            raw("Zero size", 0.0),
        ]);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Introduction");
    }

    #[test]
    fn test_all_digits_is_ascii_only() {
        assert!(is_all_digits("2024"));
        assert!(!is_all_digits(""));
        assert!(!is_all_digits("1.5"));
        assert!(!is_all_digits("½"));
        assert!(!is_all_digits("Ⅻ"));
    }

    #[test]
    fn test_bold_font_names() {
        assert!(is_bold_font_name("Helvetica-Bold"));
        assert!(is_bold_font_name("ABCDEE+Arial Black"));
        assert!(is_bold_font_name("Roboto-HEAVY"));
        assert!(!is_bold_font_name("Times-Roman"));
    }
}
