//! Integration tests for the outline pipeline end to end.
//!
//! Uses a MockSource that returns pre-built spans without invoking
//! pdftohtml, so these tests run without poppler-utils.

use outliner_core::classify::assign_heading_levels;
use outliner_core::config::{parse_config_str, ClusteringConfig, OutlineConfig, Strategy};
use outliner_core::embedding::hashing::HashingEmbedder;
use outliner_core::embedding::Embedder;
use outliner_core::error::OutlineError;
use outliner_core::extraction::pdftohtml::parse_layout_xml;
use outliner_core::extraction::{clean_spans, SpanSource};
use outliner_core::model::{OutputDocument, Span};
use outliner_core::{analyze_pdf, outline_pdf, outline_spans};
use std::collections::BTreeMap;

struct MockSource {
    spans: Vec<Span>,
}

impl SpanSource for MockSource {
    fn extract_spans(&self, _pdf_bytes: &[u8]) -> Result<Vec<Span>, OutlineError> {
        Ok(self.spans.clone())
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

/// Embedder whose model is permanently unavailable.
struct BrokenEmbedder;

impl Embedder for BrokenEmbedder {
    fn initialize(&mut self) -> Result<(), OutlineError> {
        Ok(())
    }

    fn dimension(&self) -> usize {
        16
    }

    fn try_embed(&self, _text: &str) -> Result<Vec<f32>, OutlineError> {
        Err(OutlineError::EmbeddingDegraded("model unavailable".into()))
    }
}

fn span(text: &str, size: f32, bold: bool, page: u32, x: f32, y: f32) -> Span {
    Span {
        text: text.into(),
        size,
        font: if bold { "Arial-Bold" } else { "Arial" }.into(),
        bold,
        page,
        x,
        y,
    }
}

fn embedder() -> HashingEmbedder {
    let mut e = HashingEmbedder::new(64);
    e.initialize().unwrap();
    e
}

fn report_spans() -> Vec<Span> {
    vec![
        span("Annual Report 2024", 24.0, true, 1, 150.0, 80.0),
        span("Introduction", 14.0, true, 1, 50.0, 300.0),
        span("1.1 Background", 12.0, false, 2, 60.0, 120.0),
    ]
}

/// A longer document: title, sections, subsections and body text over four pages.
fn manual_spans() -> Vec<Span> {
    let mut spans = vec![span("Operations Manual", 26.0, true, 1, 140.0, 70.0)];
    let sections = ["Installation", "Configuration", "Maintenance", "Troubleshooting"];
    for (i, section) in sections.iter().enumerate() {
        let page = i as u32 + 1;
        spans.push(span(section, 18.0, true, page, 72.0, 160.0));
        spans.push(span(&format!("{} overview", section), 13.0, true, page, 72.0, 260.0));
        spans.push(span(
            &format!("Read the {} steps carefully before you begin", section.to_lowercase()),
            10.0,
            false,
            page,
            72.0,
            300.0,
        ));
    }
    spans
}

// ---------------------------------------------------------------------------
// Report scenario: title, levels and reading order
// ---------------------------------------------------------------------------
#[test]
fn report_title_and_reading_order() {
    let source = MockSource {
        spans: report_spans(),
    };
    let analysis = analyze_pdf(&[], &source, &embedder(), &OutlineConfig::default()).unwrap();
    let doc = &analysis.document;

    assert_eq!(doc.title, "Annual Report 2024");
    let texts: Vec<&str> = doc.outline.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["Annual Report 2024", "Introduction", "1.1 Background"]);

    // Three distinct sizes, three spans: one cluster each, ranked by size
    let levels: Vec<String> = doc.outline.iter().map(|e| e.level.to_string()).collect();
    assert_eq!(levels, vec!["H1", "H2", "H3"]);

    assert_eq!(doc.metadata.total_headings, 3);
    assert_eq!(doc.metadata.pages_processed, 2);
    assert_eq!(doc.metadata.font_sizes_detected, vec![24.0, 14.0, 12.0]);

    let choice = analysis.title.unwrap();
    assert_eq!(choice.score.page, 3);
    assert_eq!(choice.score.bold, 2);
}

// ---------------------------------------------------------------------------
// Same input, same output
// ---------------------------------------------------------------------------
#[test]
fn deterministic_across_runs() {
    let spans = manual_spans();
    let config = OutlineConfig::default();
    let first = outline_spans(&spans, &embedder(), &config).unwrap();
    for _ in 0..3 {
        let again = outline_spans(&spans, &embedder(), &config).unwrap();
        assert_eq!(first, again);
    }
}

// ---------------------------------------------------------------------------
// A larger mean size never gets a deeper level
// ---------------------------------------------------------------------------
#[test]
fn levels_are_monotonic_in_mean_size() {
    let spans = manual_spans();
    let headings = assign_heading_levels(&spans, &embedder(), &ClusteringConfig::default());
    assert_eq!(headings.len(), spans.len());

    let mut by_level: BTreeMap<u8, (f64, usize)> = BTreeMap::new();
    for h in &headings {
        let entry = by_level.entry(h.level.rank()).or_insert((0.0, 0));
        entry.0 += f64::from(h.span.size);
        entry.1 += 1;
    }
    let means: Vec<f64> = by_level.values().map(|(sum, n)| sum / *n as f64).collect();
    assert!(means.windows(2).all(|w| w[0] >= w[1]), "means {means:?}");

    // Ranks are contiguous from H1
    let ranks: Vec<u8> = by_level.keys().copied().collect();
    let expected: Vec<u8> = (1..=ranks.len() as u8).collect();
    assert_eq!(ranks, expected);
}

// ---------------------------------------------------------------------------
// Final outline is in (page, y, x) order without repeats
// ---------------------------------------------------------------------------
#[test]
fn outline_is_ordered_and_deduplicated() {
    let mut spans = manual_spans();
    spans.reverse();
    // Running header repeated on every page
    for page in 1..=4 {
        spans.push(span("Operations Manual v2", 9.0, false, page, 400.0, 20.0));
        spans.push(span("operations manual v2 ", 9.0, false, page, 420.0, 30.0));
    }
    let doc = outline_spans(&spans, &embedder(), &OutlineConfig::default()).unwrap();

    let keys: Vec<(u32, f32, f32)> = doc
        .outline
        .iter()
        .map(|e| (e.page, e.position.y, e.position.x))
        .collect();
    assert!(keys.windows(2).all(|w| w[0] <= w[1]));

    for page in 1..=4 {
        let repeats = doc
            .outline
            .iter()
            .filter(|e| e.page == page && e.text.trim().eq_ignore_ascii_case("operations manual v2"))
            .count();
        assert_eq!(repeats, 1, "page {page}");
    }
    // The first copy in reading order survives
    assert!(doc
        .outline
        .iter()
        .any(|e| e.text == "Operations Manual v2" && e.position.y == 20.0));
}

// ---------------------------------------------------------------------------
// Duplicates with different positions: keep the first in sort order
// ---------------------------------------------------------------------------
#[test]
fn duplicate_heading_keeps_first_position() {
    let spans = vec![
        span("Summary of findings", 16.0, true, 1, 72.0, 400.0),
        span("Summary of Findings", 16.0, true, 1, 72.0, 150.0),
        span("Detailed results", 12.0, false, 1, 72.0, 500.0),
    ];
    let doc = outline_spans(&spans, &embedder(), &OutlineConfig::default()).unwrap();
    let summaries: Vec<_> = doc
        .outline
        .iter()
        .filter(|e| e.text.to_lowercase() == "summary of findings")
        .collect();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].position.y, 150.0);
}

// ---------------------------------------------------------------------------
// Nothing to write
// ---------------------------------------------------------------------------
#[test]
fn empty_document_is_no_content() {
    let source = MockSource { spans: vec![] };
    let err = outline_pdf(&[], &source, &embedder(), &OutlineConfig::default()).unwrap_err();
    assert!(matches!(err, OutlineError::NoContent { .. }));
    assert!(err.is_skippable());
}

#[test]
fn everything_filtered_is_no_content() {
    let spans = vec![
        span("Go", 20.0, true, 1, 100.0, 50.0),
        span("Fig", 10.0, false, 1, 100.0, 90.0),
    ];
    let err = outline_spans(&spans, &embedder(), &OutlineConfig::default()).unwrap_err();
    assert!(err.is_skippable());
    assert!(err.to_string().contains("no valid headings"));
}

// ---------------------------------------------------------------------------
// Title fallback
// ---------------------------------------------------------------------------
#[test]
fn untitled_when_headings_start_after_page_two() {
    let spans = vec![
        span("Appendix A tables", 18.0, true, 3, 150.0, 80.0),
        span("Appendix B figures", 12.0, false, 4, 150.0, 80.0),
    ];
    let analysis = outliner_core::analyze_spans(&spans, &embedder(), &OutlineConfig::default()).unwrap();
    assert_eq!(analysis.document.title, "Untitled");
    assert!(analysis.title.is_none());
    assert_eq!(analysis.document.outline.len(), 2);
}

// ---------------------------------------------------------------------------
// A failing embedder degrades instead of aborting
// ---------------------------------------------------------------------------
#[test]
fn broken_embedder_still_produces_outline() {
    let doc = outline_spans(&report_spans(), &BrokenEmbedder, &OutlineConfig::default()).unwrap();
    assert_eq!(doc.title, "Annual Report 2024");
    assert_eq!(doc.outline.len(), 3);
    assert_eq!(doc.outline[0].level.to_string(), "H1");
}

// ---------------------------------------------------------------------------
// Size-rank strategy
// ---------------------------------------------------------------------------
#[test]
fn size_rank_strategy_drops_body_text() {
    let config = parse_config_str(r#"{"strategy": "size-rank"}"#).unwrap();
    assert_eq!(config.strategy, Strategy::SizeRank);

    let doc = outline_spans(&manual_spans(), &embedder(), &config).unwrap();
    assert!(doc.outline.iter().all(|e| !e.text.starts_with("Read the")));
    assert_eq!(doc.metadata.font_sizes_detected, vec![26.0, 18.0, 13.0]);
    assert_eq!(doc.outline[0].text, "Operations Manual");
    assert_eq!(doc.outline[0].level.to_string(), "H1");
}

// ---------------------------------------------------------------------------
// JSON document round trip and field names
// ---------------------------------------------------------------------------
#[test]
fn output_document_json_shape() {
    let doc = outline_spans(&report_spans(), &embedder(), &OutlineConfig::default()).unwrap();
    let json = serde_json::to_string_pretty(&doc).unwrap();
    assert!(json.contains("\"font_sizes_detected\""));
    assert!(json.contains("\"position\""));
    assert!(json.contains("\"level\": \"H1\""));

    let back: OutputDocument = serde_json::from_str(&json).unwrap();
    assert_eq!(back, doc);
}

// ---------------------------------------------------------------------------
// pdftohtml XML through cleanup into the pipeline
// ---------------------------------------------------------------------------
#[test]
fn layout_xml_to_outline() {
    let xml = r##"<?xml version="1.0" encoding="UTF-8"?>
<pdf2xml producer="poppler" version="23.08.0">
<page number="1" position="absolute" top="0" left="0" height="842" width="595">
	<fontspec id="0" size="22" family="Helvetica-Bold" color="#000000"/>
	<fontspec id="1" size="11" family="Helvetica" color="#000000"/>
<text top="90" left="160" width="280" height="26" font="0"><b>Field Guide to Ferns</b></text>
<text top="200" left="72" width="300" height="13" font="1">Ferns are vascular plants that reproduce by spores</text>
<text top="810" left="290" width="10" height="13" font="1">1</text>
</page>
<page number="2" position="absolute" top="0" left="0" height="842" width="595">
<text top="80" left="72" width="120" height="26" font="0"><b>Identification</b></text>
<text top="130" left="72" width="300" height="13" font="1">Look at the underside of each frond</text>
<text top="810" left="290" width="10" height="13" font="1">2</text>
</page>
</pdf2xml>"##;
    let spans = clean_spans(parse_layout_xml(xml).unwrap());
    assert_eq!(spans.len(), 4);
    assert!(spans.iter().all(|s| s.text.parse::<u32>().is_err()));

    let doc = outline_spans(&spans, &embedder(), &OutlineConfig::default()).unwrap();
    assert_eq!(doc.title, "Field Guide to Ferns");
    assert_eq!(doc.metadata.pages_processed, 2);
    assert_eq!(doc.metadata.font_sizes_detected, vec![22.0, 11.0]);
    let texts: Vec<&str> = doc.outline.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "Field Guide to Ferns",
            "Ferns are vascular plants that reproduce by spores",
            "Identification",
            "Look at the underside of each frond",
        ]
    );
}
