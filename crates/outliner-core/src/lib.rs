pub mod assemble;
pub mod classify;
pub mod config;
pub mod embedding;
pub mod error;
pub mod extraction;
pub mod filter;
pub mod model;
pub mod title;

use config::OutlineConfig;
use embedding::Embedder;
use error::OutlineError;
use extraction::SpanSource;
use model::{OutputDocument, Span};
use title::TitleChoice;

/// Outline of one document plus the title score that picked its title.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub document: OutputDocument,
    /// `None` when no heading was eligible and the title is "Untitled".
    pub title: Option<TitleChoice>,
}

/// Main API entry point: extract spans from a PDF and build its outline.
pub fn analyze_pdf(
    pdf_bytes: &[u8],
    source: &dyn SpanSource,
    embedder: &dyn Embedder,
    config: &OutlineConfig,
) -> Result<Analysis, OutlineError> {
    let spans = source.extract_spans(pdf_bytes)?;
    tracing::debug!(backend = source.backend_name(), spans = spans.len(), "extracted spans");
    analyze_spans(&spans, embedder, config)
}

pub fn outline_pdf(
    pdf_bytes: &[u8],
    source: &dyn SpanSource,
    embedder: &dyn Embedder,
    config: &OutlineConfig,
) -> Result<OutputDocument, OutlineError> {
    analyze_pdf(pdf_bytes, source, embedder, config).map(|a| a.document)
}

/// Run the classification pipeline on already-extracted spans.
///
/// Fails with [`OutlineError::NoContent`] when there are no spans or when
/// nothing survives filtering; either way no document should be written.
pub fn analyze_spans(
    spans: &[Span],
    embedder: &dyn Embedder,
    config: &OutlineConfig,
) -> Result<Analysis, OutlineError> {
    if spans.is_empty() {
        return Err(OutlineError::no_content("no valid spans found"));
    }

    let headings = classify::assign_levels(spans, embedder, config);
    let headings = filter::filter_headings(headings, &config.filter);
    if headings.is_empty() {
        return Err(OutlineError::no_content("no valid headings after filtering"));
    }

    let choice = title::choose_title(headings.iter().map(|h| &h.span));
    let title_text = choice
        .as_ref()
        .map_or_else(|| title::UNTITLED.to_string(), |c| c.text.clone());
    let document = assemble::assemble(title_text, &headings);

    tracing::info!(
        strategy = %config.strategy,
        headings = document.metadata.total_headings,
        pages = document.metadata.pages_processed,
        title = %document.title,
        "built outline"
    );

    Ok(Analysis {
        document,
        title: choice,
    })
}

pub fn outline_spans(
    spans: &[Span],
    embedder: &dyn Embedder,
    config: &OutlineConfig,
) -> Result<OutputDocument, OutlineError> {
    analyze_spans(spans, embedder, config).map(|a| a.document)
}
