use outliner_core::extraction::clean_spans;
use outliner_core::extraction::pdftohtml::PdftohtmlSource;
use outliner_core::model::Span;
use outliner_core::Analysis;
use std::path::{Path, PathBuf};

use crate::output;
use crate::Settings;

pub fn run(
    input_file: &Path,
    output_format: &str,
    output_file: Option<PathBuf>,
    explain: bool,
    settings: &Settings,
) -> Result<(), outliner_core::error::OutlineError> {
    let config = super::resolve_config(settings)?;

    // Determine input type by extension
    let is_json = input_file
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let mut embedder = super::open_embedder(&config)?;
    let analysis: Result<Analysis, _> = if is_json {
        // Spans previously dumped with `outliner spans`
        let json_bytes = std::fs::read(input_file)?;
        let spans: Vec<Span> = serde_json::from_slice(&json_bytes)?;
        outliner_core::analyze_spans(&clean_spans(spans), embedder.as_ref(), &config)
    } else {
        let pdf_bytes = std::fs::read(input_file)?;
        let source = PdftohtmlSource::new();
        outliner_core::analyze_pdf(&pdf_bytes, &source, embedder.as_ref(), &config)
    };
    embedder.shutdown();
    let analysis = analysis?;

    match output_file {
        Some(path) => {
            // Always write JSON when saving to file
            output::json::write_document(&analysis.document, &path)?;
            eprintln!(
                "Found {} heading(s), title '{}', written to {}",
                analysis.document.metadata.total_headings,
                analysis.document.title,
                path.display()
            );
        }
        None => match output_format {
            "json" => output::json::print(&analysis.document)?,
            _ => output::table::print(&analysis, explain),
        },
    }

    Ok(())
}
