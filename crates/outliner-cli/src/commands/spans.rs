use outliner_core::extraction::pdftohtml::PdftohtmlSource;
use outliner_core::extraction::SpanSource;
use std::path::{Path, PathBuf};

pub fn run(
    pdf_file: &Path,
    output_file: Option<PathBuf>,
) -> Result<(), outliner_core::error::OutlineError> {
    let pdf_bytes = std::fs::read(pdf_file)?;
    let source = PdftohtmlSource::new();
    let spans = source.extract_spans(&pdf_bytes)?;
    let json = serde_json::to_string_pretty(&spans)?;

    match output_file {
        Some(path) => {
            std::fs::write(&path, json).map_err(|e| outliner_core::error::OutlineError::Persist {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            let pages = spans.iter().map(|s| s.page).max().unwrap_or(0);
            eprintln!(
                "Extracted {} span(s) from {} page(s), written to {}",
                spans.len(),
                pages,
                path.display()
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}
