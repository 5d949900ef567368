use outliner_core::error::OutlineError;
use outliner_core::model::OutputDocument;
use std::path::Path;

pub fn print(doc: &OutputDocument) -> Result<(), OutlineError> {
    let json = serde_json::to_string_pretty(doc)?;
    println!("{json}");
    Ok(())
}

/// Write the document as pretty UTF-8 JSON, replacing any existing file.
pub fn write_document(doc: &OutputDocument, path: &Path) -> Result<(), OutlineError> {
    let json = serde_json::to_string_pretty(doc)?;
    std::fs::write(path, json).map_err(|e| OutlineError::Persist {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
