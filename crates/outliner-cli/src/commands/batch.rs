use outliner_core::config::OutlineConfig;
use outliner_core::embedding::Embedder;
use outliner_core::error::OutlineError;
use outliner_core::extraction::pdftohtml::PdftohtmlSource;
use outliner_core::extraction::SpanSource;
use outliner_core::outline_pdf;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::output;
use crate::Settings;

/// What happened to one input document.
#[derive(Debug)]
enum Outcome {
    Written {
        output: PathBuf,
        headings: usize,
        title: String,
    },
    Skipped(String),
    Failed(OutlineError),
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub fn run(
    input_dir: &Path,
    output_dir: &Path,
    jobs: usize,
    settings: &Settings,
) -> Result<(), OutlineError> {
    let config = super::resolve_config(settings)?;
    let pdfs = find_pdfs(input_dir)?;
    if pdfs.is_empty() {
        eprintln!("No PDF files found in {}", input_dir.display());
        return Ok(());
    }

    let source = PdftohtmlSource::new();
    require_extractor(&source)?;

    let mut embedder = super::open_embedder(&config)?;
    let summary = run_batch(&pdfs, output_dir, jobs, &source, embedder.as_ref(), &config);
    embedder.shutdown();
    let summary = summary?;

    eprintln!(
        "Processed {} document(s), skipped {}, failed {}",
        summary.processed, summary.skipped, summary.failed
    );
    Ok(())
}

/// Fail once up front instead of once per document when pdftohtml is missing.
pub fn require_extractor(source: &PdftohtmlSource) -> Result<(), OutlineError> {
    if source.is_available() {
        Ok(())
    } else {
        tracing::error!(program = %source.program().display(), "pdftohtml is not installed");
        Err(OutlineError::PdftohtmlNotFound)
    }
}

/// All `*.pdf` files directly inside `dir` (extension case-insensitive), sorted by name.
pub fn find_pdfs(dir: &Path) -> Result<Vec<PathBuf>, OutlineError> {
    let entries = std::fs::read_dir(dir).map_err(|e| OutlineError::SourceUnavailable {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut pdfs = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if is_pdf && path.is_file() {
            pdfs.push(path);
        }
    }
    pdfs.sort();
    Ok(pdfs)
}

/// Outline each document independently. Only failing to create the output
/// directory aborts the batch; per-document errors are counted.
pub fn run_batch(
    pdfs: &[PathBuf],
    output_dir: &Path,
    jobs: usize,
    source: &dyn SpanSource,
    embedder: &dyn Embedder,
    config: &OutlineConfig,
) -> Result<BatchSummary, OutlineError> {
    std::fs::create_dir_all(output_dir).map_err(|e| OutlineError::Persist {
        path: output_dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .build()
        .map_err(|e| OutlineError::ConfigInvalid(format!("cannot start {jobs} worker(s): {e}")))?;

    let outcomes: Vec<Outcome> = pool.install(|| {
        pdfs.par_iter()
            .map(|pdf| process_document(pdf, output_dir, source, embedder, config))
            .collect()
    });

    let mut summary = BatchSummary::default();
    for (pdf, outcome) in pdfs.iter().zip(outcomes) {
        let name = file_name(pdf);
        match outcome {
            Outcome::Written {
                output,
                headings,
                title,
            } => {
                summary.processed += 1;
                println!("Processed: {name} -> {}", file_name(&output));
                println!("  {headings} heading(s), title: '{title}'");
            }
            Outcome::Skipped(reason) => {
                summary.skipped += 1;
                println!("Skipping {name}: {reason}");
            }
            Outcome::Failed(e) => {
                summary.failed += 1;
                eprintln!("Failed {name}: {e}");
            }
        }
    }
    Ok(summary)
}

fn process_document(
    pdf: &Path,
    output_dir: &Path,
    source: &dyn SpanSource,
    embedder: &dyn Embedder,
    config: &OutlineConfig,
) -> Outcome {
    let _span = tracing::info_span!("document", file = %file_name(pdf)).entered();
    let output = output_path(pdf, output_dir);

    let result = std::fs::read(pdf)
        .map_err(|e| OutlineError::SourceUnavailable {
            path: pdf.to_path_buf(),
            reason: e.to_string(),
        })
        .and_then(|bytes| outline_pdf(&bytes, source, embedder, config))
        .and_then(|doc| {
            output::json::write_document(&doc, &output)?;
            Ok(doc)
        });

    match result {
        Ok(doc) => Outcome::Written {
            output,
            headings: doc.metadata.total_headings,
            title: doc.title,
        },
        Err(OutlineError::NoContent { reason }) => {
            tracing::warn!(%reason, "skipping document");
            Outcome::Skipped(reason)
        }
        Err(e) => {
            tracing::warn!(error = %e, "document failed");
            Outcome::Failed(e)
        }
    }
}

fn output_path(pdf: &Path, output_dir: &Path) -> PathBuf {
    let stem = pdf
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    output_dir.join(format!("{stem}.json"))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
