use crate::error::OutlineError;
use crate::extraction::{clean_spans, is_bold_font_name, SpanSource};
use crate::model::{round_size, Span};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Default executable, looked up on `PATH`.
pub const PDFTOHTML: &str = "pdftohtml";

/// Layout extraction backend using pdftohtml (from poppler-utils).
///
/// Uses `pdftohtml -xml` at zoom 1 so positions and font sizes are in PDF
/// points. Each `<text>` element becomes one span.
#[derive(Debug, Clone)]
pub struct PdftohtmlSource {
    program: PathBuf,
}

impl PdftohtmlSource {
    pub fn new() -> Self {
        Self::with_program(PDFTOHTML)
    }

    /// Use a specific pdftohtml executable instead of the one on `PATH`.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Whether the executable can be started at all. Any exit status counts,
    /// since `pdftohtml -v` exits non-zero on some poppler versions.
    pub fn is_available(&self) -> bool {
        match Command::new(&self.program).arg("-v").output() {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(program = %self.program.display(), error = %e, "pdftohtml probe failed");
                false
            }
        }
    }
}

impl Default for PdftohtmlSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SpanSource for PdftohtmlSource {
    fn extract_spans(&self, pdf_bytes: &[u8]) -> Result<Vec<Span>, OutlineError> {
        let mut tmpfile = tempfile::NamedTempFile::new()?;
        tmpfile.write_all(pdf_bytes)?;
        tmpfile.flush()?;

        let output = Command::new(&self.program)
            .args(["-xml", "-i", "-q", "-stdout", "-fontfullname", "-zoom", "1"])
            .arg(tmpfile.path())
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    OutlineError::PdftohtmlNotFound
                } else {
                    OutlineError::LayoutParse(format!("pdftohtml failed: {}", e))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(OutlineError::PdftohtmlFailed { code, stderr });
        }

        let xml = String::from_utf8_lossy(&output.stdout);
        let spans = parse_layout_xml(&xml)?;
        tracing::debug!(spans = spans.len(), "parsed pdftohtml layout");
        Ok(clean_spans(spans))
    }

    fn backend_name(&self) -> &str {
        "pdftohtml"
    }
}

#[derive(Debug, Clone)]
struct FontSpec {
    size: f32,
    family: String,
}

/// A `<text>` element being accumulated.
#[derive(Debug)]
struct OpenRun {
    page: u32,
    x: f32,
    y: f32,
    font_id: Option<String>,
    text: String,
    bold: bool,
}

/// Parse pdftohtml's `-xml` output into raw (uncleaned) spans.
pub fn parse_layout_xml(xml: &str) -> Result<Vec<Span>, OutlineError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().check_end_names = false;

    let mut fonts: HashMap<String, FontSpec> = HashMap::new();
    let mut current_page: u32 = 0;
    let mut open: Option<OpenRun> = None;
    let mut bold_depth = 0usize;
    let mut out = Vec::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            OutlineError::LayoutParse(format!("at byte {}: {}", reader.error_position(), e))
        })?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                match e.name().as_ref() {
                    b"page" => {
                        if let Some(n) = attr(e, "number").and_then(|v| v.parse().ok()) {
                            current_page = n;
                        }
                    }
                    b"fontspec" => {
                        if let (Some(id), Some(size)) =
                            (attr(e, "id"), attr(e, "size").and_then(|v| v.parse().ok()))
                        {
                            let family = attr(e, "family").unwrap_or_default();
                            fonts.insert(id, FontSpec { size, family });
                        }
                    }
                    b"text" if !is_empty => {
                        bold_depth = 0;
                        open = Some(OpenRun {
                            page: current_page,
                            x: attr_f32(e, "left").unwrap_or(0.0),
                            y: attr_f32(e, "top").unwrap_or(0.0),
                            font_id: attr(e, "font"),
                            text: String::new(),
                            bold: false,
                        });
                    }
                    b"b" if !is_empty => bold_depth += 1,
                    _ => {}
                }
            }
            Event::Text(ref t) => {
                if let Some(run) = open.as_mut() {
                    let text = match t.unescape() {
                        Ok(s) => s.into_owned(),
                        Err(_) => String::from_utf8_lossy(t).into_owned(),
                    };
                    if bold_depth > 0 && !text.trim().is_empty() {
                        run.bold = true;
                    }
                    run.text.push_str(&text);
                }
            }
            Event::End(ref e) => match e.name().as_ref() {
                b"b" => bold_depth = bold_depth.saturating_sub(1),
                b"text" => {
                    if let Some(run) = open.take() {
                        if let Some(span) = finish_run(run, &fonts) {
                            out.push(span);
                        }
                    }
                    bold_depth = 0;
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out)
}

fn finish_run(run: OpenRun, fonts: &HashMap<String, FontSpec>) -> Option<Span> {
    let font = run.font_id.as_ref().and_then(|id| fonts.get(id))?;
    let bold = run.bold || is_bold_font_name(&font.family);
    let text = normalize_ws(&run.text);
    if text.is_empty() {
        return None;
    }
    Some(Span {
        text,
        size: round_size(font.size),
        font: font.family.clone(),
        bold,
        page: run.page,
        x: run.x,
        y: run.y,
    })
}

fn attr(e: &BytesStart<'_>, name: &str) -> Option<String> {
    e.try_get_attribute(name)
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn attr_f32(e: &BytesStart<'_>, name: &str) -> Option<f32> {
    attr(e, name)?.parse().ok()
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
