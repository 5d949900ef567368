use outliner_core::model::OutputDocument;
use outliner_core::title::TitleChoice;
use outliner_core::Analysis;

pub fn print(analysis: &Analysis, explain: bool) {
    print!("{}", format_outline(&analysis.document));
    if explain {
        print!("{}", format_explain(analysis.title.as_ref()));
    }
}

/// Human-readable outline: headings indented by level, then a summary line.
pub fn format_outline(doc: &OutputDocument) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {} ===\n\n", doc.title));

    let page_width = doc
        .outline
        .iter()
        .map(|e| e.page.to_string().len())
        .max()
        .unwrap_or(1);

    for entry in &doc.outline {
        let indent = "  ".repeat(usize::from(entry.level.rank().saturating_sub(1)));
        out.push_str(&format!(
            "  p{:<width$}  {}{} {}\n",
            entry.page,
            indent,
            entry.level,
            entry.text,
            width = page_width
        ));
    }

    let sizes: Vec<String> = doc
        .metadata
        .font_sizes_detected
        .iter()
        .map(|s| format!("{s}"))
        .collect();
    out.push_str(&format!(
        "\n  {} heading(s) over {} page(s); font sizes: {}\n",
        doc.metadata.total_headings,
        doc.metadata.pages_processed,
        if sizes.is_empty() {
            "-".to_string()
        } else {
            sizes.join(", ")
        }
    ));
    out
}

/// Per-band breakdown of the winning title score.
pub fn format_explain(choice: Option<&TitleChoice>) -> String {
    let Some(choice) = choice else {
        return "\n  Title: no eligible candidate, using \"Untitled\"\n".to_string();
    };
    let s = &choice.score;
    let mut out = format!(
        "\n  Title: '{}' (page {}) scored {}\n",
        choice.text, choice.page, choice.total
    );
    for (band, points) in [
        ("page", s.page),
        ("size", s.size),
        ("bold", s.bold),
        ("position", s.position),
        ("length", s.length),
        ("top", s.top),
    ] {
        out.push_str(&format!("    {band:<8}  +{points}\n"));
    }
    out
}
