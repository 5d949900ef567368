//! Title selection.
//!
//! Every eligible candidate is scored by adding small integer bonuses from
//! independent bands (page, relative size, boldness, horizontal position,
//! length, vertical position); the highest total wins and the first one
//! seen wins ties.

use crate::extraction::is_all_digits;
use crate::model::Span;
use serde::Serialize;

/// Returned when no candidate is eligible.
pub const UNTITLED: &str = "Untitled";

/// Eligible candidates have between these many characters (inclusive).
pub const MIN_TITLE_CHARS: usize = 4;
pub const MAX_TITLE_CHARS: usize = 100;
/// Candidates beyond this page are never titles.
pub const MAX_TITLE_PAGE: u32 = 2;

pub const FIRST_PAGE_BONUS: u32 = 3;
pub const SECOND_PAGE_BONUS: u32 = 1;

/// (ratio strictly above, bonus) for candidate size over mean size, largest first.
pub const SIZE_RATIO_BANDS: [(f32, u32); 3] = [(1.5, 3), (1.2, 2), (1.0, 1)];

pub const BOLD_BONUS: u32 = 2;

/// Left edge inside this range (inclusive) looks centered or indented.
pub const CENTER_X_RANGE: (f32, f32) = (100.0, 400.0);
pub const CENTER_X_BONUS: u32 = 2;
/// Left edge before the center range.
pub const LEFT_X_BONUS: u32 = 1;

/// Character ranges (inclusive) with their bonus, preferred range first.
pub const LENGTH_BANDS: [((usize, usize), u32); 2] = [((10, 50), 2), ((5, 80), 1)];

/// Top edge strictly above this is near the top of the page.
pub const TOP_Y_LIMIT: f32 = 200.0;
pub const TOP_BONUS: u32 = 1;

/// Per-band contributions for one candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TitleScore {
    pub page: u32,
    pub size: u32,
    pub bold: u32,
    pub position: u32,
    pub length: u32,
    pub top: u32,
}

impl TitleScore {
    pub fn total(&self) -> u32 {
        self.page + self.size + self.bold + self.position + self.length + self.top
    }
}

/// The winning candidate with its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleChoice {
    pub text: String,
    pub page: u32,
    pub score: TitleScore,
    pub total: u32,
}

/// Whether a span may be considered as a title at all.
pub fn is_eligible(span: &Span) -> bool {
    let len = span.char_len();
    (MIN_TITLE_CHARS..=MAX_TITLE_CHARS).contains(&len)
        && span.page <= MAX_TITLE_PAGE
        && !is_all_uppercase(&span.text)
        && !is_all_digits(&span.text)
}

pub fn page_score(page: u32) -> u32 {
    match page {
        1 => FIRST_PAGE_BONUS,
        2 => SECOND_PAGE_BONUS,
        _ => 0,
    }
}

pub fn size_score(ratio: f32) -> u32 {
    SIZE_RATIO_BANDS
        .iter()
        .find(|(above, _)| ratio > *above)
        .map_or(0, |(_, bonus)| *bonus)
}

pub fn bold_score(bold: bool) -> u32 {
    if bold {
        BOLD_BONUS
    } else {
        0
    }
}

pub fn position_score(x: f32) -> u32 {
    let (lo, hi) = CENTER_X_RANGE;
    if (lo..=hi).contains(&x) {
        CENTER_X_BONUS
    } else if x < lo {
        LEFT_X_BONUS
    } else {
        0
    }
}

pub fn length_score(chars: usize) -> u32 {
    LENGTH_BANDS
        .iter()
        .find(|((lo, hi), _)| (*lo..=*hi).contains(&chars))
        .map_or(0, |(_, bonus)| *bonus)
}

pub fn top_score(y: f32) -> u32 {
    if y < TOP_Y_LIMIT {
        TOP_BONUS
    } else {
        0
    }
}

/// Score one candidate against the mean font size of the whole input.
pub fn score_candidate(span: &Span, mean_size: f32) -> TitleScore {
    let ratio = if mean_size > 0.0 {
        span.size / mean_size
    } else {
        0.0
    };
    TitleScore {
        page: page_score(span.page),
        size: size_score(ratio),
        bold: bold_score(span.bold),
        position: position_score(span.x),
        length: length_score(span.char_len()),
        top: top_score(span.y),
    }
}

/// Pick the best title among `spans`, with its score breakdown.
///
/// The size ratio is measured against the mean size of all `spans`, not
/// only the eligible ones.
pub fn choose_title<'a, I>(spans: I) -> Option<TitleChoice>
where
    I: IntoIterator<Item = &'a Span>,
    I::IntoIter: Clone,
{
    let spans = spans.into_iter();
    let (sum, count) = spans
        .clone()
        .fold((0.0f64, 0usize), |(s, n), span| (s + f64::from(span.size), n + 1));
    if count == 0 {
        return None;
    }
    let mean_size = (sum / count as f64) as f32;

    let mut best: Option<TitleChoice> = None;
    for span in spans.filter(|s| is_eligible(s)) {
        let score = score_candidate(span, mean_size);
        let total = score.total();
        if best.as_ref().map_or(true, |b| total > b.total) {
            best = Some(TitleChoice {
                text: span.text.clone(),
                page: span.page,
                score,
                total,
            });
        }
    }
    best
}

/// Title text, or [`UNTITLED`] when nothing qualifies.
pub fn score_title<'a, I>(spans: I) -> String
where
    I: IntoIterator<Item = &'a Span>,
    I::IntoIter: Clone,
{
    choose_title(spans)
        .map(|c| c.text)
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// At least one cased character and no lowercase ones.
fn is_all_uppercase(text: &str) -> bool {
    let mut has_cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}
