//! Width estimates and word wrapping for the built-in Helvetica faces, which come without glyph
//! metrics.

const PT_TO_MM: f32 = 25.4 / 72.0;

/// Average advance of a Helvetica glyph, as a fraction of the font size.
const REGULAR_ADVANCE: f32 = 0.52;
const BOLD_ADVANCE: f32 = 0.57;

/// Leading between baselines, as a multiple of the font size.
pub(super) const LEADING: f32 = 1.2;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(super) enum Weight {
    Regular,
    Bold,
}

impl Weight {
    fn advance(self) -> f32 {
        match self {
            Weight::Regular => REGULAR_ADVANCE,
            Weight::Bold => BOLD_ADVANCE,
        }
    }
}

pub(super) fn pt_to_mm(pt: f32) -> f32 {
    pt * PT_TO_MM
}

/// Estimated printed width of `text`.
pub(super) fn width_mm(text: &str, size_pt: f32, weight: Weight) -> f32 {
    text.chars().count() as f32 * pt_to_mm(size_pt) * weight.advance()
}

/// Greedy word wrap so that no line is estimated wider than `max_mm`. A single word that does not
/// fit is put on its own line rather than broken.
pub(super) fn wrap(text: &str, size_pt: f32, weight: Weight, max_mm: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }
        let candidate = format!("{line} {word}");
        if width_mm(&candidate, size_pt, weight) <= max_mm {
            line = candidate;
        } else {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
