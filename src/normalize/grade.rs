use once_cell::sync::Lazy;
use regex::Regex;

static BARE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b([0-9]+)\b").expect("valid regex"));
static ORDINAL_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+[ªº°]").expect("valid regex"));
static ANO_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s*anos?\s*").expect("valid regex"));

/// Rewrites a grade label to the canonical suffix convention:
/// - `EJAI` labels get an ordinal mark on their number and an `ETAPA` suffix (`EJAI 2` becomes
///   `EJAI 2ª ETAPA`) unless they already say `ETAPA`.
/// - Other `EJA` labels are left alone.
/// - Regular grades get an `ANO` suffix unless they already say `ANO` (`5` becomes `5 ANO`).
///
/// Keyword checks ignore case; the label itself is only trimmed, never re-cased.
pub fn normalize_grade(raw: &str) -> String {
    let label = raw.trim();
    if label.is_empty() {
        return String::new();
    }
    let upper = label.to_uppercase();
    if upper.contains("EJAI") {
        if upper.contains("ETAPA") {
            return label.to_string();
        }
        let mut out = label.to_string();
        if BARE_NUMBER.is_match(&out) && !ORDINAL_NUMBER.is_match(&out) {
            out = BARE_NUMBER.replace_all(&out, "${1}ª").into_owned();
        }
        return format!("{out} ETAPA");
    }
    if upper.contains("EJA") {
        return label.to_string();
    }
    if upper.contains("ANO") {
        label.to_string()
    } else {
        format!("{label} ANO")
    }
}

/// Removes the word `ano`/`anos` (any case) from a grade label, e.g. `1° ano` becomes `1°`. The
/// words around it stay apart: `1º ano MANHÃ` becomes `1º MANHÃ`. Accommodated records are stored
/// this way.
pub fn strip_ano(grade: &str) -> String {
    ANO_WORD.replace_all(grade, " ").trim().to_string()
}

/// The first run of digits in `label`, if any.
pub fn leading_number(label: &str) -> Option<u64> {
    let start = label.find(|c: char| c.is_ascii_digit())?;
    let digits: String = label[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
