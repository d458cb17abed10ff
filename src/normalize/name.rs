use once_cell::sync::Lazy;
use regex::Regex;

/// Institutional prefixes removed from the front of school names, most specific first.
const PREFIXES: &[&str] = &[
    "ESCOLA MUNICIPAL DE ENSINO FUNDAMENTAL E INFANTIL ",
    "CENTRO MUNICIPAL DE EDUCACAO INFANTIL ",
    "ESCOLA MUNICIPAL DE ENSINO FUNDAMENTAL ",
    "ESCOLA MUNICIPAL DE ENSINO INFANTIL ",
    "ESCOLA MUNICIPAL ",
    "CENTRO MUNICIPAL ",
    "ESCOLA M.E.I.F ",
    "ESC MUNICIPAL ",
    "E.M.E.I.F. ",
    "E.M.E.F. ",
    "E M E I F ",
    "E M E F I ",
    "E M E F ",
    "E M E I ",
    "C M E I ",
    "M.E.I.F ",
    "ESC EST ",
    "ESC MUN ",
    "ESCOLA ",
    "EMEIF ",
    "CMEIF ",
    "EMEF ",
    "EMEI ",
    "CMEI ",
    "CMEF ",
    "E I F ",
    "ESC ",
    "E F ",
];

/// Minimum number of characters that must remain after removing a prefix.
const MIN_REMAINDER: usize = 4;

/// Normalized names shorter than this fall back to the cleaned input.
const MIN_NAME: usize = 3;

static INEP_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\(\s*INEP\s*:\s*\d+\s*\)\s*$").expect("valid regex"));

/// Normalizes a school name: upper-cases and trims it, removes a trailing `(INEP: 12345)` code and
/// strips known institutional prefixes such as `E.M.E.F.` or `ESCOLA MUNICIPAL`. A prefix is only
/// removed when more than three characters remain. Never fails and is idempotent.
pub fn normalize_school_name(raw: &str) -> String {
    let cleaned = raw.trim().to_uppercase();
    let mut name = cleaned.clone();
    loop {
        let next = strip_once(&name);
        if next == name {
            break;
        }
        name = next;
    }
    if name.chars().count() < MIN_NAME {
        return cleaned;
    }
    name
}

fn strip_once(name: &str) -> String {
    let name = name.trim().to_uppercase();
    let name = INEP_CODE.replace(&name, "");
    let name = name.trim();
    for prefix in PREFIXES {
        if let Some(rest) = name.strip_prefix(prefix) {
            let rest = rest.trim();
            if rest.chars().count() >= MIN_REMAINDER {
                return rest.to_string();
            }
        }
    }
    name.to_string()
}
