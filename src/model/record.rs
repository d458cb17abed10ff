use serde::{Deserialize, Serialize};

/// The category literal that puts a record on the standard track. Matched exactly, after trimming.
pub const STANDARD_CATEGORY: &str = "Não possui deficiência/transtorno";

/// The category stored for accommodated records whose category is blank.
pub const NOT_INFORMED: &str = "Não informado";

/// Which of the two reports a record counts towards.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Track {
    Standard,
    Accommodated,
}

serde_plain::derive_display_from_serialize!(Track);
serde_plain::derive_fromstr_from_deserialize!(Track);

impl Track {
    /// Classifies a raw category value.
    pub fn classify(category: &str) -> Self {
        if category.trim() == STANDARD_CATEGORY {
            Track::Standard
        } else {
            Track::Accommodated
        }
    }
}

/// One data row after column resolution. These are produced by a `RecordSource` and consumed
/// right away by the `Aggregator`; they are never stored.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub school: String,
    pub grade: String,
    /// Possibly empty.
    pub category: String,
    pub count: u64,
}

impl StudentRecord {
    pub fn new(
        school: impl Into<String>,
        grade: impl Into<String>,
        category: impl Into<String>,
        count: u64,
    ) -> Self {
        Self {
            school: school.into(),
            grade: grade.into(),
            category: category.into(),
            count,
        }
    }

    pub fn track(&self) -> Track {
        Track::classify(&self.category)
    }
}

/// Parses a count cell. Accepts integers and integral decimals such as `"25.0"`; negative values
/// clamp to zero. Anything else (including blank) yields `default`.
pub fn parse_count(value: &str, default: u64) -> u64 {
    let s = value.trim();
    if let Ok(n) = s.parse::<i64>() {
        return n.max(0) as u64;
    }
    match s.replace(',', ".").parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => {
            if f <= 0.0 {
                0
            } else {
                f as u64
            }
        }
        _ => default,
    }
}
