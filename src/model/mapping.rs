use crate::error::RosterError;
use crate::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::Infallible;
use std::str::FromStr;
use tracing::trace;

/// The semantic fields that free-text column labels are resolved to.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CanonicalField {
    SchoolName,
    Category,
    Grade,
    Count,
}

serde_plain::derive_display_from_serialize!(CanonicalField);

/// Keyword rules, evaluated in this order for every column. A column takes the first field whose
/// keywords it contains and which no earlier column has claimed.
const RULES: &[(CanonicalField, &[&str])] = &[
    (CanonicalField::SchoolName, &["escola", "nome"]),
    (
        CanonicalField::Category,
        &["categoria", "deficiencia", "deficiência", "transtorno"],
    ),
    (CanonicalField::Grade, &["ano"]),
    (CanonicalField::Count, &["quantidade", "total", "qtd"]),
];

/// Keywords that mark a wide-layout column as holding a per-grade student count.
const GRADE_BEARING: &[&str] = &[
    "total", "aluno", "1º", "2º", "3º", "4º", "5º", "6º", "7º", "8º", "9º", "eja", "manhã",
    "tarde", "ano",
];

/// Keywords that mark a column label as describing a count.
const COUNT_WORDS: &[&str] = &["total", "qtd", "quantidade", "aluno"];

static BOILERPLATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)total\s+de\s+alunos\s+d[ao]s?\s+").expect("valid regex"));
static CONNECTOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+d[ao]\s+").expect("valid regex"));
static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Represents a column label as it appears in the source, for example, `Qual é o nome da sua
/// escola?`
#[derive(Default, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Header(String);

impl AsRef<str> for Header {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl<S: Into<String>> From<S> for Header {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl FromStr for Header {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(s.into())
    }
}

impl Header {
    pub fn label(&self) -> &str {
        &self.0
    }

    fn lower(&self) -> String {
        self.0.trim().to_lowercase()
    }

    fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// True when the label looks like a per-grade count column of the wide layout.
    pub fn is_grade_bearing(&self) -> bool {
        let lower = self.lower();
        GRADE_BEARING.iter().any(|k| lower.contains(k))
    }

    /// True when the label mentions a count.
    pub fn mentions_count(&self) -> bool {
        let lower = self.lower();
        COUNT_WORDS.iter().any(|k| lower.contains(k))
    }

    /// Turns a wide-layout column label into a grade label, e.g.
    /// `Total de alunos do 1º ano da MANHÃ` becomes `1º ANO MANHÃ`.
    pub fn grade_label(&self) -> String {
        let s = BOILERPLATE.replace_all(self.0.trim(), "");
        let s = CONNECTOR.replace_all(&s, " ");
        let s = SPACES.replace_all(&s, " ");
        s.trim().to_uppercase()
    }
}

/// Maps original column positions to canonical fields for one table or sheet. At most one column
/// maps to each field.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct ColumnMapping {
    headers: Vec<Header>,
    fields: HashMap<CanonicalField, usize>,
}

impl ColumnMapping {
    /// Resolves the header labels of a flat table. Fails with `RosterError::MissingSchoolColumn`
    /// when no column can be identified as the school name.
    pub fn resolve<S, I>(headers: I) -> Result<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let mapping = Self::scan(headers);
        if mapping.index(CanonicalField::SchoolName).is_none() {
            return Err(RosterError::MissingSchoolColumn {
                columns: mapping.headers.iter().map(|h| h.0.clone()).collect(),
            }
            .into());
        }
        Ok(mapping)
    }

    /// Resolves header labels without requiring a school column. Used for per-sheet header rows,
    /// where the school comes from elsewhere.
    pub fn scan<S, I>(headers: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let headers: Vec<Header> = headers.into_iter().map(|s| s.into().into()).collect();
        let mut fields = HashMap::new();
        for (ix, header) in headers.iter().enumerate() {
            if header.is_blank() {
                continue;
            }
            let lower = header.lower();
            let hit = RULES.iter().find(|(field, keywords)| {
                !fields.contains_key(field) && keywords.iter().any(|k| lower.contains(k))
            });
            if let Some((field, _)) = hit {
                trace!("Column {ix} '{}' resolved to {field}", header.label());
                fields.insert(*field, ix);
            }
        }
        Self { headers, fields }
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    pub fn index(&self, field: CanonicalField) -> Option<usize> {
        self.fields.get(&field).copied()
    }

    pub fn field_of(&self, column: usize) -> Option<CanonicalField> {
        self.fields
            .iter()
            .find(|(_, ix)| **ix == column)
            .map(|(field, _)| *field)
    }
}
