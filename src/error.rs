use std::fmt::{Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Failures that callers may want to tell apart. These travel inside `anyhow::Error` and can be
/// recovered with `err.downcast_ref::<RosterError>()`.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum RosterError {
    /// No column could be identified as the school name. Fatal to the run.
    #[error("No column with the school name was found among {columns:?}")]
    MissingSchoolColumn { columns: Vec<String> },

    /// A sheet has no grade-bearing column. The sheet is skipped and the run continues.
    #[error("Sheet '{sheet}' has no grade column and was skipped")]
    MissingGradeColumn { sheet: String },

    /// A label row lacks a required field. Aborts document generation.
    #[error(
        "Unable to render label for row {row}: field '{field}' is missing \
        ({pages_finished} page(s) were already finished)"
    )]
    LabelRender {
        row: usize,
        field: String,
        pages_finished: usize,
    },
}

/// Non-fatal conditions found while processing a run.
#[derive(Debug, Clone, Eq, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Warning {
    /// A sheet was skipped because no grade column could be found in it.
    MissingGradeColumn { sheet: String },
    /// Ingestion finished without producing a single record.
    EmptyResult,
}

impl Display for Warning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::MissingGradeColumn { sheet } => {
                write!(f, "Sheet '{sheet}' has no grade column and was skipped")
            }
            Warning::EmptyResult => write!(f, "The input did not produce any records"),
        }
    }
}
