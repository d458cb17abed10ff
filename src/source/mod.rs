//! Record sources turn raw tabular input into `StudentRecord`s. There is one implementation per
//! input family; the caller picks the one that matches its input.
mod flat;
mod workbook;

use crate::error::Warning;
use crate::model::StudentRecord;
use crate::Result;

pub use flat::{FlatLayout, FlatTableSource};
pub use workbook::{WorkbookSource, SKIPPED_SHEET};

/// Produces the student records of one input.
pub trait RecordSource {
    /// A short name for log messages.
    fn name(&self) -> &str;

    /// Reads every record. Problems local to one sheet become warnings; problems that make the
    /// whole input unusable are errors.
    fn produce_records(&self) -> Result<Batch>;
}

/// The records of one input together with the non-fatal problems found while reading it.
#[derive(Default, Debug, Clone)]
pub struct Batch {
    pub records: Vec<StudentRecord>,
    pub warnings: Vec<Warning>,
}
