//! Command handlers for the roster CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod init;
mod labels;
mod table;
mod workbook;

use crate::args::OutputArgs;
use crate::files::{self, OutputFormat};
use crate::pipeline::{Reports, Summary};
use crate::{utils, Config, Result};
use serde::Serialize;
use std::fmt::Debug;
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub use init::init;
pub use labels::labels;
pub use table::table;
pub use workbook::workbook;

pub const STANDARD_FILE: &str = "standard";
pub const ACCOMMODATED_FILE: &str = "accommodated";
pub const STANDARD_LABELS_FILE: &str = "standard-labels";
pub const ACCOMMODATED_LABELS_FILE: &str = "accommodated-labels";

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// What the `workbook` and `table` commands report back.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    pub summary: Summary,
    pub files: Vec<PathBuf>,
}

/// Writes the four report tables into the output directory and builds the command output.
async fn write_reports(
    config: &Config,
    output: &OutputArgs,
    reports: Reports,
) -> Result<Out<RunOutput>> {
    let format: OutputFormat = output.format().unwrap_or_else(|| config.output_format());
    utils::make_dir(output.out_dir()).await?;

    let mut written = Vec::new();
    for (name, table) in [
        (STANDARD_FILE, &reports.standard),
        (ACCOMMODATED_FILE, &reports.accommodated),
        (STANDARD_LABELS_FILE, &reports.standard_labels),
        (ACCOMMODATED_LABELS_FILE, &reports.accommodated_labels),
    ] {
        let path = output
            .out_dir()
            .join(format!("{name}.{}", format.extension()));
        files::write_table(&path, table, format).await?;
        written.push(path);
    }

    let summary = reports.summary;
    for warning in &summary.warnings {
        warn!("{warning}");
    }
    let message = format!(
        "Tallied {} schools: {} standard and {} accommodated participants. Reports written to {}",
        summary.schools,
        summary.standard_total,
        summary.accommodated_total,
        output.out_dir().display()
    );
    Ok(Out::new(
        message,
        RunOutput {
            summary,
            files: written,
        },
    ))
}
