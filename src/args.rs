//! These structs provide the CLI interface for the roster CLI.

use crate::files::OutputFormat;
use crate::source::FlatLayout;
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// roster: turns school roster spreadsheets into participant reports and printable labels.
///
/// Every input is tallied into two reports: participants without disabilities or disorders, one
/// row per school and one column per grade, and accommodated participants, one row per school,
/// category and grade. Each report is paired with a label table that the `labels` command prints
/// as a sheet of 99×55 mm cards.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory and a config.json holding the default settings.
    ///
    /// Running this is optional. Without a config file every command uses the defaults.
    Init,
    /// Tally a workbook with one sheet per school.
    ///
    /// In every sheet the first cell holds the school name (the sheet name is used when it is
    /// blank), the second row holds the column headers and each later row is one student. A sheet
    /// named DIVISÃO is ignored.
    Workbook(WorkbookArgs),
    /// Tally a single flat table with a header row.
    ///
    /// The wide layout has one row per school and one count column per grade. The long layout has
    /// one row per school, category and grade with an optional quantity column.
    Table(TableArgs),
    /// Print a label table as a PDF sheet of cards.
    Labels(LabelsArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the configuration is held. Defaults to ~/roster
    #[arg(long, env = "ROSTER_HOME", default_value_t = default_roster_home())]
    home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

/// Where and how report files are written.
#[derive(Debug, Parser, Clone)]
pub struct OutputArgs {
    /// The directory the reports are written to. It is created if needed.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// The report file format. Defaults to the output_format in config.json, or csv.
    #[arg(long)]
    format: Option<OutputFormat>,
}

impl OutputArgs {
    pub fn new(out_dir: impl Into<PathBuf>, format: Option<OutputFormat>) -> Self {
        Self {
            out_dir: out_dir.into(),
            format,
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn format(&self) -> Option<OutputFormat> {
        self.format
    }
}

/// (Not shown): Args for the `roster workbook` command.
#[derive(Debug, Parser, Clone)]
pub struct WorkbookArgs {
    /// The workbook to read: .xlsx, .xlsm, .xls, .ods or .csv
    input: PathBuf,

    #[clap(flatten)]
    output: OutputArgs,
}

impl WorkbookArgs {
    pub fn new(input: impl Into<PathBuf>, output: OutputArgs) -> Self {
        Self {
            input: input.into(),
            output,
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &OutputArgs {
        &self.output
    }
}

/// How the layout of a flat table is chosen.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LayoutChoice {
    /// Guess the layout from the header row.
    #[default]
    Auto,
    Wide,
    Long,
}

serde_plain::derive_display_from_serialize!(LayoutChoice);
serde_plain::derive_fromstr_from_deserialize!(LayoutChoice);

impl LayoutChoice {
    /// `None` means detect.
    pub fn layout(&self) -> Option<FlatLayout> {
        match self {
            LayoutChoice::Auto => None,
            LayoutChoice::Wide => Some(FlatLayout::Wide),
            LayoutChoice::Long => Some(FlatLayout::Long),
        }
    }
}

/// (Not shown): Args for the `roster table` command.
#[derive(Debug, Parser, Clone)]
pub struct TableArgs {
    /// The table to read: a .csv file or the first sheet of a spreadsheet
    input: PathBuf,

    /// The layout of the table.
    #[arg(long, default_value_t = LayoutChoice::Auto)]
    layout: LayoutChoice,

    #[clap(flatten)]
    output: OutputArgs,
}

impl TableArgs {
    pub fn new(input: impl Into<PathBuf>, layout: LayoutChoice, output: OutputArgs) -> Self {
        Self {
            input: input.into(),
            layout,
            output,
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn layout(&self) -> LayoutChoice {
        self.layout
    }

    pub fn output(&self) -> &OutputArgs {
        &self.output
    }
}

/// (Not shown): Args for the `roster labels` command.
#[derive(Debug, Parser, Clone)]
pub struct LabelsArgs {
    /// A label table with the columns NOME ESCOLA, ANO ESCOLAR and TOTAL, as written by the
    /// workbook and table commands. Cards are printed in row order.
    table: PathBuf,

    /// The logo printed at the top of every card (PNG or JPEG).
    #[arg(long)]
    logo: PathBuf,

    /// The championship name, printed on the first line.
    #[arg(long)]
    championship: String,

    /// The stage or phase, printed in bold on the second line.
    #[arg(long)]
    stage: String,

    /// Where to write the PDF. Defaults to the table path with a .pdf extension.
    #[arg(long)]
    output: Option<PathBuf>,
}

impl LabelsArgs {
    pub fn new(
        table: impl Into<PathBuf>,
        logo: impl Into<PathBuf>,
        championship: impl Into<String>,
        stage: impl Into<String>,
        output: Option<PathBuf>,
    ) -> Self {
        Self {
            table: table.into(),
            logo: logo.into(),
            championship: championship.into(),
            stage: stage.into(),
            output,
        }
    }

    pub fn table(&self) -> &Path {
        &self.table
    }

    pub fn logo(&self) -> &Path {
        &self.logo
    }

    pub fn championship(&self) -> &str {
        &self.championship
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    /// The PDF path: `--output` if given, otherwise the table path with a `.pdf` extension.
    pub fn output(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.table.with_extension("pdf"))
    }
}

fn default_roster_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("roster"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or ROSTER_HOME instead of relying on the default \
                roster home directory.",
            );
            PathBuf::from("roster")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
