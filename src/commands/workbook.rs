use crate::args::WorkbookArgs;
use crate::commands::{write_reports, Out, RunOutput};
use crate::source::WorkbookSource;
use crate::{files, pipeline, Config, Result};
use tracing::debug;

/// Tallies a workbook with one sheet per school and writes the reports.
pub async fn workbook(config: &Config, args: &WorkbookArgs) -> Result<Out<RunOutput>> {
    let book = files::read_workbook(args.input()).await?;
    debug!(
        "Read {} sheets from {}",
        book.sheets().len(),
        args.input().display()
    );
    let reports = pipeline::run(&WorkbookSource::new(&book))?;
    write_reports(config, args.output(), reports).await
}
