use crate::args::TableArgs;
use crate::commands::{write_reports, Out, RunOutput};
use crate::source::FlatTableSource;
use crate::{files, pipeline, Config, Result};

/// Tallies a single flat table and writes the reports.
pub async fn table(config: &Config, args: &TableArgs) -> Result<Out<RunOutput>> {
    let sheet = files::read_table(args.input()).await?;
    let name = args.input().display().to_string();
    let reports = pipeline::run(&FlatTableSource::new(name, &sheet, args.layout().layout()))?;
    write_reports(config, args.output(), reports).await
}
