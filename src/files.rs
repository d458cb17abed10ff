//! Reading spreadsheets into raw sheets and writing report tables out. Everything that knows about
//! file formats lives here.

use crate::model::{Cell, NamedSheet, RawSheet, Table, Workbook};
use crate::{utils, Result};
use anyhow::{anyhow, bail, Context};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, trace};

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Name of the only sheet in written XLSX files.
const XLSX_SHEET: &str = "Dados";

/// Formats the reports can be written in.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// UTF-8 CSV with a byte order mark, so spreadsheet programs detect the encoding.
    #[default]
    Csv,
    /// An XLSX workbook with a single sheet.
    Xlsx,
}

serde_plain::derive_display_from_serialize!(OutputFormat);
serde_plain::derive_fromstr_from_deserialize!(OutputFormat);

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Xlsx => "xlsx",
        }
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// Reads every sheet of a spreadsheet (`.xlsx`, `.xlsm`, `.xls`, `.ods`). A `.csv` file is read as
/// a workbook with one sheet named after the file stem.
pub async fn read_workbook(path: &Path) -> Result<Workbook> {
    let bytes = utils::read_bytes(path).await?;
    if is_csv(path) {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let sheet = parse_csv(&bytes).with_context(|| format!("Bad CSV in {}", path.display()))?;
        return Ok(Workbook::new([NamedSheet::new(name, sheet)]));
    }
    parse_spreadsheet(bytes).with_context(|| format!("Unable to read {}", path.display()))
}

/// Reads a single flat table: a CSV file or the first sheet of a spreadsheet.
pub async fn read_table(path: &Path) -> Result<RawSheet> {
    let workbook = read_workbook(path).await?;
    workbook
        .first()
        .map(|s| s.sheet().clone())
        .ok_or_else(|| anyhow!("{} has no sheets", path.display()))
}

fn parse_csv(bytes: &[u8]) -> Result<RawSheet> {
    let bytes = bytes.strip_prefix(BOM).unwrap_or(bytes);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(Cursor::new(bytes));

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }
    Ok(RawSheet::new(rows))
}

fn parse_spreadsheet(bytes: Vec<u8>) -> Result<Workbook> {
    let mut sheets = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let mut workbook = Workbook::default();
    for name in sheets.sheet_names() {
        let range = sheets
            .worksheet_range(&name)
            .with_context(|| format!("Unable to read sheet '{name}'"))?;
        trace!("Sheet '{name}' spans {:?}", range.get_size());
        workbook.push(NamedSheet::new(name, range_to_sheet(&range)));
    }
    debug!("Read {} sheets", workbook.sheets().len());
    Ok(workbook)
}

/// Converts a calamine range to a grid anchored at A1, so that "first cell" and "second row" mean
/// the same thing they mean in the spreadsheet program.
fn range_to_sheet(range: &Range<Data>) -> RawSheet {
    let Some((first_row, first_col)) = range.start() else {
        return RawSheet::default();
    };
    let padding = vec![String::new(); first_col as usize];
    let mut rows: Vec<Vec<String>> = vec![Vec::new(); first_row as usize];
    for row in range.rows() {
        let mut cells = padding.clone();
        cells.extend(row.iter().map(render));
        rows.push(cells);
    }
    RawSheet::new(rows)
}

fn render(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        other => other.to_string(),
    }
}

/// Writes `table` to `path` in `format`.
pub async fn write_table(path: &Path, table: &Table, format: OutputFormat) -> Result<()> {
    let bytes = match format {
        OutputFormat::Csv => encode_csv(table)?,
        OutputFormat::Xlsx => encode_xlsx(table)?,
    };
    utils::write(path, bytes).await?;
    debug!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

fn encode_csv(table: &Table) -> Result<Vec<u8>> {
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(BOM.to_vec());
    wtr.write_record(table.columns())?;
    for row in table.rows() {
        wtr.write_record(row.iter().map(|c| c.to_string()))?;
    }
    wtr.into_inner()
        .map_err(|e| anyhow!("Unable to finish the CSV data: {e}"))
}

fn encode_xlsx(table: &Table) -> Result<Vec<u8>> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(XLSX_SHEET)?;
    for (col, name) in table.columns().iter().enumerate() {
        sheet.write_string(0, column(col)?, name)?;
    }
    for (ix, row) in table.rows().iter().enumerate() {
        let r = u32::try_from(ix + 1).context("Too many rows for a worksheet")?;
        for (col, cell) in row.iter().enumerate() {
            match cell {
                Cell::Text(s) => sheet.write_string(r, column(col)?, s)?,
                Cell::Count(n) => sheet.write_number(r, column(col)?, *n as f64)?,
            };
        }
    }
    Ok(workbook.save_to_buffer()?)
}

fn column(ix: usize) -> Result<u16> {
    match u16::try_from(ix) {
        Ok(c) => Ok(c),
        Err(_) => bail!("Too many columns for a worksheet: {ix}"),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::TempDir;

    fn report() -> Table {
        let mut table = Table::new(["Escola", "1º ANO", "2º ANO"]);
        table.push_row(vec![Cell::text("TUCANO"), Cell::Count(3), Cell::Count(0)]);
        table.push_row(vec![Cell::text("ARARA"), Cell::Count(12), Cell::Count(7)]);
        table
    }

    #[tokio::test]
    async fn test_csv_has_bom_and_exact_cells() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("standard.csv");
        write_table(&path, &report(), OutputFormat::Csv)
            .await
            .unwrap();

        let bytes = tokio::fs::read(&path).await.unwrap();
        assert!(bytes.starts_with(BOM));
        let text = String::from_utf8(bytes[BOM.len()..].to_vec()).unwrap();
        assert_eq!(text, "Escola,1º ANO,2º ANO\nTUCANO,3,0\nARARA,12,7\n");
    }

    #[tokio::test]
    async fn test_csv_reads_as_one_sheet_workbook() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("escolas.csv");
        tokio::fs::write(&path, b"\xEF\xBB\xBFEscola,Ano\nBoto,1\nArara\n")
            .await
            .unwrap();

        let workbook = read_workbook(&path).await.unwrap();
        assert_eq!(workbook.sheets().len(), 1);
        let sheet = &workbook.sheets()[0];
        assert_eq!(sheet.name(), "escolas");
        assert_eq!(sheet.sheet().cell(0, 0), "Escola");
        assert_eq!(sheet.sheet().cell(2, 1), "");
    }

    #[tokio::test]
    async fn test_xlsx_keeps_counts_and_positions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("standard.xlsx");
        write_table(&path, &report(), OutputFormat::Xlsx)
            .await
            .unwrap();

        let workbook = read_workbook(&path).await.unwrap();
        let sheet = &workbook.sheets()[0];
        assert_eq!(sheet.name(), XLSX_SHEET);
        assert_eq!(sheet.sheet().row(0).unwrap(), &["Escola", "1º ANO", "2º ANO"]);
        assert_eq!(sheet.sheet().cell(2, 1), "12");

        let table = read_table(&path).await.unwrap();
        assert_eq!(table.len(), 3);
    }

    #[tokio::test]
    async fn test_sheet_offset_is_preserved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("offset.xlsx");
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Tucano").unwrap();
        sheet.write_string(1, 1, "Ano").unwrap();
        sheet.write_number(2, 1, 25.0).unwrap();
        workbook.save(&path).unwrap();

        let read = read_workbook(&path).await.unwrap();
        let grid = read.sheets()[0].sheet();
        assert_eq!(grid.cell(0, 0), "");
        assert_eq!(grid.cell(1, 1), "Ano");
        assert_eq!(grid.cell(2, 1), "25");
    }

    #[tokio::test]
    async fn test_unreadable_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.xlsx");
        tokio::fs::write(&path, b"not a spreadsheet").await.unwrap();
        assert!(read_workbook(&path).await.is_err());
    }

    #[test]
    fn test_format_names() {
        assert_eq!(OutputFormat::Xlsx.to_string(), "xlsx");
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!(OutputFormat::Csv.extension(), "csv");
    }
}
