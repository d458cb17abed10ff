//! One processing run: records from a `RecordSource` go through a fresh `Aggregator` and come out
//! as the four report tables.

use crate::aggregate::{Aggregator, Tally};
use crate::error::Warning;
use crate::model::{Table, Track};
use crate::report;
use crate::source::RecordSource;
use crate::Result;
use serde::Serialize;
use tracing::{debug, warn};

/// Everything a run produces. Owned by the caller; nothing is shared between runs.
#[derive(Debug, Clone)]
pub struct Reports {
    pub standard: Table,
    pub accommodated: Table,
    pub standard_labels: Table,
    pub accommodated_labels: Table,
    pub summary: Summary,
}

/// Totals and warnings of a run, for display.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Summary {
    pub source: String,
    pub records: usize,
    pub schools: usize,
    pub standard_total: u64,
    pub accommodated_total: u64,
    pub grade_order: Vec<String>,
    pub warnings: Vec<Warning>,
}

/// Reads every record from `source`, aggregates them and builds the reports.
///
/// # Errors
/// Fails only when the source itself fails, e.g. `RosterError::MissingSchoolColumn`. Sheet-level
/// problems and an empty result are returned as warnings in the summary.
pub fn run(source: &dyn RecordSource) -> Result<Reports> {
    let batch = source.produce_records()?;
    debug!(
        "Source '{}' produced {} records",
        source.name(),
        batch.records.len()
    );

    let mut aggregator = Aggregator::new();
    for record in batch.records {
        aggregator.ingest(record);
    }
    let tally = aggregator.finish();

    let mut warnings = batch.warnings;
    if tally.is_empty() {
        warn!("No records were found in '{}'", source.name());
        warnings.push(Warning::EmptyResult);
    }

    Ok(build(source.name(), &tally, warnings))
}

fn build(source: &str, tally: &Tally, warnings: Vec<Warning>) -> Reports {
    let summary = Summary {
        source: source.to_string(),
        records: tally.records(),
        schools: tally.schools(),
        standard_total: tally.standard_total(),
        accommodated_total: tally.accommodated().total(),
        grade_order: tally.grade_order().to_vec(),
        warnings,
    };
    Reports {
        standard: report::pivoted(tally),
        accommodated: report::normalized(tally),
        standard_labels: report::labels(tally, Track::Standard),
        accommodated_labels: report::labels(tally, Track::Accommodated),
        summary,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{Cell, RawSheet, Workbook, STANDARD_CATEGORY};
    use crate::source::{FlatLayout, FlatTableSource, WorkbookSource};
    use crate::test::{flat_sheet, school_sheet};

    #[test]
    fn test_two_sheet_workbook_with_division_sheet() {
        let workbook = Workbook::new([
            school_sheet(
                "A",
                "Escola Tucano",
                &[
                    ("1° ano", STANDARD_CATEGORY),
                    ("1° ano", STANDARD_CATEGORY),
                    ("1° ano", STANDARD_CATEGORY),
                    ("2° ano", STANDARD_CATEGORY),
                ],
            ),
            school_sheet("DIVISÃO", "Escola Arara", &[("5° ano", "TEA")]),
        ]);
        let reports = run(&WorkbookSource::new(&workbook)).unwrap();

        assert_eq!(reports.standard.columns(), &["Escola", "1° ano", "2° ano"]);
        assert_eq!(
            reports.standard.rows(),
            &[vec![Cell::text("TUCANO"), Cell::Count(3), Cell::Count(1)]]
        );
        assert!(reports.accommodated.is_empty());
        assert!(reports.summary.warnings.is_empty());
        assert_eq!(reports.summary.standard_total, 4);
    }

    #[test]
    fn test_zero_only_school_is_not_lost() {
        let sheet = flat_sheet(
            &["Escola", "Categoria", "Ano", "Quantidade"],
            &[
                &["Boto", "TEA", "1º", "0"],
                &["Boto", "TEA", "2º", "0"],
                &["Arara", "TEA", "1º", "4"],
            ],
        );
        let reports = run(&FlatTableSource::new("t", &sheet, Some(FlatLayout::Long))).unwrap();
        let schools: Vec<String> = reports
            .accommodated
            .rows()
            .iter()
            .map(|r| r[0].to_string())
            .collect();
        assert_eq!(schools, vec!["ARARA", "BOTO"]);
        assert_eq!(reports.standard.len(), 2);
    }

    #[test]
    fn test_grade_normalization_is_path_independent() {
        let workbook = Workbook::new([school_sheet(
            "Jacaré",
            "Jacaré",
            &[("EJAI 2", STANDARD_CATEGORY), ("5", STANDARD_CATEGORY)],
        )]);
        let from_workbook = run(&WorkbookSource::new(&workbook)).unwrap();

        let sheet = flat_sheet(
            &["Escola", "Categoria", "Ano"],
            &[
                &["Jacaré", STANDARD_CATEGORY, "EJAI 2"],
                &["Jacaré", STANDARD_CATEGORY, "5"],
            ],
        );
        let from_table = run(&FlatTableSource::new("t", &sheet, None)).unwrap();

        assert_eq!(from_workbook.standard, from_table.standard);
        assert_eq!(
            from_table.standard.columns(),
            &["Escola", "5 ANO", "EJAI 2ª ETAPA"]
        );
    }

    #[test]
    fn test_empty_input_is_a_warning() {
        let sheet = RawSheet::new(vec![vec!["Escola", "Ano"]]);
        let reports = run(&FlatTableSource::new("t", &sheet, None)).unwrap();
        assert!(reports.standard.is_empty());
        assert_eq!(reports.summary.warnings, vec![Warning::EmptyResult]);
    }

    #[test]
    fn test_missing_school_column_fails_the_run() {
        let sheet = flat_sheet(&["Ano", "Quantidade"], &[&["1º", "3"]]);
        assert!(run(&FlatTableSource::new("t", &sheet, None)).is_err());
    }
}
