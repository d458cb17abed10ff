use crate::error::{RosterError, Warning};
use crate::model::{parse_count, CanonicalField, ColumnMapping, NamedSheet, StudentRecord, Workbook};
use crate::source::{Batch, RecordSource};
use crate::Result;
use tracing::{debug, warn};

/// Sheets with this name (in any case) are never read.
pub const SKIPPED_SHEET: &str = "DIVISÃO";

/// Reads a workbook where every sheet belongs to one school: the first cell holds the school name,
/// the second row holds the column headers and every later row is one student.
#[derive(Debug, Clone)]
pub struct WorkbookSource<'a> {
    workbook: &'a Workbook,
}

impl<'a> WorkbookSource<'a> {
    pub fn new(workbook: &'a Workbook) -> Self {
        Self { workbook }
    }
}

impl RecordSource for WorkbookSource<'_> {
    fn name(&self) -> &str {
        "workbook"
    }

    fn produce_records(&self) -> Result<Batch> {
        let mut batch = Batch::default();
        for sheet in self.workbook.sheets() {
            if sheet.name().trim().to_uppercase() == SKIPPED_SHEET {
                debug!("Skipping sheet '{}'", sheet.name());
                continue;
            }
            match sheet_records(sheet) {
                Ok(records) => {
                    debug!("Sheet '{}' produced {} records", sheet.name(), records.len());
                    batch.records.extend(records);
                }
                Err(RosterError::MissingGradeColumn { sheet }) => {
                    warn!("Sheet '{sheet}' has no grade column, skipping it");
                    batch.warnings.push(Warning::MissingGradeColumn { sheet });
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(batch)
    }
}

fn sheet_records(named: &NamedSheet) -> std::result::Result<Vec<StudentRecord>, RosterError> {
    let sheet = named.sheet();
    if sheet.len() < 2 {
        debug!("Sheet '{}' has no header row, skipping it", named.name());
        return Ok(Vec::new());
    }

    let school = match sheet.cell(0, 0).trim() {
        "" => named.name().trim().to_string(),
        s => s.to_string(),
    };

    let mapping = ColumnMapping::scan(sheet.row(1).unwrap_or_default().iter().cloned());
    let grade_ix =
        mapping
            .index(CanonicalField::Grade)
            .ok_or_else(|| RosterError::MissingGradeColumn {
                sheet: named.name().to_string(),
            })?;
    let category_ix = mapping.index(CanonicalField::Category);
    let count_ix = mapping.index(CanonicalField::Count);

    let mut records = Vec::new();
    for row in 2..sheet.len() {
        let grade = sheet.cell(row, grade_ix).trim();
        if grade.is_empty() {
            continue;
        }
        let category = category_ix
            .map(|ix| sheet.cell(row, ix).trim())
            .unwrap_or_default();
        let count = count_ix
            .map(|ix| parse_count(sheet.cell(row, ix), 0))
            .unwrap_or(1);
        records.push(StudentRecord::new(&school, grade, category, count));
    }
    Ok(records)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{RawSheet, STANDARD_CATEGORY};
    use crate::test::school_sheet;

    #[test]
    fn test_reads_one_record_per_student() {
        let workbook = Workbook::new([school_sheet(
            "A",
            "Escola Tucano",
            &[("1° ano", STANDARD_CATEGORY), ("2° ano", "TEA"), ("", "TEA")],
        )]);
        let batch = WorkbookSource::new(&workbook).produce_records().unwrap();
        assert_eq!(batch.records.len(), 2);
        assert_eq!(
            batch.records[0],
            StudentRecord::new("Escola Tucano", "1° ano", STANDARD_CATEGORY, 1)
        );
        assert_eq!(batch.records[1].category, "TEA");
        assert!(batch.warnings.is_empty());
    }

    #[test]
    fn test_blank_school_cell_falls_back_to_sheet_name() {
        let workbook = Workbook::new([school_sheet("Boto", "", &[("3° ano", "")])]);
        let batch = WorkbookSource::new(&workbook).produce_records().unwrap();
        assert_eq!(batch.records[0].school, "Boto");
    }

    #[test]
    fn test_division_sheet_is_ignored() {
        let workbook = Workbook::new([
            school_sheet("divisão", "Escola X", &[("1° ano", STANDARD_CATEGORY)]),
            school_sheet("DIVISÃO", "Escola Y", &[("1° ano", STANDARD_CATEGORY)]),
        ]);
        let batch = WorkbookSource::new(&workbook).produce_records().unwrap();
        assert!(batch.records.is_empty());
        assert!(batch.warnings.is_empty());
    }

    #[test]
    fn test_sheet_without_grade_column_is_a_warning() {
        let no_grade = NamedSheet::new(
            "Arara",
            RawSheet::new(vec![
                vec!["Escola Arara"],
                vec!["Nome", "Deficiência"],
                vec!["Maria", "TEA"],
            ]),
        );
        let workbook = Workbook::new([
            no_grade,
            school_sheet("Boto", "Escola Boto", &[("1° ano", "TEA")]),
        ]);
        let batch = WorkbookSource::new(&workbook).produce_records().unwrap();
        assert_eq!(batch.records.len(), 1);
        assert_eq!(
            batch.warnings,
            vec![Warning::MissingGradeColumn {
                sheet: "Arara".to_string()
            }]
        );
    }

    #[test]
    fn test_count_column_defaults_to_zero() {
        let sheet = NamedSheet::new(
            "Jacaré",
            RawSheet::new(vec![
                vec!["Escola Jacaré"],
                vec!["Ano", "Categoria", "Quantidade"],
                vec!["1º ano", "TEA", "3"],
                vec!["2º ano", "TEA", "n/d"],
            ]),
        );
        let workbook = Workbook::new([sheet]);
        let batch = WorkbookSource::new(&workbook).produce_records().unwrap();
        assert_eq!(batch.records[0].count, 3);
        assert_eq!(batch.records[1].count, 0);
    }

    #[test]
    fn test_short_sheet_contributes_nothing() {
        let workbook = Workbook::new([NamedSheet::new("Vazia", RawSheet::new(vec![vec!["X"]]))]);
        let batch = WorkbookSource::new(&workbook).produce_records().unwrap();
        assert!(batch.records.is_empty());
        assert!(batch.warnings.is_empty());
    }
}
