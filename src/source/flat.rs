use crate::error::Warning;
use crate::model::{
    parse_count, CanonicalField, ColumnMapping, Header, RawSheet, StudentRecord,
    STANDARD_CATEGORY,
};
use crate::source::{Batch, RecordSource};
use crate::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The two shapes a flat table comes in.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlatLayout {
    /// One row per school and one count column per grade, e.g.
    /// `Total de alunos do 1º ano da MANHÃ`. Unreadable counts are 0.
    Wide,
    /// One row per school, category and grade, with an optional quantity column. Unreadable
    /// quantities are 1.
    Long,
}

serde_plain::derive_display_from_serialize!(FlatLayout);
serde_plain::derive_fromstr_from_deserialize!(FlatLayout);

impl FlatLayout {
    /// Guesses the layout from the resolved header row. The table is long when it has a dedicated
    /// grade column (one that does not read like a count) and no other grade-like columns.
    pub fn detect(mapping: &ColumnMapping) -> Self {
        let dedicated_grade = mapping
            .index(CanonicalField::Grade)
            .and_then(|ix| mapping.headers().get(ix))
            .map(|h| !h.mentions_count())
            .unwrap_or(false);
        let skip = [
            mapping.index(CanonicalField::SchoolName),
            mapping.index(CanonicalField::Category),
            mapping.index(CanonicalField::Count),
        ];
        let grade_like = mapping
            .headers()
            .iter()
            .enumerate()
            .filter(|(ix, h)| !skip.contains(&Some(*ix)) && h.is_grade_bearing())
            .count();
        if dedicated_grade && grade_like < 2 {
            FlatLayout::Long
        } else {
            FlatLayout::Wide
        }
    }
}

/// Reads a single flat table whose first row is the header row.
#[derive(Debug, Clone)]
pub struct FlatTableSource<'a> {
    name: String,
    sheet: &'a RawSheet,
    layout: Option<FlatLayout>,
}

impl<'a> FlatTableSource<'a> {
    /// `layout` of `None` means detect it from the header row.
    pub fn new(name: impl Into<String>, sheet: &'a RawSheet, layout: Option<FlatLayout>) -> Self {
        Self {
            name: name.into(),
            sheet,
            layout,
        }
    }

    fn missing_grade(&self, batch: &mut Batch) {
        warn!("Table '{}' has no grade column", self.name);
        batch.warnings.push(Warning::MissingGradeColumn {
            sheet: self.name.clone(),
        });
    }

    fn long_records(&self, mapping: &ColumnMapping, school_ix: usize, batch: &mut Batch) {
        let Some(grade_ix) = mapping.index(CanonicalField::Grade) else {
            self.missing_grade(batch);
            return;
        };
        let category_ix = mapping.index(CanonicalField::Category);
        let count_ix = mapping.index(CanonicalField::Count);
        for row in 1..self.sheet.len() {
            let school = self.sheet.cell(row, school_ix).trim();
            let grade = self.sheet.cell(row, grade_ix).trim();
            if school.is_empty() || grade.is_empty() {
                continue;
            }
            let category = category_ix
                .map(|ix| self.sheet.cell(row, ix).trim())
                .unwrap_or_default();
            let count = count_ix
                .map(|ix| parse_count(self.sheet.cell(row, ix), 1))
                .unwrap_or(1);
            batch
                .records
                .push(StudentRecord::new(school, grade, category, count));
        }
    }

    fn wide_records(&self, mapping: &ColumnMapping, school_ix: usize, batch: &mut Batch) {
        let category_ix = mapping.index(CanonicalField::Category);
        let grade_columns: Vec<(usize, String)> = mapping
            .headers()
            .iter()
            .enumerate()
            .filter(|(ix, _)| *ix != school_ix && Some(*ix) != category_ix)
            .filter(|(ix, h)| {
                let bearing = h.is_grade_bearing();
                if !bearing {
                    debug!("Ignoring column {ix} '{}'", h.label());
                }
                bearing
            })
            .map(|(ix, h): (usize, &Header)| (ix, h.grade_label()))
            .collect();
        if grade_columns.is_empty() {
            self.missing_grade(batch);
            return;
        }
        for row in 1..self.sheet.len() {
            let school = self.sheet.cell(row, school_ix).trim();
            if school.is_empty() {
                continue;
            }
            let category = match category_ix {
                Some(ix) => self.sheet.cell(row, ix).trim(),
                None => STANDARD_CATEGORY,
            };
            for (ix, grade) in &grade_columns {
                let count = parse_count(self.sheet.cell(row, *ix), 0);
                batch
                    .records
                    .push(StudentRecord::new(school, grade, category, count));
            }
        }
    }
}

impl RecordSource for FlatTableSource<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn produce_records(&self) -> Result<Batch> {
        let headers = self.sheet.row(0).unwrap_or_default();
        let mapping = ColumnMapping::resolve(headers.iter().cloned())?;
        let school_ix = mapping
            .index(CanonicalField::SchoolName)
            .unwrap_or_default();
        let layout = self.layout.unwrap_or_else(|| FlatLayout::detect(&mapping));
        debug!("Reading table '{}' with the {layout} layout", self.name);

        let mut batch = Batch::default();
        match layout {
            FlatLayout::Long => self.long_records(&mapping, school_ix, &mut batch),
            FlatLayout::Wide => self.wide_records(&mapping, school_ix, &mut batch),
        }
        Ok(batch)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::RosterError;

    fn wide_sheet() -> RawSheet {
        RawSheet::new(vec![
            vec![
                "Carimbo de data/hora",
                "Qual é o nome da sua escola?",
                "Total de alunos do 1º ano da MANHÃ",
                "Total de alunos do 1º ano da TARDE",
                "Total de alunos da EJA 1ª ETAPA",
            ],
            vec!["2024-03-01", "EMEF Peixe-Boi", "25", "", "7"],
            vec!["2024-03-02", "", "1", "1", "1"],
            vec!["2024-03-03", "Escola Tucano", "0", "x", "0"],
        ])
    }

    fn long_sheet() -> RawSheet {
        RawSheet::new(vec![
            vec!["Escola", "Categoria", "Ano", "Quantidade"],
            vec!["EMEF Peixe-Boi", "TEA", "5º", "10"],
            vec!["EMEF Peixe-Boi", "", "EJAI 2", "abc"],
            vec!["EMEF Peixe-Boi", "TEA", "", "3"],
        ])
    }

    #[test]
    fn test_detect_layouts() {
        let wide = ColumnMapping::resolve(wide_sheet().rows()[0].clone()).unwrap();
        assert_eq!(FlatLayout::detect(&wide), FlatLayout::Wide);
        let long = ColumnMapping::resolve(long_sheet().rows()[0].clone()).unwrap();
        assert_eq!(FlatLayout::detect(&long), FlatLayout::Long);
        let plain = ColumnMapping::resolve(["Escola", "1º ano", "2º ano", "EJA"]).unwrap();
        assert_eq!(FlatLayout::detect(&plain), FlatLayout::Wide);
        let long_total =
            ColumnMapping::resolve(["Escola", "Categoria", "Ano escolar", "Total"]).unwrap();
        assert_eq!(FlatLayout::detect(&long_total), FlatLayout::Long);
    }

    #[test]
    fn test_wide_melts_grade_columns() {
        let sheet = wide_sheet();
        let batch = FlatTableSource::new("t", &sheet, None)
            .produce_records()
            .unwrap();
        // two schools with a name, three grade columns each
        assert_eq!(batch.records.len(), 6);
        assert_eq!(
            batch.records[0],
            StudentRecord::new("EMEF Peixe-Boi", "1º ANO MANHÃ", STANDARD_CATEGORY, 25)
        );
        assert_eq!(batch.records[1].grade, "1º ANO TARDE");
        assert_eq!(batch.records[1].count, 0);
        assert_eq!(batch.records[2].grade, "EJA 1ª ETAPA");
        assert!(batch.records[3..].iter().all(|r| r.count == 0));
    }

    #[test]
    fn test_long_reads_quantities() {
        let sheet = long_sheet();
        let batch = FlatTableSource::new("t", &sheet, Some(FlatLayout::Long))
            .produce_records()
            .unwrap();
        assert_eq!(batch.records.len(), 2);
        assert_eq!(
            batch.records[0],
            StudentRecord::new("EMEF Peixe-Boi", "5º", "TEA", 10)
        );
        assert_eq!(
            batch.records[1],
            StudentRecord::new("EMEF Peixe-Boi", "EJAI 2", "", 1)
        );
    }

    #[test]
    fn test_missing_school_column_is_fatal() {
        let sheet = RawSheet::new(vec![vec!["Ano", "Quantidade"], vec!["1", "2"]]);
        let err = FlatTableSource::new("t", &sheet, None)
            .produce_records()
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RosterError>(),
            Some(RosterError::MissingSchoolColumn { .. })
        ));
    }

    #[test]
    fn test_no_grade_columns_is_a_warning() {
        let sheet = RawSheet::new(vec![vec!["Escola", "Diretor"], vec!["Boto", "Ana"]]);
        let batch = FlatTableSource::new("t", &sheet, Some(FlatLayout::Wide))
            .produce_records()
            .unwrap();
        assert!(batch.records.is_empty());
        assert_eq!(
            batch.warnings,
            vec![Warning::MissingGradeColumn {
                sheet: "t".to_string()
            }]
        );
    }

    #[test]
    fn test_long_layout_without_grade_column_is_a_warning() {
        let sheet = RawSheet::new(vec![
            vec!["Escola", "Categoria", "Quantidade"],
            vec!["Boto", "TEA", "2"],
        ]);
        let batch = FlatTableSource::new("t", &sheet, Some(FlatLayout::Long))
            .produce_records()
            .unwrap();
        assert!(batch.records.is_empty());
        assert_eq!(
            batch.warnings,
            vec![Warning::MissingGradeColumn {
                sheet: "t".to_string()
            }]
        );
    }
}
