use serde::{Deserialize, Serialize};

/// One sheet of a source workbook, or one flat table, as a grid of cell strings. No header row is
/// assumed. Rows may have different lengths; missing cells read as empty.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSheet {
    rows: Vec<Vec<String>>,
}

impl RawSheet {
    pub fn new<S, R>(rows: impl IntoIterator<Item = R>) -> Self
    where
        S: Into<String>,
        R: IntoIterator<Item = S>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|s| s.into()).collect())
                .collect(),
        }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row(&self, ix: usize) -> Option<&[String]> {
        self.rows.get(ix).map(|r| r.as_slice())
    }

    /// The cell at (`row`, `col`), or an empty string when the cell does not exist.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A sheet together with the name of its tab.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct NamedSheet {
    name: String,
    sheet: RawSheet,
}

impl NamedSheet {
    pub fn new(name: impl Into<String>, sheet: RawSheet) -> Self {
        Self {
            name: name.into(),
            sheet,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sheet(&self) -> &RawSheet {
        &self.sheet
    }
}

/// A decoded workbook: its sheets in tab order.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Workbook {
    sheets: Vec<NamedSheet>,
}

impl Workbook {
    pub fn new(sheets: impl IntoIterator<Item = NamedSheet>) -> Self {
        Self {
            sheets: sheets.into_iter().collect(),
        }
    }

    pub fn push(&mut self, sheet: NamedSheet) {
        self.sheets.push(sheet);
    }

    pub fn sheets(&self) -> &[NamedSheet] {
        &self.sheets
    }

    pub fn first(&self) -> Option<&NamedSheet> {
        self.sheets.first()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cell_out_of_range_is_empty() {
        let sheet = RawSheet::new(vec![vec!["a", "b"], vec!["c"]]);
        assert_eq!(sheet.cell(0, 1), "b");
        assert_eq!(sheet.cell(1, 1), "");
        assert_eq!(sheet.cell(9, 0), "");
        assert_eq!(sheet.len(), 2);
    }
}
