use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// A typed output cell. Counts stay integers all the way to the writer.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Cell {
    Text(String),
    Count(u64),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    /// True for an empty or whitespace-only text cell.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Count(_) => false,
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Count(n) => write!(f, "{n}"),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Count(n) => serializer.serialize_u64(*n),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<u64> for Cell {
    fn from(value: u64) -> Self {
        Cell::Count(value)
    }
}

/// An ordered list of columns and an ordered list of rows. This is what the reports are built
/// into and what the writers and the label compositor consume.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new<S>(columns: impl IntoIterator<Item = S>) -> Self
    where
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(|s| s.into()).collect(),
            rows: Vec::new(),
        }
    }

    /// Builds a table from a raw grid whose first row holds the column names. Every cell is kept
    /// verbatim as text.
    pub fn from_header_row(sheet: &crate::model::RawSheet) -> Self {
        let mut rows = sheet.rows().iter();
        let mut table = match rows.next() {
            Some(header) => Table::new(header.iter().map(|h| h.trim().to_string())),
            None => Table::default(),
        };
        for row in rows {
            if row.iter().all(|c| c.trim().is_empty()) {
                continue;
            }
            table.push_row(row.iter().map(|c| Cell::text(c.as_str())).collect());
        }
        table
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Finds a column by name, ignoring case and surrounding whitespace.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_uppercase();
        self.columns
            .iter()
            .position(|c| c.trim().to_uppercase() == wanted)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Sum of all `Count` cells in the named column.
    pub fn column_total(&self, name: &str) -> u64 {
        let Some(ix) = self.column_index(name) else {
            return 0;
        };
        self.rows
            .iter()
            .filter_map(|r| match r.get(ix) {
                Some(Cell::Count(n)) => Some(*n),
                _ => None,
            })
            .sum()
    }
}
