//! Materializes a `Tally` into the tabular reports.

use crate::aggregate::{AccommodatedEntry, Tally};
use crate::model::{Cell, Table, Track};
use crate::normalize::leading_number;

pub const SCHOOL: &str = "Escola";
pub const CATEGORY: &str = "Categoria";
pub const GRADE: &str = "Ano";
pub const QUANTITY: &str = "Quantidade";

/// Column names of the label tables, which are also what the label compositor reads.
pub const LABEL_SCHOOL: &str = "NOME ESCOLA";
pub const LABEL_CATEGORY: &str = "CATEGORIA";
pub const LABEL_GRADE: &str = "ANO ESCOLAR";
pub const LABEL_TOTAL: &str = "TOTAL";

/// Grades without a number sort after all numbered ones in the normalized report.
const UNNUMBERED_GRADE: u64 = 999;

/// One row per school, one column per grade in grade order. Missing cells are 0.
pub fn pivoted(tally: &Tally) -> Table {
    let mut table = Table::new(
        std::iter::once(SCHOOL.to_string()).chain(tally.grade_order().iter().cloned()),
    );
    for (school, grades) in tally.standard() {
        let mut row = vec![Cell::text(school.as_str())];
        row.extend(
            tally
                .grade_order()
                .iter()
                .map(|grade| Cell::Count(grades.get(grade).copied().unwrap_or(0))),
        );
        table.push_row(row);
    }
    table
}

/// Accommodated entries sorted by school, category and grade number.
fn sorted_entries(tally: &Tally) -> Vec<&AccommodatedEntry> {
    let mut entries: Vec<&AccommodatedEntry> = tally.accommodated().entries().iter().collect();
    entries.sort_by(|a, b| {
        a.school
            .cmp(&b.school)
            .then_with(|| a.category.cmp(&b.category))
            .then_with(|| grade_number(&a.grade).cmp(&grade_number(&b.grade)))
    });
    entries
}

fn grade_number(grade: &str) -> u64 {
    leading_number(grade).unwrap_or(UNNUMBERED_GRADE)
}

/// One row per (school, category, grade).
pub fn normalized(tally: &Tally) -> Table {
    let mut table = Table::new([SCHOOL, CATEGORY, GRADE, QUANTITY]);
    for e in sorted_entries(tally) {
        table.push_row(vec![
            Cell::text(e.school.as_str()),
            Cell::text(e.category.as_str()),
            Cell::text(e.grade.as_str()),
            Cell::Count(e.quantity),
        ]);
    }
    table
}

/// The table the label compositor prints from: one row per non-empty aggregate cell.
pub fn labels(tally: &Tally, track: Track) -> Table {
    match track {
        Track::Standard => {
            let mut table = Table::new([LABEL_SCHOOL, LABEL_GRADE, LABEL_TOTAL]);
            for (school, grades) in tally.standard() {
                for grade in tally.grade_order() {
                    if let Some(&total) = grades.get(grade) {
                        table.push_row(vec![
                            Cell::text(school.as_str()),
                            Cell::text(grade.as_str()),
                            Cell::Count(total),
                        ]);
                    }
                }
            }
            table
        }
        Track::Accommodated => {
            let mut table = Table::new([LABEL_SCHOOL, LABEL_CATEGORY, LABEL_GRADE, LABEL_TOTAL]);
            for e in sorted_entries(tally) {
                table.push_row(vec![
                    Cell::text(e.school.as_str()),
                    Cell::text(e.category.as_str()),
                    Cell::text(e.grade.as_str()),
                    Cell::Count(e.quantity),
                ]);
            }
            table
        }
    }
}
