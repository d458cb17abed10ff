//! Classifies student records into the standard and accommodated tracks and accumulates their
//! counts. One `Aggregator` lives for exactly one run.

use crate::model::{StudentRecord, Track, NOT_INFORMED};
use crate::normalize::{normalize_grade, normalize_school_name, strip_ano};
use crate::order::order_grades;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, trace};

/// school -> (grade -> count) for standard-track records.
pub type StandardAggregate = BTreeMap<String, BTreeMap<String, u64>>;

/// One (school, category, grade) cell of the accommodated track.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct AccommodatedEntry {
    pub school: String,
    pub category: String,
    pub grade: String,
    pub quantity: u64,
}

/// Accommodated-track entries in first-seen order, with at most one entry per
/// (school, category, grade).
#[derive(Default, Debug, Clone)]
pub struct AccommodatedAggregate {
    entries: Vec<AccommodatedEntry>,
    index: HashMap<(String, String, String), usize>,
}

impl AccommodatedAggregate {
    /// Adds `quantity` to the matching entry, creating it if needed.
    pub fn upsert(&mut self, school: &str, category: &str, grade: &str, quantity: u64) {
        let key = (school.to_string(), category.to_string(), grade.to_string());
        match self.index.get(&key) {
            Some(&ix) => self.entries[ix].quantity += quantity,
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(AccommodatedEntry {
                    school: school.to_string(),
                    category: category.to_string(),
                    grade: grade.to_string(),
                    quantity,
                });
            }
        }
    }

    pub fn entries(&self) -> &[AccommodatedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.quantity).sum()
    }
}

/// A record after normalization, ready to be counted.
#[derive(Debug, Clone)]
struct Normalized {
    school: String,
    grade: String,
    category: String,
    count: u64,
}

/// Accumulates records for one run. Call `ingest` for every record and `finish` once.
#[derive(Default, Debug)]
pub struct Aggregator {
    standard: StandardAggregate,
    accommodated: AccommodatedAggregate,
    grades: Vec<String>,
    seen_grades: HashSet<String>,
    counted_schools: HashSet<String>,
    zero_rows: Vec<Normalized>,
    zero_schools: HashSet<String>,
    records: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes, classifies and counts one record. Records without a grade or a school are
    /// skipped. Zero-count records are held back until `finish`.
    pub fn ingest(&mut self, record: StudentRecord) {
        let grade = normalize_grade(&record.grade);
        if grade.is_empty() {
            trace!("Skipping record without a grade: {record:?}");
            return;
        }
        let school = normalize_school_name(&record.school);
        if school.is_empty() {
            trace!("Skipping record without a school: {record:?}");
            return;
        }
        let row = Normalized {
            school,
            grade,
            category: record.category.trim().to_string(),
            count: record.count,
        };
        self.records += 1;
        self.standard.entry(row.school.clone()).or_default();

        if row.count == 0 {
            if self.zero_schools.insert(row.school.clone()) {
                self.zero_rows.push(row);
            }
            return;
        }
        self.counted_schools.insert(row.school.clone());
        self.count(row);
    }

    fn count(&mut self, row: Normalized) {
        if self.seen_grades.insert(row.grade.clone()) {
            self.grades.push(row.grade.clone());
        }
        match Track::classify(&row.category) {
            Track::Standard => {
                *self
                    .standard
                    .entry(row.school)
                    .or_default()
                    .entry(row.grade)
                    .or_default() += row.count;
            }
            Track::Accommodated => {
                let category = if row.category.is_empty() {
                    NOT_INFORMED
                } else {
                    row.category.as_str()
                };
                let grade = strip_ano(&row.grade);
                self.accommodated
                    .upsert(&row.school, category, &grade, row.count);
            }
        }
    }

    /// Keeps one zero-count row for every school that has no positive count, then freezes the
    /// aggregates and computes the grade order.
    pub fn finish(mut self) -> Tally {
        let zero_rows = std::mem::take(&mut self.zero_rows);
        for row in zero_rows {
            if self.counted_schools.contains(&row.school) {
                continue;
            }
            debug!(
                "School '{}' only has zero counts, keeping one row for it",
                row.school
            );
            self.count(row);
        }
        let grade_order = order_grades(self.grades.iter().cloned());
        Tally {
            standard: self.standard,
            accommodated: self.accommodated,
            grade_order,
            records: self.records,
        }
    }
}

/// The frozen result of a run's aggregation.
#[derive(Debug, Clone)]
pub struct Tally {
    standard: StandardAggregate,
    accommodated: AccommodatedAggregate,
    grade_order: Vec<String>,
    records: usize,
}

impl Tally {
    pub fn standard(&self) -> &StandardAggregate {
        &self.standard
    }

    pub fn accommodated(&self) -> &AccommodatedAggregate {
        &self.accommodated
    }

    pub fn grade_order(&self) -> &[String] {
        &self.grade_order
    }

    /// Number of records that were ingested (including held-back zero-count ones).
    pub fn records(&self) -> usize {
        self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records == 0
    }

    pub fn standard_total(&self) -> u64 {
        self.standard.values().flat_map(|grades| grades.values()).sum()
    }

    pub fn schools(&self) -> usize {
        self.standard.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::STANDARD_CATEGORY;

    fn standard(school: &str, grade: &str, count: u64) -> StudentRecord {
        StudentRecord::new(school, grade, STANDARD_CATEGORY, count)
    }

    #[test]
    fn test_standard_literal_only_counts_standard() {
        let mut agg = Aggregator::new();
        agg.ingest(standard("Tucano", "1° ano", 1));
        agg.ingest(standard("Tucano", "1° ano", 1));
        let tally = agg.finish();
        assert_eq!(tally.standard()["TUCANO"]["1° ano"], 2);
        assert!(tally.accommodated().is_empty());
    }

    #[test]
    fn test_accommodated_upserts_instead_of_duplicating() {
        let mut agg = Aggregator::new();
        agg.ingest(StudentRecord::new("Tucano", "3° ano", "TEA", 1));
        agg.ingest(StudentRecord::new("Tucano", "3° ano", " TEA ", 2));
        agg.ingest(StudentRecord::new("Tucano", "3° ano", "", 1));
        let tally = agg.finish();
        let entries = tally.accommodated().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].category, "TEA");
        assert_eq!(entries[0].grade, "3°");
        assert_eq!(entries[0].quantity, 3);
        assert_eq!(entries[1].category, NOT_INFORMED);
        assert_eq!(tally.standard()["TUCANO"].values().sum::<u64>(), 0);
    }

    #[test]
    fn test_blank_grade_is_skipped() {
        let mut agg = Aggregator::new();
        agg.ingest(standard("Tucano", "  ", 4));
        let tally = agg.finish();
        assert!(tally.is_empty());
        assert!(tally.standard().is_empty());
    }

    #[test]
    fn test_zero_only_school_keeps_one_row() {
        let mut agg = Aggregator::new();
        agg.ingest(standard("Arara", "1º ANO", 0));
        agg.ingest(standard("Arara", "2º ANO", 0));
        agg.ingest(standard("Boto", "1º ANO", 0));
        agg.ingest(standard("Boto", "2º ANO", 5));
        let tally = agg.finish();
        assert_eq!(tally.standard()["ARARA"].len(), 1);
        assert_eq!(tally.standard()["ARARA"]["1º ANO"], 0);
        assert_eq!(tally.standard()["BOTO"].len(), 1);
        assert_eq!(tally.standard()["BOTO"]["2º ANO"], 5);
        assert_eq!(tally.standard_total(), 5);
    }

    #[test]
    fn test_zero_only_accommodated_school_keeps_one_entry() {
        let mut agg = Aggregator::new();
        agg.ingest(StudentRecord::new("Arara", "1º ANO", "TDAH", 0));
        agg.ingest(StudentRecord::new("Arara", "2º ANO", "TDAH", 0));
        let tally = agg.finish();
        assert_eq!(tally.accommodated().len(), 1);
        assert_eq!(tally.accommodated().entries()[0].quantity, 0);
        assert!(tally.standard().contains_key("ARARA"));
    }

    #[test]
    fn test_every_school_gets_a_standard_row() {
        let mut agg = Aggregator::new();
        agg.ingest(StudentRecord::new("Boto", "1º ANO", "TEA", 1));
        let tally = agg.finish();
        assert_eq!(tally.schools(), 1);
        assert!(tally.standard()["BOTO"].is_empty());
    }

    #[test]
    fn test_grade_order_covers_both_tracks() {
        let mut agg = Aggregator::new();
        agg.ingest(standard("A", "EJA 1", 1));
        agg.ingest(StudentRecord::new("A", "3", "TEA", 1));
        agg.ingest(standard("A", "1", 1));
        let tally = agg.finish();
        assert_eq!(tally.grade_order(), &["1 ANO", "3 ANO", "EJA 1"]);
    }
}
