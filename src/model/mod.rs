//! Types that represent the data model: raw input sheets, resolved column mappings, student
//! records and the typed tables the reports are built into.
mod mapping;
mod record;
mod sheet;
mod table;

pub use mapping::{CanonicalField, ColumnMapping, Header};
pub use record::{parse_count, StudentRecord, Track, NOT_INFORMED, STANDARD_CATEGORY};
pub use sheet::{NamedSheet, RawSheet, Workbook};
pub use table::{Cell, Table};
