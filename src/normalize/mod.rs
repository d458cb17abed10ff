//! Pure text normalizers for school names and grade labels.
mod grade;
mod name;

pub use grade::{leading_number, normalize_grade, strip_ano};
pub use name::normalize_school_name;
