//! Total order over grade labels: regular grades first, adult-education (`EJA`) grades last, each
//! group ascending by the first number in the label.

use crate::normalize::leading_number;

/// Sort key of a grade label. Numbered labels sort before unnumbered ones, in either group, so a
/// bare `EJA` comes after `EJAI 1`. Unnumbered labels sort by their text.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum GradeKey<'a> {
    Numbered(u64),
    Named(&'a str),
}

impl<'a> GradeKey<'a> {
    pub fn of(label: &'a str) -> Self {
        match leading_number(label) {
            Some(n) => GradeKey::Numbered(n),
            None => GradeKey::Named(label),
        }
    }
}

/// True for adult-education labels.
pub fn is_adult_education(label: &str) -> bool {
    label.to_uppercase().contains("EJA")
}

/// Orders grade labels. Labels with equal keys keep their input order.
pub fn order_grades<I, S>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let (mut regular, mut adult): (Vec<String>, Vec<String>) = labels
        .into_iter()
        .map(Into::into)
        .partition(|label| !is_adult_education(label));
    regular.sort_by(|a, b| GradeKey::of(a).cmp(&GradeKey::of(b)));
    adult.sort_by(|a, b| GradeKey::of(a).cmp(&GradeKey::of(b)));
    regular.extend(adult);
    regular
}
