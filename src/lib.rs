mod aggregate;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod files;
pub mod labels;
pub mod model;
mod normalize;
mod order;
pub mod pipeline;
mod report;
pub mod source;
mod utils;

#[cfg(test)]
mod test;

pub use aggregate::{AccommodatedAggregate, AccommodatedEntry, Aggregator, StandardAggregate, Tally};
pub use config::Config;
pub use error::{Error, Result, RosterError, Warning};
pub use normalize::{normalize_grade, normalize_school_name};
pub use order::order_grades;
