//! Row filters over the SCC reference table and the combined record table.
//!
//! The two tables are joined through an SCC code set: [`scc::scc_codes`]
//! extracts it from a filtered reference table, and the record filters in
//! [`poll`] test membership against it.

pub mod poll;
pub mod scc;

use serde::Deserialize;

use crate::error::InventoryError;

pub use poll::{filter_poll_data, filter_poll_data_with_capacity};
pub use scc::{filter_scc_data, scc_codes};

/// One value or an explicit list of values (keywords, pollutant codes).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Selection {
    One(String),
    Many(Vec<String>),
}

impl Selection {
    pub fn values(&self) -> &[String] {
        match self {
            Selection::One(value) => std::slice::from_ref(value),
            Selection::Many(values) => values,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    pub fn contains(&self, candidate: &str) -> bool {
        self.values().iter().any(|v| v == candidate)
    }
}

impl From<&str> for Selection {
    fn from(value: &str) -> Self {
        Selection::One(value.to_string())
    }
}

impl From<Vec<&str>> for Selection {
    fn from(values: Vec<&str>) -> Self {
        Selection::Many(values.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for Selection {
    fn from(values: Vec<String>) -> Self {
        Selection::Many(values)
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.values().join(", "))
    }
}

/// Level of the SCC hierarchy a keyword search runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SccLevel {
    One,
    Two,
    Three,
    Four,
}

impl SccLevel {
    /// Name of the reference-table column holding this level's labels.
    pub fn column(self) -> &'static str {
        match self {
            SccLevel::One => "scc level one",
            SccLevel::Two => "scc level two",
            SccLevel::Three => "scc level three",
            SccLevel::Four => "scc level four",
        }
    }
}

impl TryFrom<u8> for SccLevel {
    type Error = InventoryError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(SccLevel::One),
            2 => Ok(SccLevel::Two),
            3 => Ok(SccLevel::Three),
            4 => Ok(SccLevel::Four),
            other => Err(InventoryError::InvalidArgument(format!(
                "scc_level must be one of [1, 2, 3, 4], got {other}"
            ))),
        }
    }
}
