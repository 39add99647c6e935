use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::generate_point::DEFAULT_MAX_TRIALS;

/// How a sampled point is written in place of a placeholder marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointStyle {
    /// `(x y)`, keeping the surrounding WKT valid.
    #[default]
    Coordinates,
    /// `(POINT (x y))`.
    Tagged,
}

/// What to do with data rows too short to reach the WKT column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowPolicy {
    #[default]
    Lenient,
    Strict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairOptions {
    pub max_trials: usize,
    /// Re-scan rounds per value before giving up on a persisting placeholder.
    pub max_rounds: usize,
    /// Fixed decimal places; `None` writes the shortest exact form.
    pub precision: Option<usize>,
    pub point_style: PointStyle,
    pub row_policy: RowPolicy,
    pub delimiter: char,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            max_trials: DEFAULT_MAX_TRIALS,
            max_rounds: 64,
            precision: None,
            point_style: PointStyle::default(),
            row_policy: RowPolicy::default(),
            delimiter: ',',
        }
    }
}

impl RepairOptions {
    pub fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(Error::InvalidDelimiter(self.delimiter))
        }
    }
}
