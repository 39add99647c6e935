use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("no layer selected: {0}")]
    LayerNotSelected(String),

    #[error("input cancelled: {0}")]
    InputCancelled(String),

    #[error("column '{column}' not found in header {header:?}")]
    ColumnNotFound { column: String, header: Vec<String> },

    #[error("destination {} already exists", .0.display())]
    FileExists(PathBuf),

    #[error("no point inside the boundary after {trials} trials (area {area}, bbox area {bbox_area})")]
    DegeneratePolygon {
        trials: usize,
        area: f64,
        bbox_area: f64,
    },

    #[error("boundary has no usable polygon: {0}")]
    EmptyBoundary(String),

    #[error("row {row} has {fields} fields, expected more than {index}")]
    MalformedRow {
        row: usize,
        fields: usize,
        index: usize,
    },

    #[error("table has no header row")]
    EmptyTable,

    #[error("placeholders still present in row {row} after {rounds} rounds")]
    PlaceholderPersisted { row: usize, rounds: usize },

    #[error("delimiter {0:?} is not a single-byte ASCII character")]
    InvalidDelimiter(char),

    #[error("unsupported layer source '{0}'")]
    UnsupportedSource(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Shapefile(#[from] shapefile::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
