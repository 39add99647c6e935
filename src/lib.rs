mod boundary;
pub use boundary::Boundary;

mod generate_point;
pub use generate_point::DEFAULT_MAX_TRIALS;
pub use generate_point::{random_point_in_boundary, random_rounded_point_in_boundary, round_point};
pub use generate_point::random_point_in_rect;

mod load_boundary;
pub use load_boundary::FeatureSelection;
pub use load_boundary::load_boundary;
pub use load_boundary::load_polygon_records;

mod placeholder;
pub use placeholder::{Filled, Placeholder, fill_placeholders, format_point, has_placeholder};

mod table;
pub use table::{DelimitedTable, LineEnding, read_header};

mod repair;
pub use repair::{RepairReport, repair_file, repair_wkt_column};

mod clone_source;
pub use clone_source::{Overwrite, clone_destination, clone_source};

mod layer_uri;
pub use layer_uri::{DEFAULT_CRS, DELIMITED_TEXT_PROVIDER, delimited_text_uri, source_path};

pub mod catalog;
pub mod prompt;

mod workflow;
pub use workflow::{RunSummary, run};

mod config;
pub use config::{PointStyle, RepairOptions, RowPolicy};

mod error;
pub use error::{Error, Result};
