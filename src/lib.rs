//! Viewer for legislator campaign-finance records: a dataset engine with
//! name search and per-column sort, plus the terminal front end around it.

pub mod controller;
pub mod domain;
pub mod engine;
pub mod fields;
pub mod format;
pub mod inputter;
pub mod loader;
pub mod model;
pub mod record;
pub mod sink;
pub mod ui;

pub use domain::{FvError, ViewerConfig};
pub use engine::{DatasetEngine, ViewSink};
pub use fields::{FieldId, FieldKind, SortDirection};
pub use format::{DisplayRow, format_currency, format_metric};
pub use loader::Source;
pub use record::{Metric, Record};
