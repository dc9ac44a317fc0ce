pub mod join;
pub mod mapping;
pub mod pipeline;
pub mod present;
pub mod table;

pub use join::{join_tables, DuplicatePolicy, JoinReport, MatchOutcome};
pub use mapping::{FieldMapping, Preset, ProjectionField};
pub use present::{copy_grid, ClipboardSink, Notice, Presenter, TextGrid};
pub use table::{parse_table, Row, Table};
