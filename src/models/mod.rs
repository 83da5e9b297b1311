pub mod loaders;
pub mod record;
pub mod result_queue;
pub mod schema;
pub mod stats;

pub use loaders::{load_task, scan_input_files};
pub use record::{AnalysisRecord, AnalysisTask};
pub use result_queue::ResultQueue;
pub use schema::{legacy_aliases, ColumnSpec, CsvSchema};
pub use stats::{BatchStats, StatsSnapshot};
