pub mod text_loader;

pub use text_loader::{load_task, scan_input_files};
