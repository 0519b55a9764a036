pub mod config_io;
pub mod diagnostics;
pub mod document_io;
pub mod lock;
pub mod watcher;
