use std::path::PathBuf;

mod logger;
mod worker;

pub use logger::{LogEntry, SessionLogger};
pub use worker::worker_task;

// Re-export types from the library crate
pub use pdf_booklet::{ExportOptions, ImpositionStatistics, PageSequence};

/// Commands sent from UI to worker
#[derive(Debug)]
pub enum BookletCommand {
    /// Load a new primary document, replacing the current one
    Load { path: PathBuf },
    Export {
        sequence: PageSequence,
        options: ExportOptions,
        output_path: PathBuf,
    },
    /// Cancel the export in flight, if any
    Cancel,
}

/// Updates sent from worker to UI
#[derive(Debug, Clone)]
pub enum BookletUpdate {
    Loaded {
        path: PathBuf,
        page_count: usize,
    },
    Progress {
        operation: String,
        percent: u8,
    },
    ExportComplete {
        path: PathBuf,
        /// Size of the written file
        bytes: usize,
    },
    ExportCancelled,
    Error {
        message: String,
    },
}
