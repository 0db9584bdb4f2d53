use chrono::{DateTime, Local};
use log::{Level, Metadata, Record};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub target: String,
    pub message: String,
}

impl LogEntry {
    /// One-line form for a status bar
    pub fn status_line(&self) -> String {
        format!(
            "{} [{}] {}",
            self.timestamp.format("%H:%M:%S"),
            self.level,
            self.message
        )
    }
}

/// In-memory log sink keeping the most recent entries of this session.
///
/// Clones share the same buffer, so one clone can be installed as the
/// global logger while another is kept for reading.
#[derive(Clone)]
pub struct SessionLogger {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    max_entries: usize,
    level: Level,
}

impl SessionLogger {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::new())),
            max_entries: max_entries.max(1),
            level: Level::Info,
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Install a clone of this logger as the global `log` sink
    pub fn init(&self) -> Result<(), log::SetLoggerError> {
        log::set_boxed_logger(Box::new(self.clone()))?;
        log::set_max_level(self.level.to_level_filter());
        Ok(())
    }

    // A panic while holding the lock leaves the buffer usable
    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().iter().cloned().collect()
    }

    pub fn latest_message(&self) -> Option<String> {
        self.lock().back().map(|entry| entry.message.clone())
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn push(&self, entry: LogEntry) {
        let mut entries = self.lock();
        entries.push_back(entry);
        while entries.len() > self.max_entries {
            entries.pop_front();
        }
    }
}

impl log::Log for SessionLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.push(LogEntry {
                timestamp: Local::now(),
                level: record.level(),
                target: record.target().to_string(),
                message: format!("{}", record.args()),
            });
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    fn record(logger: &SessionLogger, level: Level, message: &str) {
        logger.log(
            &Record::builder()
                .level(level)
                .target("pdf_booklet")
                .args(format_args!("{message}"))
                .build(),
        );
    }

    #[test]
    fn test_keeps_most_recent_entries() {
        let logger = SessionLogger::new(2);
        record(&logger, Level::Info, "first");
        record(&logger, Level::Info, "second");
        record(&logger, Level::Warn, "third");

        let messages: Vec<_> = logger.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["second", "third"]);
        assert_eq!(logger.latest_message().as_deref(), Some("third"));
    }

    #[test]
    fn test_filters_by_level() {
        let logger = SessionLogger::new(10);
        record(&logger, Level::Debug, "hidden");
        assert!(logger.entries().is_empty());

        let verbose = SessionLogger::new(10).with_level(Level::Debug);
        record(&verbose, Level::Debug, "shown");
        assert_eq!(verbose.entries().len(), 1);
    }

    #[test]
    fn test_clones_share_entries() {
        let logger = SessionLogger::new(10);
        let reader = logger.clone();
        record(&logger, Level::Error, "boom");

        assert!(reader.entries()[0].status_line().contains("[ERROR] boom"));
        reader.clear();
        assert!(logger.latest_message().is_none());
    }
}
