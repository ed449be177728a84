//! MemoryLogger - テスト用 Logger（記録をメモリに溜める）

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::ports::Logger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
}

/// Clones share one record buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogger {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn push(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        // a poisoned buffer still takes records: logging must not fail
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(LogRecord {
                level,
                message: args.to_string(),
            });
    }
}

impl Logger for MemoryLogger {
    fn error(&self, args: fmt::Arguments<'_>) {
        self.push(LogLevel::Error, args);
    }

    fn info(&self, args: fmt::Arguments<'_>) {
        self.push(LogLevel::Info, args);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_formatted_messages_in_order() {
        let logger = MemoryLogger::new();

        logger.error(format_args!("render failed for {}: {}", "job-42", 500));
        logger.info(format_args!("retrying"));

        assert_eq!(
            logger.records(),
            vec![
                LogRecord {
                    level: LogLevel::Error,
                    message: "render failed for job-42: 500".to_string(),
                },
                LogRecord {
                    level: LogLevel::Info,
                    message: "retrying".to_string(),
                },
            ]
        );
    }

    #[test]
    fn separate_loggers_do_not_share_records() {
        let a = MemoryLogger::new();
        let b = MemoryLogger::new();

        a.error(format_args!("boom"));

        assert_eq!(a.records().len(), 1);
        assert!(b.records().is_empty());
    }
}
