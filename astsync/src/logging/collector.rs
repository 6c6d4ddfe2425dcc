//! Per-unit error collection with cargo-style output
//!
//! Batch runs align many units on worker threads; every error or warning
//! logged inside a file context lands here keyed by that unit's path.

use super::events::LogEvent;
use crate::config::constants::compile_time::logging::{
    LOG_BUFFER_SIZE, MAX_ERROR_COLLECTION, MAX_LOG_EVENTS_PER_FILE,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// The unit currently being processed on this thread
#[derive(Debug, Clone)]
pub struct FileProcessingContext {
    pub file_path: PathBuf,
    pub file_id: usize,
    pub start_time: Instant,
}

impl FileProcessingContext {
    pub fn new(file_path: PathBuf, file_id: usize) -> Self {
        Self {
            file_path,
            file_id,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Roll-up of collected events
#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_files: usize,
    pub failed_files: usize,
    pub files_with_warnings: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_processing_time: Duration,
}

impl ProcessingSummary {
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }
}

/// Thread-safe error collector
pub struct ErrorCollector {
    file_events: Mutex<BTreeMap<PathBuf, Vec<LogEvent>>>,
    processing_start: Instant,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            file_events: Mutex::new(BTreeMap::new()),
            processing_start: Instant::now(),
        }
    }

    fn events(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Vec<LogEvent>>> {
        self.file_events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Record an event for a unit; per-file and per-run caps apply
    pub fn record_event(&self, file_path: &Path, event: LogEvent) {
        let mut events = self.events();

        if !events.contains_key(file_path) && events.len() >= MAX_ERROR_COLLECTION {
            return;
        }

        let file_events = events.entry(file_path.to_path_buf()).or_default();

        if file_events.len() < MAX_LOG_EVENTS_PER_FILE {
            file_events.push(event);
        } else if file_events.len() == MAX_LOG_EVENTS_PER_FILE {
            file_events.push(LogEvent::warning(&format!(
                "Too many events for unit (limit: {})",
                MAX_LOG_EVENTS_PER_FILE
            )));
        }
    }

    pub fn get_file_events(&self, file_path: &Path) -> Vec<LogEvent> {
        self.events().get(file_path).cloned().unwrap_or_default()
    }

    pub fn get_file_errors(&self, file_path: &Path) -> Vec<LogEvent> {
        self.events()
            .get(file_path)
            .map(|events| events.iter().filter(|e| e.is_error()).cloned().collect())
            .unwrap_or_default()
    }

    pub fn get_all_file_events(&self) -> BTreeMap<PathBuf, Vec<LogEvent>> {
        self.events().clone()
    }

    pub fn get_files_with_errors(&self) -> Vec<PathBuf> {
        self.events()
            .iter()
            .filter(|(_, events)| events.iter().any(|e| e.is_error()))
            .map(|(path, _)| path.clone())
            .collect()
    }

    pub fn get_summary(&self) -> ProcessingSummary {
        let events = self.events();
        let mut summary = ProcessingSummary {
            total_files: events.len(),
            total_processing_time: self.processing_start.elapsed(),
            ..ProcessingSummary::default()
        };

        for file_events in events.values() {
            let errors = file_events.iter().filter(|e| e.is_error()).count();
            let warnings = file_events.iter().filter(|e| e.is_warning()).count();

            if errors > 0 {
                summary.failed_files += 1;
            } else if warnings > 0 {
                summary.files_with_warnings += 1;
            }
            summary.total_errors += errors;
            summary.total_warnings += warnings;
        }

        summary
    }

    pub fn total_event_count(&self) -> usize {
        self.events().values().map(Vec::len).sum()
    }

    /// (current events, buffer size, fill ratio)
    pub fn get_capacity_info(&self) -> (usize, usize, f64) {
        let current = self.total_event_count();
        let percentage = if LOG_BUFFER_SIZE > 0 {
            current as f64 / LOG_BUFFER_SIZE as f64
        } else {
            0.0
        };
        (current, LOG_BUFFER_SIZE, percentage)
    }

    pub fn clear(&self) {
        self.events().clear();
    }
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn location(file_path: &Path, event: &LogEvent) -> String {
    event
        .span
        .as_ref()
        .map(|s| format!("\n  --> {}:{}", file_path.display(), s.start))
        .unwrap_or_default()
}

/// Format collected errors and warnings the way cargo prints diagnostics
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();

    for (file_path, events) in &collector.get_all_file_events() {
        for event in events.iter().filter(|e| e.is_error()) {
            output.push_str(&format!(
                "error[{}]: {}{}\n",
                event.code.as_str(),
                event.message,
                location(file_path, event)
            ));
            for (key, value) in &event.context {
                if key != "file" && key != "file_id" {
                    output.push_str(&format!("  = {}: {}\n", key, value));
                }
            }
            let action = event.recommended_action();
            if action != "No specific action available" {
                output.push_str(&format!("  = help: {}\n", action));
            }
            output.push('\n');
        }

        for event in events.iter().filter(|e| e.is_warning()) {
            output.push_str(&format!(
                "warning[{}]: {}{}\n\n",
                event.code.as_str(),
                event.message,
                location(file_path, event)
            ));
        }
    }

    let summary = collector.get_summary();
    if summary.total_errors > 0 || summary.total_warnings > 0 {
        output.push_str(&format!(
            "{}: {} error(s), {} warning(s) across {} unit(s)\n",
            if summary.has_errors() { "error" } else { "warning" },
            summary.total_errors,
            summary.total_warnings,
            summary.total_files
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;
    use crate::utils::{SourcePosition, Span};

    #[test]
    fn test_events_grouped_by_file() {
        let collector = ErrorCollector::new();
        let a = PathBuf::from("a.json");
        let b = PathBuf::from("b.json");

        collector.record_event(&a, LogEvent::error(codes::alignment::GRAMMAR_MISMATCH, "x"));
        collector.record_event(&a, LogEvent::warning("y"));
        collector.record_event(&b, LogEvent::warning("z"));

        assert_eq!(collector.get_file_events(&a).len(), 2);
        assert_eq!(collector.get_file_errors(&a).len(), 1);
        assert_eq!(collector.get_files_with_errors(), vec![a]);

        let summary = collector.get_summary();
        assert_eq!(summary.total_files, 2);
        assert_eq!(summary.failed_files, 1);
        assert_eq!(summary.files_with_warnings, 1);
        assert_eq!(summary.total_warnings, 2);
    }

    #[test]
    fn test_per_file_cap_adds_single_overflow_warning() {
        let collector = ErrorCollector::new();
        let path = PathBuf::from("noisy.json");
        for _ in 0..(MAX_LOG_EVENTS_PER_FILE + 10) {
            collector.record_event(&path, LogEvent::info("event"));
        }
        assert_eq!(
            collector.get_file_events(&path).len(),
            MAX_LOG_EVENTS_PER_FILE + 1
        );
    }

    #[test]
    fn test_cargo_style_output() {
        let collector = ErrorCollector::new();
        let path = PathBuf::from("unit.json");
        collector.record_event(
            &path,
            LogEvent::error(codes::alignment::GRAMMAR_MISMATCH, "expected Operator '('")
                .with_span(Span::point(SourcePosition::new(3, 1)))
                .with_context("found", "Operator '['"),
        );

        let output = format_cargo_style_errors(&collector);
        assert!(output.contains("error[E050]: expected Operator '('"));
        assert!(output.contains("--> unit.json:3:2"));
        assert!(output.contains("= found: Operator '['"));
        assert!(output.contains("= help:"));
        assert!(output.contains("1 error(s)"));
    }
}
