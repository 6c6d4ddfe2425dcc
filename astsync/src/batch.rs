//! Directory batches of alignment units
//!
//! Discovers unit files, aligns each one in isolation, and collects the
//! outcome per file. A unit that fails is recorded and the batch moves on
//! unless fail-fast was requested.

use crate::config::constants::compile_time::batch_processing::{
    MAX_FILES_PER_BATCH, MAX_WORKER_THREADS,
};
use crate::config::runtime::{AlignmentPreferences, BatchPreferences};
use crate::logging::{self, codes};
use crate::pipeline::{self, PipelineError, PipelineResult};
use crate::{log_debug, log_error, log_info, log_success, log_warning};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub recursive: bool,
    pub max_files: Option<usize>,
    pub progress_reporting: bool,
    pub fail_fast: bool,
    /// Extension (without the dot) that marks a unit file
    pub unit_extension: String,
    pub alignment: AlignmentPreferences,
}

impl Default for BatchConfig {
    fn default() -> Self {
        let preferences = BatchPreferences::default();
        Self {
            max_threads: thread::available_parallelism()
                .map(|n| n.get().min(MAX_WORKER_THREADS))
                .unwrap_or(4),
            recursive: true,
            max_files: None,
            progress_reporting: preferences.progress_reporting,
            fail_fast: false,
            unit_extension: preferences.unit_extension,
            alignment: AlignmentPreferences::default(),
        }
    }
}

impl BatchConfig {
    pub fn sequential(mut self) -> Self {
        self.max_threads = 1;
        self
    }

    /// Thread count clamped to the build-time ceiling
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.max_threads = threads.clamp(1, MAX_WORKER_THREADS);
        self
    }
}

#[derive(Debug, Default)]
pub struct BatchResults {
    pub successful_files: Vec<(PathBuf, PipelineResult)>,
    pub failed_files: Vec<(PathBuf, PipelineError)>,
    pub processing_duration: Duration,
    pub files_processed: usize,
    pub files_discovered: usize,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_count(&self) -> usize {
        self.successful_files.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed_files.len()
    }

    pub fn success_rate(&self) -> f64 {
        if self.files_processed == 0 {
            0.0
        } else {
            self.successful_files.len() as f64 / self.files_processed as f64
        }
    }

    pub fn add_success(&mut self, file_path: PathBuf, result: PipelineResult) {
        self.successful_files.push((file_path, result));
        self.files_processed += 1;
    }

    pub fn add_failure(&mut self, file_path: PathBuf, error: PipelineError) {
        self.failed_files.push((file_path, error));
        self.files_processed += 1;
    }

    pub fn merge(&mut self, other: BatchResults) {
        self.successful_files.extend(other.successful_files);
        self.failed_files.extend(other.failed_files);
        self.files_processed += other.files_processed;
    }

    /// Order both lists by path so parallel runs report like sequential ones
    pub fn sort(&mut self) {
        self.successful_files.sort_by(|a, b| a.0.cmp(&b.0));
        self.failed_files.sort_by(|a, b| a.0.cmp(&b.0));
    }

    pub fn total_tokens(&self) -> usize {
        self.successful_files
            .iter()
            .map(|(_, r)| r.unit.token_count())
            .sum()
    }

    pub fn summary(&self) -> String {
        format!(
            "Aligned {} of {} units ({:.1}%), {} failed, {} tokens, {:.2}s",
            self.success_count(),
            self.files_processed,
            self.success_rate() * 100.0,
            self.failure_count(),
            self.total_tokens(),
            self.processing_duration.as_secs_f64()
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("No unit files (*.{extension}) found in directory: {path}")]
    NoFilesFound { path: String, extension: String },

    #[error("Too many unit files: {count} (max: {max})")]
    TooManyFiles { count: usize, max: usize },

    #[error("I/O error during directory traversal of {path}: {message}")]
    IoError { path: String, message: String },

    #[error("Worker error: {message}")]
    ThreadError { message: String },
}

impl BatchError {
    pub fn error_code(&self) -> logging::Code {
        match self {
            BatchError::TooManyFiles { .. } => codes::batch::TOO_MANY_FILES,
            BatchError::ThreadError { .. } => codes::system::LOCK_POISONED,
            _ => codes::batch::DISCOVERY_FAILED,
        }
    }
}

// ============================================================================
// DISCOVERY
// ============================================================================

/// Unit files under `dir_path`, sorted
pub fn discover_unit_files(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<Vec<PathBuf>, BatchError> {
    log_info!("Starting unit discovery",
        "directory" => dir_path.display(),
        "recursive" => config.recursive,
        "extension" => config.unit_extension
    );

    if !dir_path.is_dir() {
        return Err(BatchError::DirectoryNotFound {
            path: dir_path.display().to_string(),
        });
    }

    let limit = config
        .max_files
        .map_or(MAX_FILES_PER_BATCH, |max| max.min(MAX_FILES_PER_BATCH));
    let mut files = Vec::new();
    visit_directory(dir_path, &mut files, config, limit)?;

    if files.is_empty() {
        return Err(BatchError::NoFilesFound {
            path: dir_path.display().to_string(),
            extension: config.unit_extension.clone(),
        });
    }

    files.sort();

    log_debug!("Unit discovery completed",
        "files_found" => files.len(),
        "directory" => dir_path.display()
    );
    Ok(files)
}

fn visit_directory(
    dir_path: &Path,
    files: &mut Vec<PathBuf>,
    config: &BatchConfig,
    limit: usize,
) -> Result<(), BatchError> {
    let io_error = |e: std::io::Error| BatchError::IoError {
        path: dir_path.display().to_string(),
        message: e.to_string(),
    };

    let mut entries: Vec<PathBuf> = fs::read_dir(dir_path)
        .map_err(io_error)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()
        .map_err(io_error)?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            if config.recursive {
                visit_directory(&path, files, config, limit)?;
            }
        } else if is_unit_file(&path, &config.unit_extension) {
            if files.len() >= limit {
                if config.max_files.is_some_and(|max| max <= MAX_FILES_PER_BATCH) {
                    log_warning!(codes::warnings::UNIT_SKIPPED,
                        "Reached maximum file limit",
                        "limit" => limit,
                        "skipped" => path.display()
                    );
                    return Ok(());
                }
                return Err(BatchError::TooManyFiles {
                    count: files.len() + 1,
                    max: MAX_FILES_PER_BATCH,
                });
            }
            files.push(path);
        }
    }
    Ok(())
}

fn is_unit_file(path: &Path, extension: &str) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

// ============================================================================
// PROCESSING
// ============================================================================

pub fn process_directory(dir_path: &Path) -> Result<BatchResults, BatchError> {
    process_directory_with_config(dir_path, &BatchConfig::default())
}

pub fn process_directory_with_config(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    if config.max_threads <= 1 {
        process_directory_sequential(dir_path, config)
    } else {
        process_directory_parallel(dir_path, config)
    }
}

pub fn process_directory_sequential(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();
    log_info!("Starting sequential batch", "directory" => dir_path.display());

    let files = discover_unit_files(dir_path, config)?;
    let mut results = BatchResults::new();
    results.files_discovered = files.len();

    for (file_id, file_path) in files.iter().enumerate() {
        if config.progress_reporting {
            println!(
                "Aligning unit {} of {}: {}",
                file_id + 1,
                files.len(),
                file_path.display()
            );
        }

        let failed = process_one(file_path, file_id, config, &mut results);
        if failed && config.fail_fast {
            log_warning!(codes::warnings::UNIT_SKIPPED,
                "Fail-fast: stopping after first failed unit",
                "remaining" => files.len() - file_id - 1
            );
            break;
        }
    }

    results.processing_duration = start_time.elapsed();
    log_batch_complete(&results, 1);
    Ok(results)
}

pub fn process_directory_parallel(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();
    let threads = config.max_threads.clamp(1, MAX_WORKER_THREADS);
    log_info!("Starting parallel batch",
        "directory" => dir_path.display(),
        "threads" => threads
    );

    let files = discover_unit_files(dir_path, config)?;
    let mut results = BatchResults::new();
    results.files_discovered = files.len();

    let chunk_size = calculate_chunk_size(files.len(), threads);
    for (chunk_id, chunk) in files.chunks(chunk_size).enumerate() {
        let offset = chunk_id * chunk_size;
        results.merge(process_chunk_parallel(chunk, offset, threads, config)?);

        if config.progress_reporting {
            println!(
                "Aligned {} of {} units",
                results.files_processed,
                files.len()
            );
        }
        if config.fail_fast && results.failure_count() > 0 {
            log_warning!(codes::warnings::UNIT_SKIPPED,
                "Fail-fast: stopping after chunk with failed units",
                "remaining" => files.len() - results.files_processed
            );
            break;
        }
    }

    results.sort();
    results.processing_duration = start_time.elapsed();
    log_batch_complete(&results, threads);
    Ok(results)
}

/// Align one file under its own logging context; true if it failed
fn process_one(
    file_path: &Path,
    file_id: usize,
    config: &BatchConfig,
    results: &mut BatchResults,
) -> bool {
    logging::with_file_context(file_path.to_path_buf(), file_id, || {
        let outcome = match file_path.to_str() {
            Some(path) => pipeline::process_file_with_preferences(path, &config.alignment),
            None => Err(PipelineError::pipeline_error("unit path is not valid UTF-8")),
        };
        match outcome {
            Ok(result) => {
                results.add_success(file_path.to_path_buf(), result);
                false
            }
            Err(error) => {
                log_error!(error.error_code(), "Unit failed",
                    "file" => file_path.display(),
                    "file_id" => file_id,
                    "error" => error
                );
                results.add_failure(file_path.to_path_buf(), error);
                true
            }
        }
    })
}

fn process_chunk_parallel(
    files: &[PathBuf],
    offset: usize,
    threads: usize,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let shared = Arc::new(Mutex::new(BatchResults::new()));
    let per_thread = files.len().div_ceil(threads);

    let mut handles = Vec::new();
    for (thread_id, slice) in files.chunks(per_thread.max(1)).enumerate() {
        let thread_files = slice.to_vec();
        let shared = Arc::clone(&shared);
        let config = config.clone();
        let first_id = offset + thread_id * per_thread;

        handles.push(thread::spawn(move || {
            for (local_id, file_path) in thread_files.iter().enumerate() {
                let mut local = BatchResults::new();
                process_one(file_path, first_id + local_id, &config, &mut local);
                shared
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .merge(local);
            }
        }));
    }

    for handle in handles {
        handle.join().map_err(|_| BatchError::ThreadError {
            message: "worker panicked while aligning a unit".to_string(),
        })?;
    }

    let mutex = Arc::try_unwrap(shared).map_err(|_| BatchError::ThreadError {
        message: "batch results still shared after workers joined".to_string(),
    })?;
    Ok(mutex.into_inner().unwrap_or_else(PoisonError::into_inner))
}

fn calculate_chunk_size(file_count: usize, threads: usize) -> usize {
    const MAX_CHUNK_SIZE: usize = 64;
    file_count.div_ceil(threads.max(1)).clamp(1, MAX_CHUNK_SIZE)
}

fn log_batch_complete(results: &BatchResults, threads: usize) {
    log_success!(codes::success::BATCH_COMPLETE, "Batch complete",
        "files_processed" => results.files_processed,
        "successful" => results.success_count(),
        "failed" => results.failure_count(),
        "threads" => threads,
        "duration_ms" => format!("{:.2}", results.processing_duration.as_secs_f64() * 1000.0)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{NodeKind, TreeBuilder};
    use crate::tokens::TokenStreamBuilder;
    use crate::unit::AlignmentUnit;
    use tempfile::tempdir;

    fn write_unit(dir: &Path, name: &str, source: &str) {
        let tokens = TokenStreamBuilder::from_source(source);
        let mut t = TreeBuilder::new();
        let pass = t.add_at(NodeKind::Pass, 1, 0);
        let module = t.module(vec![pass]);
        let nodes = t.finish(module).unwrap();
        let unit = AlignmentUnit::new(name, tokens, nodes, module).unwrap();
        fs::write(dir.join(name), serde_json::to_string(&unit).unwrap()).unwrap();
    }

    fn quiet() -> BatchConfig {
        BatchConfig {
            progress_reporting: false,
            unit_extension: "json".to_string(),
            ..BatchConfig::default()
        }
    }

    #[test]
    fn test_discovery_filters_and_recurses() {
        let dir = tempdir().unwrap();
        write_unit(dir.path(), "a.json", "pass\n");
        fs::create_dir(dir.path().join("nested")).unwrap();
        write_unit(&dir.path().join("nested"), "b.json", "pass\n");
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let files = discover_unit_files(dir.path(), &quiet()).unwrap();
        assert_eq!(files.len(), 2);

        let flat = BatchConfig { recursive: false, ..quiet() };
        assert_eq!(discover_unit_files(dir.path(), &flat).unwrap().len(), 1);
    }

    #[test]
    fn test_max_files_truncates() {
        let dir = tempdir().unwrap();
        for name in ["a.json", "b.json", "c.json"] {
            write_unit(dir.path(), name, "pass\n");
        }
        let config = BatchConfig { max_files: Some(2), ..quiet() };
        assert_eq!(discover_unit_files(dir.path(), &config).unwrap().len(), 2);
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            discover_unit_files(dir.path(), &quiet()),
            Err(BatchError::NoFilesFound { .. })
        ));
    }

    #[test]
    fn test_failing_unit_does_not_stop_batch() {
        let dir = tempdir().unwrap();
        write_unit(dir.path(), "a.json", "pass\n");
        write_unit(dir.path(), "b.json", "break\n");
        write_unit(dir.path(), "c.json", "pass\n");

        let sequential = process_directory_with_config(dir.path(), &quiet().sequential()).unwrap();
        assert_eq!(sequential.success_count(), 2);
        assert_eq!(sequential.failure_count(), 1);
        assert!(sequential.failed_files[0].0.ends_with("b.json"));

        let parallel = process_directory_with_config(dir.path(), &quiet().with_threads(2)).unwrap();
        assert_eq!(parallel.success_count(), 2);
        assert_eq!(parallel.failure_count(), 1);
    }

    #[test]
    fn test_fail_fast_stops_sequential_batch() {
        let dir = tempdir().unwrap();
        write_unit(dir.path(), "a.json", "break\n");
        write_unit(dir.path(), "b.json", "pass\n");

        let config = BatchConfig { fail_fast: true, ..quiet().sequential() };
        let results = process_directory_with_config(dir.path(), &config).unwrap();
        assert_eq!(results.files_processed, 1);
        assert_eq!(results.files_discovered, 2);
    }

    #[test]
    fn test_chunk_size() {
        assert_eq!(calculate_chunk_size(100, 4), 25);
        assert_eq!(calculate_chunk_size(10, 4), 3);
        assert_eq!(calculate_chunk_size(0, 4), 1);
        assert_eq!(calculate_chunk_size(1000, 4), 64);
    }
}
