//! Error, warning and success codes with their classification metadata
//!
//! Every fallible stage maps its error variants onto a [`Code`]; severity,
//! halt policy and the remediation hint shown in cargo-style output are
//! looked up here rather than hard-coded at the call site.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Universal code wrapper for error, warning and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const LOCK_POISONED: Code = Code::new("ERR003");
}

/// Unit file reading errors
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
}

/// Unit structure errors (token stream and node arena consistency)
pub mod unit {
    use super::Code;

    pub const INVALID_UNIT_FORMAT: Code = Code::new("E020");
    pub const EMPTY_TOKEN_STREAM: Code = Code::new("E021");
    pub const MISSING_END_MARKER: Code = Code::new("E022");
    pub const INVALID_NODE_REFERENCE: Code = Code::new("E023");
    pub const NODE_REACHED_TWICE: Code = Code::new("E024");
    pub const TOO_MANY_TOKENS: Code = Code::new("E026");
    pub const TOO_MANY_NODES: Code = Code::new("E027");
}

/// Alignment errors raised by the traversal
pub mod alignment {
    use super::Code;

    pub const GRAMMAR_MISMATCH: Code = Code::new("E050");
    pub const UNEXPECTED_END_OF_STREAM: Code = Code::new("E051");
    pub const DOUBLE_OWNERSHIP: Code = Code::new("E052");
    pub const UNREACHABLE_DISPATCH: Code = Code::new("E053");
    pub const MALFORMED_GROUP: Code = Code::new("E054");
}

/// Post-traversal verification failures
pub mod verification {
    use super::Code;

    pub const COVERAGE_MISMATCH: Code = Code::new("E060");
    pub const OWNERSHIP_CONFLICT: Code = Code::new("E061");
    pub const CURSOR_REGRESSION: Code = Code::new("E062");
    pub const COMMENT_OWNED: Code = Code::new("E063");
}

/// Resource limit errors
pub mod limits {
    use super::Code;

    pub const NESTING_TOO_DEEP: Code = Code::new("E080");
    pub const WORKLIST_OVERFLOW: Code = Code::new("E081");
}

/// Batch processing errors
pub mod batch {
    use super::Code;

    pub const DISCOVERY_FAILED: Code = Code::new("E090");
    pub const TOO_MANY_FILES: Code = Code::new("E091");
}

/// Warning codes
pub mod warnings {
    use super::Code;

    pub const LARGE_UNIT: Code = Code::new("W010");
    pub const UNPOSITIONED_CALL_ARGUMENTS: Code = Code::new("W020");
    pub const UNIT_SKIPPED: Code = Code::new("W030");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const UNIT_LOADED: Code = Code::new("I006");
    pub const ALIGNMENT_COMPLETE: Code = Code::new("I040");
    pub const VERIFICATION_PASSED: Code = Code::new("I041");
    pub const UNIT_PROCESSING_COMPLETE: Code = Code::new("I050");
    pub const BATCH_COMPLETE: Code = Code::new("I060");
}

// ============================================================================
// METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    use Severity::*;

    ERROR_REGISTRY.get_or_init(|| {
        let entries = [
            // System
            ErrorMetadata::new(
                "ERR001",
                "System",
                Critical,
                false,
                true,
                "Critical internal error",
                "File a bug report with the unit that triggered it",
            ),
            ErrorMetadata::new(
                "ERR002",
                "System",
                Critical,
                false,
                true,
                "System initialization failure",
                "Check logging configuration and compile-time limits",
            ),
            ErrorMetadata::new(
                "ERR003",
                "System",
                Critical,
                false,
                true,
                "Shared state lock was poisoned by a panicking worker",
                "Rerun the batch sequentially to isolate the failing unit",
            ),
            // File processing
            ErrorMetadata::new(
                "E005",
                "FileProcessing",
                High,
                false,
                true,
                "Unit file not found",
                "Check the path passed on the command line",
            ),
            ErrorMetadata::new(
                "E006",
                "FileProcessing",
                Low,
                true,
                false,
                "Unit file has an unexpected extension",
                "Rename the file or change ASTSYNC_BATCH_UNIT_EXTENSION",
            ),
            ErrorMetadata::new(
                "E007",
                "FileProcessing",
                High,
                false,
                true,
                "Unit file exceeds the compile-time size limit",
                "Split the source file or rebuild with a larger max_file_size",
            ),
            ErrorMetadata::new(
                "E008",
                "FileProcessing",
                Medium,
                true,
                false,
                "Unit file is empty",
                "Regenerate the unit from the parser and lexer",
            ),
            ErrorMetadata::new(
                "E009",
                "FileProcessing",
                High,
                false,
                true,
                "Permission denied reading unit file",
                "Check file permissions",
            ),
            ErrorMetadata::new(
                "E010",
                "FileProcessing",
                High,
                false,
                true,
                "Unit file is not valid UTF-8",
                "Regenerate the unit with UTF-8 output",
            ),
            ErrorMetadata::new(
                "E011",
                "FileProcessing",
                High,
                false,
                true,
                "I/O error reading unit file",
                "Check disk health and retry",
            ),
            ErrorMetadata::new(
                "E012",
                "FileProcessing",
                Medium,
                false,
                true,
                "Invalid unit file path",
                "Pass a regular file or a directory",
            ),
            // Unit structure
            ErrorMetadata::new(
                "E020",
                "UnitStructure",
                High,
                false,
                true,
                "Unit file does not match the unit schema",
                "Check the exporter version against the expected schema",
            ),
            ErrorMetadata::new(
                "E021",
                "UnitStructure",
                High,
                false,
                true,
                "Unit has no tokens",
                "Regenerate the unit; even empty sources produce an end marker",
            ),
            ErrorMetadata::new(
                "E022",
                "UnitStructure",
                High,
                false,
                true,
                "Token stream does not end with an end marker",
                "Export the complete lexer output including the end marker",
            ),
            ErrorMetadata::new(
                "E023",
                "UnitStructure",
                High,
                false,
                true,
                "Node refers to a node id outside the arena",
                "Check the tree exporter for dangling child ids",
            ),
            ErrorMetadata::new(
                "E024",
                "UnitStructure",
                High,
                false,
                true,
                "Node is reachable from more than one parent or forms a cycle",
                "Export each syntax node exactly once",
            ),
            ErrorMetadata::new(
                "E026",
                "UnitStructure",
                High,
                false,
                true,
                "Unit exceeds the compile-time token limit",
                "Split the source file or rebuild with a larger max_tokens",
            ),
            ErrorMetadata::new(
                "E027",
                "UnitStructure",
                High,
                false,
                true,
                "Unit exceeds the compile-time node limit",
                "Split the source file or rebuild with a larger max_nodes",
            ),
            // Alignment
            ErrorMetadata::new(
                "E050",
                "Alignment",
                High,
                false,
                true,
                "Syntax tree and token stream disagree at this position",
                "Check that parser and lexer ran on the same source and language version",
            ),
            ErrorMetadata::new(
                "E051",
                "Alignment",
                High,
                false,
                true,
                "Token stream ended before the syntax tree was fully aligned",
                "Check that the token stream was not truncated",
            ),
            ErrorMetadata::new(
                "E052",
                "Alignment",
                Critical,
                false,
                true,
                "A token was claimed by two syntax nodes",
                "File a bug report: a dispatch entry visits the same token twice",
            ),
            ErrorMetadata::new(
                "E053",
                "Alignment",
                Critical,
                false,
                true,
                "Dispatch was invoked on a node that is only unpacked inline",
                "File a bug report: a dispatch entry visits an inline-only node",
            ),
            ErrorMetadata::new(
                "E054",
                "Alignment",
                High,
                false,
                true,
                "String grouping found a non-string token",
                "Check that string literal nodes line up with string tokens",
            ),
            // Verification
            ErrorMetadata::new(
                "E060",
                "Verification",
                Critical,
                false,
                true,
                "Owned tokens do not reproduce the significant token sequence",
                "File a bug report with the unit",
            ),
            ErrorMetadata::new(
                "E061",
                "Verification",
                Critical,
                false,
                true,
                "Token owner and node owned-token lists disagree",
                "File a bug report with the unit",
            ),
            ErrorMetadata::new(
                "E062",
                "Verification",
                Critical,
                false,
                true,
                "Claimed token indices are not strictly increasing",
                "File a bug report with the unit",
            ),
            ErrorMetadata::new(
                "E063",
                "Verification",
                Critical,
                false,
                true,
                "A comment token received a primary owner",
                "File a bug report with the unit",
            ),
            // Limits
            ErrorMetadata::new(
                "E080",
                "Limits",
                High,
                false,
                true,
                "Syntax tree nesting exceeds the compile-time limit",
                "Rebuild with a larger alignment.max_nesting_depth",
            ),
            ErrorMetadata::new(
                "E081",
                "Limits",
                High,
                false,
                true,
                "Pending work list exceeds the compile-time limit",
                "Rebuild with a larger alignment.max_worklist_len",
            ),
            // Batch
            ErrorMetadata::new(
                "E090",
                "Batch",
                High,
                false,
                true,
                "Directory discovery failed",
                "Check that the directory exists and is readable",
            ),
            ErrorMetadata::new(
                "E091",
                "Batch",
                Medium,
                true,
                false,
                "Directory contains more units than the batch limit",
                "Pass --max-files or split the directory",
            ),
            // Warnings
            ErrorMetadata::new(
                "W010",
                "FileProcessing",
                Low,
                true,
                false,
                "Unit file is larger than the large-file threshold",
                "No action required",
            ),
            ErrorMetadata::new(
                "W020",
                "Alignment",
                Low,
                true,
                false,
                "Call arguments lack positions; field order was used",
                "Export node positions so mixed keyword arguments align",
            ),
            ErrorMetadata::new(
                "W030",
                "Batch",
                Low,
                true,
                false,
                "Unit skipped after a failure",
                "Inspect the reported error for that unit",
            ),
        ];

        let mut registry = HashMap::with_capacity(entries.len());
        for metadata in entries {
            registry.insert(metadata.code, metadata);
        }
        registry
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get severity from code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires the current unit to halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get category from code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

/// All codes with registered metadata, sorted
pub fn registered_codes() -> Vec<&'static str> {
    let mut codes: Vec<_> = get_error_registry().keys().copied().collect();
    codes.sort_unstable();
    codes
}
