//! Alignment units: one source file's token stream and syntax tree
//!
//! Units arrive as JSON exported by a host parser binding:
//!
//! ```json
//! { "file": "pkg/mod.py", "source": "x = 1\n", "tokens": [...], "nodes": [...], "root": 0 }
//! ```
//!
//! `source` is optional; when present it fills in each token's `source_line`
//! for diagnostics.

use crate::ast::{NodeArena, NodeId, TreeError};
use crate::config::constants::compile_time::alignment::{MAX_NODES, MAX_TOKENS};
use crate::config::constants::compile_time::file_processing::{
    LARGE_FILE_THRESHOLD, MAX_FILE_SIZE,
};
use crate::logging::{codes, Code};
use crate::tokens::{TokenArena, TokenKind};
use crate::{log_debug, log_error, log_success, log_warning};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub type UnitResult<T> = Result<T, UnitError>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum UnitError {
    #[error("Unit file not found: {path}")]
    FileNotFound { path: String },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Unit file too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("Unit file is empty: {path}")]
    EmptyFile { path: String },

    #[error("I/O error reading unit file {path}: {message}")]
    IoError { path: String, message: String },

    #[error("Invalid unit JSON at line {line}, column {column}: {message}")]
    InvalidFormat {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Unit {file} has no tokens")]
    EmptyTokenStream { file: String },

    #[error("Unit {file} does not end with an end marker (last token: {last})")]
    MissingEndMarker { file: String, last: String },

    #[error("Unit {file} has {count} tokens (max: {max})")]
    TooManyTokens { file: String, count: usize, max: usize },

    #[error("Unit {file} has {count} nodes (max: {max})")]
    TooManyNodes { file: String, count: usize, max: usize },

    #[error("Unit {file}: {source}")]
    Tree {
        file: String,
        #[source]
        source: TreeError,
    },
}

impl UnitError {
    pub fn error_code(&self) -> Code {
        match self {
            UnitError::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            UnitError::PermissionDenied { .. } => codes::file_processing::PERMISSION_DENIED,
            UnitError::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            UnitError::EmptyFile { .. } => codes::file_processing::EMPTY_FILE,
            UnitError::IoError { .. } => codes::file_processing::IO_ERROR,
            UnitError::InvalidFormat { .. } => codes::unit::INVALID_UNIT_FORMAT,
            UnitError::EmptyTokenStream { .. } => codes::unit::EMPTY_TOKEN_STREAM,
            UnitError::MissingEndMarker { .. } => codes::unit::MISSING_END_MARKER,
            UnitError::TooManyTokens { .. } => codes::unit::TOO_MANY_TOKENS,
            UnitError::TooManyNodes { .. } => codes::unit::TOO_MANY_NODES,
            UnitError::Tree { source, .. } => source.error_code(),
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }
}

/// One file's token arena, node arena and root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentUnit {
    pub file: String,
    pub tokens: TokenArena,
    pub nodes: NodeArena,
    pub root: NodeId,
}

/// Wire form; `source` is consumed while loading
#[derive(Deserialize)]
struct UnitFile {
    file: String,
    #[serde(default)]
    source: Option<String>,
    tokens: TokenArena,
    nodes: NodeArena,
    root: NodeId,
}

impl AlignmentUnit {
    /// Validate and link an in-memory unit
    pub fn new(file: &str, tokens: TokenArena, nodes: NodeArena, root: NodeId) -> UnitResult<Self> {
        let mut unit = Self {
            file: file.to_string(),
            tokens,
            nodes,
            root,
        };
        unit.validate()?;
        Ok(unit)
    }

    /// Parse a unit from JSON text
    pub fn from_json_str(json: &str) -> UnitResult<Self> {
        let wire: UnitFile = serde_json::from_str(json).map_err(|e| UnitError::InvalidFormat {
            message: e.to_string(),
            line: e.line(),
            column: e.column(),
        })?;

        let mut tokens = wire.tokens;
        if let Some(source) = &wire.source {
            fill_source_lines(&mut tokens, source);
        }

        Self::new(&wire.file, tokens, wire.nodes, wire.root)
    }

    /// Read and parse a unit file
    pub fn load(path: &Path) -> UnitResult<Self> {
        let display = path.display().to_string();
        log_debug!("Loading unit", "path" => display);

        let metadata = fs::metadata(path).map_err(|e| io_error(&display, e))?;
        if !metadata.is_file() {
            return Err(UnitError::FileNotFound { path: display });
        }

        let size = metadata.len();
        if size > MAX_FILE_SIZE {
            let error = UnitError::FileTooLarge {
                size,
                max_size: MAX_FILE_SIZE,
            };
            log_error!(error.error_code(), "Unit file exceeds size limit",
                "path" => display,
                "size" => size,
                "max_size" => MAX_FILE_SIZE
            );
            return Err(error);
        }
        if size == 0 {
            return Err(UnitError::EmptyFile { path: display });
        }
        if size > LARGE_FILE_THRESHOLD {
            log_warning!(codes::warnings::LARGE_UNIT, "Large unit file",
                "path" => display,
                "size" => size
            );
        }

        let json = fs::read_to_string(path).map_err(|e| io_error(&display, e))?;
        let unit = Self::from_json_str(&json)?;

        log_success!(codes::success::UNIT_LOADED, "Unit loaded",
            "path" => display,
            "tokens" => unit.tokens.len(),
            "nodes" => unit.nodes.len()
        );
        Ok(unit)
    }

    /// Structural checks, then parent links
    fn validate(&mut self) -> UnitResult<()> {
        if self.tokens.is_empty() {
            return Err(UnitError::EmptyTokenStream {
                file: self.file.clone(),
            });
        }
        if self.tokens.len() > MAX_TOKENS {
            return Err(UnitError::TooManyTokens {
                file: self.file.clone(),
                count: self.tokens.len(),
                max: MAX_TOKENS,
            });
        }
        if self.nodes.len() > MAX_NODES {
            return Err(UnitError::TooManyNodes {
                file: self.file.clone(),
                count: self.nodes.len(),
                max: MAX_NODES,
            });
        }
        if !self.tokens.ends_with_end_marker() {
            let last = self
                .tokens
                .tokens()
                .last()
                .map(|t| t.describe())
                .unwrap_or_default();
            return Err(UnitError::MissingEndMarker {
                file: self.file.clone(),
                last,
            });
        }

        self.nodes
            .link_parents(self.root)
            .map_err(|source| UnitError::Tree {
                file: self.file.clone(),
                source,
            })
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn significant_count(&self) -> usize {
        self.tokens.iter().filter(|t| t.is_significant()).count()
    }

    pub fn comment_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Comment)
            .count()
    }
}

fn fill_source_lines(tokens: &mut TokenArena, source: &str) {
    let lines: Vec<&str> = source.split('\n').collect();
    for index in 0..tokens.len() {
        let Some(token) = tokens.get_mut(index) else {
            continue;
        };
        if !token.source_line.is_empty() {
            continue;
        }
        if let Some(line) = (token.line as usize)
            .checked_sub(1)
            .and_then(|i| lines.get(i))
        {
            token.source_line = line.trim_end_matches('\r').to_string();
        }
    }
}

fn io_error(path: &str, error: std::io::Error) -> UnitError {
    match error.kind() {
        std::io::ErrorKind::NotFound => UnitError::FileNotFound {
            path: path.to_string(),
        },
        std::io::ErrorKind::PermissionDenied => UnitError::PermissionDenied {
            path: path.to_string(),
        },
        _ => UnitError::IoError {
            path: path.to_string(),
            message: error.to_string(),
        },
    }
}
