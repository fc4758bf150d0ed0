//! Error types for parsing and import editing.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from the Tree-sitter parsing layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyntaxError {
    /// Failed to initialise the Tree-sitter parser with the Rust grammar.
    #[error("failed to initialise the rust parser: {message}")]
    ParserInitError {
        /// Description of the failure.
        message: String,
    },

    /// Tree-sitter did not produce a syntax tree.
    #[error("failed to parse rust source: {message}")]
    ParseError {
        /// Description of the failure.
        message: String,
    },
}

impl SyntaxError {
    /// Creates a parser initialisation error.
    #[must_use]
    pub fn parser_init(message: impl Into<String>) -> Self {
        Self::ParserInitError {
            message: message.into(),
        }
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }
}

/// Errors raised while reading or editing an import block.
#[derive(Debug, Error)]
pub enum ImportEditError {
    /// The source file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The edited source could not be written back.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// File that was being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The parser could not be set up or produced no tree.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// The file declares no top-level imports at all.
    #[error("no import block found; the entry point must declare at least one `use` item")]
    MissingImportBlock,

    /// The import region contains syntax errors.
    #[error("malformed import block at line {line}, column {column}: {context}")]
    MalformedImportBlock {
        /// One-based line of the first syntax error.
        line: u32,
        /// One-based column of the first syntax error.
        column: u32,
        /// Snippet of the offending source.
        context: String,
    },

    /// The requested import path is not a Rust path.
    #[error("'{import_path}' is not a valid import path")]
    InvalidImportPath {
        /// The rejected path.
        import_path: String,
    },
}

impl ImportEditError {
    /// Returns `true` when the error describes the shape of the source file
    /// rather than an I/O failure.
    ///
    /// Callers treat these as configuration problems: the file on disk is
    /// not the entry point they expected.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Syntax(_)
                | Self::MissingImportBlock
                | Self::MalformedImportBlock { .. }
                | Self::InvalidImportPath { .. }
        )
    }
}
