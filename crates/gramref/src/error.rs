//! Error types for documentation-build operations.
//!
//! Every variant is fatal to the build: nothing is retried, nothing is
//! downgraded to a warning, and no partial document set is emitted on
//! failure.

use std::io;

use thiserror::Error;

use gramref_parser::{LineCol, ParseError};

use crate::merge::MergeError;

/// The main error type for gramref operations.
///
/// The `Parse` variant keeps the offending source text alongside the
/// structured diagnostics so [`Error::render`] can report exact
/// `file:line:column` positions.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{file}: {err}")]
    Parse {
        err: ParseError,
        file: String,
        src: String,
    },

    #[error(transparent)]
    Merge(#[from] MergeError),
}

impl Error {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(
        err: ParseError,
        file: impl Into<String>,
        src: impl Into<String>,
    ) -> Self {
        Self::Parse {
            err,
            file: file.into(),
            src: src.into(),
        }
    }

    /// Render the error as human-readable lines.
    ///
    /// Parse errors become one `file:line:column: error[Exxx]: message`
    /// line per diagnostic, with help text indented below; other variants
    /// render through their `Display` implementation.
    pub fn render(&self) -> String {
        match self {
            Error::Parse { err, file, src } => {
                let mut out = String::new();
                for diagnostic in err.diagnostics() {
                    if !out.is_empty() {
                        out.push('\n');
                    }
                    match diagnostic.primary_span() {
                        Some(span) => {
                            let pos = LineCol::locate(src, span.start());
                            out.push_str(&format!("{file}:{pos}: {diagnostic}"));
                        }
                        None => out.push_str(&format!("{file}: {diagnostic}")),
                    }
                    if let Some(help) = diagnostic.help() {
                        out.push_str(&format!("\n    = help: {help}"));
                    }
                }
                out
            }
            other => other.to_string(),
        }
    }
}
