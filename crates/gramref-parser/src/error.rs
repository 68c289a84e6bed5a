//! Error and diagnostic system for the grammar parser.
//!
//! Built around the [`Diagnostic`] type: a single error or warning with an
//! optional error code, labeled source spans, and help text. One or more
//! diagnostics are wrapped in [`ParseError`] when a fragment fails to lex or
//! parse.
//!
//! # Example
//!
//! ```
//! # use gramref_parser::error::{Diagnostic, ErrorCode};
//! # use gramref_parser::Span;
//!
//! let span = Span::new(42..46);
//! let first = Span::new(7..11);
//!
//! let diag = Diagnostic::error("statement `zone` is defined twice in this fragment")
//!     .with_code(ErrorCode::E103)
//!     .with_label(span, "duplicate definition")
//!     .with_secondary_label(first, "first defined here")
//!     .with_help("merge the bodies, or mark the second definition `override`");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
