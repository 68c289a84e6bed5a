//! # Gramref Parser
//!
//! Parser for the gramref configuration-grammar notation. This crate
//! provides the pipeline from grammar source text to a parsed
//! [`GrammarFragment`].
//!
//! ## Usage
//!
//! ```
//! # use gramref_parser::{parse_fragment, ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//!         # canonical grammar
//!         zone {
//!             "name";
//!             ( "primary" | "secondary" )?;
//!         }*;
//!     "#;
//!
//!     let fragment = parse_fragment(source, "zone.grammar")?;
//!     assert_eq!(fragment.len(), 1);
//!     Ok(())
//! }
//! ```

pub mod error;
mod lexer;
mod parser;
mod span;
mod tokens;

pub use error::ParseError;
pub use span::{LineCol, Span};
pub use tokens::{PositionedToken, Token};

use std::collections::HashSet;

use log::{debug, trace};

use gramref_core::{FragmentEntry, GrammarFragment, GrammarNode, Statement};

use crate::error::{Diagnostic, ErrorCode};

/// Tokenize grammar-notation source without parsing it.
///
/// Exposed for hosts that want to inspect the raw token stream; the normal
/// entry points are [`parse_fragment`] and [`parse_mapbody`].
pub fn tokenize(source: &str) -> Result<Vec<PositionedToken<'_>>, ParseError> {
    lexer::tokenize(source)
}

/// Parse one full grammar fragment.
///
/// This is the main entry point for the canonical grammar and its
/// override/extension fragment files. It orchestrates the pipeline:
///
/// 1. **Tokenize** - convert source text to tokens
/// 2. **Parse** - build the statement entries from tokens
/// 3. **Check** - reject duplicate statement names within the fragment
///
/// Parsing is fail-fast and all-or-nothing: any error means no fragment,
/// because documenting a partially-wrong schema would mislead readers about
/// the syntax the real parser accepts.
///
/// # Arguments
///
/// * `source` - the grammar notation text
/// * `label` - the source identity (file path or caller-supplied label)
///
/// # Errors
///
/// Returns [`ParseError`] with one diagnostic per lexical error, or a
/// single diagnostic for the first syntax error.
pub fn parse_fragment(source: &str, label: impl Into<String>) -> Result<GrammarFragment, ParseError> {
    let label = label.into();
    debug!(label = label.as_str(); "parsing grammar fragment");

    let tokens = lexer::tokenize(source)?;
    trace!(label = label.as_str(), tokens = tokens.len(); "tokenized fragment");

    let entries = parser::build_fragment(&tokens).map_err(ParseError::from)?;
    check_unique_names(&entries)?;

    debug!(label = label.as_str(), statements = entries.len(); "fragment parsed");
    Ok(collect(label, entries))
}

/// Parse one mapping-body grammar file.
///
/// Mapbody files describe the simpler control-channel configuration: top
/// level entries may be flat `name term* ;` lines as well as full block
/// statements, and merge markers are not recognized.
pub fn parse_mapbody(source: &str, label: impl Into<String>) -> Result<GrammarFragment, ParseError> {
    let label = label.into();
    debug!(label = label.as_str(); "parsing mapbody grammar");

    let tokens = lexer::tokenize(source)?;
    let entries = parser::build_mapbody(&tokens).map_err(ParseError::from)?;
    check_unique_names(&entries)?;

    debug!(label = label.as_str(), statements = entries.len(); "mapbody parsed");
    Ok(collect(label, entries))
}

fn collect(label: String, entries: Vec<(FragmentEntry, Span)>) -> GrammarFragment {
    GrammarFragment::new(label, entries.into_iter().map(|(entry, _)| entry).collect())
}

/// Statement names must be unique within their defining scope.
fn check_unique_names(entries: &[(FragmentEntry, Span)]) -> Result<(), ParseError> {
    let mut seen: Vec<(&str, Span)> = Vec::new();
    for (entry, span) in entries {
        if let Some((_, first)) = seen.iter().find(|(name, _)| *name == entry.name()) {
            return Err(Diagnostic::error(format!(
                "statement `{}` is defined twice in this fragment",
                entry.name()
            ))
            .with_code(ErrorCode::E103)
            .with_label(*span, "duplicate definition")
            .with_secondary_label(*first, "first defined here")
            .with_help("merge the bodies, or move one definition to an override fragment")
            .into());
        }
        seen.push((entry.name(), *span));

        check_unique_nested(&entry.statement, *span)?;
    }
    Ok(())
}

fn check_unique_nested(statement: &Statement, enclosing_span: Span) -> Result<(), ParseError> {
    let mut seen = HashSet::new();
    for item in &statement.body {
        if let GrammarNode::Statement(nested) = item {
            if !seen.insert(nested.name.as_str()) {
                return Err(Diagnostic::error(format!(
                    "statement `{}` is defined twice inside `{}`",
                    nested.name, statement.name
                ))
                .with_code(ErrorCode::E103)
                .with_label(enclosing_span, "in this definition")
                .into());
            }
            check_unique_nested(nested, enclosing_span)?;
        }
    }
    Ok(())
}
