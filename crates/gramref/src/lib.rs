//! Gramref - configuration-grammar reference documentation model.
//!
//! Parsing, merging, and document-tree construction for hand-written
//! grammar-notation files. The same syntax definitions the real
//! configuration parser accepts drive the generated reference
//! documentation, so prose never drifts from the implementation.

pub mod config;

mod doctree;
mod error;
mod merge;
mod registry;

pub use gramref_core::{fragment, node, render};

pub use gramref_core::{
    Cardinality, Choice, FragmentEntry, GrammarFragment, GrammarNode, Group, MergeMode, Statement,
};
pub use gramref_parser::ParseError;

pub use doctree::{DocumentNode, DocumentTree, DocumentTreeBuilder, PlaceholderId};
pub use error::Error;
pub use merge::{MergeError, MergedGrammar, combine_fragments};
pub use registry::{DomainRegistry, Registration, RegistrationHandle};

use std::fs;
use std::io::Read;
use std::path::Path;

use log::{debug, info};

use config::BuildConfig;

/// Pipeline driver for one documentation build.
///
/// Runs load → parse → merge → build synchronously, once per build; the
/// resulting [`MergedGrammar`] and [`DocumentTree`] are discarded with the
/// build. There is no cross-build caching and no process-wide state.
///
/// # Examples
///
/// ```rust,no_run
/// use gramref::{DocBuilder, config::BuildConfig};
///
/// fn main() -> Result<(), gramref::Error> {
///     let builder = DocBuilder::new(BuildConfig::default());
///
///     // Merge the well-known main-configuration fragment set.
///     let merged = builder.combine()?;
///
///     // Emit one placeholder node per statement for the host renderer.
///     let tree = builder.build_doc(&merged);
///     println!("{} statements documented", tree.len());
///     Ok(())
/// }
/// ```
#[derive(Debug, Default)]
pub struct DocBuilder {
    config: BuildConfig,
}

impl DocBuilder {
    /// Create a new builder with the given configuration.
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Locate and merge the well-known fragment set for the main
    /// configuration language.
    ///
    /// Fragments are parsed independently and folded in the precedence
    /// order the configuration names them: the canonical base grammar
    /// first, override/extension fragments after.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] for a missing or unreadable grammar source, a
    /// lexical or syntax error in any fragment, or a conflicting
    /// structural redefinition across fragments. All are fatal; no partial
    /// grammar is produced.
    pub fn combine(&self) -> Result<MergedGrammar, Error> {
        info!("combining main configuration grammar");

        let mut fragments = Vec::new();
        for path in self.config.main_paths() {
            fragments.push(self.load_fragment(&path)?);
        }

        let merged = combine_fragments(fragments)?;
        debug!(statements = merged.len(); "main grammar merged");
        Ok(merged)
    }

    /// Parse the control-channel grammar file.
    pub fn control_grammar(&self) -> Result<GrammarFragment, Error> {
        let path = self.config.control_path();
        info!(path:? = path; "parsing control-channel grammar");

        let src = fs::read_to_string(&path)?;
        let label = path.display().to_string();
        gramref_parser::parse_mapbody(&src, &label)
            .map_err(|err| Error::new_parse_error(err, label, src))
    }

    /// Build the document tree for a merged grammar.
    ///
    /// Never fails: one placeholder node per statement name, in first-seen
    /// order.
    pub fn build_doc(&self, merged: &MergedGrammar) -> DocumentTree {
        info!("building documentation tree");
        DocumentTreeBuilder::new().build(merged)
    }

    fn load_fragment(&self, path: &Path) -> Result<GrammarFragment, Error> {
        debug!(path:? = path; "loading grammar fragment");

        let src = fs::read_to_string(path)?;
        let label = path.display().to_string();
        gramref_parser::parse_fragment(&src, &label)
            .map_err(|err| Error::new_parse_error(err, label, src))
    }
}

/// Parse one mapping-body grammar from an input stream.
///
/// Used for the simpler, single-file control-channel grammar when the host
/// supplies the stream itself rather than a configured path.
///
/// # Errors
///
/// Returns [`Error::Io`] if the stream cannot be read, or a parse error
/// with the given label as the file identity.
pub fn parse_mapbody<R: Read>(mut reader: R, label: impl Into<String>) -> Result<GrammarFragment, Error> {
    let label = label.into();
    let mut src = String::new();
    reader.read_to_string(&mut src)?;

    gramref_parser::parse_mapbody(&src, &label).map_err(|err| Error::new_parse_error(err, label, src))
}
