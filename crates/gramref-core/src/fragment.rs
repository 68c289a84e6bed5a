//! Parsed grammar fragments and merge markers.
//!
//! A fragment is the parse result of one grammar source file. Fragments are
//! immutable once parsed; the merger folds them in precedence order into a
//! single canonical grammar.

use std::fmt;

use serde::Serialize;

use crate::node::Statement;

/// How a top-level statement interacts with an earlier definition of the
/// same name during merging.
///
/// In grammar source the mode is written as a contextual keyword in front of
/// the statement name: `override zone { ... };` or `extend category { ... };`.
/// A statement with no marker is a plain definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum MergeMode {
    /// A plain definition.
    #[default]
    Define,
    /// Replaces an earlier definition outright.
    Override,
    /// Appends alternatives to an earlier choice-shaped definition.
    Extend,
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeMode::Define => write!(f, "define"),
            MergeMode::Override => write!(f, "override"),
            MergeMode::Extend => write!(f, "extend"),
        }
    }
}

/// One top-level statement of a fragment together with its merge marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FragmentEntry {
    pub mode: MergeMode,
    pub statement: Statement,
}

impl FragmentEntry {
    pub fn new(mode: MergeMode, statement: Statement) -> Self {
        Self { mode, statement }
    }

    /// The name of the defined statement.
    pub fn name(&self) -> &str {
        &self.statement.name
    }
}

/// The parse result of one grammar source file.
///
/// Carries the source identity (label), the precedence rank assigned by the
/// merge input order, and the ordered top-level entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrammarFragment {
    label: String,
    rank: usize,
    entries: Vec<FragmentEntry>,
}

impl GrammarFragment {
    /// Create a fragment with rank 0. The merger re-ranks fragments by their
    /// position in the merge input order.
    pub fn new(label: impl Into<String>, entries: Vec<FragmentEntry>) -> Self {
        Self {
            label: label.into(),
            rank: 0,
            entries,
        }
    }

    /// Set the precedence rank.
    pub fn with_rank(mut self, rank: usize) -> Self {
        self.rank = rank;
        self
    }

    /// The source identity: a file path or caller-supplied label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The precedence rank: position in the merge input order, lowest first.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// The top-level entries in source order.
    pub fn entries(&self) -> &[FragmentEntry] {
        &self.entries
    }

    /// The top-level statements in source order, without merge markers.
    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.entries.iter().map(|entry| &entry.statement)
    }

    /// Number of top-level statements.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{GrammarNode, Statement};

    fn entry(name: &str) -> FragmentEntry {
        FragmentEntry::new(
            MergeMode::Define,
            Statement::new(name, vec![GrammarNode::Reference("value".to_string())]),
        )
    }

    #[test]
    fn fragment_accessors() {
        let fragment =
            GrammarFragment::new("base.grammar", vec![entry("options"), entry("zone")]);

        assert_eq!(fragment.label(), "base.grammar");
        assert_eq!(fragment.rank(), 0);
        assert_eq!(fragment.len(), 2);
        assert!(!fragment.is_empty());

        let names: Vec<_> = fragment.statements().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["options", "zone"]);
    }

    #[test]
    fn fragment_rank_is_caller_assigned() {
        let fragment = GrammarFragment::new("overrides.grammar", vec![entry("zone")]).with_rank(3);
        assert_eq!(fragment.rank(), 3);
    }

    #[test]
    fn merge_mode_display() {
        assert_eq!(MergeMode::Define.to_string(), "define");
        assert_eq!(MergeMode::Override.to_string(), "override");
        assert_eq!(MergeMode::Extend.to_string(), "extend");
    }
}
