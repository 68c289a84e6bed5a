//! Document tree construction.
//!
//! Walks a [`MergedGrammar`] in first-seen order and emits one placeholder
//! node per top-level statement, annotated with its formatted grammar
//! notation. The host renderer later finds each placeholder through the
//! name-keyed lookup and substitutes fully rendered markup; this core never
//! performs that substitution.

use std::collections::HashMap;

use log::debug;
use serde::Serialize;

use gramref_core::render::render_statement;

use crate::merge::MergedGrammar;

/// Identity of one placeholder node.
///
/// Distinct for every node emitted by one builder; never reused within a
/// build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PlaceholderId(usize);

impl PlaceholderId {
    /// The numeric index of this placeholder.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One documentation node: a placeholder for a top-level statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentNode {
    /// The statement name.
    pub name: String,
    /// The statement's grammar, rendered in the notation the configuration
    /// parser accepts.
    pub grammar: String,
    /// The placeholder the host substitution pass replaces with rendered
    /// markup.
    pub placeholder: PlaceholderId,
}

/// The ordered document node sequence plus its name-keyed lookup table.
#[derive(Debug, Default, Serialize)]
pub struct DocumentTree {
    nodes: Vec<DocumentNode>,
    index: HashMap<String, usize>,
}

impl DocumentTree {
    /// The nodes in first-seen statement order.
    pub fn nodes(&self) -> &[DocumentNode] {
        &self.nodes
    }

    /// Look up a node by statement name.
    ///
    /// This is a back-reference for the host's substitution pass, not an
    /// ownership relation.
    pub fn get(&self, name: &str) -> Option<&DocumentNode> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate the nodes in order.
    pub fn iter(&self) -> impl Iterator<Item = &DocumentNode> {
        self.nodes.iter()
    }
}

/// Builder emitting one [`DocumentNode`] per statement.
///
/// Construct a fresh builder per documentation build; consuming `build`
/// guarantees placeholder identities are never reused.
#[derive(Debug, Default)]
pub struct DocumentTreeBuilder {
    next_placeholder: usize,
}

impl DocumentTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit one node per statement name in first-seen order.
    ///
    /// Never fails: a [`MergedGrammar`] is valid by construction.
    pub fn build(mut self, merged: &MergedGrammar) -> DocumentTree {
        let mut nodes = Vec::with_capacity(merged.len());
        let mut index = HashMap::with_capacity(merged.len());

        for statement in merged.iter() {
            let placeholder = PlaceholderId(self.next_placeholder);
            self.next_placeholder += 1;

            index.insert(statement.name.clone(), nodes.len());
            nodes.push(DocumentNode {
                name: statement.name.clone(),
                grammar: render_statement(statement),
                placeholder,
            });
        }

        debug!(nodes = nodes.len(); "document tree built");
        DocumentTree { nodes, index }
    }
}
