//! Fragment merging.
//!
//! Folds an ordered sequence of parsed fragments into one canonical
//! [`MergedGrammar`]. Merging is order-sensitive by design: precedence order
//! expresses "later fragments are more specific", so the fold is strictly
//! sequential and must run after all fragment parses complete.

use indexmap::IndexMap;
use log::{debug, trace};
use thiserror::Error;

use gramref_core::{FragmentEntry, GrammarFragment, MergeMode, Statement};

/// A conflicting structural redefinition of one statement name across
/// fragments. Any merge error aborts the whole merge; no partial grammar is
/// produced, because a silent merge would desynchronize the generated
/// documentation from the grammar the real parser accepts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// Two unmarked definitions of the same name disagree structurally
    /// (different cardinality, or only one is choice-shaped).
    #[error(
        "statement `{name}` is redefined with an incompatible structure; \
         mark the redefinition `override` if the replacement is intended"
    )]
    IncompatibleRedefinition { name: String },

    /// An `extend` entry met a definition that is not extendable: both the
    /// stored and the extending definition must be a top-level choice with
    /// the same cardinality.
    #[error(
        "statement `{name}` cannot be extended: both definitions must be a \
         top-level choice with matching cardinality"
    )]
    ShapeMismatch { name: String },
}

/// One resolved statement with the merge mode its current definition
/// arrived with.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MergedStatement {
    mode: MergeMode,
    statement: Statement,
}

/// The canonical grammar: one resolved definition per statement name, in
/// first-seen order.
///
/// Built fresh per documentation build by [`combine_fragments`], owned by
/// that build, then discarded. First-seen order is stable across overrides,
/// so documentation order does not move when a fragment replaces a
/// definition.
#[derive(Debug, Default)]
pub struct MergedGrammar {
    statements: IndexMap<String, MergedStatement>,
}

impl MergedGrammar {
    /// Look up a statement definition by name.
    pub fn get(&self, name: &str) -> Option<&Statement> {
        self.statements.get(name).map(|merged| &merged.statement)
    }

    /// Whether a statement name is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.statements.contains_key(name)
    }

    /// The resolved statements in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        self.statements.values().map(|merged| &merged.statement)
    }

    /// The statement names in first-seen order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.statements.keys().map(|name| name.as_str())
    }

    /// Number of distinct statement names.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// Fold fragments into one canonical grammar, in the given precedence order
/// (lowest precedence, typically the base grammar, first).
///
/// Per statement name:
///
/// 1. Unseen names are inserted; their position becomes the first-seen
///    order.
/// 2. An `override` entry replaces the stored definition in place, keeping
///    the first-seen position.
/// 3. An `extend` entry appends its top-level choice alternatives to the
///    stored choice; both sides must be choice-shaped with matching
///    cardinality.
/// 4. An unmarked redefinition replaces the stored definition when the
///    stored one was itself an `override` still waiting for its base, or
///    when the two definitions are structurally compatible (later fragments
///    are more specific); a structurally incompatible unmarked redefinition
///    is a [`MergeError`].
pub fn combine_fragments(
    fragments: Vec<GrammarFragment>,
) -> Result<MergedGrammar, MergeError> {
    let mut statements = IndexMap::new();

    for (rank, fragment) in fragments.into_iter().enumerate() {
        let fragment = fragment.with_rank(rank);
        debug!(label = fragment.label(), rank = rank; "merging fragment");

        for entry in fragment.entries() {
            merge_entry(&mut statements, entry)?;
        }
    }

    debug!(statements = statements.len(); "merge complete");
    Ok(MergedGrammar { statements })
}

fn merge_entry(
    statements: &mut IndexMap<String, MergedStatement>,
    entry: &FragmentEntry,
) -> Result<(), MergeError> {
    let name = entry.name();

    let Some(existing) = statements.get_mut(name) else {
        trace!(name = name, mode:? = entry.mode; "first definition");
        statements.insert(name.to_string(), MergedStatement {
            mode: entry.mode,
            statement: entry.statement.clone(),
        });
        return Ok(());
    };

    match entry.mode {
        MergeMode::Override => {
            trace!(name = name; "override replaces stored definition");
            existing.statement = entry.statement.clone();
            existing.mode = MergeMode::Override;
        }
        MergeMode::Extend => {
            if existing.statement.cardinality != entry.statement.cardinality {
                return Err(MergeError::ShapeMismatch {
                    name: name.to_string(),
                });
            }
            let Some(new_choice) = entry.statement.top_choice() else {
                return Err(MergeError::ShapeMismatch {
                    name: name.to_string(),
                });
            };
            let Some(stored_choice) = existing.statement.top_choice_mut() else {
                return Err(MergeError::ShapeMismatch {
                    name: name.to_string(),
                });
            };
            trace!(
                name = name,
                added = new_choice.alternatives.len();
                "extend appends alternatives"
            );
            stored_choice
                .alternatives
                .extend(new_choice.alternatives.iter().cloned());
        }
        MergeMode::Define => {
            // An override stored before its base appears is replaceable by
            // any later definition: later fragments are more specific.
            let stored_is_loose = existing.mode == MergeMode::Override;
            let compatible = existing.statement.cardinality == entry.statement.cardinality
                && existing.statement.is_choice_shaped() == entry.statement.is_choice_shaped();

            if !stored_is_loose && !compatible {
                return Err(MergeError::IncompatibleRedefinition {
                    name: name.to_string(),
                });
            }

            trace!(name = name; "later definition replaces stored one");
            existing.statement = entry.statement.clone();
            existing.mode = MergeMode::Define;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gramref_core::{Cardinality, Choice, GrammarNode};

    fn statement(name: &str, cardinality: Cardinality) -> Statement {
        Statement::new(name, vec![GrammarNode::Reference("value".to_string())])
            .with_cardinality(cardinality)
    }

    fn choice_statement(name: &str, alternatives: &[&str]) -> Statement {
        let alternatives = alternatives
            .iter()
            .map(|alt| GrammarNode::Literal(alt.to_string()))
            .collect();
        Statement::new(name, vec![GrammarNode::Choice(Choice::new(alternatives))])
    }

    fn fragment(label: &str, entries: Vec<FragmentEntry>) -> GrammarFragment {
        GrammarFragment::new(label, entries)
    }

    fn define(statement: Statement) -> FragmentEntry {
        FragmentEntry::new(MergeMode::Define, statement)
    }

    #[test]
    fn disjoint_union() {
        let a = fragment("a", vec![
            define(statement("options", Cardinality::One)),
            define(statement("zone", Cardinality::ZeroOrMore)),
        ]);
        let b = fragment("b", vec![define(statement("key", Cardinality::One))]);

        let merged = combine_fragments(vec![a.clone(), b]).unwrap();
        assert_eq!(merged.len(), 3);
        let names: Vec<_> = merged.names().collect();
        assert_eq!(names, ["options", "zone", "key"]);
        assert_eq!(merged.get("zone"), a.statements().nth(1));
    }

    #[test]
    fn override_wins_in_precedence_order() {
        let a = fragment("a", vec![define(statement("x", Cardinality::One))]);
        let b = fragment("b", vec![FragmentEntry::new(
            MergeMode::Override,
            statement("x", Cardinality::Optional),
        )]);

        let merged = combine_fragments(vec![a, b]).unwrap();
        assert_eq!(merged.get("x").unwrap().cardinality, Cardinality::Optional);
    }

    #[test]
    fn reversed_order_changes_the_winner() {
        // B first: its override has no base yet, so A's plain definition
        // later in precedence order supplies the winning definition.
        let a = fragment("a", vec![define(statement("x", Cardinality::One))]);
        let b = fragment("b", vec![FragmentEntry::new(
            MergeMode::Override,
            statement("x", Cardinality::Optional),
        )]);

        let merged = combine_fragments(vec![b, a]).unwrap();
        assert_eq!(merged.get("x").unwrap().cardinality, Cardinality::One);
    }

    #[test]
    fn override_keeps_first_seen_position() {
        let a = fragment("a", vec![
            define(statement("first", Cardinality::One)),
            define(statement("second", Cardinality::One)),
        ]);
        let b = fragment("b", vec![FragmentEntry::new(
            MergeMode::Override,
            statement("first", Cardinality::Optional),
        )]);

        let merged = combine_fragments(vec![a, b]).unwrap();
        let names: Vec<_> = merged.names().collect();
        assert_eq!(names, ["first", "second"]);
    }

    #[test]
    fn incompatible_redefinition_is_an_error() {
        let a = fragment("a", vec![define(statement("x", Cardinality::One))]);
        let b = fragment("b", vec![define(statement("x", Cardinality::Optional))]);

        let err = combine_fragments(vec![a, b]).unwrap_err();
        assert_eq!(err, MergeError::IncompatibleRedefinition {
            name: "x".to_string(),
        });
        assert!(err.to_string().contains("`x`"));
    }

    #[test]
    fn compatible_redefinition_last_wins() {
        let first = statement("x", Cardinality::One);
        let mut second = statement("x", Cardinality::One);
        second.body = vec![GrammarNode::Literal("replacement".to_string())];

        let merged = combine_fragments(vec![
            fragment("a", vec![define(first)]),
            fragment("b", vec![define(second.clone())]),
        ])
        .unwrap();

        assert_eq!(merged.get("x"), Some(&second));
    }

    #[test]
    fn extend_appends_alternatives_in_order() {
        let base = fragment("base", vec![define(choice_statement("category", &[
            "queries", "security",
        ]))]);
        let extension = fragment("ext", vec![FragmentEntry::new(
            MergeMode::Extend,
            choice_statement("category", &["rate-limit"]),
        )]);

        let merged = combine_fragments(vec![base, extension]).unwrap();
        let stored = merged.get("category").unwrap();
        let alternatives: Vec<_> = stored
            .top_choice()
            .unwrap()
            .alternatives
            .iter()
            .map(|alt| match alt {
                GrammarNode::Literal(text) => text.as_str(),
                other => panic!("unexpected alternative {other:?}"),
            })
            .collect();
        assert_eq!(alternatives, ["queries", "security", "rate-limit"]);
    }

    #[test]
    fn extend_requires_choice_shape_on_both_sides() {
        let base = fragment("base", vec![define(statement("category", Cardinality::One))]);
        let extension = fragment("ext", vec![FragmentEntry::new(
            MergeMode::Extend,
            choice_statement("category", &["rate-limit"]),
        )]);

        let err = combine_fragments(vec![base, extension]).unwrap_err();
        assert_eq!(err, MergeError::ShapeMismatch {
            name: "category".to_string(),
        });
    }

    #[test]
    fn extend_requires_matching_cardinality() {
        let base = fragment("base", vec![define(choice_statement("category", &[
            "queries", "security",
        ]))]);
        let mut widened = choice_statement("category", &["a", "b"]);
        widened.cardinality = Cardinality::ZeroOrMore;
        let extension = fragment("ext", vec![FragmentEntry::new(MergeMode::Extend, widened)]);

        let err = combine_fragments(vec![base, extension]).unwrap_err();
        assert!(matches!(err, MergeError::ShapeMismatch { .. }));
    }

    #[test]
    fn extend_of_unseen_name_inserts_it() {
        let extension = fragment("ext", vec![FragmentEntry::new(
            MergeMode::Extend,
            choice_statement("category", &["rate-limit"]),
        )]);

        let merged = combine_fragments(vec![extension]).unwrap();
        assert!(merged.contains("category"));
    }

    #[test]
    fn failed_merge_produces_no_partial_grammar() {
        let a = fragment("a", vec![
            define(statement("ok", Cardinality::One)),
            define(statement("x", Cardinality::One)),
        ]);
        let b = fragment("b", vec![define(statement("x", Cardinality::ZeroOrMore))]);

        let result = combine_fragments(vec![a, b]);
        assert!(result.is_err());
    }

    #[test]
    fn empty_input_merges_to_empty_grammar() {
        let merged = combine_fragments(Vec::new()).unwrap();
        assert!(merged.is_empty());
        assert_eq!(merged.len(), 0);
    }
}
