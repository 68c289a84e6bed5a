//! Grammar node model types.
//!
//! This module contains the in-memory representation of a configuration
//! grammar after parsing. These types describe the *syntax a configuration
//! parser accepts*, never a configuration instance itself.
//!
//! # Pipeline Position
//!
//! ```text
//! Grammar Source Text
//!     ↓ lexer
//! Tokens
//!     ↓ parser
//! GrammarFragment (these types) - one per source file
//!     ↓ merge
//! MergedGrammar - canonical statement set
//!     ↓ build
//! DocumentTree - placeholder nodes for the host renderer
//! ```

use std::fmt;

use serde::Serialize;

/// How many times a clause may appear.
///
/// Cardinality is an attribute of [`Statement`], [`Group`], and [`Choice`]
/// nodes; literals and references always appear exactly once in their
/// enclosing unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Cardinality {
    /// The clause appears exactly once (no suffix).
    #[default]
    One,
    /// The clause may be omitted (`?`).
    Optional,
    /// The clause may appear any number of times, including zero (`*`).
    ZeroOrMore,
    /// The clause appears at least once (`+`).
    OneOrMore,
}

impl Cardinality {
    /// The notation suffix for this cardinality, as it appears in grammar
    /// source. [`Cardinality::One`] has no suffix.
    pub fn suffix(&self) -> &'static str {
        match self {
            Cardinality::One => "",
            Cardinality::Optional => "?",
            Cardinality::ZeroOrMore => "*",
            Cardinality::OneOrMore => "+",
        }
    }

    /// Minimum number of occurrences.
    pub fn min(&self) -> usize {
        match self {
            Cardinality::One | Cardinality::OneOrMore => 1,
            Cardinality::Optional | Cardinality::ZeroOrMore => 0,
        }
    }

    /// Whether the clause may repeat without bound.
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Cardinality::ZeroOrMore | Cardinality::OneOrMore)
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::One => write!(f, "exactly one"),
            Cardinality::Optional => write!(f, "optional"),
            Cardinality::ZeroOrMore => write!(f, "zero or more"),
            Cardinality::OneOrMore => write!(f, "one or more"),
        }
    }
}

/// A single element of a grammar tree.
///
/// The variants are matched exhaustively by every consumer; there is no
/// attribute probing anywhere in the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GrammarNode {
    /// A named syntactic unit with a braced body.
    Statement(Statement),
    /// Fixed quoted text.
    Literal(String),
    /// A bare name resolved by the documentation host, not by this core.
    Reference(String),
    /// An ordered sequence of children treated as one unit.
    Group(Group),
    /// A set of two or more alternatives; exactly one applies at a time.
    Choice(Choice),
}

impl GrammarNode {
    /// The cardinality of this node. Literals and references are always
    /// exactly-one.
    pub fn cardinality(&self) -> Cardinality {
        match self {
            GrammarNode::Statement(stmt) => stmt.cardinality,
            GrammarNode::Group(group) => group.cardinality,
            GrammarNode::Choice(choice) => choice.cardinality,
            GrammarNode::Literal(_) | GrammarNode::Reference(_) => Cardinality::One,
        }
    }
}

/// A named top-level or nested syntactic unit: `name { body } suffix? ;`.
///
/// Statement names are unique within their defining scope (the fragment for
/// top-level statements, the enclosing body for nested ones).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    /// The statement keyword.
    pub name: String,
    /// Ordered body items: nested statements and clauses.
    pub body: Vec<GrammarNode>,
    /// How often the statement may appear in its scope.
    pub cardinality: Cardinality,
}

impl Statement {
    /// Create a statement with exactly-one cardinality.
    pub fn new(name: impl Into<String>, body: Vec<GrammarNode>) -> Self {
        Self {
            name: name.into(),
            body,
            cardinality: Cardinality::One,
        }
    }

    /// Set the cardinality.
    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    /// Whether the statement body is a single top-level [`Choice`].
    ///
    /// Only choice-shaped statements can participate in an extend merge.
    pub fn is_choice_shaped(&self) -> bool {
        matches!(self.body.as_slice(), [GrammarNode::Choice(_)])
    }

    /// The top-level choice of a choice-shaped statement.
    pub fn top_choice(&self) -> Option<&Choice> {
        match self.body.as_slice() {
            [GrammarNode::Choice(choice)] => Some(choice),
            _ => None,
        }
    }

    /// Mutable access to the top-level choice of a choice-shaped statement.
    pub fn top_choice_mut(&mut self) -> Option<&mut Choice> {
        match self.body.as_mut_slice() {
            [GrammarNode::Choice(choice)] => Some(choice),
            _ => None,
        }
    }
}

/// An ordered sequence of child nodes treated as one unit.
///
/// Optional-cardinality groups are written `[ ... ]` in notation; all other
/// groups are written `( ... )` with a repetition suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub children: Vec<GrammarNode>,
    pub cardinality: Cardinality,
}

impl Group {
    pub fn new(children: Vec<GrammarNode>) -> Self {
        Self {
            children,
            cardinality: Cardinality::One,
        }
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }
}

/// Two or more `|`-separated alternatives.
///
/// The parser never constructs a choice with fewer than two alternatives; a
/// single parenthesized clause is a plain [`Group`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub alternatives: Vec<GrammarNode>,
    pub cardinality: Cardinality,
}

impl Choice {
    pub fn new(alternatives: Vec<GrammarNode>) -> Self {
        debug_assert!(alternatives.len() >= 2, "choice needs two alternatives");
        Self {
            alternatives,
            cardinality: Cardinality::One,
        }
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cardinality_suffixes() {
        assert_eq!(Cardinality::One.suffix(), "");
        assert_eq!(Cardinality::Optional.suffix(), "?");
        assert_eq!(Cardinality::ZeroOrMore.suffix(), "*");
        assert_eq!(Cardinality::OneOrMore.suffix(), "+");
    }

    #[test]
    fn cardinality_bounds() {
        assert_eq!(Cardinality::One.min(), 1);
        assert_eq!(Cardinality::Optional.min(), 0);
        assert_eq!(Cardinality::ZeroOrMore.min(), 0);
        assert_eq!(Cardinality::OneOrMore.min(), 1);

        assert!(!Cardinality::One.is_unbounded());
        assert!(!Cardinality::Optional.is_unbounded());
        assert!(Cardinality::ZeroOrMore.is_unbounded());
        assert!(Cardinality::OneOrMore.is_unbounded());
    }

    #[test]
    fn leaf_nodes_are_exactly_one() {
        assert_eq!(
            GrammarNode::Literal("yes".to_string()).cardinality(),
            Cardinality::One
        );
        assert_eq!(
            GrammarNode::Reference("zone".to_string()).cardinality(),
            Cardinality::One
        );
    }

    #[test]
    fn choice_shaped_statement() {
        let choice = Choice::new(vec![
            GrammarNode::Literal("yes".to_string()),
            GrammarNode::Literal("no".to_string()),
        ]);
        let stmt = Statement::new("recursion", vec![GrammarNode::Choice(choice)]);
        assert!(stmt.is_choice_shaped());
        assert_eq!(stmt.top_choice().unwrap().alternatives.len(), 2);

        let plain = Statement::new("zone", vec![GrammarNode::Reference("name".to_string())]);
        assert!(!plain.is_choice_shaped());
        assert!(plain.top_choice().is_none());
    }

    #[test]
    fn statement_cardinality_builder() {
        let stmt = Statement::new("zone", Vec::new()).with_cardinality(Cardinality::ZeroOrMore);
        assert_eq!(stmt.cardinality, Cardinality::ZeroOrMore);
        assert_eq!(
            GrammarNode::Statement(stmt).cardinality(),
            Cardinality::ZeroOrMore
        );
    }
}
