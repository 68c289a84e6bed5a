//! Canonical notation renderer.
//!
//! Renders grammar nodes back into the notation the grammar parser accepts,
//! so generated documentation shows readers the exact syntax the real
//! configuration parser understands. Rendering and parsing round-trip:
//! parsing the rendered text yields a structurally identical tree.

use std::fmt::Write;

use crate::fragment::{FragmentEntry, GrammarFragment, MergeMode};
use crate::node::{Cardinality, GrammarNode, Statement};

const INDENT: &str = "    ";

/// Render one statement in block form, e.g.
///
/// ```text
/// zone {
///     "name";
///     ( "primary" | "secondary" )?;
/// }*;
/// ```
pub fn render_statement(statement: &Statement) -> String {
    let mut out = String::new();
    write_statement(&mut out, statement, 0);
    out
}

/// Render a whole fragment, one blank line between top-level statements,
/// with merge markers preserved.
pub fn render_fragment(fragment: &GrammarFragment) -> String {
    let mut out = String::new();
    for (i, entry) in fragment.entries().iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        write_entry(&mut out, entry);
        out.push('\n');
    }
    out
}

fn write_entry(out: &mut String, entry: &FragmentEntry) {
    match entry.mode {
        MergeMode::Define => {}
        MergeMode::Override => out.push_str("override "),
        MergeMode::Extend => out.push_str("extend "),
    }
    write_statement(out, &entry.statement, 0);
}

fn write_statement(out: &mut String, statement: &Statement, depth: usize) {
    let _ = write!(out, "{} {{", statement.name);
    for item in &statement.body {
        out.push('\n');
        for _ in 0..=depth {
            out.push_str(INDENT);
        }
        write_item(out, item, depth + 1);
    }
    if !statement.body.is_empty() {
        out.push('\n');
        for _ in 0..depth {
            out.push_str(INDENT);
        }
    }
    let _ = write!(out, "}}{};", statement.cardinality.suffix());
}

/// One body item: a nested statement block or a `;`-terminated clause.
fn write_item(out: &mut String, item: &GrammarNode, depth: usize) {
    match item {
        GrammarNode::Statement(statement) => write_statement(out, statement, depth),
        node => {
            write_node(out, node);
            out.push(';');
        }
    }
}

fn write_node(out: &mut String, node: &GrammarNode) {
    match node {
        GrammarNode::Literal(text) => {
            let _ = write!(out, "\"{text}\"");
        }
        GrammarNode::Reference(name) => out.push_str(name),
        GrammarNode::Group(group) => {
            // Optional groups use the bracket form; everything else is
            // parenthesized with its repetition suffix.
            if group.cardinality == Cardinality::Optional {
                out.push_str("[ ");
                write_sequence(out, &group.children);
                out.push_str(" ]");
            } else {
                out.push_str("( ");
                write_sequence(out, &group.children);
                out.push_str(" )");
                out.push_str(group.cardinality.suffix());
            }
        }
        GrammarNode::Choice(choice) => {
            out.push_str("( ");
            for (i, alternative) in choice.alternatives.iter().enumerate() {
                if i > 0 {
                    out.push_str(" | ");
                }
                write_node(out, alternative);
            }
            out.push_str(" )");
            out.push_str(choice.cardinality.suffix());
        }
        GrammarNode::Statement(statement) => {
            // Statements nested in clause position render inline.
            write_statement(out, statement, 0);
        }
    }
}

fn write_sequence(out: &mut String, nodes: &[GrammarNode]) {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        write_node(out, node);
    }
}

impl std::fmt::Display for GrammarNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = String::new();
        write_node(&mut out, self);
        f.write_str(&out)
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&render_statement(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Choice, Group};

    fn literal(text: &str) -> GrammarNode {
        GrammarNode::Literal(text.to_string())
    }

    fn reference(name: &str) -> GrammarNode {
        GrammarNode::Reference(name.to_string())
    }

    #[test]
    fn minimal_statement() {
        let stmt = Statement::new("foo", vec![literal("bar")]);
        assert_eq!(render_statement(&stmt), "foo {\n    \"bar\";\n};");
    }

    #[test]
    fn empty_statement_body() {
        let stmt = Statement::new("inline-signing", Vec::new());
        assert_eq!(render_statement(&stmt), "inline-signing {};");
    }

    #[test]
    fn statement_cardinality_suffix() {
        let stmt = Statement::new("zone", vec![reference("name")])
            .with_cardinality(Cardinality::ZeroOrMore);
        assert_eq!(render_statement(&stmt), "zone {\n    name;\n}*;");
    }

    #[test]
    fn choice_renders_with_pipes() {
        let choice = Choice::new(vec![literal("yes"), literal("no")])
            .with_cardinality(Cardinality::Optional);
        let mut out = String::new();
        write_node(&mut out, &GrammarNode::Choice(choice));
        assert_eq!(out, "( \"yes\" | \"no\" )?");
    }

    #[test]
    fn optional_group_uses_brackets() {
        let group = Group::new(vec![reference("class")]).with_cardinality(Cardinality::Optional);
        assert_eq!(GrammarNode::Group(group).to_string(), "[ class ]");
    }

    #[test]
    fn repeated_group_uses_parens() {
        let group = Group::new(vec![reference("address"), reference("port")])
            .with_cardinality(Cardinality::OneOrMore);
        assert_eq!(GrammarNode::Group(group).to_string(), "( address port )+");
    }

    #[test]
    fn nested_statement_indents() {
        let inner = Statement::new("file", vec![literal("path")]);
        let outer = Statement::new("zone", vec![GrammarNode::Statement(inner)]);
        assert_eq!(
            render_statement(&outer),
            "zone {\n    file {\n        \"path\";\n    };\n};"
        );
    }

    #[test]
    fn fragment_preserves_markers() {
        let fragment = GrammarFragment::new(
            "view.grammar",
            vec![
                FragmentEntry::new(MergeMode::Define, Statement::new("view", vec![])),
                FragmentEntry::new(MergeMode::Override, Statement::new("zone", vec![])),
            ],
        );
        assert_eq!(render_fragment(&fragment), "view {};\n\noverride zone {};\n");
    }
}
