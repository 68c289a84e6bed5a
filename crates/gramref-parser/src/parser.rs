//! Parser for grammar-notation tokens.
//!
//! This module transforms a token stream from the [`lexer`](super::lexer)
//! into the grammar model defined in [`gramref_core`]. Parsing is fail-fast:
//! the first malformed construct aborts the fragment with a [`Diagnostic`],
//! and no partial tree is produced. The entry points are [`build_fragment`]
//! and [`build_mapbody`]; each parser function below covers one nonterminal
//! and is pure over its token stream.

use winnow::{
    Parser as _,
    combinator::{alt, opt, repeat, separated},
    error::{ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use gramref_core::{Cardinality, Choice, FragmentEntry, GrammarNode, Group, MergeMode, Statement};

use crate::{
    error::{Diagnostic, ErrorCode},
    span::Span,
    tokens::{PositionedToken, Token},
};

/// Context type for parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    /// Description of what is currently being parsed
    Label(&'static str),
    /// Error code override for specific failure shapes
    Code(ErrorCode),
    /// Remaining token count (`eof_offset()`) at error start position
    ///
    /// Used to calculate the start token index as `tokens.len() - value`.
    StartOffset(usize),
}

type Input<'src> = GrammarTokenSlice<'src>;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<Context>>>;
/// Type alias for winnow TokenSlice with our positioned tokens
type GrammarTokenSlice<'src> = TokenSlice<'src, PositionedToken<'src>>;

/// Run `f` and promote its failure to a committed error.
///
/// Records the remaining token count at entry so the converted diagnostic
/// can point at the token where the committed construct started, unless an
/// inner failure already pinned a more precise position.
fn cut<'src, O, F>(input: &mut Input<'src>, f: F) -> IResult<O>
where
    F: FnOnce(&mut Input<'src>) -> IResult<O>,
{
    let start_remaining = input.eof_offset();

    match f(input) {
        Ok(o) => Ok(o),
        Err(ErrMode::Backtrack(mut e)) | Err(ErrMode::Cut(mut e)) => {
            if !e
                .context()
                .any(|ctx| matches!(ctx, Context::StartOffset(_)))
            {
                e.push(Context::StartOffset(start_remaining));
            }
            Err(ErrMode::Cut(e))
        }
        Err(e) => Err(e),
    }
}

/// Parse an identifier token, returning its text and span.
fn raw_identifier<'src>(input: &mut Input<'src>) -> IResult<(&'src str, Span)> {
    any.verify_map(|token: &PositionedToken<'src>| match token.token {
        Token::Identifier(name) => Some((name, token.span)),
        _ => None,
    })
    .context(Context::Label("identifier"))
    .parse_next(input)
}

/// Parse a quoted literal token.
fn literal_term<'src>(input: &mut Input<'src>) -> IResult<GrammarNode> {
    any.verify_map(|token: &PositionedToken<'src>| match token.token {
        Token::Literal(text) => Some(GrammarNode::Literal(text.to_string())),
        _ => None,
    })
    .context(Context::Label("literal"))
    .parse_next(input)
}

fn left_brace<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| matches!(token.token, Token::LeftBrace))
        .void()
        .context(Context::Label("`{`"))
        .parse_next(input)
}

fn right_brace<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| matches!(token.token, Token::RightBrace))
        .void()
        .context(Context::Label("`}`"))
        .parse_next(input)
}

fn left_paren<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| matches!(token.token, Token::LeftParen))
        .void()
        .context(Context::Label("`(`"))
        .parse_next(input)
}

fn right_paren<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| matches!(token.token, Token::RightParen))
        .void()
        .context(Context::Label("`)`"))
        .parse_next(input)
}

fn left_bracket<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| matches!(token.token, Token::LeftBracket))
        .void()
        .context(Context::Label("`[`"))
        .parse_next(input)
}

fn right_bracket<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| matches!(token.token, Token::RightBracket))
        .void()
        .context(Context::Label("`]`"))
        .parse_next(input)
}

fn semicolon<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| matches!(token.token, Token::Semicolon))
        .void()
        .context(Context::Label("`;`"))
        .parse_next(input)
}

fn pipe<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| matches!(token.token, Token::Pipe))
        .void()
        .context(Context::Label("`|`"))
        .parse_next(input)
}

/// Parse a repetition suffix: `?`, `*`, or `+`.
fn repetition_suffix<'src>(input: &mut Input<'src>) -> IResult<Cardinality> {
    any.verify_map(|token: &PositionedToken<'_>| match token.token {
        Token::Question => Some(Cardinality::Optional),
        Token::Star => Some(Cardinality::ZeroOrMore),
        Token::Plus => Some(Cardinality::OneOrMore),
        _ => None,
    })
    .context(Context::Label("repetition suffix"))
    .parse_next(input)
}

/// Parse one clause term: a reference, a literal, a parenthesized group, or
/// a bracketed optional.
fn term<'src>(input: &mut Input<'src>) -> IResult<GrammarNode> {
    alt((
        raw_identifier.map(|(name, _)| GrammarNode::Reference(name.to_string())),
        literal_term,
        group,
        optional,
    ))
    .context(Context::Label("clause"))
    .parse_next(input)
}

/// Parse a clause: one or more terms with an optional repetition suffix.
///
/// A single term stays bare; multiple terms are wrapped in a [`Group`] so
/// the sequence is treated as one unit.
fn clause<'src>(input: &mut Input<'src>) -> IResult<GrammarNode> {
    let terms: Vec<GrammarNode> = repeat(1.., term).parse_next(input)?;
    let suffix = opt(repetition_suffix).parse_next(input)?;
    Ok(clause_node(terms, suffix))
}

fn clause_node(mut terms: Vec<GrammarNode>, suffix: Option<Cardinality>) -> GrammarNode {
    if terms.len() == 1 {
        let node = terms.pop().expect("one term");
        match suffix {
            None => node,
            Some(cardinality) => apply_cardinality(node, cardinality),
        }
    } else {
        GrammarNode::Group(
            Group::new(terms).with_cardinality(suffix.unwrap_or(Cardinality::One)),
        )
    }
}

/// Attach a suffix cardinality to a node.
///
/// Groups and choices that have not consumed a suffix of their own absorb
/// it; anything else (a bare reference or literal, or an already-suffixed
/// unit) is wrapped in a fresh group, since cardinality is an attribute of
/// statements, groups, and choices only.
fn apply_cardinality(node: GrammarNode, cardinality: Cardinality) -> GrammarNode {
    match node {
        GrammarNode::Group(mut group) if group.cardinality == Cardinality::One => {
            group.cardinality = cardinality;
            GrammarNode::Group(group)
        }
        GrammarNode::Choice(mut choice) if choice.cardinality == Cardinality::One => {
            choice.cardinality = cardinality;
            GrammarNode::Choice(choice)
        }
        other => GrammarNode::Group(Group::new(vec![other]).with_cardinality(cardinality)),
    }
}

/// Parse a parenthesized group: `( alternatives ) suffix?`.
///
/// Two or more `|`-separated alternatives form a [`Choice`]; a single
/// alternative is a plain [`Group`].
fn group<'src>(input: &mut Input<'src>) -> IResult<GrammarNode> {
    left_paren(input)?;

    let alternatives: Vec<GrammarNode> =
        cut(input, |i| separated(1.., clause, pipe).parse_next(i))?;
    cut(input, right_paren)?;
    let suffix = opt(repetition_suffix).parse_next(input)?;

    let cardinality = suffix.unwrap_or(Cardinality::One);
    Ok(group_node(alternatives, cardinality))
}

fn group_node(mut alternatives: Vec<GrammarNode>, cardinality: Cardinality) -> GrammarNode {
    if alternatives.len() >= 2 {
        GrammarNode::Choice(Choice::new(alternatives).with_cardinality(cardinality))
    } else {
        let node = alternatives.pop().expect("one alternative");
        match node {
            GrammarNode::Group(mut group) if group.cardinality == Cardinality::One => {
                group.cardinality = cardinality;
                GrammarNode::Group(group)
            }
            other => GrammarNode::Group(Group::new(vec![other]).with_cardinality(cardinality)),
        }
    }
}

/// Parse a bracketed optional: `[ clause ] suffix?`.
///
/// The bracket form is optional by definition; a `*` or `+` suffix after
/// the closing bracket widens it to zero-or-more.
fn optional<'src>(input: &mut Input<'src>) -> IResult<GrammarNode> {
    left_bracket(input)?;

    let node = cut(input, clause)?;
    cut(input, right_bracket)?;
    let suffix = opt(repetition_suffix).parse_next(input)?;

    let cardinality = match suffix {
        None | Some(Cardinality::Optional) => Cardinality::Optional,
        Some(Cardinality::ZeroOrMore) | Some(Cardinality::OneOrMore) => Cardinality::ZeroOrMore,
        Some(Cardinality::One) => Cardinality::Optional,
    };

    Ok(match node {
        GrammarNode::Group(mut group) if group.cardinality == Cardinality::One => {
            group.cardinality = cardinality;
            GrammarNode::Group(group)
        }
        other => GrammarNode::Group(Group::new(vec![other]).with_cardinality(cardinality)),
    })
}

/// Parse one statement body item: a nested statement or a `;`-terminated
/// clause.
fn body_item<'src>(input: &mut Input<'src>) -> IResult<GrammarNode> {
    // Try a nested statement first; it backtracks when the identifier is
    // not followed by `{`, in which case the identifier is a clause term.
    let checkpoint = input.checkpoint();
    match nested_statement(input) {
        Ok(statement) => return Ok(GrammarNode::Statement(statement)),
        Err(ErrMode::Backtrack(_)) => input.reset(&checkpoint),
        Err(e) => return Err(e),
    }

    let node = clause(input)?;
    cut(input, semicolon)?;
    Ok(node)
}

fn nested_statement<'src>(input: &mut Input<'src>) -> IResult<Statement> {
    let (name, _span) = raw_identifier(input)?;
    statement_tail(name, input)
}

/// Parse the statement tail after the name: `'{' item* '}' suffix? ';'`.
///
/// Backtracks if the next token is not `{`; commits once the body is open.
/// A body that is never closed reports E102 pointing at the opening brace.
fn statement_tail<'src>(name: &'src str, input: &mut Input<'src>) -> IResult<Statement> {
    let open_remaining = input.eof_offset();
    left_brace(input)?;

    let body: Vec<GrammarNode> = repeat(0.., body_item).parse_next(input)?;

    match right_brace(input) {
        Ok(()) => {}
        Err(ErrMode::Backtrack(mut e)) | Err(ErrMode::Cut(mut e)) => {
            e.push(Context::Code(ErrorCode::E102));
            e.push(Context::StartOffset(open_remaining));
            return Err(ErrMode::Cut(e));
        }
        Err(e) => return Err(e),
    }

    let suffix = opt(repetition_suffix).parse_next(input)?;
    cut(input, semicolon)?;

    Ok(Statement::new(name, body).with_cardinality(suffix.unwrap_or(Cardinality::One)))
}

/// Parse one top-level fragment entry: an optional merge marker followed by
/// a statement.
///
/// `override` and `extend` are contextual: they act as markers only when a
/// statement name follows, so a statement actually named `override` is
/// still expressible.
fn fragment_entry<'src>(input: &mut Input<'src>) -> IResult<(FragmentEntry, Span)> {
    let (first, first_span) = raw_identifier(input)?;

    if matches!(first, "override" | "extend") {
        let checkpoint = input.checkpoint();
        match raw_identifier(input) {
            Ok((name, name_span)) => {
                let mode = if first == "override" {
                    MergeMode::Override
                } else {
                    MergeMode::Extend
                };
                let statement = cut(input, |i| statement_tail(name, i))?;
                return Ok((FragmentEntry::new(mode, statement), name_span));
            }
            Err(ErrMode::Backtrack(_)) => input.reset(&checkpoint),
            Err(e) => return Err(e),
        }
    }

    let statement = cut(input, |i| statement_tail(first, i))?;
    Ok((FragmentEntry::new(MergeMode::Define, statement), first_span))
}

/// Parse one mapbody entry: a block statement, or a flat `name term* ';'`
/// line whose terms become the statement body.
fn mapbody_entry<'src>(input: &mut Input<'src>) -> IResult<(FragmentEntry, Span)> {
    let (name, name_span) = raw_identifier(input)?;

    let checkpoint = input.checkpoint();
    match statement_tail(name, input) {
        Ok(statement) => return Ok((FragmentEntry::new(MergeMode::Define, statement), name_span)),
        Err(ErrMode::Backtrack(_)) => input.reset(&checkpoint),
        Err(e) => return Err(e),
    }

    let statement = cut(input, |i| flat_tail(name, i))?;
    Ok((FragmentEntry::new(MergeMode::Define, statement), name_span))
}

/// Parse the flat mapbody tail after the name: `term* suffix? ';'`.
fn flat_tail<'src>(name: &'src str, input: &mut Input<'src>) -> IResult<Statement> {
    let body: Vec<GrammarNode> = repeat(0.., term).parse_next(input)?;
    let suffix = opt(repetition_suffix).parse_next(input)?;
    semicolon(input)?;

    Ok(Statement::new(name, body).with_cardinality(suffix.unwrap_or(Cardinality::One)))
}

/// Parse a full grammar fragment: a sequence of top-level statements with
/// optional merge markers.
///
/// Returns each entry with the span of its name token, for duplicate-name
/// diagnostics.
pub(crate) fn build_fragment<'src>(
    tokens: &'src [PositionedToken<'src>],
) -> Result<Vec<(FragmentEntry, Span)>, Diagnostic> {
    run_entries(tokens, fragment_entry)
}

/// Parse a mapping-body grammar: a sequence of block or flat entries.
pub(crate) fn build_mapbody<'src>(
    tokens: &'src [PositionedToken<'src>],
) -> Result<Vec<(FragmentEntry, Span)>, Diagnostic> {
    run_entries(tokens, mapbody_entry)
}

fn run_entries<'src, F>(
    tokens: &'src [PositionedToken<'src>],
    entry: F,
) -> Result<Vec<(FragmentEntry, Span)>, Diagnostic>
where
    F: FnMut(&mut Input<'src>) -> IResult<(FragmentEntry, Span)>,
{
    let mut token_slice = TokenSlice::new(tokens);

    let parsed: IResult<Vec<(FragmentEntry, Span)>> =
        repeat(0.., entry).parse_next(&mut token_slice);

    match parsed {
        Ok(entries) => {
            let remaining = token_slice.eof_offset();
            if remaining != 0 {
                let index = tokens.len() - remaining;
                return Err(Diagnostic::error("expected a statement definition")
                    .with_code(ErrorCode::E100)
                    .with_label(tokens[index].span, ErrorCode::E100.description()));
            }
            Ok(entries)
        }
        Err(e) => {
            let current_remaining = token_slice.eof_offset();
            Err(convert_error(e, tokens, current_remaining))
        }
    }
}

/// Convert a winnow error into a [`Diagnostic`] with a useful span.
fn convert_error(
    error: ErrMode<ContextError<Context>>,
    tokens: &[PositionedToken],
    current_remaining: usize,
) -> Diagnostic {
    let context_error = match error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e,
        ErrMode::Incomplete(_) => ContextError::new(),
    };

    let labels: Vec<String> = context_error
        .context()
        .filter_map(|ctx| match ctx {
            Context::Label(label) => Some(format!("expected {label}")),
            _ => None,
        })
        .collect();

    let explicit_code = context_error.context().find_map(|ctx| match ctx {
        Context::Code(code) => Some(*code),
        _ => None,
    });

    let start_remaining = context_error.context().find_map(|ctx| match ctx {
        Context::StartOffset(n) => Some(*n),
        _ => None,
    });

    let end_offset = tokens.len() - current_remaining.min(tokens.len());
    let at_eof = end_offset >= tokens.len();

    let code = explicit_code.unwrap_or(if at_eof {
        ErrorCode::E101
    } else {
        ErrorCode::E100
    });

    let message = if labels.is_empty() {
        "unexpected token or end of input".to_string()
    } else {
        labels.join(" → ")
    };

    // An unclosed block points at its opening brace; otherwise point at the
    // token the parser stopped on, or the last token at end of input.
    let span = if code == ErrorCode::E102 {
        start_remaining
            .and_then(|remaining| tokens.get(tokens.len() - remaining.min(tokens.len())))
            .map(|token| token.span)
            .unwrap_or_default()
    } else if !at_eof {
        tokens[end_offset].span
    } else {
        tokens.last().map(|token| token.span).unwrap_or_default()
    };

    Diagnostic::error(message)
        .with_code(code)
        .with_label(span, code.description())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse_tokens(input: &str) -> Vec<PositionedToken<'_>> {
        tokenize(input).expect("failed to tokenize input")
    }

    #[test]
    fn raw_identifier_returns_text_and_span() {
        let tokens = parse_tokens("max-cache-size");
        let mut slice = TokenSlice::new(&tokens);
        let (name, span) = raw_identifier(&mut slice).unwrap();
        assert_eq!(name, "max-cache-size");
        assert_eq!(span.start(), 0);
        assert_eq!(span.end(), 14);
    }

    #[test]
    fn single_term_clause_stays_bare() {
        let tokens = parse_tokens("address");
        let mut slice = TokenSlice::new(&tokens);
        let node = clause(&mut slice).unwrap();
        assert_eq!(node, GrammarNode::Reference("address".to_string()));
    }

    #[test]
    fn multi_term_clause_becomes_group() {
        let tokens = parse_tokens("address port");
        let mut slice = TokenSlice::new(&tokens);
        let node = clause(&mut slice).unwrap();
        assert_eq!(
            node,
            GrammarNode::Group(Group::new(vec![
                GrammarNode::Reference("address".to_string()),
                GrammarNode::Reference("port".to_string()),
            ]))
        );
    }

    #[test]
    fn suffixed_reference_wraps_in_group() {
        let tokens = parse_tokens("address*");
        let mut slice = TokenSlice::new(&tokens);
        let node = clause(&mut slice).unwrap();
        assert_eq!(
            node,
            GrammarNode::Group(
                Group::new(vec![GrammarNode::Reference("address".to_string())])
                    .with_cardinality(Cardinality::ZeroOrMore)
            )
        );
    }

    #[test]
    fn single_alternative_parens_is_group() {
        let tokens = parse_tokens("( address )");
        let mut slice = TokenSlice::new(&tokens);
        let node = term(&mut slice).unwrap();
        assert!(matches!(node, GrammarNode::Group(_)));
    }

    #[test]
    fn two_alternatives_are_a_choice() {
        let tokens = parse_tokens("( \"yes\" | \"no\" )");
        let mut slice = TokenSlice::new(&tokens);
        let node = term(&mut slice).unwrap();
        match node {
            GrammarNode::Choice(choice) => {
                assert_eq!(choice.alternatives.len(), 2);
                assert_eq!(choice.cardinality, Cardinality::One);
            }
            other => panic!("expected choice, got {other:?}"),
        }
    }

    #[test]
    fn bracket_form_is_optional_group() {
        let tokens = parse_tokens("[ class ]");
        let mut slice = TokenSlice::new(&tokens);
        let node = term(&mut slice).unwrap();
        assert_eq!(
            node,
            GrammarNode::Group(
                Group::new(vec![GrammarNode::Reference("class".to_string())])
                    .with_cardinality(Cardinality::Optional)
            )
        );
    }

    #[test]
    fn bracket_with_star_widens_to_zero_or_more() {
        let tokens = parse_tokens("[ class ]*");
        let mut slice = TokenSlice::new(&tokens);
        let node = term(&mut slice).unwrap();
        assert_eq!(node.cardinality(), Cardinality::ZeroOrMore);
    }
}
