//! Lexical analyzer for grammar-notation source text.
//!
//! The lexer converts source text into a stream of [`Token`]s for parsing.
//! Comments (`#` to end of line) and whitespace are consumed and never
//! emitted. Every token carries its byte span so diagnostics can report
//! exact line/column positions.
//!
//! The public entry point is [`tokenize`], which performs error-recovering
//! lexical analysis and collects all diagnostics in a single pass. Any
//! lexical error fails the whole fragment; re-invoking [`tokenize`] on the
//! same text gives a fresh pass.

use winnow::{
    Parser as _,
    combinator::{alt, cut_err, preceded, repeat, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::take_while,
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
    tokens::{PositionedToken, Token},
};

/// Rich diagnostic information for lexer errors.
///
/// Attached to winnow errors via `.context()` so the final diagnostic keeps
/// its code, help text, and the span start of the offending construct.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    pub code: ErrorCode,
    pub message: &'static str,
    pub help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    pub start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<'a, O> = ModalResult<O, ContextError<LexerDiagnostic>>;

/// Parse a quoted literal.
///
/// Literals carry no escape sequences and may not span lines; a literal
/// still open at a newline or at end of input is unterminated.
fn literal<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    let start_pos = input.current_token_start();

    '"'.parse_next(input)?;

    // Commit after the opening quote so a missing close quote reports E001
    // with a span from the opening quote to the error position.
    cut_err(terminated(
        take_while(0.., |c: char| c != '"' && c != '\n' && c != '\r'),
        '"',
    ))
    .context(LexerDiagnostic {
        code: ErrorCode::E001,
        message: "unterminated literal",
        help: Some("add a closing `\"` before the end of the line"),
        start: start_pos,
    })
    .parse_next(input)
    .map(Token::Literal)
}

/// Parse an identifier: `[A-Za-z_][A-Za-z0-9_-]*`.
///
/// Dashes are valid interior characters; configuration statement names such
/// as `max-cache-size` are single identifiers.
fn identifier<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    take_while(1.., |c: char| {
        c.is_ascii_alphanumeric() || c == '_' || c == '-'
    })
    .verify(|s: &str| {
        s.chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
    })
    .map(Token::Identifier)
    .parse_next(input)
}

/// Parse a single punctuation token.
fn punctuation<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    alt((
        '{'.value(Token::LeftBrace),
        '}'.value(Token::RightBrace),
        ';'.value(Token::Semicolon),
        '|'.value(Token::Pipe),
        '['.value(Token::LeftBracket),
        ']'.value(Token::RightBracket),
        '('.value(Token::LeftParen),
        ')'.value(Token::RightParen),
        alt((
            '*'.value(Token::Star),
            '+'.value(Token::Plus),
            '?'.value(Token::Question),
        )),
    ))
    .parse_next(input)
}

/// Consume a `#` comment up to (not including) the end of the line.
fn comment<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    preceded('#', take_while(0.., |c| c != '\n'))
        .void()
        .parse_next(input)
}

/// Consume a run of whitespace.
fn whitespace<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    take_while(1.., char::is_whitespace).void().parse_next(input)
}

/// Consume any amount of whitespace and comments.
fn trivia0<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    repeat(0.., alt((whitespace, comment))).parse_next(input)
}

/// Parse a single token with position tracking.
fn positioned_token<'a>(input: &mut Input<'a>) -> IResult<'a, PositionedToken<'a>> {
    let start_pos = input.current_token_start();

    let token = alt((literal, identifier, punctuation)).parse_next(input)?;

    let end_pos = input.current_token_start();
    let span = Span::new(start_pos..end_pos);

    Ok(PositionedToken::new(token, span))
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer<'a> {
    tokens: Vec<PositionedToken<'a>>,
    diagnostics: DiagnosticCollector,
}

impl<'a> Lexer<'a> {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// Tokenize the input, collecting tokens and errors.
    fn tokenize(&mut self, mut input: Input<'a>) {
        loop {
            let _ = trivia0(&mut input);
            if input.eof_offset() == 0 {
                break;
            }

            match positioned_token(&mut input) {
                Ok(token) => {
                    self.tokens.push(token);
                }
                Err(e) => {
                    let error_pos = input.current_token_start();

                    let diagnostic = Self::convert_err_mode(e, error_pos);
                    self.diagnostics.emit(diagnostic);

                    // Skip one character and keep lexing so a single pass
                    // reports every lexical error in the fragment.
                    if input.eof_offset() > 0 {
                        input.next_token();
                    }
                }
            }
        }
    }

    /// Finish lexing and return tokens or collected errors.
    fn finish(self) -> Result<Vec<PositionedToken<'a>>, ParseError> {
        self.diagnostics.finish().map(|()| self.tokens)
    }

    /// Convert an ErrMode and error position to a Diagnostic.
    ///
    /// Extracts `LexerDiagnostic` from the error context when present; falls
    /// back to E002 (unexpected character) otherwise.
    fn convert_err_mode(
        err: ErrMode<ContextError<LexerDiagnostic>>,
        error_pos: usize,
    ) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let span = Span::new(*start..error_pos);

            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(span, code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        let span = Span::new(error_pos..error_pos.saturating_add(1));
        Diagnostic::error("unexpected character")
            .with_code(ErrorCode::E002)
            .with_label(span, ErrorCode::E002.description())
    }
}

/// Tokenize grammar-notation source, collecting multiple errors.
///
/// # Returns
///
/// - `Ok(tokens)` - every token in source order, comments and whitespace
///   already stripped
/// - `Err(ParseError)` - one or more lexical errors; no token stream is
///   returned and the fragment is failed
pub fn tokenize(input: &str) -> Result<Vec<PositionedToken<'_>>, ParseError> {
    let located_input = LocatingSlice::new(input);
    let mut lexer = Lexer::new();
    lexer.tokenize(located_input);
    lexer.finish()
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    /// Strategy for valid identifier strings.
    fn valid_identifier_strategy() -> impl Strategy<Value = String> {
        "[a-z_][a-z0-9_-]{0,20}"
    }

    /// Valid identifiers always tokenize to a single identifier token.
    fn check_identifier_tokenizes(id: &str) -> Result<(), TestCaseError> {
        let result = tokenize(id);
        prop_assert!(result.is_ok(), "failed to tokenize identifier `{id}`");
        let tokens = result.unwrap();
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(tokens[0].token, Token::Identifier(id));
        Ok(())
    }

    /// Literal content without quotes or newlines round-trips through the
    /// lexer unchanged.
    fn check_literal_tokenizes(content: &str) -> Result<(), TestCaseError> {
        let source = format!("\"{content}\"");
        let result = tokenize(&source);
        prop_assert!(result.is_ok(), "failed to tokenize literal {source:?}");
        let tokens = result.unwrap();
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(tokens[0].token, Token::Literal(content));
        Ok(())
    }

    proptest! {
        #[test]
        fn identifiers_tokenize(id in valid_identifier_strategy()) {
            check_identifier_tokenizes(&id)?;
        }

        #[test]
        fn literals_tokenize(content in "[a-zA-Z0-9 ._/-]{0,30}") {
            check_literal_tokenizes(&content)?;
        }
    }
}
