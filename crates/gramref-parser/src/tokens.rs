//! Token types for the grammar notation.

use std::fmt;

use winnow::stream::Location;

use crate::span::Span;

/// Lexical tokens of the grammar notation.
///
/// Comments and whitespace are consumed by the lexer and never emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'src> {
    /// A statement or reference name: `[A-Za-z_][A-Za-z0-9_-]*`.
    Identifier(&'src str),
    /// A quoted literal with the quotes stripped.
    Literal(&'src str),

    // Punctuation
    LeftBrace,    // {
    RightBrace,   // }
    Semicolon,    // ;
    Pipe,         // |
    LeftBracket,  // [
    RightBracket, // ]
    LeftParen,    // (
    RightParen,   // )
    Star,         // *
    Plus,         // +
    Question,     // ?
}

/// A token with position information for winnow integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span) -> Self {
        Self { token, span }
    }
}

impl<'src> std::ops::Deref for PositionedToken<'src> {
    type Target = Token<'src>;

    fn deref(&self) -> &Self::Target {
        &self.token
    }
}

impl<'src> AsRef<Token<'src>> for PositionedToken<'src> {
    fn as_ref(&self) -> &Token<'src> {
        &self.token
    }
}

impl<'src> From<(Token<'src>, Span)> for PositionedToken<'src> {
    fn from((token, span): (Token<'src>, Span)) -> Self {
        Self::new(token, span)
    }
}

impl<'src> fmt::Display for PositionedToken<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.token.fmt(f)
    }
}

impl<'src> Location for PositionedToken<'src> {
    fn previous_token_end(&self) -> usize {
        self.span.start()
    }

    fn current_token_start(&self) -> usize {
        self.span.start()
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Identifier(name) => write!(f, "{name}"),
            Token::Literal(text) => write!(f, "\"{text}\""),

            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::Semicolon => write!(f, ";"),
            Token::Pipe => write!(f, "|"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Star => write!(f, "*"),
            Token::Plus => write!(f, "+"),
            Token::Question => write!(f, "?"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_display() {
        assert_eq!(Token::Identifier("zone").to_string(), "zone");
        assert_eq!(Token::Literal("yes").to_string(), "\"yes\"");
        assert_eq!(Token::LeftBrace.to_string(), "{");
        assert_eq!(Token::Pipe.to_string(), "|");
        assert_eq!(Token::Question.to_string(), "?");
    }

    #[test]
    fn positioned_token_derefs_to_token() {
        let positioned = PositionedToken::new(Token::Semicolon, Span::new(3..4));
        assert_eq!(*positioned, Token::Semicolon);
        assert_eq!(positioned.span.start(), 3);
    }
}
