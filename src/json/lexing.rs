//! One-token-lookahead lexer over an in-memory document
//!
//! [`Lexer`] wraps the logos scanner, attaches positions to every token and
//! keeps the next token primed so the parser can [`Lexer::seek`] before it
//! commits with [`Lexer::get`]. Scanner errors are turned into `Bad` tokens
//! carrying the rejected text; once input runs out the lexer keeps returning
//! `Eof`.

use super::location::SourceLocation;
use super::token::{RawToken, Token, TokenKind};
use logos::Logos;

pub struct Lexer<'src> {
    scanner: logos::Lexer<'src, RawToken>,
    location: SourceLocation<'src>,
    next: Token,
}

impl<'src> Lexer<'src> {
    /// Create a lexer and prime the first token.
    pub fn new(source: &'src str) -> Self {
        let mut lexer = Self {
            scanner: RawToken::lexer(source),
            location: SourceLocation::new(source),
            next: Token::new(TokenKind::Eof, "", None),
        };
        lexer.next = lexer.scan_token();
        lexer
    }

    /// Return and consume the next token.
    pub fn get(&mut self) -> Token {
        let upcoming = self.scan_token();
        std::mem::replace(&mut self.next, upcoming)
    }

    /// Return the next token without consuming it.
    pub fn seek(&self) -> &Token {
        &self.next
    }

    fn scan_token(&mut self) -> Token {
        match self.scanner.next() {
            Some(Ok(raw)) => {
                let position = self.location.byte_to_position(self.scanner.span().start);
                Token::from_raw(raw, position)
            }
            Some(Err(())) => {
                let position = self.location.byte_to_position(self.scanner.span().start);
                Token::new(TokenKind::Bad, self.scanner.slice(), Some(position))
            }
            None => Token::new(TokenKind::Eof, "", Some(self.location.end_position())),
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    /// Yields every token up to, not including, `Eof`.
    fn next(&mut self) -> Option<Token> {
        if self.next.is(TokenKind::Eof) {
            None
        } else {
            Some(self.get())
        }
    }
}

/// Convenience function to tokenize a document and collect its token kinds
pub fn tokenize(source: &str) -> Vec<TokenKind> {
    Lexer::new(source).map(|token| token.kind()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::location::Position;

    #[test]
    fn test_seek_does_not_consume() {
        let mut lexer = Lexer::new("[1]");
        assert_eq!(lexer.seek().kind(), TokenKind::LeftBracket);
        assert_eq!(lexer.seek().kind(), TokenKind::LeftBracket);
        assert_eq!(lexer.get().kind(), TokenKind::LeftBracket);
        assert_eq!(lexer.seek().kind(), TokenKind::Number);
    }

    #[test]
    fn test_primed_lexer_works_with_iterator_adapters() {
        let lexer = Lexer::new("[1, 2]");
        let running: Vec<usize> = lexer
            .scan(0, |count, _| {
                *count += 1;
                Some(*count)
            })
            .collect();
        assert_eq!(running, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut lexer = Lexer::new("  # only a comment");
        assert_eq!(lexer.get().kind(), TokenKind::Eof);
        assert_eq!(lexer.get().kind(), TokenKind::Eof);
    }

    #[test]
    fn test_simple_tokenization() {
        assert_eq!(
            tokenize(r#"{"a": [true, false, 1.5]}"#),
            vec![
                TokenKind::LeftBrace,
                TokenKind::String,
                TokenKind::Colon,
                TokenKind::LeftBracket,
                TokenKind::True,
                TokenKind::Comma,
                TokenKind::False,
                TokenKind::Comma,
                TokenKind::Number,
                TokenKind::RightBracket,
                TokenKind::RightBrace,
            ]
        );
    }

    #[test]
    fn test_positions_are_one_based() {
        let mut lexer = Lexer::new("{\n  \"key\": 12\n}");
        assert_eq!(lexer.get().position(), Some(Position::new(1, 1)));
        let key = lexer.get();
        assert_eq!(key.value(), "key");
        assert_eq!(key.position(), Some(Position::new(2, 3)));
        assert_eq!(lexer.get().position(), Some(Position::new(2, 8)));
        assert_eq!(lexer.get().position(), Some(Position::new(2, 10)));
        assert_eq!(lexer.get().position(), Some(Position::new(3, 1)));
        assert_eq!(lexer.get().position(), Some(Position::new(3, 2)));
    }

    #[test]
    fn test_bad_token_keeps_rejected_text() {
        let mut lexer = Lexer::new("[1.]");
        lexer.get();
        let bad = lexer.get();
        assert_eq!(bad.kind(), TokenKind::Bad);
        assert_eq!(bad.value(), "1.");
        assert_eq!(bad.position(), Some(Position::new(1, 2)));
    }

    #[test]
    fn test_keyword_mismatch_is_bad() {
        assert_eq!(tokenize("[tru]")[1], TokenKind::Bad);
        assert_eq!(tokenize("[null]")[1], TokenKind::Bad);
    }

    #[test]
    fn test_unterminated_string_is_bad() {
        let mut lexer = Lexer::new("[\"open");
        lexer.get();
        assert_eq!(lexer.get().kind(), TokenKind::Bad);
    }
}
