//! Token definitions for lconf documents
//!
//! Two layers live here:
//!
//! - [`RawToken`] is the logos-derived scanner. It knows the surface syntax
//!   (punctuation, keywords, strings, numbers, `@"..."` includes) and skips
//!   whitespace and `#` comments.
//! - [`Token`] is what the parser sees: an immutable kind + text + position
//!   triple. Anything the scanner rejects becomes a [`TokenKind::Bad`] token
//!   rather than an error, so the parser decides how to report it.

use super::location::Position;
use logos::Logos;
use std::fmt;

/// Scanner output. Data-carrying variants hold the already-validated text.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"([ \t\r\n\f]+|#[^\n]*)")]
pub(crate) enum RawToken {
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // The regex is deliberately looser than the grammar so that a malformed
    // run like `1.` or `1e` is consumed whole and rejected by the callback.
    #[regex(r"-?([0-9]+(\.[0-9]*)?|\.[0-9]*)([eE]-?[0-9]*)?", validate_number)]
    Number(String),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(&lex.slice()[1..]))]
    String(String),

    #[regex(r#"@"([^"\\]|\\.)*""#, |lex| unescape(&lex.slice()[2..]))]
    Include(String),
}

/// Accept `-? digits* ('.' digits+)? ([eE] '-'? digits+)?` with at least one
/// mantissa digit.
fn validate_number(lex: &mut logos::Lexer<RawToken>) -> Option<String> {
    let text = lex.slice();
    let body = text.strip_prefix('-').unwrap_or(text);

    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(at) => (&body[..at], Some(&body[at + 1..])),
        None => (body, None),
    };

    let (integer, fraction) = match mantissa.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (mantissa, None),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(integer) {
        return None;
    }
    if let Some(fraction) = fraction {
        if fraction.is_empty() || !all_digits(fraction) {
            return None;
        }
    }
    if integer.is_empty() && fraction.is_none() {
        return None;
    }
    if let Some(exponent) = exponent {
        let digits = exponent.strip_prefix('-').unwrap_or(exponent);
        if digits.is_empty() || !all_digits(digits) {
            return None;
        }
    }

    Some(text.to_string())
}

/// Decode the body of a quoted literal. `quoted` starts right after the opening
/// quote and still carries the closing one.
fn unescape(quoted: &str) -> Option<String> {
    let body = quoted.strip_suffix('"')?;
    let mut value = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            value.push(ch);
            continue;
        }
        match chars.next()? {
            '\\' => value.push('\\'),
            '"' => value.push('"'),
            'n' => value.push('\n'),
            't' => value.push('\t'),
            _ => return None,
        }
    }

    Some(value)
}

/// The kinds of token the parser distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Eof,
    Bad,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Colon,
    True,
    False,
    Number,
    String,
    Include,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Eof => "end of input",
            TokenKind::Bad => "bad token",
            TokenKind::LeftBrace => "`{`",
            TokenKind::RightBrace => "`}`",
            TokenKind::LeftBracket => "`[`",
            TokenKind::RightBracket => "`]`",
            TokenKind::Comma => "`,`",
            TokenKind::Colon => "`:`",
            TokenKind::True => "`true`",
            TokenKind::False => "`false`",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Include => "include directive",
        };
        f.write_str(text)
    }
}

/// An immutable lexical unit
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    kind: TokenKind,
    value: String,
    position: Option<Position>,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, position: Option<Position>) -> Self {
        Self {
            kind,
            value: value.into(),
            position,
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Decoded text for strings and includes, source text for numbers and bad
    /// tokens, empty otherwise.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub(crate) fn from_raw(raw: RawToken, position: Position) -> Self {
        let (kind, value) = match raw {
            RawToken::LeftBrace => (TokenKind::LeftBrace, String::new()),
            RawToken::RightBrace => (TokenKind::RightBrace, String::new()),
            RawToken::LeftBracket => (TokenKind::LeftBracket, String::new()),
            RawToken::RightBracket => (TokenKind::RightBracket, String::new()),
            RawToken::Comma => (TokenKind::Comma, String::new()),
            RawToken::Colon => (TokenKind::Colon, String::new()),
            RawToken::True => (TokenKind::True, String::new()),
            RawToken::False => (TokenKind::False, String::new()),
            RawToken::Number(text) => (TokenKind::Number, text),
            RawToken::String(text) => (TokenKind::String, text),
            RawToken::Include(path) => (TokenKind::Include, path),
        };
        Self::new(kind, value, Some(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> Vec<Result<RawToken, ()>> {
        RawToken::lexer(source).collect()
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            scan("{ } [ ] , :"),
            vec![
                Ok(RawToken::LeftBrace),
                Ok(RawToken::RightBrace),
                Ok(RawToken::LeftBracket),
                Ok(RawToken::RightBracket),
                Ok(RawToken::Comma),
                Ok(RawToken::Colon),
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            scan("# leading\n[ # trailing\n]"),
            vec![Ok(RawToken::LeftBracket), Ok(RawToken::RightBracket)]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(scan("-0.5e-3"), vec![Ok(RawToken::Number("-0.5e-3".into()))]);
        assert_eq!(scan(".25"), vec![Ok(RawToken::Number(".25".into()))]);
        assert_eq!(scan("10E3"), vec![Ok(RawToken::Number("10E3".into()))]);
    }

    #[test]
    fn test_malformed_numbers_are_single_errors() {
        for source in [".", "1.", "1e", "1e-", "-.e"] {
            assert_eq!(scan(source), vec![Err(())], "source {:?}", source);
        }
        assert_eq!(scan("-"), vec![Err(())]);
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            scan(r#""a\"b\\c\nd\te""#),
            vec![Ok(RawToken::String("a\"b\\c\nd\te".into()))]
        );
        assert_eq!(scan(r#""bad \x escape""#), vec![Err(())]);
    }

    #[test]
    fn test_include_directive() {
        assert_eq!(
            scan(r#"@"conf/base.lconf""#),
            vec![Ok(RawToken::Include("conf/base.lconf".into()))]
        );
    }

    #[test]
    fn test_unescape_rejects_dangling_backslash() {
        assert_eq!(unescape("abc\\\""), None);
        assert_eq!(unescape("abc\""), Some("abc".to_string()));
    }

    #[test]
    fn test_from_raw_keeps_text() {
        let token = Token::from_raw(RawToken::Number("12".into()), Position::new(1, 4));
        assert_eq!(token.kind(), TokenKind::Number);
        assert_eq!(token.value(), "12");
        assert_eq!(token.position(), Some(Position::new(1, 4)));
    }
}
