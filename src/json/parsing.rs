//! Recursive-descent parser
//!
//! Builds a [`Node`] tree from the token stream of a [`Lexer`]:
//!
//! ```text
//! document := object | array
//! object   := '{' (pair (',' pair)*)? '}'
//! pair     := STRING ':' atom
//! array    := '[' (atom (',' atom)*)? ']'
//! atom     := NUMBER | STRING | 'true' | 'false' | object | array | INCLUDE
//! ```
//!
//! The first error ends the parse. Errors carry the position of the offending
//! token, and the file it came from when the source is a file.
//!
//! Include directives (`@"path"`) are resolved while parsing: the referenced
//! file is parsed with the same options and its root replaces the directive.
//! Relative paths resolve against the including file's directory, or against
//! [`ParseOptions::base_dir`] for in-memory sources.

use super::error::ParseError;
use super::lexing::Lexer;
use super::node::{Node, ObjectMap};
use super::token::{Token, TokenKind};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Options controlling how documents are parsed
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Resolve `@"path"` directives. When off, a directive is a parse error.
    pub allow_includes: bool,
    /// Maximum nesting of includes within includes
    pub max_include_depth: usize,
    /// Maximum depth of nested objects and arrays, counted across includes
    pub max_nesting: usize,
    /// Directory relative includes resolve against when the document has no
    /// file of its own. Defaults to the working directory.
    pub base_dir: Option<PathBuf>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            allow_includes: true,
            max_include_depth: 16,
            max_nesting: 128,
            base_dir: None,
        }
    }
}

impl ParseOptions {
    pub fn without_includes() -> Self {
        Self {
            allow_includes: false,
            ..Self::default()
        }
    }
}

pub struct Parser<'src, 'opt> {
    lexer: Lexer<'src>,
    options: &'opt ParseOptions,
    /// File being parsed, if any
    origin: Option<PathBuf>,
    /// Canonical paths of this file and every file that included it
    include_stack: Vec<PathBuf>,
    depth: usize,
    /// Open objects and arrays enclosing the current token
    nesting: usize,
}

impl<'src, 'opt> Parser<'src, 'opt> {
    pub fn new(source: &'src str, options: &'opt ParseOptions) -> Self {
        Self {
            lexer: Lexer::new(source),
            options,
            origin: None,
            include_stack: Vec::new(),
            depth: 0,
            nesting: 0,
        }
    }

    /// Mark the source as the contents of `path`. Includes then resolve next
    /// to it and errors name it.
    pub fn with_origin(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if let Ok(canonical) = fs::canonicalize(&path) {
            self.include_stack.push(canonical);
        }
        self.origin = Some(path);
        self
    }

    /// Parse the whole source into its root node.
    pub fn parse(mut self) -> Result<Node, ParseError> {
        let origin = self.origin.clone();
        let result = self.parse_document();
        match origin {
            Some(origin) => result.map_err(|err| err.with_origin(origin)),
            None => result,
        }
    }

    fn parse_document(&mut self) -> Result<Node, ParseError> {
        let root = match self.lexer.seek().kind() {
            TokenKind::LeftBrace => self.parse_object()?,
            TokenKind::LeftBracket => self.parse_array()?,
            _ => {
                let token = self.lexer.get();
                return Err(error_at(
                    &token,
                    format!("expected `{{` or `[` at document start, found {}", describe(&token)),
                ));
            }
        };

        let trailing = self.lexer.get();
        if !trailing.is(TokenKind::Eof) {
            return Err(error_at(
                &trailing,
                format!("unexpected {} after end of document", describe(&trailing)),
            ));
        }
        Ok(root)
    }

    fn parse_object(&mut self) -> Result<Node, ParseError> {
        let open = self.expect(TokenKind::LeftBrace, "to open object")?;
        self.descend(&open)?;
        let mut entries = ObjectMap::new();

        if self.lexer.seek().is(TokenKind::RightBrace) {
            self.lexer.get();
        } else {
            loop {
                let key = self.lexer.get();
                if !key.is(TokenKind::String) {
                    return Err(error_at(
                        &key,
                        format!("expected string key, found {}", describe(&key)),
                    ));
                }

                let colon = self.lexer.get();
                if !colon.is(TokenKind::Colon) {
                    return Err(error_at(
                        &colon,
                        format!("expected `:` after key `{}`, found {}", key.value(), describe(&colon)),
                    ));
                }

                let value = self.parse_atom()?;
                if entries.contains_key(key.value()) {
                    return Err(error_at(
                        &key,
                        format!("redefinition of object entry `{}`", key.value()),
                    ));
                }
                entries.insert(key.value().to_string(), value);

                let next = self.lexer.get();
                match next.kind() {
                    TokenKind::Comma => continue,
                    TokenKind::RightBrace => break,
                    _ => {
                        return Err(error_at(
                            &next,
                            format!("expected `,` or `}}` in object, found {}", describe(&next)),
                        ))
                    }
                }
            }
        }

        self.nesting -= 1;
        Ok(Node::Object(entries))
    }

    fn parse_array(&mut self) -> Result<Node, ParseError> {
        let open = self.expect(TokenKind::LeftBracket, "to open array")?;
        self.descend(&open)?;
        let mut items = Vec::new();

        if self.lexer.seek().is(TokenKind::RightBracket) {
            self.lexer.get();
        } else {
            loop {
                items.push(self.parse_atom()?);

                let next = self.lexer.get();
                match next.kind() {
                    TokenKind::Comma => continue,
                    TokenKind::RightBracket => break,
                    _ => {
                        return Err(error_at(
                            &next,
                            format!("expected `,` or `]` in array, found {}", describe(&next)),
                        ))
                    }
                }
            }
        }

        self.nesting -= 1;
        Ok(Node::Array(items))
    }

    /// Enter the container opened by `open`. Errors end the parse, so only
    /// the success paths step back out.
    fn descend(&mut self, open: &Token) -> Result<(), ParseError> {
        if self.nesting >= self.options.max_nesting {
            return Err(error_at(
                open,
                format!(
                    "containers nested deeper than {} levels",
                    self.options.max_nesting
                ),
            ));
        }
        self.nesting += 1;
        Ok(())
    }

    fn parse_atom(&mut self) -> Result<Node, ParseError> {
        match self.lexer.seek().kind() {
            TokenKind::LeftBrace => return self.parse_object(),
            TokenKind::LeftBracket => return self.parse_array(),
            _ => {}
        }

        let token = self.lexer.get();
        match token.kind() {
            TokenKind::Number => Ok(Node::Number(parse_number(token.value()))),
            TokenKind::String => Ok(Node::String(token.value().to_string())),
            TokenKind::True => Ok(Node::Boolean(true)),
            TokenKind::False => Ok(Node::Boolean(false)),
            TokenKind::Include => self.include(&token),
            _ => Err(error_at(
                &token,
                format!("expected a value, found {}", describe(&token)),
            )),
        }
    }

    fn include(&mut self, token: &Token) -> Result<Node, ParseError> {
        if !self.options.allow_includes {
            return Err(error_at(token, "include directives are disabled"));
        }
        if self.depth >= self.options.max_include_depth {
            return Err(error_at(
                token,
                format!(
                    "includes nested deeper than {} levels",
                    self.options.max_include_depth
                ),
            ));
        }

        let path = self.resolve(token.value());
        let canonical = fs::canonicalize(&path).map_err(|err| {
            error_at(
                token,
                format!("cannot open included file `{}`: {}", path.display(), err),
            )
        })?;
        if self.include_stack.contains(&canonical) {
            return Err(error_at(
                token,
                format!("include cycle through `{}`", path.display()),
            ));
        }

        let source = fs::read_to_string(&path).map_err(|err| {
            error_at(
                token,
                format!("cannot read included file `{}`: {}", path.display(), err),
            )
        })?;
        debug!(path = %path.display(), depth = self.depth + 1, "resolved include");

        let mut include_stack = self.include_stack.clone();
        include_stack.push(canonical);
        let nested = Parser {
            lexer: Lexer::new(&source),
            options: self.options,
            origin: Some(path),
            include_stack,
            depth: self.depth + 1,
            nesting: self.nesting,
        };
        nested.parse()
    }

    fn resolve(&self, target: &str) -> PathBuf {
        let target = Path::new(target);
        if target.is_absolute() {
            return target.to_path_buf();
        }
        let base = match &self.origin {
            Some(origin) => origin.parent().map(Path::to_path_buf),
            None => self.options.base_dir.clone(),
        };
        match base {
            Some(base) => base.join(target),
            None => target.to_path_buf(),
        }
    }

    fn expect(&mut self, kind: TokenKind, context: &str) -> Result<Token, ParseError> {
        let token = self.lexer.get();
        if token.is(kind) {
            Ok(token)
        } else {
            Err(error_at(
                &token,
                format!("expected {} {}, found {}", kind, context, describe(&token)),
            ))
        }
    }
}

/// Convert a validated number literal. Values that do not fit in an `f32`
/// become zero.
fn parse_number(text: &str) -> f32 {
    match text.parse::<f32>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            debug!(literal = text, "number out of range, using 0");
            0.0
        }
    }
}

fn describe(token: &Token) -> String {
    match token.kind() {
        TokenKind::Bad => format!("bad token `{}`", token.value()),
        kind => kind.to_string(),
    }
}

fn error_at(token: &Token, message: impl Into<String>) -> ParseError {
    ParseError::new(token.position().unwrap_or_default(), message)
}

/// Parse an in-memory document with default options.
pub fn parse(source: &str) -> Result<Node, ParseError> {
    let options = ParseOptions::default();
    Parser::new(source, &options).parse()
}
