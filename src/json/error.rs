//! Error types for parsing, binding and document I/O
//!
//! Every fallible entry point returns [`Error`], which wraps one of four
//! narrower kinds:
//!
//! - [`ParseError`]: grammar violations, always with a line:column position.
//!   Malformed literals never fail in the lexer itself; they come back as `Bad`
//!   tokens and become parse errors once the parser reaches them.
//! - [`BindingError`]: the document does not fit a template. It keeps a copy of
//!   the offending node and its path from the extraction root.
//! - [`UsageError`]: programmer errors that do not depend on input data.
//! - `Io`: a file or stream could not be read or written.

use super::location::Position;
use super::node::Node;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// A grammar violation found while parsing
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub position: Position,
    pub message: String,
    /// File the error was found in, when the source is a file (or an include)
    pub origin: Option<PathBuf>,
}

impl ParseError {
    pub fn new(position: Position, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
            origin: None,
        }
    }

    /// Attach an origin unless a nested include already set one.
    pub fn with_origin(mut self, origin: impl Into<PathBuf>) -> Self {
        if self.origin.is_none() {
            self.origin = Some(origin.into());
        }
        self
    }

    pub fn line(&self) -> usize {
        self.position.line
    }

    pub fn column(&self) -> usize {
        self.position.column
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(origin) = &self.origin {
            write!(f, "{}:", origin.display())?;
        }
        write!(f, "{}: {}", self.position, self.message)
    }
}

impl std::error::Error for ParseError {}

/// One step on the way from the extraction root to a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// A document fragment that does not match its binding
#[derive(Debug, Clone, PartialEq)]
pub struct BindingError {
    node: Node,
    /// Stored leaf-first while the error unwinds; see [`BindingError::path`]
    reversed_path: Vec<PathSegment>,
    message: String,
}

impl BindingError {
    pub fn new(node: &Node, message: impl Into<String>) -> Self {
        Self {
            node: node.clone(),
            reversed_path: Vec::new(),
            message: message.into(),
        }
    }

    /// The node that failed to extract.
    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Path of the offending node, root first.
    pub fn path(&self) -> Vec<PathSegment> {
        self.reversed_path.iter().rev().cloned().collect()
    }

    /// Path rendered as a JSON-pointer-like string (`/servers/0/port`).
    pub fn pointer(&self) -> String {
        if self.reversed_path.is_empty() {
            return "/".to_string();
        }
        let mut out = String::new();
        for segment in self.reversed_path.iter().rev() {
            out.push('/');
            match segment {
                PathSegment::Key(key) => out.push_str(key),
                PathSegment::Index(index) => out.push_str(&index.to_string()),
            }
        }
        out
    }

    pub(crate) fn within(mut self, segment: PathSegment) -> Self {
        self.reversed_path.push(segment);
        self
    }
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} (found {})",
            self.pointer(),
            self.message,
            self.node.kind()
        )
    }
}

impl std::error::Error for BindingError {}

/// Misuse of the API, independent of any document contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// A template already has a different shape
    AlreadyBound { shape: &'static str, requested: &'static str },
    /// The same name was bound twice into an object template
    DuplicateName(String),
    /// An unbound template was extracted, synthesized or bound as a child
    Unbound,
    /// Direct node access past the end of an array
    IndexOutOfBounds { index: usize, len: usize },
    /// Direct node access with the wrong node type
    NotA { expected: &'static str, found: &'static str },
    /// A bound variable is borrowed elsewhere while the engine needs it
    BindingBusy,
    /// A POD/Raw binding over a zero-sized element type
    ZeroSized,
    /// A foreign value (such as JSON `null`) with no node equivalent
    NoEquivalent(&'static str),
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageError::AlreadyBound { shape, requested } => write!(
                f,
                "template is already bound as {}, cannot bind it as {}",
                shape, requested
            ),
            UsageError::DuplicateName(name) => {
                write!(f, "element `{}` is already bound", name)
            }
            UsageError::Unbound => write!(f, "template is not bound"),
            UsageError::IndexOutOfBounds { index, len } => write!(
                f,
                "index {} out of bounds for array of length {}",
                index, len
            ),
            UsageError::NotA { expected, found } => {
                write!(f, "expected {} node, found {}", expected, found)
            }
            UsageError::BindingBusy => {
                write!(f, "bound variable is already borrowed")
            }
            UsageError::ZeroSized => {
                write!(f, "binary bindings need a non zero-sized element type")
            }
            UsageError::NoEquivalent(what) => {
                write!(f, "{} has no lconf equivalent", what)
            }
        }
    }
}

impl std::error::Error for UsageError {}

/// Any failure surfaced by the library
#[derive(Debug)]
pub enum Error {
    Io { path: PathBuf, source: io::Error },
    Parse(ParseError),
    Binding(BindingError),
    Usage(UsageError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Path prefix pushed while unwinding through an aggregate element.
    /// Only binding errors carry a path; other kinds pass through untouched.
    pub(crate) fn within(self, segment: PathSegment) -> Self {
        match self {
            Error::Binding(err) => Error::Binding(err.within(segment)),
            other => other,
        }
    }

    pub fn as_binding(&self) -> Option<&BindingError> {
        match self {
            Error::Binding(err) => Some(err),
            _ => None,
        }
    }

    pub fn as_parse(&self) -> Option<&ParseError> {
        match self {
            Error::Parse(err) => Some(err),
            _ => None,
        }
    }

    pub fn as_usage(&self) -> Option<&UsageError> {
        match self {
            Error::Usage(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io { path, source } => {
                write!(f, "I/O error on {}: {}", path.display(), source)
            }
            Error::Parse(err) => write!(f, "parse error: {}", err),
            Error::Binding(err) => write!(f, "binding error: {}", err),
            Error::Usage(err) => write!(f, "usage error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            Error::Parse(err) => Some(err),
            Error::Binding(err) => Some(err),
            Error::Usage(err) => Some(err),
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}

impl From<BindingError> for Error {
    fn from(err: BindingError) -> Self {
        Error::Binding(err)
    }
}

impl From<UsageError> for Error {
    fn from(err: UsageError) -> Self {
        Error::Usage(err)
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
