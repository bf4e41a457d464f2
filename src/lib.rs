//! # lconf
//!
//! A commented JSON dialect with a typed two-way binding layer.
//!
//! Documents are parsed into a tree of [`Node`] values. A [`Template`] binds
//! native variables to places in that tree, then either extracts a parsed
//! document into them or synthesizes a new document from their values.
//!
//! The dialect differs from standard JSON in a few ways: `#` starts a comment
//! running to the end of the line, there is no `null`, numbers are `f32`,
//! string escapes are limited to `\\ \" \n \t`, and `@"path"` splices in
//! another document.

pub mod json;

pub use json::error::{BindingError, Error, ParseError, PathSegment, Result, UsageError};
pub use json::loader::{
    extract_file, extract_file_with, extract_reader, extract_reader_with, parse_file,
    parse_file_with, parse_reader, parse_reader_with, parse_stdin, parse_str, parse_str_with,
    serialize_file, serialize_file_with, serialize_writer, serialize_writer_with,
    synthetize_file, synthetize_file_with, synthetize_writer, synthetize_writer_with,
};
pub use json::location::Position;
pub use json::node::{Node, NodeKind, ObjectMap};
pub use json::parsing::ParseOptions;
pub use json::serializer::SerializeOptions;
pub use json::template::{Element, ElementKind, Template, Terminal, ToNode};
