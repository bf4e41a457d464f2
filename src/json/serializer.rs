//! Text output for document trees
//!
//! Two layouts share one writer:
//!
//! - compact: everything on one line, siblings joined with `, `
//! - indented: objects always break onto one entry per line; arrays break only
//!   when one of their elements does, so `[1, 2, 3]` stays on one line while an
//!   array of objects expands
//!
//! Empty containers are written as `{}` and `[]` in both layouts. An empty
//! object still counts as multiline for the array holding it.
//!
//! Escaping is minimal: backslash, double quote, newline and tab. Everything
//! else is written as-is.

use super::node::Node;
use serde::Deserialize;
use std::fmt;
use std::io;

/// Layout knobs for the serializer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SerializeOptions {
    /// Pretty-print with one entry per line
    pub indent: bool,
    /// Spaces per nesting level when `indent` is set
    pub indent_width: usize,
}

impl SerializeOptions {
    pub fn compact() -> Self {
        Self {
            indent: false,
            ..Self::default()
        }
    }

    pub fn indented() -> Self {
        Self::default()
    }
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            indent: true,
            indent_width: 4,
        }
    }
}

/// Whether a node spans several lines in the given layout.
pub fn is_multiline(node: &Node, indent: bool) -> bool {
    if !indent {
        return false;
    }
    match node {
        Node::Object(_) => true,
        Node::Array(items) => items.iter().any(|item| is_multiline(item, indent)),
        _ => false,
    }
}

/// Serialize a node to a string.
pub fn to_string(node: &Node, options: &SerializeOptions) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_node(&mut out, node, 0, options);
    out
}

/// Serialize a node into a byte sink.
pub fn to_writer<W: io::Write>(node: &Node, writer: &mut W, options: &SerializeOptions) -> io::Result<()> {
    let text = to_string(node, options);
    writer.write_all(text.as_bytes())?;
    if options.indent {
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

fn write_node<W: fmt::Write>(out: &mut W, node: &Node, level: usize, options: &SerializeOptions) -> fmt::Result {
    match node {
        Node::Number(value) => write!(out, "{}", value),
        Node::Boolean(value) => write!(out, "{}", value),
        Node::String(value) => write_string(out, value),
        Node::Object(entries) => {
            if entries.is_empty() {
                return out.write_str("{}");
            }
            let multiline = is_multiline(node, options.indent);
            out.write_char('{')?;
            for (i, (key, value)) in entries.iter().enumerate() {
                write_separator(out, i, level + 1, multiline, options)?;
                write_string(out, key)?;
                out.write_str(": ")?;
                write_node(out, value, level + 1, options)?;
            }
            write_closing(out, '}', level, multiline, options)
        }
        Node::Array(items) => {
            if items.is_empty() {
                return out.write_str("[]");
            }
            let multiline = is_multiline(node, options.indent);
            out.write_char('[')?;
            for (i, item) in items.iter().enumerate() {
                write_separator(out, i, level + 1, multiline, options)?;
                write_node(out, item, level + 1, options)?;
            }
            write_closing(out, ']', level, multiline, options)
        }
    }
}

fn write_separator<W: fmt::Write>(
    out: &mut W,
    index: usize,
    level: usize,
    multiline: bool,
    options: &SerializeOptions,
) -> fmt::Result {
    if multiline {
        if index > 0 {
            out.write_char(',')?;
        }
        out.write_char('\n')?;
        write_indent(out, level, options)
    } else if index > 0 {
        out.write_str(", ")
    } else {
        Ok(())
    }
}

fn write_closing<W: fmt::Write>(
    out: &mut W,
    closing: char,
    level: usize,
    multiline: bool,
    options: &SerializeOptions,
) -> fmt::Result {
    if multiline {
        out.write_char('\n')?;
        write_indent(out, level, options)?;
    }
    out.write_char(closing)
}

fn write_indent<W: fmt::Write>(out: &mut W, level: usize, options: &SerializeOptions) -> fmt::Result {
    for _ in 0..level * options.indent_width {
        out.write_char(' ')?;
    }
    Ok(())
}

fn write_string<W: fmt::Write>(out: &mut W, value: &str) -> fmt::Result {
    out.write_char('"')?;
    for ch in value.chars() {
        match ch {
            '\\' => out.write_str("\\\\")?,
            '"' => out.write_str("\\\"")?,
            '\n' => out.write_str("\\n")?,
            '\t' => out.write_str("\\t")?,
            _ => out.write_char(ch)?,
        }
    }
    out.write_char('"')
}

impl Node {
    /// Serialize with the default indent width.
    pub fn to_text(&self, indent: bool) -> String {
        let options = SerializeOptions {
            indent,
            ..SerializeOptions::default()
        };
        to_string(self, &options)
    }
}

/// `{}` writes the compact form, `{:#}` the indented one.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options = if f.alternate() {
            SerializeOptions::indented()
        } else {
            SerializeOptions::compact()
        };
        write_node(f, self, 0, &options)
    }
}
