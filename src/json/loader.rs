//! File and stream entry points
//!
//! Thin wrappers that pair the parser and serializer with I/O, and the template
//! engine with both. Each function has a `_with` variant taking explicit
//! options; the plain one uses the defaults.
//!
//! I/O failures are reported as [`Error::Io`] with the file path, or
//! `<stream>` for readers and writers.

use super::error::{Error, Result};
use super::node::Node;
use super::parsing::{ParseOptions, Parser};
use super::serializer::{self, SerializeOptions};
use super::template::Template;
use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

const STREAM: &str = "<stream>";

fn serialize_options(indent: bool) -> SerializeOptions {
    SerializeOptions {
        indent,
        ..SerializeOptions::default()
    }
}

pub fn parse_str(source: &str) -> Result<Node> {
    parse_str_with(source, &ParseOptions::default())
}

pub fn parse_str_with(source: &str, options: &ParseOptions) -> Result<Node> {
    Ok(Parser::new(source, options).parse()?)
}

pub fn parse_reader<R: Read>(reader: R) -> Result<Node> {
    parse_reader_with(reader, &ParseOptions::default())
}

/// Read the whole stream, then parse it. Includes resolve against
/// `options.base_dir`.
pub fn parse_reader_with<R: Read>(mut reader: R, options: &ParseOptions) -> Result<Node> {
    let mut source = String::new();
    reader
        .read_to_string(&mut source)
        .map_err(|err| Error::io(STREAM, err))?;
    parse_str_with(&source, options)
}

pub fn parse_file(path: impl AsRef<Path>) -> Result<Node> {
    parse_file_with(path, &ParseOptions::default())
}

/// Parse a file. Includes resolve relative to the file's directory and errors
/// name the file.
pub fn parse_file_with(path: impl AsRef<Path>, options: &ParseOptions) -> Result<Node> {
    let path = path.as_ref();
    debug!(path = %path.display(), "parsing file");
    let source = fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
    Ok(Parser::new(&source, options).with_origin(path).parse()?)
}

pub fn serialize_writer<W: Write>(node: &Node, writer: W, indent: bool) -> Result<()> {
    serialize_writer_with(node, writer, &serialize_options(indent))
}

pub fn serialize_writer_with<W: Write>(
    node: &Node,
    mut writer: W,
    options: &SerializeOptions,
) -> Result<()> {
    serializer::to_writer(node, &mut writer, options).map_err(|err| Error::io(STREAM, err))
}

pub fn serialize_file(node: &Node, path: impl AsRef<Path>, indent: bool) -> Result<()> {
    serialize_file_with(node, path, &serialize_options(indent))
}

/// Write a node to a file, replacing its contents.
pub fn serialize_file_with(
    node: &Node,
    path: impl AsRef<Path>,
    options: &SerializeOptions,
) -> Result<()> {
    let path = path.as_ref();
    debug!(path = %path.display(), indent = options.indent, "writing file");
    let file = fs::File::create(path).map_err(|err| Error::io(path, err))?;
    let mut writer = BufWriter::new(file);
    serializer::to_writer(node, &mut writer, options).map_err(|err| Error::io(path, err))
}

pub fn extract_reader<R: Read>(template: &Template<'_>, reader: R) -> Result<()> {
    extract_reader_with(template, reader, &ParseOptions::default())
}

pub fn extract_reader_with<R: Read>(
    template: &Template<'_>,
    reader: R,
    options: &ParseOptions,
) -> Result<()> {
    let node = parse_reader_with(reader, options)?;
    template.extract(&node)
}

pub fn extract_file(template: &Template<'_>, path: impl AsRef<Path>) -> Result<()> {
    extract_file_with(template, path, &ParseOptions::default())
}

/// Parse a file and extract it into the template's storage.
pub fn extract_file_with(
    template: &Template<'_>,
    path: impl AsRef<Path>,
    options: &ParseOptions,
) -> Result<()> {
    let node = parse_file_with(path, options)?;
    template.extract(&node)
}

pub fn synthetize_writer<W: Write>(template: &Template<'_>, writer: W, indent: bool) -> Result<()> {
    synthetize_writer_with(template, writer, &serialize_options(indent))
}

pub fn synthetize_writer_with<W: Write>(
    template: &Template<'_>,
    writer: W,
    options: &SerializeOptions,
) -> Result<()> {
    let node = template.synthetize()?;
    serialize_writer_with(&node, writer, options)
}

pub fn synthetize_file(template: &Template<'_>, path: impl AsRef<Path>, indent: bool) -> Result<()> {
    synthetize_file_with(template, path, &serialize_options(indent))
}

/// Synthesize a tree from the template and write it to a file. Nothing is
/// written when synthesis fails.
pub fn synthetize_file_with(
    template: &Template<'_>,
    path: impl AsRef<Path>,
    options: &SerializeOptions,
) -> Result<()> {
    let node = template.synthetize()?;
    serialize_file_with(&node, path, options)
}

/// Parse from standard input.
pub fn parse_stdin(options: &ParseOptions) -> Result<Node> {
    parse_reader_with(io::stdin().lock(), options)
}
