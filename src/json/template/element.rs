//! The element protocol and the leaf elements over typed values

use super::terminal::{Terminal, ToNode};
use crate::json::error::{BindingError, Result, UsageError};
use crate::json::node::Node;
use std::cell::RefCell;
use std::fmt;

/// What an element binds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    User,
    Scalar,
    Pod,
    Raw,
    Vector,
    Map,
    Object,
    Array,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::User => "user",
            ElementKind::Scalar => "scalar",
            ElementKind::Pod => "pod",
            ElementKind::Raw => "raw",
            ElementKind::Vector => "vector",
            ElementKind::Map => "map",
            ElementKind::Object => "object",
            ElementKind::Array => "array",
        };
        f.write_str(name)
    }
}

/// A binding between a document fragment and native storage.
///
/// Elements move data both ways: [`Element::extract`] writes a node's contents
/// into the bound storage, [`Element::synthetize`] builds a fresh node from the
/// storage's current value. Storage is reached through shared references, so
/// both take `&self`.
pub trait Element {
    fn kind(&self) -> ElementKind;

    fn extract(&self, node: &Node) -> Result<()>;

    fn synthetize(&self) -> Result<Node>;

    /// Read-only elements can synthesize but never extract.
    fn is_read_only(&self) -> bool {
        false
    }
}

/// Read-write terminal over a `RefCell`
pub(crate) struct Bound<'a, T> {
    cell: &'a RefCell<T>,
}

impl<'a, T> Bound<'a, T> {
    pub(crate) fn new(cell: &'a RefCell<T>) -> Self {
        Self { cell }
    }
}

impl<T: Terminal> Element for Bound<'_, T> {
    fn kind(&self) -> ElementKind {
        T::KIND
    }

    fn extract(&self, node: &Node) -> Result<()> {
        let mut value = self
            .cell
            .try_borrow_mut()
            .map_err(|_| UsageError::BindingBusy)?;
        value.extract_from(node)
    }

    fn synthetize(&self) -> Result<Node> {
        let value = self.cell.try_borrow().map_err(|_| UsageError::BindingBusy)?;
        value.to_node()
    }
}

/// Read-only terminal over a plain reference
pub(crate) struct Constant<'a, T: ?Sized> {
    value: &'a T,
}

impl<'a, T: ?Sized> Constant<'a, T> {
    pub(crate) fn new(value: &'a T) -> Self {
        Self { value }
    }
}

impl<T: ToNode + ?Sized> Element for Constant<'_, T> {
    fn kind(&self) -> ElementKind {
        T::KIND
    }

    fn extract(&self, node: &Node) -> Result<()> {
        Err(read_only(node))
    }

    fn synthetize(&self) -> Result<Node> {
        self.value.to_node()
    }

    fn is_read_only(&self) -> bool {
        true
    }
}

pub(crate) fn read_only(node: &Node) -> crate::json::error::Error {
    BindingError::new(node, "extracting to read-only binding").into()
}

/// Extract into `element` unless it declares itself read-only, in which case
/// its storage is never touched.
pub(crate) fn extract_into(element: &dyn Element, node: &Node) -> Result<()> {
    if element.is_read_only() {
        return Err(read_only(node));
    }
    element.extract(node)
}
