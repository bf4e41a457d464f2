//! Typed two-way bindings between documents and native variables
//!
//! A [`Template`] describes where native storage sits inside a document.
//! [`Template::extract`] copies values out of a parsed tree into that storage,
//! [`Template::synthetize`] builds a new tree from the storage's current
//! contents.
//!
//! ```text
//! let port = RefCell::new(0_u32);
//! let hosts = RefCell::new(Vec::<String>::new());
//!
//! let mut server = Template::new();
//! server.bind("port", &port)?.bind("hosts", &hosts)?;
//! server.extract(&parse_str(r#"{"port": 80, "hosts": ["a", "b"]}"#)?)?;
//! ```
//!
//! Read-write storage is a `RefCell` borrowed for the template's lifetime;
//! read-only storage is a plain reference (see [`Template::constant`]).
//! Extracting into read-only storage fails, synthesizing from it works.
//!
//! A template has one of three shapes once bound: a single terminal, an object
//! of named children or an array of positional children. Cloning a template is
//! cheap and shares its element.
//!
//! Sharing is by value, not by reference. Binding a template into a parent
//! snapshots its layout; binding more children into it later copies the
//! aggregate first (`Rc::make_mut`), so parents and other clones keep the
//! layout they were given and never see names added afterwards. The bound
//! storage itself stays shared: every copy reads and writes the same cells.
//! To have a parent see a child's extra names, bind them before binding the
//! child.

mod aggregate;
mod binary;
mod element;
mod terminal;

pub use element::{Element, ElementKind};
pub use terminal::{Terminal, ToNode};

use crate::json::error::{Result, UsageError};
use crate::json::node::Node;
use aggregate::{ArrayElement, ObjectElement};
use binary::{check_sized, PodElement, RawElement};
use bytemuck::Pod;
use element::{extract_into, Bound, Constant};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Clone, Default)]
enum Shape<'a> {
    #[default]
    Unbound,
    Terminal(Rc<dyn Element + 'a>),
    Object(Rc<ObjectElement<'a>>),
    Array(Rc<ArrayElement<'a>>),
}

impl Shape<'_> {
    fn name(&self) -> &'static str {
        match self {
            Shape::Unbound => "unbound",
            Shape::Terminal(_) => "terminal",
            Shape::Object(_) => "object",
            Shape::Array(_) => "array",
        }
    }
}

/// Handle on an optional element tree
#[derive(Clone, Default)]
pub struct Template<'a> {
    shape: Shape<'a>,
}

impl<'a> Template<'a> {
    /// An unbound template
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a read-write terminal.
    pub fn terminal<T: Terminal + 'a>(cell: &'a RefCell<T>) -> Self {
        Self::element(Bound::new(cell))
    }

    /// Bind a read-only terminal.
    pub fn constant<T: ToNode + ?Sized + 'a>(value: &'a T) -> Self {
        Self::element(Constant::new(value))
    }

    /// Bind a plain-old-data value, written as the hex dump of its bytes.
    pub fn pod<T: Pod>(cell: &'a RefCell<T>) -> std::result::Result<Self, UsageError> {
        check_sized::<T>()?;
        Ok(Self::element(PodElement::ReadWrite(cell)))
    }

    pub fn pod_constant<T: Pod>(value: &'a T) -> std::result::Result<Self, UsageError> {
        check_sized::<T>()?;
        Ok(Self::element(PodElement::ReadOnly(value)))
    }

    /// Bind a buffer that extraction allocates. The cell must hold `None`
    /// when extracted into.
    pub fn raw<T: Pod>(cell: &'a RefCell<Option<Vec<T>>>) -> std::result::Result<Self, UsageError> {
        check_sized::<T>()?;
        Ok(Self::element(RawElement::ReadWrite(cell)))
    }

    pub fn raw_constant<T: Pod>(values: &'a [T]) -> std::result::Result<Self, UsageError> {
        check_sized::<T>()?;
        Ok(Self::element(RawElement::ReadOnly(values)))
    }

    /// Bind a custom element.
    pub fn user(element: impl Element + 'a) -> Self {
        Self::element(element)
    }

    /// Wrap an element that is already shared.
    pub fn from_element(element: Rc<dyn Element + 'a>) -> Self {
        Self {
            shape: Shape::Terminal(element),
        }
    }

    fn element(element: impl Element + 'a) -> Self {
        Self::from_element(Rc::new(element))
    }

    /// Add a named child, turning an unbound template into an object.
    pub fn bind(
        &mut self,
        name: impl Into<String>,
        child: impl Into<Template<'a>>,
    ) -> std::result::Result<&mut Self, UsageError> {
        let child = child.into().into_element()?;
        if let Shape::Unbound = self.shape {
            self.shape = Shape::Object(Rc::default());
        }
        match &mut self.shape {
            Shape::Object(object) => Rc::make_mut(object).insert(name.into(), child)?,
            shape => {
                return Err(UsageError::AlreadyBound {
                    shape: shape.name(),
                    requested: "object",
                })
            }
        }
        Ok(self)
    }

    /// Append a positional child, turning an unbound template into an array.
    pub fn bind_array(
        &mut self,
        child: impl Into<Template<'a>>,
    ) -> std::result::Result<&mut Self, UsageError> {
        let child = child.into().into_element()?;
        if let Shape::Unbound = self.shape {
            self.shape = Shape::Array(Rc::default());
        }
        match &mut self.shape {
            Shape::Array(array) => Rc::make_mut(array).push(child),
            shape => {
                return Err(UsageError::AlreadyBound {
                    shape: shape.name(),
                    requested: "array",
                })
            }
        }
        Ok(self)
    }

    pub fn is_bound(&self) -> bool {
        !matches!(self.shape, Shape::Unbound)
    }

    /// Kind of the root element, `None` while unbound.
    pub fn kind(&self) -> Option<ElementKind> {
        self.root().map(|element| element.kind())
    }

    /// Copy the node's contents into the bound storage.
    pub fn extract(&self, node: &Node) -> Result<()> {
        let root = self.root().ok_or(UsageError::Unbound)?;
        extract_into(root, node)
    }

    /// Build a node from the bound storage.
    pub fn synthetize(&self) -> Result<Node> {
        let root = self.root().ok_or(UsageError::Unbound)?;
        root.synthetize()
    }

    fn root(&self) -> Option<&dyn Element> {
        match &self.shape {
            Shape::Unbound => None,
            Shape::Terminal(element) => Some(element.as_ref()),
            Shape::Object(object) => Some(object.as_ref()),
            Shape::Array(array) => Some(array.as_ref()),
        }
    }

    fn into_element(self) -> std::result::Result<Rc<dyn Element + 'a>, UsageError> {
        match self.shape {
            Shape::Unbound => Err(UsageError::Unbound),
            Shape::Terminal(element) => Ok(element),
            Shape::Object(object) => Ok(object),
            Shape::Array(array) => Ok(array),
        }
    }
}

impl<'a, T: Terminal + 'a> From<&'a RefCell<T>> for Template<'a> {
    fn from(cell: &'a RefCell<T>) -> Self {
        Template::terminal(cell)
    }
}

impl<'a> From<&Template<'a>> for Template<'a> {
    fn from(template: &Template<'a>) -> Self {
        template.clone()
    }
}

impl fmt::Debug for Template<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.shape {
            Shape::Unbound => f.write_str("Template(unbound)"),
            Shape::Terminal(element) => write!(f, "Template({})", element.kind()),
            Shape::Object(object) => f.debug_set().entries(object.names()).finish(),
            Shape::Array(array) => write!(f, "Template(array of {})", array.len()),
        }
    }
}
