//! Object and array elements
//!
//! Aggregates own their children through `Rc`, so one child can sit in several
//! parents. They are `Clone` to support copy-on-write in [`super::Template`].

use super::element::{extract_into, Element, ElementKind};
use crate::json::error::{BindingError, PathSegment, Result, UsageError};
use crate::json::node::{Node, ObjectMap};
use std::rc::Rc;

/// Named children, kept in bind order
#[derive(Clone, Default)]
pub(crate) struct ObjectElement<'a> {
    children: Vec<(String, Rc<dyn Element + 'a>)>,
}

impl<'a> ObjectElement<'a> {
    pub(crate) fn insert(
        &mut self,
        name: String,
        child: Rc<dyn Element + 'a>,
    ) -> std::result::Result<(), UsageError> {
        if self.children.iter().any(|(bound, _)| *bound == name) {
            return Err(UsageError::DuplicateName(name));
        }
        self.children.push((name, child));
        Ok(())
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|(name, _)| name.as_str())
    }
}

impl Element for ObjectElement<'_> {
    fn kind(&self) -> ElementKind {
        ElementKind::Object
    }

    /// Every bound name must be present; unbound entries are ignored.
    fn extract(&self, node: &Node) -> Result<()> {
        let entries = node
            .as_object()
            .ok_or_else(|| BindingError::new(node, "expecting an object node"))?;

        for (name, child) in &self.children {
            let entry = entries
                .get(name)
                .ok_or_else(|| BindingError::new(node, format!("missing element `{}`", name)))?;
            extract_into(child.as_ref(), entry)
                .map_err(|err| err.within(PathSegment::Key(name.clone())))?;
        }
        Ok(())
    }

    fn synthetize(&self) -> Result<Node> {
        let mut entries = ObjectMap::new();
        for (name, child) in &self.children {
            entries.insert(name.clone(), child.synthetize()?);
        }
        Ok(Node::Object(entries))
    }
}

/// Positional children
#[derive(Clone, Default)]
pub(crate) struct ArrayElement<'a> {
    children: Vec<Rc<dyn Element + 'a>>,
}

impl<'a> ArrayElement<'a> {
    pub(crate) fn push(&mut self, child: Rc<dyn Element + 'a>) {
        self.children.push(child);
    }

    pub(crate) fn len(&self) -> usize {
        self.children.len()
    }
}

impl Element for ArrayElement<'_> {
    fn kind(&self) -> ElementKind {
        ElementKind::Array
    }

    /// The node needs at least one entry per child; extra entries are ignored.
    fn extract(&self, node: &Node) -> Result<()> {
        let items = node
            .as_array()
            .ok_or_else(|| BindingError::new(node, "expecting an array node"))?;

        if items.len() < self.children.len() {
            return Err(BindingError::new(
                node,
                format!(
                    "size mismatch in array: expected at least {} elements, found {}",
                    self.children.len(),
                    items.len()
                ),
            )
            .into());
        }

        for (index, (child, item)) in self.children.iter().zip(items).enumerate() {
            extract_into(child.as_ref(), item)
                .map_err(|err| err.within(PathSegment::Index(index)))?;
        }
        Ok(())
    }

    fn synthetize(&self) -> Result<Node> {
        self.children
            .iter()
            .map(|child| child.synthetize())
            .collect::<Result<Vec<_>>>()
            .map(Node::Array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::template::element::Bound;
    use std::cell::RefCell;

    #[test]
    fn test_object_missing_key_reports_the_object() {
        let port = RefCell::new(0_u32);
        let mut object = ObjectElement::default();
        object.insert("port".into(), Rc::new(Bound::new(&port))).unwrap();

        let mut node = Node::object();
        node.insert("host", "localhost".into()).unwrap();
        let err = object.extract(&node).unwrap_err();
        let binding = err.as_binding().unwrap();
        assert_eq!(binding.message(), "missing element `port`");
        assert_eq!(binding.pointer(), "/");
        assert_eq!(binding.node(), &node);
    }

    #[test]
    fn test_object_duplicate_name() {
        let flag = RefCell::new(false);
        let mut object = ObjectElement::default();
        object.insert("on".into(), Rc::new(Bound::new(&flag))).unwrap();
        assert_eq!(
            object.insert("on".into(), Rc::new(Bound::new(&flag))),
            Err(UsageError::DuplicateName("on".into()))
        );
        assert_eq!(object.names().collect::<Vec<_>>(), vec!["on"]);
    }

    #[test]
    fn test_array_extra_entries_are_ignored() {
        let first = RefCell::new(0_i32);
        let mut array = ArrayElement::default();
        array.push(Rc::new(Bound::new(&first)));

        let node = Node::Array(vec![Node::Number(4.0), Node::String("extra".into())]);
        array.extract(&node).unwrap();
        assert_eq!(*first.borrow(), 4);
        assert_eq!(array.synthetize().unwrap(), Node::Array(vec![Node::Number(4.0)]));
    }

    /// Declares itself read-only but would still accept writes
    struct Sealed<'a> {
        writes: &'a RefCell<usize>,
    }

    impl Element for Sealed<'_> {
        fn kind(&self) -> ElementKind {
            ElementKind::User
        }

        fn extract(&self, _node: &Node) -> Result<()> {
            *self.writes.borrow_mut() += 1;
            Ok(())
        }

        fn synthetize(&self) -> Result<Node> {
            Ok(Node::Number(*self.writes.borrow() as f32))
        }

        fn is_read_only(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_read_only_children_are_never_extracted_into() {
        let writes = RefCell::new(0_usize);
        let mut object = ObjectElement::default();
        object.insert("sealed".into(), Rc::new(Sealed { writes: &writes })).unwrap();
        let mut array = ArrayElement::default();
        array.push(Rc::new(Sealed { writes: &writes }));

        let mut node = Node::object();
        node.insert("sealed", Node::Number(1.0)).unwrap();
        let err = object.extract(&node).unwrap_err();
        let binding = err.as_binding().unwrap();
        assert_eq!(binding.message(), "extracting to read-only binding");
        assert_eq!(binding.pointer(), "/sealed");

        let err = array.extract(&Node::Array(vec![Node::Number(1.0)])).unwrap_err();
        assert_eq!(err.as_binding().unwrap().pointer(), "/0");
        assert_eq!(*writes.borrow(), 0);
        assert_eq!(object.synthetize().unwrap().get("sealed"), Some(&Node::Number(0.0)));
    }

    #[test]
    fn test_nested_errors_carry_full_path() {
        let port = RefCell::new(0_u32);
        let mut server = ObjectElement::default();
        server.insert("port".into(), Rc::new(Bound::new(&port))).unwrap();
        let mut servers = ArrayElement::default();
        servers.push(Rc::new(server));

        let mut bad = Node::object();
        bad.insert("port", Node::Boolean(true)).unwrap();
        let err = servers.extract(&Node::Array(vec![bad])).unwrap_err();
        assert_eq!(err.as_binding().unwrap().pointer(), "/0/port");
    }
}
