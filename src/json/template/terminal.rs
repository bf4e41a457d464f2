//! Conversions between native values and nodes
//!
//! [`ToNode`] is the synthesis half and [`Terminal`] adds extraction. Any type
//! implementing them can be bound into a template; the crate provides
//! implementations for the scalar types, `Vec<T>` and `BTreeMap<String, T>`.
//!
//! Integer targets take the number through an `as` cast, which truncates
//! toward zero and saturates at the type's bounds. Synthesizing a value with
//! no finite `f32` form (NaN, infinities, `f64` beyond `f32::MAX`) fails,
//! since the text would not parse back.

use super::element::ElementKind;
use crate::json::error::{BindingError, PathSegment, Result};
use crate::json::node::{Node, ObjectMap};
use std::collections::BTreeMap;

/// Build a node from a native value.
pub trait ToNode {
    /// Reported as the element kind when the value is bound
    const KIND: ElementKind = ElementKind::User;

    fn to_node(&self) -> Result<Node>;
}

/// Overwrite a native value from a node.
///
/// Implementations should leave `self` untouched when they fail.
pub trait Terminal: ToNode {
    fn extract_from(&mut self, node: &Node) -> Result<()>;
}

fn finite_number(value: f32) -> Result<Node> {
    let node = Node::Number(value);
    if value.is_finite() {
        Ok(node)
    } else {
        Err(BindingError::new(&node, "number has no finite 32-bit form").into())
    }
}

fn expect_number(node: &Node) -> Result<f32> {
    node.as_number()
        .ok_or_else(|| BindingError::new(node, "expecting a number node").into())
}

macro_rules! number_terminal {
    ($($ty:ty),*) => {
        $(
            impl ToNode for $ty {
                const KIND: ElementKind = ElementKind::Scalar;

                fn to_node(&self) -> Result<Node> {
                    finite_number(*self as f32)
                }
            }

            impl Terminal for $ty {
                fn extract_from(&mut self, node: &Node) -> Result<()> {
                    *self = expect_number(node)? as $ty;
                    Ok(())
                }
            }
        )*
    };
}

number_terminal!(i32, u32, usize, f32, f64);

impl ToNode for bool {
    const KIND: ElementKind = ElementKind::Scalar;

    fn to_node(&self) -> Result<Node> {
        Ok(Node::Boolean(*self))
    }
}

impl Terminal for bool {
    fn extract_from(&mut self, node: &Node) -> Result<()> {
        *self = node
            .as_bool()
            .ok_or_else(|| BindingError::new(node, "expecting a boolean node"))?;
        Ok(())
    }
}

impl ToNode for str {
    const KIND: ElementKind = ElementKind::Scalar;

    fn to_node(&self) -> Result<Node> {
        Ok(Node::String(self.to_string()))
    }
}

impl ToNode for String {
    const KIND: ElementKind = ElementKind::Scalar;

    fn to_node(&self) -> Result<Node> {
        Ok(Node::String(self.clone()))
    }
}

impl Terminal for String {
    fn extract_from(&mut self, node: &Node) -> Result<()> {
        let value = node
            .as_str()
            .ok_or_else(|| BindingError::new(node, "expecting a string node"))?;
        self.clear();
        self.push_str(value);
        Ok(())
    }
}

impl<T: ToNode> ToNode for Vec<T> {
    const KIND: ElementKind = ElementKind::Vector;

    fn to_node(&self) -> Result<Node> {
        self.iter()
            .map(ToNode::to_node)
            .collect::<Result<Vec<_>>>()
            .map(Node::Array)
    }
}

impl<T: Terminal + Default> Terminal for Vec<T> {
    fn extract_from(&mut self, node: &Node) -> Result<()> {
        let items = node
            .as_array()
            .ok_or_else(|| BindingError::new(node, "expecting an array node"))?;

        let mut values = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let mut value = T::default();
            value
                .extract_from(item)
                .map_err(|err| err.within(PathSegment::Index(index)))?;
            values.push(value);
        }
        *self = values;
        Ok(())
    }
}

impl<T: ToNode> ToNode for BTreeMap<String, T> {
    const KIND: ElementKind = ElementKind::Map;

    fn to_node(&self) -> Result<Node> {
        self.iter()
            .map(|(key, value)| value.to_node().map(|node| (key.clone(), node)))
            .collect::<Result<ObjectMap>>()
            .map(Node::Object)
    }
}

impl<T: Terminal + Default> Terminal for BTreeMap<String, T> {
    fn extract_from(&mut self, node: &Node) -> Result<()> {
        let entries = node
            .as_object()
            .ok_or_else(|| BindingError::new(node, "expecting an object node"))?;

        let mut values = BTreeMap::new();
        for (key, entry) in entries {
            let mut value = T::default();
            value
                .extract_from(entry)
                .map_err(|err| err.within(PathSegment::Key(key.clone())))?;
            values.insert(key.clone(), value);
        }
        *self = values;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_truncate_and_saturate() {
        let mut value = 0_i32;
        value.extract_from(&Node::Number(-2.75)).unwrap();
        assert_eq!(value, -2);

        let mut value = 5_u32;
        value.extract_from(&Node::Number(-1.0)).unwrap();
        assert_eq!(value, 0);
    }

    #[test]
    fn test_numbers_without_finite_f32_form_are_refused() {
        let err = 1.0e300_f64.to_node().unwrap_err();
        assert_eq!(
            err.as_binding().unwrap().message(),
            "number has no finite 32-bit form"
        );
        assert!(f32::NAN.to_node().is_err());
        assert_eq!(f64::from(f32::MAX).to_node().unwrap(), Node::Number(f32::MAX));
        assert_eq!(usize::MAX.to_node().unwrap(), Node::Number(usize::MAX as f32));
    }

    #[test]
    fn test_type_mismatch_leaves_value_alone() {
        let mut value = String::from("kept");
        let err = value.extract_from(&Node::Boolean(true)).unwrap_err();
        assert_eq!(value, "kept");
        assert_eq!(err.as_binding().unwrap().message(), "expecting a string node");
    }

    #[test]
    fn test_vector_errors_carry_the_index() {
        let node = Node::Array(vec![Node::Number(1.0), Node::String("x".into())]);
        let mut values = vec![9.0_f64];
        let err = values.extract_from(&node).unwrap_err();
        assert_eq!(err.as_binding().unwrap().pointer(), "/1");
        assert_eq!(values, vec![9.0]);
    }

    #[test]
    fn test_vector_of_bool() {
        let node = Node::Array(vec![true.into(), false.into(), true.into()]);
        let mut flags: Vec<bool> = Vec::new();
        flags.extract_from(&node).unwrap();
        flags.push(false);
        assert_eq!(flags.to_node().unwrap().to_text(false), "[true, false, true, false]");
    }

    #[test]
    fn test_map_round_trip() {
        let mut node = Node::object();
        node.insert("a", Node::Number(1.0)).unwrap();
        node.insert("b", Node::Number(2.0)).unwrap();

        let mut values: BTreeMap<String, u32> = BTreeMap::new();
        values.extract_from(&node).unwrap();
        assert_eq!(values.get("b"), Some(&2));
        assert_eq!(values.to_node().unwrap(), node);
    }

    #[test]
    fn test_map_errors_carry_the_key() {
        let mut node = Node::object();
        node.insert("port", Node::String("http".into())).unwrap();

        let mut values: BTreeMap<String, u32> = BTreeMap::new();
        let err = values.extract_from(&node).unwrap_err();
        assert_eq!(err.as_binding().unwrap().pointer(), "/port");
    }
}
