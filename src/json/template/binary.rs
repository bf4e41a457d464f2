//! Binary blobs carried as hex strings
//!
//! A POD element writes the in-memory bytes of one `bytemuck::Pod` value, a
//! raw element those of a runtime-sized buffer. Both encode two lowercase hex
//! digits per byte, so the text depends on the host's byte order.

use super::element::{read_only, Element, ElementKind};
use crate::json::error::{BindingError, Result, UsageError};
use crate::json::node::Node;
use bytemuck::Pod;
use std::cell::RefCell;
use std::mem;

fn decode_hex(node: &Node) -> Result<Vec<u8>> {
    let text = node
        .as_str()
        .ok_or_else(|| BindingError::new(node, "expecting a string node"))?;
    if text.len() % 2 != 0 {
        return Err(BindingError::new(node, "bad buffer size: odd number of hex digits").into());
    }
    hex::decode(text).map_err(|err| BindingError::new(node, format!("bad hex payload: {}", err)).into())
}

pub(crate) fn check_sized<T>() -> std::result::Result<(), UsageError> {
    if mem::size_of::<T>() == 0 {
        Err(UsageError::ZeroSized)
    } else {
        Ok(())
    }
}

pub(crate) enum PodElement<'a, T> {
    ReadWrite(&'a RefCell<T>),
    ReadOnly(&'a T),
}

impl<T: Pod> Element for PodElement<'_, T> {
    fn kind(&self) -> ElementKind {
        ElementKind::Pod
    }

    fn extract(&self, node: &Node) -> Result<()> {
        let cell = match self {
            PodElement::ReadWrite(cell) => cell,
            PodElement::ReadOnly(_) => return Err(read_only(node)),
        };

        let bytes = decode_hex(node)?;
        let value = bytemuck::try_pod_read_unaligned::<T>(&bytes).map_err(|_| {
            BindingError::new(
                node,
                format!(
                    "bad buffer size: expected {} bytes, found {}",
                    mem::size_of::<T>(),
                    bytes.len()
                ),
            )
        })?;
        *cell.try_borrow_mut().map_err(|_| UsageError::BindingBusy)? = value;
        Ok(())
    }

    fn synthetize(&self) -> Result<Node> {
        let text = match self {
            PodElement::ReadWrite(cell) => {
                let value = cell.try_borrow().map_err(|_| UsageError::BindingBusy)?;
                hex::encode(bytemuck::bytes_of(&*value))
            }
            PodElement::ReadOnly(value) => hex::encode(bytemuck::bytes_of(*value)),
        };
        Ok(Node::String(text))
    }

    fn is_read_only(&self) -> bool {
        matches!(self, PodElement::ReadOnly(_))
    }
}

pub(crate) enum RawElement<'a, T> {
    ReadWrite(&'a RefCell<Option<Vec<T>>>),
    ReadOnly(&'a [T]),
}

impl<T: Pod> Element for RawElement<'_, T> {
    fn kind(&self) -> ElementKind {
        ElementKind::Raw
    }

    fn extract(&self, node: &Node) -> Result<()> {
        let cell = match self {
            RawElement::ReadWrite(cell) => cell,
            RawElement::ReadOnly(_) => return Err(read_only(node)),
        };
        let mut slot = cell.try_borrow_mut().map_err(|_| UsageError::BindingBusy)?;
        if slot.is_some() {
            return Err(BindingError::new(node, "target memory is already allocated").into());
        }

        let bytes = decode_hex(node)?;
        let width = mem::size_of::<T>();
        if bytes.len() % width != 0 {
            return Err(BindingError::new(
                node,
                format!(
                    "bad buffer size: {} bytes is not a whole number of {}-byte elements",
                    bytes.len(),
                    width
                ),
            )
            .into());
        }

        let values = bytes
            .chunks_exact(width)
            .map(bytemuck::try_pod_read_unaligned::<T>)
            .collect::<std::result::Result<Vec<T>, _>>()
            .map_err(|_| BindingError::new(node, "bad buffer size"))?;
        *slot = Some(values);
        Ok(())
    }

    fn synthetize(&self) -> Result<Node> {
        let text = match self {
            RawElement::ReadWrite(cell) => {
                let slot = cell.try_borrow().map_err(|_| UsageError::BindingBusy)?;
                match slot.as_deref() {
                    Some(values) => hex::encode(bytemuck::cast_slice::<T, u8>(values)),
                    None => String::new(),
                }
            }
            RawElement::ReadOnly(values) => hex::encode(bytemuck::cast_slice::<T, u8>(values)),
        };
        Ok(Node::String(text))
    }

    fn is_read_only(&self) -> bool {
        matches!(self, RawElement::ReadOnly(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pod_round_trip() {
        let cell = RefCell::new(0x0102_0304_u32);
        let element = PodElement::ReadWrite(&cell);
        let node = element.synthetize().unwrap();
        assert_eq!(node, Node::String(hex::encode(0x0102_0304_u32.to_ne_bytes())));

        *cell.borrow_mut() = 0;
        element.extract(&node).unwrap();
        assert_eq!(*cell.borrow(), 0x0102_0304);
    }

    #[test]
    fn test_pod_rejects_wrong_length_and_bad_digits() {
        let cell = RefCell::new(0_u16);
        let element = PodElement::ReadWrite(&cell);

        let err = element.extract(&Node::String("abc".into())).unwrap_err();
        assert!(err.as_binding().unwrap().message().contains("odd number"));

        let err = element.extract(&Node::String("aabbcc".into())).unwrap_err();
        assert_eq!(
            err.as_binding().unwrap().message(),
            "bad buffer size: expected 2 bytes, found 3"
        );

        let err = element.extract(&Node::String("zz00".into())).unwrap_err();
        assert!(err.as_binding().unwrap().message().starts_with("bad hex payload"));

        let err = element.extract(&Node::Number(1.0)).unwrap_err();
        assert_eq!(err.as_binding().unwrap().message(), "expecting a string node");
    }

    #[test]
    fn test_raw_allocates_once() {
        let cell: RefCell<Option<Vec<u16>>> = RefCell::new(None);
        let element = RawElement::ReadWrite(&cell);
        let payload = hex::encode(bytemuck::cast_slice::<u16, u8>(&[1, 2, 3]));

        element.extract(&Node::String(payload.clone())).unwrap();
        assert_eq!(cell.borrow().as_deref(), Some(&[1_u16, 2, 3][..]));

        let err = element.extract(&Node::String(payload)).unwrap_err();
        assert_eq!(
            err.as_binding().unwrap().message(),
            "target memory is already allocated"
        );
    }

    #[test]
    fn test_raw_requires_whole_elements() {
        let cell: RefCell<Option<Vec<u32>>> = RefCell::new(None);
        let element = RawElement::ReadWrite(&cell);
        let err = element.extract(&Node::String("000000".into())).unwrap_err();
        assert!(err.as_binding().unwrap().message().contains("whole number"));
        assert!(cell.borrow().is_none());
    }

    #[test]
    fn test_raw_read_only_synthesizes() {
        let values = [0xff_u8, 0x10];
        let element = RawElement::ReadOnly(&values[..]);
        assert!(element.is_read_only());
        assert_eq!(element.synthetize().unwrap(), Node::String("ff10".into()));
        assert!(element.extract(&Node::String("00".into())).is_err());
    }

    #[test]
    fn test_zero_sized_types_are_refused() {
        assert_eq!(check_sized::<()>(), Err(UsageError::ZeroSized));
        assert_eq!(check_sized::<u8>(), Ok(()));
    }
}
