//! Property-based tests for the parser and serializer
//!
//! Generated trees must survive a trip through text unchanged in both layouts,
//! and compact output must be a fixed point of parse-then-serialize.

use lconf::json::lexing::tokenize;
use lconf::{parse_str, Node};
use proptest::prelude::*;

fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,7}"
}

/// Printable ASCII plus the escapable control characters
fn text_strategy() -> impl Strategy<Value = String> {
    "[ -~\t\n]{0,12}"
}

fn node_strategy() -> impl Strategy<Value = Node> {
    let leaf = prop_oneof![
        (-1.0e6f32..1.0e6f32).prop_map(Node::Number),
        any::<bool>().prop_map(Node::Boolean),
        text_strategy().prop_map(Node::String),
    ];

    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Node::Array),
            prop::collection::btree_map(key_strategy(), inner, 0..6).prop_map(Node::Object),
        ]
    })
}

fn document_strategy() -> impl Strategy<Value = Node> {
    prop_oneof![
        prop::collection::vec(node_strategy(), 0..6).prop_map(Node::Array),
        prop::collection::btree_map(key_strategy(), node_strategy(), 0..6).prop_map(Node::Object),
    ]
}

proptest! {
    #[test]
    fn test_compact_round_trip(document in document_strategy()) {
        let text = document.to_text(false);
        prop_assert_eq!(parse_str(&text).unwrap(), document);
    }

    #[test]
    fn test_indented_round_trip(document in document_strategy()) {
        let text = document.to_text(true);
        prop_assert_eq!(parse_str(&text).unwrap(), document);
    }

    #[test]
    fn test_compact_output_is_idempotent(document in document_strategy()) {
        let once = document.to_text(false);
        let twice = parse_str(&once).unwrap().to_text(false);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_lexer_never_panics(input in "\\PC*") {
        let _kinds = tokenize(&input);
    }

    #[test]
    fn test_parser_never_panics(input in "[\\[\\]{}:,\"0-9.eE\\- a-z#@\n]{0,40}") {
        // Errors are fine, panics are not
        let _ = parse_str(&input);
    }
}
