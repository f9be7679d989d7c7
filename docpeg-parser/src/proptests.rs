#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]

use proptest::prelude::*;

use crate::{Node, Options, parse};

fn assert_tree_invariants(node: &Node, padded_len: usize) {
    let location = node.location();
    assert!(
        location.start <= location.end,
        "span inverted: {location:?}"
    );
    assert!(
        location.end <= padded_len,
        "span {location:?} escapes the padded source of {padded_len} chars"
    );

    if let Node::Title(title) = node {
        assert!((1..=5).contains(&title.level), "title level {}", title.level);
    }

    let children = node.children();
    for pair in children.windows(2) {
        assert!(
            !(matches!(pair[0], Node::Text(_)) && matches!(pair[1], Node::Text(_))),
            "adjacent text leaves survived attachment: {pair:?}"
        );
    }
    if let (Some(first), Some(last)) = (children.first(), children.last()) {
        assert!(location.start <= first.location().start);
        assert!(last.location().end <= location.end);
    }
    for child in children {
        assert_tree_invariants(child, padded_len);
    }
}

proptest! {
    // The word/endline/space fallback makes the grammar total over any
    // input, so a parse may time out but must never report an internal
    // error or panic.
    #[test]
    fn arbitrary_input_parses_cleanly(input in r"[ a-z0-9=~^+>\t\r\n-]{0,64}") {
        let document = parse(&input, &Options::default())
            .expect("inline fallback must consume any input");
        let padded_len = input.chars().count() + 2;
        assert_tree_invariants(&Node::Document(document), padded_len);
    }

    #[test]
    fn parsing_is_deterministic(input in r"[ a-z=\n-]{0,48}") {
        let first = parse(&input, &Options::default());
        let second = parse(&input, &Options::default());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn heading_markers_never_exceed_level_five(marker_len in 1_usize..=5, body in "[a-z]{1,12}") {
        let marker: String = "=".repeat(marker_len);
        let document = parse(&format!("{marker} {body}"), &Options::default())
            .expect("headings parse");
        let first = document.children.first();
        if let Some(Node::Title(title)) = first {
            prop_assert_eq!(usize::from(title.level), marker_len);
        } else {
            prop_assert!(false, "expected a title, got {:?}", first);
        }
    }
}
