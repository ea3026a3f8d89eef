//! Property-based tests for the bundled grammars
//!
//! Arbitrary text, valid or not, must parse into a tree that covers the
//! whole input, keeps every byte and is navigable.

use grove::syntax::GreenElement;
use grove::{GrammarRegistry, Node, Parser, SyntaxTree};
use proptest::prelude::*;

const LANGUAGES: [&str; 3] = ["python", "cpp", "javascript"];

fn parse(language: &str, code: &str) -> SyntaxTree {
    let grammar = GrammarRegistry::global().load(language).unwrap();
    Parser::new().parse_str(&grammar, code).unwrap()
}

fn collect_text(element: &GreenElement, out: &mut String) {
    match element {
        GreenElement::Node(node) => {
            for child in node.children() {
                collect_text(child, out);
            }
        }
        GreenElement::Token(token) => out.push_str(token.text()),
    }
}

fn check_children(node: Node<'_>) -> Result<(), TestCaseError> {
    let range = node.range();
    let mut previous_end = range.start();
    for child in node.children() {
        let child_range = child.range();
        prop_assert!(range.contains_range(child_range), "{child:?} outside {node:?}");
        prop_assert!(child_range.start() >= previous_end, "{child:?} overlaps its sibling");
        previous_end = child_range.end();
        check_children(child)?;
    }
    Ok(())
}

/// Printable ASCII with line breaks and tabs
fn ascii_text() -> impl Strategy<Value = String> {
    "[ -~\t\n]{0,80}"
}

/// Fragments that look like code, glued together in random order
fn code_soup() -> impl Strategy<Value = String> {
    let fragment = prop_oneof![
        Just("def "),
        Just("if "),
        Just("return "),
        Just("int "),
        Just("function "),
        Just("x"),
        Just("foo"),
        Just("1"),
        Just("2.5"),
        Just("'s'"),
        Just("\"t\""),
        Just("("),
        Just(")"),
        Just("{"),
        Just("}"),
        Just("["),
        Just("]"),
        Just(":"),
        Just(";"),
        Just(","),
        Just("."),
        Just("="),
        Just("+"),
        Just("<<"),
        Just("::"),
        Just("=>"),
        Just(" "),
        Just("\n"),
        Just("\n    "),
        Just("# c\n"),
        Just("// c\n"),
        Just("/* c */"),
    ];
    prop::collection::vec(fragment, 0..40).prop_map(|parts| parts.concat())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn root_covers_ascii_input(code in ascii_text()) {
        for language in LANGUAGES {
            let tree = parse(language, &code);
            let root = tree.root();
            prop_assert_eq!(root.range().start().to_usize(), 0);
            prop_assert_eq!(root.range().end().to_usize(), code.len());
            prop_assert_eq!(root.text(), code.as_str());
        }
    }

    #[test]
    fn trees_are_lossless(code in code_soup()) {
        for language in LANGUAGES {
            let tree = parse(language, &code);
            let mut text = String::new();
            collect_text(&GreenElement::Node(tree.green().clone()), &mut text);
            prop_assert_eq!(&text, &code, "{}", language);
        }
    }

    #[test]
    fn children_are_ordered_and_contained(code in code_soup()) {
        for language in LANGUAGES {
            let tree = parse(language, &code);
            check_children(tree.root())?;
        }
    }

    #[test]
    fn parsing_is_deterministic(code in code_soup()) {
        for language in LANGUAGES {
            let first = parse(language, &code);
            let second = parse(language, &code);
            prop_assert_eq!(first.green(), second.green());
        }
    }

    #[test]
    fn cursor_paths_lead_back_to_nodes(code in code_soup()) {
        let tree = parse("python", &code);
        let mut walker = tree.cursor();
        let mut cursor = tree.cursor();
        for visit in tree.preorder() {
            while walker.current_node() != visit.node {
                let moved = walker.goto_first_child()
                    || walker.goto_next_sibling()
                    || loop {
                        if !walker.goto_parent() {
                            break false;
                        }
                        if walker.goto_next_sibling() {
                            break true;
                        }
                    };
                prop_assert!(moved);
            }
            prop_assert_eq!(walker.depth(), visit.depth);
            prop_assert!(cursor.goto_path(&walker.path()));
            prop_assert_eq!(cursor.current_node(), visit.node);
            prop_assert_eq!(cursor.current_field_name(), visit.field);
        }
    }

    #[test]
    fn unicode_text_never_panics(code in "\\PC{0,40}") {
        for language in LANGUAGES {
            let tree = parse(language, &code);
            prop_assert_eq!(tree.root().range().end().to_usize(), code.len());
        }
    }
}
