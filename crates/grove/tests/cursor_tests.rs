//! Tree cursor navigation tests

use grove::{GrammarRegistry, Parser, Point, SyntaxTree, TextSize, TreePath};

fn python(code: &str) -> SyntaxTree {
    let grammar = GrammarRegistry::global().load("python").unwrap();
    Parser::new().parse(&grammar, code).unwrap()
}

#[test]
fn test_walk_assignment() {
    let tree = python("x = 1");
    let mut cursor = tree.cursor();
    assert!(cursor.is_at_root());
    assert_eq!(cursor.current_node().kind(), "module");

    assert!(cursor.goto_first_child());
    assert_eq!(cursor.current_node().kind(), "expression_statement");
    assert!(cursor.goto_first_child());
    assert_eq!(cursor.current_node().kind(), "assignment");
    assert_eq!(cursor.depth(), 2);

    assert!(cursor.goto_first_child());
    let left = cursor.current_node();
    assert_eq!(left.kind(), "identifier");
    assert_eq!(left.text(), "x");
    assert_eq!(cursor.current_field_name(), Some("left"));

    assert!(cursor.goto_next_sibling());
    assert_eq!(cursor.current_node().kind(), "=");
    assert!(!cursor.current_node().is_named());
    assert_eq!(cursor.current_field_name(), None);

    assert!(cursor.goto_next_sibling());
    let right = cursor.current_node();
    assert_eq!(right.kind(), "integer");
    assert_eq!(right.text(), "1");
    assert_eq!(cursor.current_field_name(), Some("right"));
    assert!(!cursor.goto_next_sibling());

    assert!(cursor.goto_parent());
    assert_eq!(cursor.current_node().kind(), "assignment");
}

#[test]
fn test_failed_moves_leave_cursor_in_place() {
    let tree = python("x = 1");
    let mut cursor = tree.cursor();

    assert!(!cursor.goto_parent());
    assert!(!cursor.goto_next_sibling());
    assert!(!cursor.goto_prev_sibling());
    assert!(cursor.is_at_root());

    assert!(cursor.goto_first_child());
    assert!(cursor.goto_first_child());
    assert!(cursor.goto_first_child());
    let leaf = cursor.current_node();
    let path = cursor.path();

    assert!(!cursor.goto_first_child());
    assert!(!cursor.goto_last_child());
    assert!(!cursor.goto_prev_sibling());
    assert_eq!(cursor.current_node(), leaf);
    assert_eq!(cursor.path(), path);
}

#[test]
fn test_siblings_both_ways() {
    let tree = python("x = 1");
    let mut cursor = tree.cursor();
    assert!(cursor.goto_first_child());
    assert!(cursor.goto_first_child());

    assert!(cursor.goto_last_child());
    assert_eq!(cursor.current_node().kind(), "integer");
    assert_eq!(cursor.path().indices(), &[0, 0, 2]);

    assert!(cursor.goto_prev_sibling());
    assert_eq!(cursor.current_node().kind(), "=");
    assert_eq!(cursor.current_node().start_byte(), TextSize::from(2));
    assert!(cursor.goto_prev_sibling());
    assert_eq!(cursor.current_node().kind(), "identifier");
    assert_eq!(cursor.current_field_name(), Some("left"));
    assert_eq!(cursor.path().indices(), &[0, 0, 0]);
}

#[test]
fn test_first_child_for_byte() {
    let tree = python("a = 1\nb = 2\n");
    let mut cursor = tree.cursor();

    assert_eq!(cursor.goto_first_child_for_byte(TextSize::from(7)), Some(1));
    let statement = cursor.current_node();
    assert_eq!(statement.kind(), "expression_statement");
    assert_eq!(statement.text(), "b = 2");
    assert_eq!(statement.start_point(), Point::new(1, 0));
    assert_eq!(statement.end_point(), Point::new(1, 5));

    cursor.reset();
    assert_eq!(cursor.goto_first_child_for_byte(TextSize::from(0)), Some(0));
    cursor.reset();
    assert_eq!(cursor.goto_first_child_for_byte(TextSize::from(5)), Some(1));
    cursor.reset();
    assert_eq!(cursor.goto_first_child_for_byte(TextSize::from(12)), None);
    assert!(cursor.is_at_root());
}

#[test]
fn test_path_round_trip() {
    let tree = python("def f(a, b):\n    return a + b\n");
    let expected: Vec<_> = tree.preorder().map(|visit| visit.node).collect();

    // Revisit every node by path, in pre-order
    let mut cursor = tree.cursor();
    let mut walker = tree.cursor();
    let mut stack: Vec<TreePath> = vec![walker.path()];
    let mut visited = Vec::new();
    while let Some(path) = stack.pop() {
        assert!(cursor.goto_path(&path));
        visited.push(cursor.current_node());
        assert!(walker.goto_path(&path));
        if walker.goto_last_child() {
            loop {
                stack.push(walker.path());
                if !walker.goto_prev_sibling() {
                    break;
                }
            }
        }
    }
    assert_eq!(visited, expected);
}

#[test]
fn test_goto_invalid_path_restores() {
    let tree = python("x = 1");
    let mut cursor = tree.cursor();
    assert!(cursor.goto_first_child());
    let before = cursor.path();

    assert!(!cursor.goto_path(&TreePath(vec![0, 9].into())));
    assert_eq!(cursor.path(), before);
    assert_eq!(cursor.current_node().kind(), "expression_statement");

    assert!(cursor.goto_path(&TreePath::default()));
    assert!(cursor.is_at_root());
}

#[test]
fn test_preorder_depths_and_fields() {
    let tree = python("x = 1");
    let visits: Vec<(usize, &str, Option<&str>)> = tree
        .preorder()
        .map(|visit| (visit.depth, visit.node.kind(), visit.field))
        .collect();
    assert_eq!(
        visits,
        vec![
            (0, "module", None),
            (1, "expression_statement", None),
            (2, "assignment", None),
            (3, "identifier", Some("left")),
            (3, "=", None),
            (3, "integer", Some("right")),
        ]
    );
}

#[test]
fn test_points_across_lines() {
    let tree = python("if x:\n    y = 2\n");
    let node = tree
        .preorder()
        .map(|visit| visit.node)
        .find(|node| node.kind() == "integer")
        .unwrap();
    assert_eq!(node.start_point(), Point::new(1, 8));
    assert_eq!(node.start_point().to_string(), "[1, 8]");
    assert_eq!(node.range().to_string(), "14..15");
}
