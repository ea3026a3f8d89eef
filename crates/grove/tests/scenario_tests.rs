//! End-to-end parsing tests over the bundled grammars
//!
//! These mirror what the `grove` tool does: load a grammar by name, parse a
//! program, walk the result and render it.

use grove::error::{EncodingError, Error};
use grove::languages::sample_code;
use grove::parser::ParseConfig;
use grove::{GrammarRegistry, Parser, PrinterConfig, SyntaxTree, TextSize, TreePrinter};
use std::time::{Duration, Instant};

fn parse(language: &str, code: &str) -> SyntaxTree {
    let grammar = GrammarRegistry::global().load(language).unwrap();
    Parser::new().parse(&grammar, code).unwrap()
}

fn nested_parens(language: &str, levels: usize) -> String {
    let value = format!("{}1{}", "(".repeat(levels), ")".repeat(levels));
    match language {
        "python" => format!("x = {value}\n"),
        "cpp" => format!("int main() {{ return {value}; }}"),
        _ => format!("x = {value};"),
    }
}

fn indented(lines: &[(usize, &str)]) -> String {
    let mut out = String::new();
    for (depth, line) in lines {
        out.push_str(&"  ".repeat(*depth));
        out.push_str(line);
        out.push('\n');
    }
    out
}

#[test]
fn test_python_function_scenario() {
    let tree = parse("python", "def main():\n    print('Hello, Python!')");
    let root = tree.root();
    assert_eq!(root.kind(), "module");
    assert_eq!(root.range().len(), TextSize::from(39));
    assert!(!tree.has_error());

    let function = root.child(0).unwrap();
    assert_eq!(function.kind(), "function_definition");
    assert_eq!(function.child_by_field_name("name").unwrap().text(), "main");

    let body = function.child_by_field_name("body").unwrap();
    let call = tree
        .preorder()
        .map(|visit| visit.node)
        .find(|node| node.kind() == "call")
        .unwrap();
    assert!(body.range().contains_range(call.range()));
    assert_eq!(call.child_by_field_name("function").unwrap().text(), "print");
}

#[test]
fn test_cpp_return_scenario() {
    let tree = parse("cpp", sample_code("cpp").unwrap());
    assert_eq!(tree.root().kind(), "translation_unit");
    assert!(!tree.has_error());

    let ret = tree
        .preorder()
        .map(|visit| visit.node)
        .find(|node| node.kind() == "return_statement")
        .unwrap();
    let value = ret.children().find(grove::Node::is_named).unwrap();
    assert_eq!(value.kind(), "number_literal");
    assert_eq!(value.text(), "0");
    assert_eq!(value.start_point().row, 2);
    assert_eq!(ret.start_point().column, 2);
}

#[test]
fn test_javascript_sample_scenario() {
    let code = sample_code("javascript").unwrap();
    let tree = parse("javascript", code);
    assert!(!tree.has_error());

    let function = tree.root().child(0).unwrap();
    assert_eq!(function.kind(), "function_declaration");
    assert_eq!(function.child_by_field_name("name").unwrap().text(), "hello");

    let statement = function
        .child_by_field_name("body")
        .unwrap()
        .children()
        .find(grove::Node::is_named)
        .unwrap();
    assert_eq!(statement.kind(), "expression_statement");
    assert_eq!(statement.start_point().row, 1);
    assert_eq!(statement.start_point().column, 2);
}

#[test]
fn test_broken_python_still_covers_input() {
    let tree = parse("python", "def (:");
    let root = tree.root();
    assert_eq!(root.kind(), "module");
    assert_eq!(root.range().len(), TextSize::from(6));
    assert!(tree.has_error());
    assert!(tree.errors().count() >= 1);
    assert!(tree.metrics().errors >= 1);
}

#[test]
fn test_invalid_utf8_is_rejected() {
    let grammar = GrammarRegistry::global().load("python").unwrap();
    let err = Parser::new().parse(&grammar, b"x = \xff\n").unwrap_err();
    assert!(matches!(
        err,
        Error::Encoding(EncodingError {
            valid_up_to: 4,
            error_len: Some(1),
        })
    ));
}

#[test]
fn test_empty_input() {
    for (language, entry) in [
        ("python", "module"),
        ("cpp", "translation_unit"),
        ("javascript", "program"),
    ] {
        let tree = parse(language, "");
        assert_eq!(tree.root().kind(), entry);
        assert!(tree.root().range().is_empty(), "{language}");
    }
}

#[test]
fn test_deeply_nested_parentheses() {
    for language in ["python", "cpp", "javascript"] {
        let code = nested_parens(language, 100);
        let started = Instant::now();
        let tree = parse(language, &code);
        assert!(started.elapsed() < Duration::from_secs(5), "{language}");
        assert!(!tree.has_error(), "{language}");
        assert_eq!(tree.text(), code);

        let depth = tree
            .preorder()
            .filter(|visit| visit.node.kind() == "parenthesized_expression")
            .count();
        assert_eq!(depth, 100, "{language}");
    }
}

#[test]
fn test_depth_limit_gives_up_in_linear_time() {
    let parser = Parser::with_config(ParseConfig {
        max_depth: 16,
        ..ParseConfig::default()
    });
    for language in ["python", "cpp", "javascript"] {
        let grammar = GrammarRegistry::global().load(language).unwrap();
        let code = nested_parens(language, 300);
        let started = Instant::now();
        let tree = parser.parse(&grammar, &code).unwrap();
        assert!(started.elapsed() < Duration::from_secs(5), "{language}");
        assert!(tree.has_error(), "{language}");
        assert_eq!(tree.root().range().len().to_usize(), code.len());
        assert_eq!(tree.text(), code);
    }
}

#[test]
fn test_parsing_is_deterministic() {
    for language in ["python", "cpp", "javascript"] {
        let code = sample_code(language).unwrap();
        let first = parse(language, code);
        let second = parse(language, code);
        assert_eq!(first.green(), second.green(), "{language}");
        assert_eq!(first.root().to_sexp(), second.root().to_sexp());
    }
}

#[test]
fn test_python_demo_output() {
    let tree = parse("python", sample_code("python").unwrap());
    let expected = indented(&[
        (0, "module"),
        (1, "function_definition"),
        (2, "def"),
        (2, "identifier (name)"),
        (2, "parameters (parameters)"),
        (3, "("),
        (3, ")"),
        (2, ":"),
        (2, "block (body)"),
        (3, "expression_statement"),
        (4, "call"),
        (5, "identifier (function)"),
        (5, "argument_list (arguments)"),
        (6, "("),
        (6, "string"),
        (6, ")"),
    ]);
    assert_eq!(TreePrinter::new().print(&tree), expected);
}

#[test]
fn test_cpp_demo_output() {
    let tree = parse("cpp", sample_code("cpp").unwrap());
    let expected = indented(&[
        (0, "translation_unit"),
        (1, "function_definition"),
        (2, "primitive_type (type)"),
        (2, "function_declarator (declarator)"),
        (3, "identifier (declarator)"),
        (3, "parameter_list (parameters)"),
        (4, "("),
        (4, ")"),
        (2, "compound_statement (body)"),
        (3, "{"),
        (3, "expression_statement"),
        (4, "binary_expression"),
        (5, "binary_expression (left)"),
        (6, "qualified_identifier (left)"),
        (7, "namespace_identifier (scope)"),
        (7, "::"),
        (7, "identifier (name)"),
        (6, "<< (operator)"),
        (6, "string_literal (right)"),
        (5, "<< (operator)"),
        (5, "qualified_identifier (right)"),
        (6, "namespace_identifier (scope)"),
        (6, "::"),
        (6, "identifier (name)"),
        (4, ";"),
        (3, "return_statement"),
        (4, "return"),
        (4, "number_literal"),
        (4, ";"),
        (3, "}"),
    ]);
    assert_eq!(TreePrinter::new().print(&tree), expected);
}

#[test]
fn test_javascript_demo_output() {
    let tree = parse("javascript", sample_code("javascript").unwrap());
    let expected = indented(&[
        (0, "program"),
        (1, "function_declaration"),
        (2, "function"),
        (2, "identifier (name)"),
        (2, "formal_parameters (parameters)"),
        (3, "("),
        (3, ")"),
        (2, "statement_block (body)"),
        (3, "{"),
        (3, "expression_statement"),
        (4, "call_expression"),
        (5, "member_expression (function)"),
        (6, "identifier (object)"),
        (6, "."),
        (6, "property_identifier (property)"),
        (5, "arguments (arguments)"),
        (6, "("),
        (6, "string"),
        (6, ")"),
        (4, ";"),
        (3, "}"),
    ]);
    assert_eq!(TreePrinter::new().print(&tree), expected);
}

#[test]
fn test_printer_ranges_and_points() {
    let tree = parse("python", "x = 1\n");
    let printer = TreePrinter::with_config(PrinterConfig {
        ranges: true,
        points: true,
        ..PrinterConfig::default()
    });
    let printed = printer.print(&tree);
    let mut lines = printed.lines();
    assert_eq!(lines.next(), Some("module [0..6] [0, 0] - [1, 0]"));
    assert_eq!(lines.next(), Some("  expression_statement [0..5] [0, 0] - [0, 5]"));
    assert!(printed.contains("integer (right) [4..5] [0, 4] - [0, 5]"));
}

#[test]
fn test_printer_subtree_write() {
    let tree = parse("javascript", "f(a);");
    let mut cursor = tree.cursor();
    assert!(cursor.goto_first_child());
    assert!(cursor.goto_first_child());
    assert_eq!(cursor.current_node().kind(), "call_expression");

    let mut out = String::new();
    TreePrinter::new().write(cursor, &mut out).unwrap();
    let expected = indented(&[
        (0, "call_expression"),
        (1, "identifier (function)"),
        (1, "arguments (arguments)"),
        (2, "("),
        (2, "identifier"),
        (2, ")"),
    ]);
    assert_eq!(out, expected);
}

#[cfg(feature = "parallel")]
#[test]
fn test_parse_batch_matches_sequential() {
    let grammar = GrammarRegistry::global().load("javascript").unwrap();
    let sources = [
        "let a = 1;",
        "function f(x) { return x * 2 }",
        "if (a) { b() } else { c() }",
        "class A extends B { m() { return this.x } }",
    ];

    let parser = Parser::new();
    let batch = parser.parse_batch(&grammar, &sources);
    assert_eq!(batch.len(), sources.len());
    for (result, source) in batch.iter().zip(sources) {
        let tree = result.as_ref().unwrap();
        let single = parser.parse(&grammar, source).unwrap();
        assert_eq!(tree.green(), single.green());
        assert_eq!(tree.text(), source);
    }
}
