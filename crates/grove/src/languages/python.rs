//! Python grammar.
//!
//! Statements, suites and expressions of Python 3 without `async`, `with`,
//! `match`, comprehensions and f-string interpolation. Indentation is turned
//! into `_newline`/`_indent`/`_dedent` tokens by the layout pass.

use super::dsl::{
    alias, binary, choice, comma_list, comma_sep1, field, lit, lits, opt, plus, seq, star, sym,
    tail, Expr,
};
use crate::error::GrammarError;
use crate::grammar::{DEDENT, Grammar, GrammarBuilder, INDENT, NEWLINE};
use crate::lexer::{CharSet, Pattern};

/// Demo program
pub const SAMPLE: &str = "def main():\n    print('Hello, Python!')";

const AUGMENTED_OPERATORS: &[&str] = &[
    "+=", "-=", "*=", "@=", "/=", "//=", "%=", "**=", ">>=", "<<=", "&=", "^=", "|=",
];

const COMPARISON_OPERATORS: &[&str] = &["<", "<=", "==", "!=", ">=", ">", "in", "is"];

/// Build the Python grammar.
///
/// # Errors
///
/// Only fails if the definition itself is inconsistent.
pub fn grammar() -> Result<Grammar, GrammarError> {
    let builder = GrammarBuilder::new("python")
        .indentation()
        .token("identifier", super::identifier(""))
        .token(
            "float",
            Pattern::choice([
                Pattern::seq([
                    super::digits("_"),
                    Pattern::literal("."),
                    Pattern::many(Pattern::class(CharSet::digits().with_chars("_"))),
                    exponent(),
                ]),
                Pattern::seq([Pattern::literal("."), super::digits("_"), exponent()]),
                Pattern::seq([
                    super::digits("_"),
                    Pattern::class(CharSet::chars("eE")),
                    Pattern::optional(Pattern::class(CharSet::chars("+-"))),
                    super::digits("_"),
                ]),
            ]),
        )
        .token(
            "integer",
            Pattern::choice([super::hex_number("_"), super::digits("_")]),
        )
        .token(
            "string",
            Pattern::regex(
                r#"[rRbBuUfF]{0,2}(?:'''(?s:.)*?'''|"""(?s:.)*?"""|'(?:[^'\\\n]|\\(?s:.))*'|"(?:[^"\\\n]|\\(?s:.))*")"#,
            ),
        )
        .extra("comment", super::line_comment("#"))
        .extra(
            "_line_continuation",
            Pattern::seq([
                Pattern::literal("\\"),
                Pattern::optional(Pattern::literal("\r")),
                Pattern::literal("\n"),
            ]),
        )
        .extra("_whitespace", super::whitespace())
        .word("identifier");

    let builder = statements(builder);
    let builder = expressions(builder);
    builder.build()
}

fn exponent() -> Pattern {
    Pattern::optional(Pattern::seq([
        Pattern::class(CharSet::chars("eE")),
        Pattern::optional(Pattern::class(CharSet::chars("+-"))),
        super::digits("_"),
    ]))
}

fn suite(field_name: &str) -> Expr {
    field(field_name, sym("_suite"))
}

fn statements(builder: GrammarBuilder) -> GrammarBuilder {
    builder
        .rule("module", Expr::items(sym("_statement"), []))
        .rule(
            "_statement",
            choice([sym("_compound_statement"), sym("_simple_statements")]),
        )
        .rule(
            "_simple_statements",
            seq([
                Expr::sep1_trailing(sym("_simple_statement"), ";"),
                sym(NEWLINE),
            ]),
        )
        .rule(
            "_simple_statement",
            choice([
                sym("import_statement"),
                sym("import_from_statement"),
                sym("return_statement"),
                sym("pass_statement"),
                sym("break_statement"),
                sym("continue_statement"),
                sym("raise_statement"),
                sym("assert_statement"),
                sym("delete_statement"),
                sym("global_statement"),
                sym("expression_statement"),
            ]),
        )
        .rule(
            "import_statement",
            seq([lit("import"), comma_sep1(field("name", sym("_import_name")))]),
        )
        .rule(
            "import_from_statement",
            seq([
                lit("from"),
                field("module_name", sym("dotted_name")),
                lit("import"),
                choice([
                    sym("wildcard_import"),
                    seq([
                        lit("("),
                        Expr::sep1_trailing(field("name", sym("_import_name")), ","),
                        lit(")"),
                    ]),
                    comma_sep1(field("name", sym("_import_name"))),
                ]),
            ]),
        )
        .rule("_import_name", choice([sym("aliased_import"), sym("dotted_name")]))
        .rule(
            "aliased_import",
            seq([
                field("name", sym("dotted_name")),
                lit("as"),
                field("alias", sym("identifier")),
            ]),
        )
        .rule("dotted_name", Expr::sep1(sym("identifier"), lit(".")))
        .rule("wildcard_import", lit("*"))
        .rule("return_statement", seq([lit("return"), opt(sym("_expressions"))]))
        .rule("pass_statement", lit("pass"))
        .rule("break_statement", lit("break"))
        .rule("continue_statement", lit("continue"))
        .rule(
            "raise_statement",
            seq([
                lit("raise"),
                opt(sym("_expression")),
                opt(seq([lit("from"), field("cause", sym("_expression"))])),
            ]),
        )
        .rule("assert_statement", seq([lit("assert"), comma_sep1(sym("_expression"))]))
        .rule("delete_statement", seq([lit("del"), sym("_expressions")]))
        .rule(
            "global_statement",
            seq([lits(&["global", "nonlocal"]), comma_sep1(sym("identifier"))]),
        )
        .rule(
            "expression_statement",
            choice([
                sym("assignment"),
                sym("augmented_assignment"),
                sym("_expressions"),
            ]),
        )
        .rule(
            "assignment",
            seq([
                field("left", sym("_left_hand_side")),
                choice([
                    seq([lit("="), field("right", sym("_right_hand_side"))]),
                    seq([
                        lit(":"),
                        field("type", sym("type")),
                        opt(seq([lit("="), field("right", sym("_right_hand_side"))])),
                    ]),
                ]),
            ]),
        )
        .rule(
            "augmented_assignment",
            seq([
                field("left", sym("_left_hand_side")),
                field("operator", lits(AUGMENTED_OPERATORS)),
                field("right", sym("_right_hand_side")),
            ]),
        )
        .rule("_left_hand_side", choice([sym("pattern_list"), sym("_primary_expression")]))
        .rule(
            "pattern_list",
            seq([
                sym("_primary_expression"),
                plus(seq([lit(","), sym("_primary_expression")])),
                opt(lit(",")),
            ]),
        )
        .rule("_right_hand_side", choice([sym("assignment"), sym("_expressions")]))
        .rule(
            "_compound_statement",
            choice([
                sym("function_definition"),
                sym("class_definition"),
                sym("decorated_definition"),
                sym("if_statement"),
                sym("for_statement"),
                sym("while_statement"),
                sym("try_statement"),
            ]),
        )
        .rule(
            "function_definition",
            seq([
                lit("def"),
                field("name", sym("identifier")),
                field("parameters", sym("parameters")),
                opt(seq([lit("->"), field("return_type", sym("type"))])),
                lit(":"),
                suite("body"),
            ]),
        )
        .rule(
            "class_definition",
            seq([
                lit("class"),
                field("name", sym("identifier")),
                opt(field("superclasses", sym("argument_list"))),
                lit(":"),
                suite("body"),
            ]),
        )
        .rule(
            "decorated_definition",
            seq([
                plus(sym("decorator")),
                field(
                    "definition",
                    choice([sym("function_definition"), sym("class_definition")]),
                ),
            ]),
        )
        .rule("decorator", seq([lit("@"), sym("_expression"), sym(NEWLINE)]))
        .rule(
            "if_statement",
            seq([
                lit("if"),
                field("condition", sym("_expression")),
                lit(":"),
                suite("consequence"),
                star(field("alternative", sym("elif_clause"))),
                opt(field("alternative", sym("else_clause"))),
            ]),
        )
        .rule(
            "elif_clause",
            seq([
                lit("elif"),
                field("condition", sym("_expression")),
                lit(":"),
                suite("consequence"),
            ]),
        )
        .rule("else_clause", seq([lit("else"), lit(":"), suite("body")]))
        .rule(
            "for_statement",
            seq([
                lit("for"),
                field("left", sym("_left_hand_side")),
                lit("in"),
                field("right", sym("_expressions")),
                lit(":"),
                suite("body"),
                opt(field("alternative", sym("else_clause"))),
            ]),
        )
        .rule(
            "while_statement",
            seq([
                lit("while"),
                field("condition", sym("_expression")),
                lit(":"),
                suite("body"),
                opt(field("alternative", sym("else_clause"))),
            ]),
        )
        .rule(
            "try_statement",
            seq([
                lit("try"),
                lit(":"),
                suite("body"),
                star(sym("except_clause")),
                opt(sym("else_clause")),
                opt(sym("finally_clause")),
            ]),
        )
        .rule(
            "except_clause",
            seq([
                lit("except"),
                opt(seq([
                    sym("_expression"),
                    opt(seq([lit("as"), sym("identifier")])),
                ])),
                lit(":"),
                sym("_suite"),
            ]),
        )
        .rule("finally_clause", seq([lit("finally"), lit(":"), sym("_suite")]))
        // An indented block, or statements on the same line as the colon
        .rule(
            "_suite",
            choice([
                seq([sym(NEWLINE), sym(INDENT), sym("block")]),
                alias(sym("inline_block"), "block"),
            ]),
        )
        .rule(
            "block",
            seq([Expr::items(sym("_statement"), [sym(DEDENT)]), sym(DEDENT)]),
        )
        .rule("inline_block", sym("_simple_statements"))
}

fn expressions(builder: GrammarBuilder) -> GrammarBuilder {
    builder
        .rule("_expressions", choice([sym("expression_list"), sym("_expression")]))
        .rule(
            "expression_list",
            seq([
                sym("_expression"),
                plus(seq([lit(","), sym("_expression")])),
                opt(lit(",")),
            ]),
        )
        .rule(
            "_expression",
            choice([
                sym("lambda"),
                sym("conditional_expression"),
                sym("_or_test"),
            ]),
        )
        .rule(
            "lambda",
            seq([
                lit("lambda"),
                opt(field("parameters", sym("lambda_parameters"))),
                lit(":"),
                field("body", sym("_expression")),
            ]),
        )
        .rule(
            "lambda_parameters",
            Expr::sep1_trailing(
                choice([
                    sym("default_parameter"),
                    sym("list_splat_pattern"),
                    sym("dictionary_splat_pattern"),
                    sym("identifier"),
                ]),
                ",",
            ),
        )
        .rule(
            "conditional_expression",
            seq([
                sym("_or_test"),
                lit("if"),
                sym("_or_test"),
                lit("else"),
                sym("_expression"),
            ]),
        )
        .rule("type", sym("_expression"))
        .rule("_or_test", binary("boolean_operator", "_and_test", &["or"]))
        .rule("_and_test", binary("boolean_operator", "_not_test", &["and"]))
        .rule("_not_test", choice([sym("not_operator"), sym("_comparison")]))
        .rule(
            "not_operator",
            seq([lit("not"), field("argument", sym("_not_test"))]),
        )
        .rule(
            "_comparison",
            choice([sym("comparison_operator"), sym("_bitwise_or")]),
        )
        .rule(
            "comparison_operator",
            seq([
                sym("_bitwise_or"),
                plus(seq([
                    field(
                        "operators",
                        choice([
                            seq([lit("not"), lit("in")]),
                            seq([lit("is"), lit("not")]),
                            lits(COMPARISON_OPERATORS),
                        ]),
                    ),
                    sym("_bitwise_or"),
                ])),
            ]),
        )
        .rule("_bitwise_or", binary("binary_operator", "_bitwise_xor", &["|"]))
        .rule("_bitwise_xor", binary("binary_operator", "_bitwise_and", &["^"]))
        .rule("_bitwise_and", binary("binary_operator", "_shift", &["&"]))
        .rule("_shift", binary("binary_operator", "_arith", &["<<", ">>"]))
        .rule("_arith", binary("binary_operator", "_term", &["+", "-"]))
        .rule(
            "_term",
            binary("binary_operator", "_factor", &["*", "/", "//", "%", "@"]),
        )
        .rule("_factor", choice([sym("unary_operator"), sym("_power")]))
        .rule(
            "unary_operator",
            seq([
                field("operator", lits(&["+", "-", "~"])),
                field("argument", sym("_factor")),
            ]),
        )
        // `**` is right associative and binds tighter than unary minus on its left
        .rule(
            "_power",
            choice([
                alias(sym("power"), "binary_operator"),
                sym("_primary_expression"),
            ]),
        )
        .rule(
            "power",
            seq([
                field("left", sym("_primary_expression")),
                field("operator", lit("**")),
                field("right", sym("_factor")),
            ]),
        )
        .rule(
            "_primary_expression",
            Expr::left_fold(
                sym("_atom"),
                [
                    tail(
                        "attribute",
                        "object",
                        seq([lit("."), field("attribute", sym("identifier"))]),
                    ),
                    tail(
                        "subscript",
                        "value",
                        seq([
                            lit("["),
                            Expr::sep1_trailing(
                                field("subscript", choice([sym("slice"), sym("_expression")])),
                                ",",
                            ),
                            lit("]"),
                        ]),
                    ),
                    tail("call", "function", field("arguments", sym("argument_list"))),
                ],
            ),
        )
        .rule(
            "slice",
            seq([
                opt(sym("_expression")),
                lit(":"),
                opt(sym("_expression")),
                opt(seq([lit(":"), opt(sym("_expression"))])),
            ]),
        )
        .rule(
            "_atom",
            choice([
                sym("identifier"),
                sym("string"),
                sym("integer"),
                sym("float"),
                alias(lit("True"), "true"),
                alias(lit("False"), "false"),
                alias(lit("None"), "none"),
                alias(lit("..."), "ellipsis"),
                sym("list"),
                sym("dictionary"),
                sym("set"),
                sym("parenthesized_expression"),
                sym("tuple"),
            ]),
        )
        .rule(
            "list",
            seq([lit("["), comma_list(sym("_collection_item")), lit("]")]),
        )
        .rule(
            "dictionary",
            seq([
                lit("{"),
                comma_list(choice([sym("pair"), sym("dictionary_splat")])),
                lit("}"),
            ]),
        )
        .rule(
            "set",
            seq([
                lit("{"),
                Expr::sep1_trailing(sym("_collection_item"), ","),
                lit("}"),
            ]),
        )
        .rule(
            "pair",
            seq([
                field("key", sym("_expression")),
                lit(":"),
                field("value", sym("_expression")),
            ]),
        )
        .rule(
            "parenthesized_expression",
            seq([lit("("), sym("_expression"), lit(")")]),
        )
        .rule(
            "tuple",
            seq([
                lit("("),
                opt(seq([
                    sym("_collection_item"),
                    lit(","),
                    comma_list(sym("_collection_item")),
                ])),
                lit(")"),
            ]),
        )
        .rule(
            "_collection_item",
            choice([sym("list_splat"), sym("_expression")]),
        )
        .rule(
            "argument_list",
            seq([
                lit("("),
                comma_list(choice([
                    sym("keyword_argument"),
                    sym("list_splat"),
                    sym("dictionary_splat"),
                    sym("_expression"),
                ])),
                lit(")"),
            ]),
        )
        .rule(
            "keyword_argument",
            seq([
                field("name", sym("identifier")),
                lit("="),
                field("value", sym("_expression")),
            ]),
        )
        .rule("list_splat", seq([lit("*"), sym("_expression")]))
        .rule("dictionary_splat", seq([lit("**"), sym("_expression")]))
        .rule(
            "parameters",
            seq([lit("("), comma_list(sym("_parameter")), lit(")")]),
        )
        .rule(
            "_parameter",
            choice([
                sym("typed_default_parameter"),
                sym("default_parameter"),
                sym("typed_parameter"),
                sym("list_splat_pattern"),
                sym("dictionary_splat_pattern"),
                sym("identifier"),
            ]),
        )
        .rule(
            "typed_default_parameter",
            seq([
                field("name", sym("identifier")),
                lit(":"),
                field("type", sym("type")),
                lit("="),
                field("value", sym("_expression")),
            ]),
        )
        .rule(
            "default_parameter",
            seq([
                field("name", sym("identifier")),
                lit("="),
                field("value", sym("_expression")),
            ]),
        )
        .rule(
            "typed_parameter",
            seq([sym("identifier"), lit(":"), field("type", sym("type"))]),
        )
        .rule("list_splat_pattern", seq([lit("*"), sym("identifier")]))
        .rule("dictionary_splat_pattern", seq([lit("**"), sym("identifier")]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::syntax::SyntaxTree;
    use std::sync::Arc;

    fn parse(text: &str) -> SyntaxTree {
        let grammar = Arc::new(grammar().unwrap());
        Parser::new().parse(&grammar, text).unwrap()
    }

    fn sexp(text: &str) -> String {
        let tree = parse(text);
        assert!(!tree.has_error(), "{}", tree.root().to_sexp());
        tree.root().to_sexp()
    }

    #[test]
    fn test_grammar_builds() {
        let grammar = grammar().unwrap();
        assert_eq!(grammar.name(), "python");
        assert_eq!(grammar.symbol_name(grammar.entry()), "module");
        assert!(grammar.layout().is_some());
    }

    #[test]
    fn test_assignment() {
        assert_eq!(
            sexp("x = 1"),
            "(module (expression_statement (assignment left: (identifier) right: (integer))))"
        );
    }

    #[test]
    fn test_backslash_continuation() {
        assert_eq!(
            sexp("x = 1 + \\\n    2\ny = 3\n"),
            "(module (expression_statement (assignment left: (identifier) \
             right: (binary_operator left: (integer) right: (integer)))) \
             (expression_statement (assignment left: (identifier) right: (integer))))"
        );
        assert_eq!(
            sexp("if a and \\\r\n        b:\n    pass\n"),
            "(module (if_statement condition: (boolean_operator left: (identifier) right: (identifier)) \
             consequence: (block (pass_statement))))"
        );
    }

    #[test]
    fn test_backslash_in_comment_ends_line() {
        let tree = parse("x = 1  # \\\ny = 2\n");
        assert!(!tree.has_error());
        let root = tree.root();
        let statements = root
            .children()
            .filter(|child| child.kind() == "expression_statement")
            .count();
        assert_eq!(statements, 2);
        assert!(tree.preorder().any(|visit| visit.node.kind() == "comment"));
    }

    #[test]
    fn test_sample_function() {
        assert_eq!(
            sexp(SAMPLE),
            "(module (function_definition name: (identifier) parameters: (parameters) \
             body: (block (expression_statement (call function: (identifier) \
             arguments: (argument_list (string)))))))"
        );
    }

    #[test]
    fn test_inline_suite_is_a_block() {
        assert_eq!(
            sexp("def f(): return 1\n"),
            "(module (function_definition name: (identifier) parameters: (parameters) \
             body: (block (return_statement (integer)))))"
        );
    }

    #[test]
    fn test_if_elif_else() {
        let text = "if a:\n    b\nelif c:\n    d\nelse:\n    e\n";
        assert_eq!(
            sexp(text),
            "(module (if_statement condition: (identifier) \
             consequence: (block (expression_statement (identifier))) \
             alternative: (elif_clause condition: (identifier) \
             consequence: (block (expression_statement (identifier)))) \
             alternative: (else_clause body: (block (expression_statement (identifier))))))"
        );
    }

    #[test]
    fn test_nested_blocks_and_dedent() {
        let text = "class A:\n    def f(self):\n        return self.x\n\n    y = 2\nz = 3\n";
        let tree = parse(text);
        assert!(!tree.has_error());
        let root = tree.root();
        assert_eq!(root.named_child_count(), 2);
        let class = root.child(0).unwrap();
        assert_eq!(class.kind(), "class_definition");
        let body = class.child_by_field_name("body").unwrap();
        let kinds: Vec<_> = body.children().map(|child| child.kind()).collect();
        assert_eq!(kinds, ["function_definition", "expression_statement"]);
        assert_eq!(root.child(1).unwrap().text(), "z = 3");
    }

    #[test]
    fn test_operator_precedence() {
        assert_eq!(
            sexp("a + b * c ** -d"),
            "(module (expression_statement (binary_operator left: (identifier) \
             right: (binary_operator left: (identifier) right: (binary_operator \
             left: (identifier) right: (unary_operator argument: (identifier)))))))"
        );
    }

    #[test]
    fn test_comparison_and_boolean() {
        assert_eq!(
            sexp("a not in b and not c"),
            "(module (expression_statement (boolean_operator \
             left: (comparison_operator (identifier) (identifier)) \
             right: (not_operator argument: (identifier)))))"
        );
    }

    #[test]
    fn test_for_loop_target_is_not_a_comparison() {
        let tree = parse("for i, x in pairs:\n    pass\n");
        assert!(!tree.has_error());
        let statement = tree.root().child(0).unwrap();
        assert_eq!(statement.kind(), "for_statement");
        assert_eq!(statement.child_by_field_name("left").unwrap().kind(), "pattern_list");
        assert_eq!(statement.child_by_field_name("right").unwrap().text(), "pairs");
    }

    #[test]
    fn test_brackets_span_lines() {
        let tree = parse("total = f(1,\n          2)\nprint(total)\n");
        assert!(!tree.has_error());
        assert_eq!(tree.root().named_child_count(), 2);
    }

    #[test]
    fn test_collections_and_literals() {
        assert_eq!(
            sexp("x = [1, 2.5, 'a', None, {1: True}, (), (1,)]"),
            "(module (expression_statement (assignment left: (identifier) right: (list \
             (integer) (float) (string) (none) (dictionary (pair key: (integer) value: (true))) \
             (tuple) (tuple (integer))))))"
        );
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let text = "# header\n\ndef f():\n    # inside\n\n    return 1\n";
        let tree = parse(text);
        assert!(!tree.has_error());
        let function = tree.root().child(1).unwrap();
        assert_eq!(function.kind(), "function_definition");
        assert!(function.children().any(|child| child.kind() == "comment"));
        let body = function.child_by_field_name("body").unwrap();
        assert_eq!(body.child(0).unwrap().kind(), "return_statement");
    }

    #[test]
    fn test_triple_quoted_string() {
        let tree = parse("doc = \"\"\"one\ntwo\"\"\"\n");
        assert!(!tree.has_error());
        let string = tree.root().child(0).unwrap().child(0).unwrap().child_by_field_name("right");
        assert_eq!(string.unwrap().text(), "\"\"\"one\ntwo\"\"\"");
    }

    #[test]
    fn test_malformed_definition_recovers() {
        let tree = parse("def (:");
        assert!(tree.has_error());
        assert_eq!(tree.root().kind(), "module");
        assert_eq!(tree.root().range().len().to_usize(), 6);
    }
}
