//! JavaScript grammar.
//!
//! ES2017-style statements and expressions. Semicolons are optional
//! wherever a statement may end. Regex literals, template substitutions,
//! destructuring patterns, generators and modules are not covered.

use super::dsl::{
    alias, binary, choice, comma_list, comma_sep1, field, lit, lits, opt, plus, seq, sym, tail,
    Expr,
};
use crate::error::GrammarError;
use crate::grammar::{Grammar, GrammarBuilder};
use crate::lexer::{CharSet, Pattern};

/// Demo program
pub const SAMPLE: &str = "function hello() {\n  console.log('Hello, JavaScript!');\n}";

const ASSIGNMENT_OPERATORS: &[&str] = &[
    "+=", "-=", "*=", "/=", "%=", "**=", "<<=", ">>=", ">>>=", "&=", "^=", "|=", "&&=", "||=",
    "??=",
];

/// Build the JavaScript grammar.
///
/// # Errors
///
/// Only fails if the definition itself is inconsistent.
pub fn grammar() -> Result<Grammar, GrammarError> {
    let builder = GrammarBuilder::new("javascript")
        .token("identifier", super::identifier("$"))
        .token(
            "number",
            Pattern::seq([
                Pattern::choice([super::hex_number("_"), super::decimal_number("_")]),
                Pattern::optional(Pattern::literal("n")),
            ]),
        )
        .token(
            "string",
            Pattern::choice([super::quoted('\''), super::quoted('"')]),
        )
        .token(
            "template_string",
            Pattern::seq([
                Pattern::literal("`"),
                Pattern::many(Pattern::choice([
                    Pattern::class(CharSet::none_of("`\\")),
                    Pattern::seq([Pattern::literal("\\"), Pattern::Any]),
                ])),
                Pattern::literal("`"),
            ]),
        )
        .extra(
            "comment",
            Pattern::choice([super::line_comment("//"), super::block_comment()]),
        )
        .extra("_whitespace", super::whitespace())
        .word("identifier");

    let builder = statements(builder);
    let builder = expressions(builder);
    builder.build()
}

fn property_identifier() -> Expr {
    alias(sym("identifier"), "property_identifier")
}

fn statements(builder: GrammarBuilder) -> GrammarBuilder {
    builder
        .rule("program", Expr::items(sym("_statement"), []))
        .rule(
            "_statement",
            choice([
                sym("function_declaration"),
                sym("class_declaration"),
                sym("lexical_declaration"),
                sym("variable_declaration"),
                sym("statement_block"),
                sym("if_statement"),
                sym("for_in_statement"),
                sym("for_statement"),
                sym("while_statement"),
                sym("do_statement"),
                sym("try_statement"),
                sym("return_statement"),
                sym("throw_statement"),
                sym("break_statement"),
                sym("continue_statement"),
                sym("empty_statement"),
                sym("expression_statement"),
            ]),
        )
        .rule("_semicolon", opt(lit(";")))
        .rule(
            "function_declaration",
            seq([
                opt(lit("async")),
                lit("function"),
                field("name", sym("identifier")),
                field("parameters", sym("formal_parameters")),
                field("body", sym("statement_block")),
            ]),
        )
        .rule(
            "class_declaration",
            seq([
                lit("class"),
                field("name", sym("identifier")),
                opt(sym("class_heritage")),
                field("body", sym("class_body")),
            ]),
        )
        .rule("class_heritage", seq([lit("extends"), sym("_expression")]))
        .rule(
            "class_body",
            seq([
                lit("{"),
                Expr::items(
                    choice([sym("method_definition"), sym("field_definition"), lit(";")]),
                    [lit("}")],
                ),
                lit("}"),
            ]),
        )
        .rule(
            "method_definition",
            seq([
                opt(lit("static")),
                opt(lit("async")),
                field("name", property_identifier()),
                field("parameters", sym("formal_parameters")),
                field("body", sym("statement_block")),
            ]),
        )
        .rule(
            "field_definition",
            seq([
                opt(lit("static")),
                field("property", property_identifier()),
                opt(seq([lit("="), field("value", sym("_expression"))])),
                sym("_semicolon"),
            ]),
        )
        .rule(
            "formal_parameters",
            seq([
                lit("("),
                comma_list(choice([
                    sym("assignment_pattern"),
                    sym("rest_pattern"),
                    sym("identifier"),
                ])),
                lit(")"),
            ]),
        )
        .rule(
            "assignment_pattern",
            seq([
                field("left", sym("identifier")),
                lit("="),
                field("right", sym("_expression")),
            ]),
        )
        .rule("rest_pattern", seq([lit("..."), sym("identifier")]))
        .rule(
            "statement_block",
            seq([
                lit("{"),
                Expr::items(sym("_statement"), [lit("}")]),
                lit("}"),
            ]),
        )
        .rule(
            "lexical_declaration",
            seq([
                field("kind", lits(&["let", "const"])),
                comma_sep1(sym("variable_declarator")),
                sym("_semicolon"),
            ]),
        )
        .rule(
            "variable_declaration",
            seq([
                lit("var"),
                comma_sep1(sym("variable_declarator")),
                sym("_semicolon"),
            ]),
        )
        .rule(
            "variable_declarator",
            seq([
                field("name", sym("identifier")),
                opt(seq([lit("="), field("value", sym("_expression"))])),
            ]),
        )
        .rule(
            "if_statement",
            seq([
                lit("if"),
                field("condition", sym("parenthesized_expression")),
                field("consequence", sym("_statement")),
                opt(field("alternative", sym("else_clause"))),
            ]),
        )
        .rule("else_clause", seq([lit("else"), sym("_statement")]))
        .rule(
            "for_statement",
            seq([
                lit("for"),
                lit("("),
                field(
                    "initializer",
                    choice([
                        sym("lexical_declaration"),
                        sym("variable_declaration"),
                        sym("expression_statement"),
                        sym("empty_statement"),
                    ]),
                ),
                field(
                    "condition",
                    choice([sym("expression_statement"), sym("empty_statement")]),
                ),
                opt(field("increment", sym("_expressions"))),
                lit(")"),
                field("body", sym("_statement")),
            ]),
        )
        .rule(
            "for_in_statement",
            seq([
                lit("for"),
                lit("("),
                opt(field("kind", lits(&["let", "const", "var"]))),
                field("left", sym("identifier")),
                field("operator", lits(&["in", "of"])),
                field("right", sym("_expressions")),
                lit(")"),
                field("body", sym("_statement")),
            ]),
        )
        .rule(
            "while_statement",
            seq([
                lit("while"),
                field("condition", sym("parenthesized_expression")),
                field("body", sym("_statement")),
            ]),
        )
        .rule(
            "do_statement",
            seq([
                lit("do"),
                field("body", sym("_statement")),
                lit("while"),
                field("condition", sym("parenthesized_expression")),
                sym("_semicolon"),
            ]),
        )
        .rule(
            "try_statement",
            seq([
                lit("try"),
                field("body", sym("statement_block")),
                opt(field("handler", sym("catch_clause"))),
                opt(field("finalizer", sym("finally_clause"))),
            ]),
        )
        .rule(
            "catch_clause",
            seq([
                lit("catch"),
                opt(seq([lit("("), field("parameter", sym("identifier")), lit(")")])),
                field("body", sym("statement_block")),
            ]),
        )
        .rule(
            "finally_clause",
            seq([lit("finally"), field("body", sym("statement_block"))]),
        )
        .rule(
            "return_statement",
            seq([lit("return"), opt(sym("_expressions")), sym("_semicolon")]),
        )
        .rule(
            "throw_statement",
            seq([lit("throw"), sym("_expressions"), sym("_semicolon")]),
        )
        .rule(
            "break_statement",
            seq([
                lit("break"),
                opt(field("label", alias(sym("identifier"), "statement_identifier"))),
                sym("_semicolon"),
            ]),
        )
        .rule(
            "continue_statement",
            seq([
                lit("continue"),
                opt(field("label", alias(sym("identifier"), "statement_identifier"))),
                sym("_semicolon"),
            ]),
        )
        .rule("empty_statement", lit(";"))
        .rule(
            "expression_statement",
            seq([sym("_expressions"), sym("_semicolon")]),
        )
}

fn expressions(builder: GrammarBuilder) -> GrammarBuilder {
    builder
        .rule(
            "_expressions",
            choice([sym("sequence_expression"), sym("_expression")]),
        )
        .rule(
            "sequence_expression",
            seq([
                sym("_expression"),
                plus(seq([lit(","), sym("_expression")])),
            ]),
        )
        .rule(
            "_expression",
            choice([
                sym("arrow_function"),
                sym("assignment_expression"),
                sym("augmented_assignment_expression"),
                sym("ternary_expression"),
                sym("_nullish"),
            ]),
        )
        .rule(
            "arrow_function",
            seq([
                opt(lit("async")),
                choice([
                    field("parameter", sym("identifier")),
                    field("parameters", sym("formal_parameters")),
                ]),
                lit("=>"),
                field("body", choice([sym("statement_block"), sym("_expression")])),
            ]),
        )
        .rule(
            "assignment_expression",
            seq([
                field("left", sym("_postfix")),
                lit("="),
                field("right", sym("_expression")),
            ]),
        )
        .rule(
            "augmented_assignment_expression",
            seq([
                field("left", sym("_postfix")),
                field("operator", lits(ASSIGNMENT_OPERATORS)),
                field("right", sym("_expression")),
            ]),
        )
        .rule(
            "ternary_expression",
            seq([
                field("condition", sym("_nullish")),
                lit("?"),
                field("consequence", sym("_expression")),
                lit(":"),
                field("alternative", sym("_expression")),
            ]),
        )
        .rule("_nullish", binary("binary_expression", "_logical_or", &["??"]))
        .rule("_logical_or", binary("binary_expression", "_logical_and", &["||"]))
        .rule("_logical_and", binary("binary_expression", "_bitwise_or", &["&&"]))
        .rule("_bitwise_or", binary("binary_expression", "_bitwise_xor", &["|"]))
        .rule("_bitwise_xor", binary("binary_expression", "_bitwise_and", &["^"]))
        .rule("_bitwise_and", binary("binary_expression", "_equality", &["&"]))
        .rule(
            "_equality",
            binary("binary_expression", "_relational", &["==", "!=", "===", "!=="]),
        )
        .rule(
            "_relational",
            binary(
                "binary_expression",
                "_shift",
                &["<", ">", "<=", ">=", "instanceof", "in"],
            ),
        )
        .rule(
            "_shift",
            binary("binary_expression", "_additive", &["<<", ">>", ">>>"]),
        )
        .rule("_additive", binary("binary_expression", "_multiplicative", &["+", "-"]))
        .rule(
            "_multiplicative",
            binary("binary_expression", "_exponent", &["*", "/", "%"]),
        )
        .rule("_exponent", binary("binary_expression", "_unary", &["**"]))
        .rule(
            "_unary",
            choice([
                sym("unary_expression"),
                sym("update_expression"),
                sym("await_expression"),
                sym("_postfix"),
            ]),
        )
        .rule(
            "unary_expression",
            seq([
                field(
                    "operator",
                    lits(&["!", "~", "-", "+", "typeof", "void", "delete"]),
                ),
                field("argument", sym("_unary")),
            ]),
        )
        // Prefix form; postfix `i++` is a fold tail producing the same node
        .rule(
            "update_expression",
            seq([
                field("operator", lits(&["++", "--"])),
                field("argument", sym("_unary")),
            ]),
        )
        .rule("await_expression", seq([lit("await"), sym("_unary")]))
        .rule(
            "_postfix",
            Expr::left_fold(
                sym("_primary"),
                [
                    tail(
                        "member_expression",
                        "object",
                        seq([
                            lits(&[".", "?."]),
                            field("property", property_identifier()),
                        ]),
                    ),
                    tail(
                        "subscript_expression",
                        "object",
                        seq([lit("["), field("index", sym("_expressions")), lit("]")]),
                    ),
                    tail("call_expression", "function", field("arguments", sym("arguments"))),
                    tail(
                        "call_expression",
                        "function",
                        field("arguments", sym("template_string")),
                    ),
                    tail("update_expression", "argument", field("operator", lits(&["++", "--"]))),
                ],
            ),
        )
        .rule(
            "_primary",
            choice([
                sym("function_expression"),
                sym("new_expression"),
                sym("identifier"),
                sym("number"),
                sym("string"),
                sym("template_string"),
                alias(lit("true"), "true"),
                alias(lit("false"), "false"),
                alias(lit("null"), "null"),
                alias(lit("this"), "this"),
                alias(lit("super"), "super"),
                sym("parenthesized_expression"),
                sym("array"),
                sym("object"),
            ]),
        )
        .rule(
            "function_expression",
            seq([
                opt(lit("async")),
                lit("function"),
                opt(field("name", sym("identifier"))),
                field("parameters", sym("formal_parameters")),
                field("body", sym("statement_block")),
            ]),
        )
        .rule(
            "new_expression",
            seq([
                lit("new"),
                field("constructor", sym("_constructor")),
                opt(field("arguments", sym("arguments"))),
            ]),
        )
        .rule(
            "_constructor",
            Expr::left_fold(
                sym("_primary"),
                [tail(
                    "member_expression",
                    "object",
                    seq([lit("."), field("property", property_identifier())]),
                )],
            ),
        )
        .rule(
            "parenthesized_expression",
            seq([lit("("), sym("_expressions"), lit(")")]),
        )
        .rule(
            "array",
            seq([
                lit("["),
                comma_list(choice([sym("spread_element"), sym("_expression")])),
                lit("]"),
            ]),
        )
        .rule(
            "object",
            seq([
                lit("{"),
                comma_list(choice([
                    sym("pair"),
                    sym("spread_element"),
                    sym("method_definition"),
                    alias(sym("identifier"), "shorthand_property_identifier"),
                ])),
                lit("}"),
            ]),
        )
        .rule(
            "pair",
            seq([
                field(
                    "key",
                    choice([
                        property_identifier(),
                        sym("string"),
                        sym("number"),
                        sym("computed_property_name"),
                    ]),
                ),
                lit(":"),
                field("value", sym("_expression")),
            ]),
        )
        .rule("computed_property_name", seq([lit("["), sym("_expression"), lit("]")]))
        .rule("spread_element", seq([lit("..."), sym("_expression")]))
        .rule(
            "arguments",
            seq([
                lit("("),
                comma_list(choice([sym("spread_element"), sym("_expression")])),
                lit(")"),
            ]),
        )
}
