//! C++ grammar.
//!
//! Functions, declarations, namespaces and the usual statements and
//! expressions. Templates, classes and the preprocessor are not covered.

use super::dsl::{
    alias, binary, choice, comma_list, comma_sep, comma_sep1, field, lit, lits, opt, seq, star,
    sym, tail, Expr,
};
use crate::error::GrammarError;
use crate::grammar::{Grammar, GrammarBuilder};
use crate::lexer::{CharSet, Pattern};

/// Demo program
pub const SAMPLE: &str =
    "int main() {\n  std::cout << \"Hello, C++!\" << std::endl;\n  return 0;\n}";

const PRIMITIVE_TYPES: &[&str] = &[
    "bool", "char", "char16_t", "char32_t", "double", "float", "int", "long", "short", "signed",
    "unsigned", "void", "size_t", "auto", "wchar_t",
];

const ASSIGNMENT_OPERATORS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "%=", "<<=", ">>=", "&=", "^=", "|=",
];

/// Build the C++ grammar.
///
/// # Errors
///
/// Only fails if the definition itself is inconsistent.
pub fn grammar() -> Result<Grammar, GrammarError> {
    let builder = GrammarBuilder::new("cpp")
        .token(
            "primitive_type",
            Pattern::choice(PRIMITIVE_TYPES.iter().map(|name| Pattern::literal(name))),
        )
        .token("identifier", super::identifier(""))
        .token(
            "number_literal",
            Pattern::seq([
                Pattern::choice([super::hex_number("'"), super::decimal_number("'")]),
                Pattern::many(Pattern::class(CharSet::chars("uUlLfF"))),
            ]),
        )
        .token(
            "string_literal",
            Pattern::seq([
                Pattern::optional(Pattern::choice([
                    Pattern::literal("u8"),
                    Pattern::class(CharSet::chars("LuU")),
                ])),
                super::quoted('"'),
            ]),
        )
        .token(
            "char_literal",
            Pattern::seq([
                Pattern::optional(Pattern::class(CharSet::chars("LuU"))),
                super::quoted('\''),
            ]),
        )
        .extra(
            "comment",
            Pattern::choice([super::line_comment("//"), super::block_comment()]),
        )
        .extra("_whitespace", super::whitespace())
        .word("identifier");

    let builder = declarations(builder);
    let builder = statements(builder);
    let builder = expressions(builder);
    builder.build()
}

fn namespace_identifier() -> Expr {
    alias(sym("identifier"), "namespace_identifier")
}

fn declarations(builder: GrammarBuilder) -> GrammarBuilder {
    builder
        .rule("translation_unit", Expr::items(sym("_top_level_item"), []))
        .rule(
            "_top_level_item",
            choice([
                sym("function_definition"),
                sym("namespace_definition"),
                sym("using_declaration"),
                sym("declaration"),
                sym("_statement"),
            ]),
        )
        .rule(
            "function_definition",
            seq([
                star(sym("type_qualifier")),
                field("type", sym("_type_specifier")),
                field("declarator", sym("_declarator")),
                field("body", sym("compound_statement")),
            ]),
        )
        .rule(
            "declaration",
            seq([
                star(sym("type_qualifier")),
                field("type", sym("_type_specifier")),
                comma_sep1(field(
                    "declarator",
                    choice([sym("init_declarator"), sym("_declarator")]),
                )),
                lit(";"),
            ]),
        )
        .rule(
            "namespace_definition",
            seq([
                lit("namespace"),
                opt(field("name", namespace_identifier())),
                field("body", sym("declaration_list")),
            ]),
        )
        .rule(
            "declaration_list",
            seq([
                lit("{"),
                Expr::items(sym("_top_level_item"), [lit("}")]),
                lit("}"),
            ]),
        )
        .rule(
            "using_declaration",
            seq([
                lit("using"),
                opt(lit("namespace")),
                choice([sym("qualified_identifier"), sym("identifier")]),
                lit(";"),
            ]),
        )
        .rule(
            "type_qualifier",
            lits(&["const", "constexpr", "volatile", "static", "inline", "extern"]),
        )
        .rule(
            "_type_specifier",
            choice([
                sym("primitive_type"),
                alias(sym("qualified_type"), "qualified_identifier"),
                alias(sym("identifier"), "type_identifier"),
            ]),
        )
        .rule(
            "qualified_type",
            seq([
                field("scope", namespace_identifier()),
                lit("::"),
                field(
                    "name",
                    choice([
                        alias(sym("qualified_type"), "qualified_identifier"),
                        alias(sym("identifier"), "type_identifier"),
                    ]),
                ),
            ]),
        )
        .rule(
            "_declarator",
            choice([
                sym("pointer_declarator"),
                sym("reference_declarator"),
                sym("function_declarator"),
                sym("array_declarator"),
                sym("qualified_identifier"),
                sym("identifier"),
            ]),
        )
        .rule(
            "pointer_declarator",
            seq([
                lit("*"),
                star(sym("type_qualifier")),
                field("declarator", sym("_declarator")),
            ]),
        )
        .rule(
            "reference_declarator",
            seq([lits(&["&", "&&"]), sym("_declarator")]),
        )
        .rule(
            "function_declarator",
            seq([
                field(
                    "declarator",
                    choice([sym("qualified_identifier"), sym("identifier")]),
                ),
                field("parameters", sym("parameter_list")),
                star(sym("type_qualifier")),
            ]),
        )
        .rule(
            "array_declarator",
            seq([
                field("declarator", sym("identifier")),
                lit("["),
                opt(field("size", sym("_expression"))),
                lit("]"),
            ]),
        )
        .rule(
            "init_declarator",
            seq([
                field("declarator", sym("_declarator")),
                choice([
                    seq([
                        lit("="),
                        field(
                            "value",
                            choice([sym("initializer_list"), sym("_expression")]),
                        ),
                    ]),
                    field(
                        "value",
                        choice([sym("argument_list"), sym("initializer_list")]),
                    ),
                ]),
            ]),
        )
        .rule(
            "initializer_list",
            seq([lit("{"), comma_list(sym("_expression")), lit("}")]),
        )
        .rule(
            "parameter_list",
            seq([
                lit("("),
                comma_sep(choice([
                    sym("optional_parameter_declaration"),
                    sym("parameter_declaration"),
                ])),
                lit(")"),
            ]),
        )
        .rule(
            "parameter_declaration",
            seq([
                star(sym("type_qualifier")),
                field("type", sym("_type_specifier")),
                opt(field("declarator", sym("_declarator"))),
            ]),
        )
        .rule(
            "optional_parameter_declaration",
            seq([
                star(sym("type_qualifier")),
                field("type", sym("_type_specifier")),
                field("declarator", sym("_declarator")),
                lit("="),
                field("default_value", sym("_expression")),
            ]),
        )
}

fn statements(builder: GrammarBuilder) -> GrammarBuilder {
    builder
        .rule(
            "compound_statement",
            seq([
                lit("{"),
                Expr::items(sym("_block_item"), [lit("}")]),
                lit("}"),
            ]),
        )
        .rule("_block_item", choice([sym("declaration"), sym("_statement")]))
        .rule(
            "_statement",
            choice([
                sym("compound_statement"),
                sym("return_statement"),
                sym("if_statement"),
                sym("while_statement"),
                sym("do_statement"),
                sym("for_statement"),
                sym("break_statement"),
                sym("continue_statement"),
                sym("expression_statement"),
            ]),
        )
        .rule(
            "return_statement",
            seq([lit("return"), opt(sym("_expressions")), lit(";")]),
        )
        .rule(
            "expression_statement",
            seq([opt(sym("_expressions")), lit(";")]),
        )
        .rule(
            "if_statement",
            seq([
                lit("if"),
                field("condition", sym("condition_clause")),
                field("consequence", sym("_statement")),
                opt(field("alternative", sym("else_clause"))),
            ]),
        )
        .rule("else_clause", seq([lit("else"), sym("_statement")]))
        .rule(
            "condition_clause",
            seq([lit("("), field("value", sym("_expressions")), lit(")")]),
        )
        .rule(
            "while_statement",
            seq([
                lit("while"),
                field("condition", sym("condition_clause")),
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
                lit(";"),
            ]),
        )
        .rule(
            "for_statement",
            seq([
                lit("for"),
                lit("("),
                choice([
                    field("initializer", sym("declaration")),
                    seq([opt(field("initializer", sym("_expressions"))), lit(";")]),
                ]),
                opt(field("condition", sym("_expressions"))),
                lit(";"),
                opt(field("update", sym("_expressions"))),
                lit(")"),
                field("body", sym("_statement")),
            ]),
        )
        .rule("break_statement", seq([lit("break"), lit(";")]))
        .rule("continue_statement", seq([lit("continue"), lit(";")]))
}

fn expressions(builder: GrammarBuilder) -> GrammarBuilder {
    builder
        .rule(
            "_expressions",
            choice([sym("comma_expression"), sym("_expression")]),
        )
        .rule(
            "comma_expression",
            seq([
                field("left", sym("_expression")),
                lit(","),
                field("right", sym("_expressions")),
            ]),
        )
        .rule(
            "_expression",
            choice([
                sym("assignment_expression"),
                sym("conditional_expression"),
                sym("_logical_or"),
            ]),
        )
        .rule(
            "assignment_expression",
            seq([
                field("left", sym("_unary")),
                field("operator", lits(ASSIGNMENT_OPERATORS)),
                field("right", sym("_expression")),
            ]),
        )
        .rule(
            "conditional_expression",
            seq([
                field("condition", sym("_logical_or")),
                lit("?"),
                field("consequence", sym("_expression")),
                lit(":"),
                field("alternative", sym("_expression")),
            ]),
        )
        .rule("_logical_or", binary("binary_expression", "_logical_and", &["||"]))
        .rule("_logical_and", binary("binary_expression", "_bitwise_or", &["&&"]))
        .rule("_bitwise_or", binary("binary_expression", "_bitwise_xor", &["|"]))
        .rule("_bitwise_xor", binary("binary_expression", "_bitwise_and", &["^"]))
        .rule("_bitwise_and", binary("binary_expression", "_equality", &["&"]))
        .rule("_equality", binary("binary_expression", "_relational", &["==", "!="]))
        .rule(
            "_relational",
            binary("binary_expression", "_shift", &["<", ">", "<=", ">="]),
        )
        .rule("_shift", binary("binary_expression", "_additive", &["<<", ">>"]))
        .rule("_additive", binary("binary_expression", "_multiplicative", &["+", "-"]))
        .rule(
            "_multiplicative",
            binary("binary_expression", "_unary", &["*", "/", "%"]),
        )
        .rule(
            "_unary",
            choice([
                sym("unary_expression"),
                sym("pointer_expression"),
                sym("update_expression"),
                sym("sizeof_expression"),
                sym("_postfix"),
            ]),
        )
        .rule(
            "unary_expression",
            seq([
                field("operator", lits(&["!", "~", "-", "+"])),
                field("argument", sym("_unary")),
            ]),
        )
        .rule(
            "pointer_expression",
            seq([
                field("operator", lits(&["*", "&"])),
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
        .rule(
            "sizeof_expression",
            seq([
                lit("sizeof"),
                choice([
                    seq([lit("("), field("type", sym("_type_specifier")), lit(")")]),
                    field("value", sym("_unary")),
                ]),
            ]),
        )
        .rule(
            "_postfix",
            Expr::left_fold(
                sym("_primary"),
                [
                    tail("call_expression", "function", field("arguments", sym("argument_list"))),
                    tail(
                        "field_expression",
                        "argument",
                        seq([
                            field("operator", lits(&[".", "->"])),
                            field("field", alias(sym("identifier"), "field_identifier")),
                        ]),
                    ),
                    tail(
                        "subscript_expression",
                        "argument",
                        seq([lit("["), field("index", sym("_expressions")), lit("]")]),
                    ),
                    tail("update_expression", "argument", field("operator", lits(&["++", "--"]))),
                ],
            ),
        )
        .rule(
            "_primary",
            choice([
                sym("qualified_identifier"),
                sym("identifier"),
                sym("number_literal"),
                sym("string_literal"),
                sym("char_literal"),
                alias(lit("true"), "true"),
                alias(lit("false"), "false"),
                alias(lit("nullptr"), "null"),
                alias(lit("this"), "this"),
                sym("parenthesized_expression"),
            ]),
        )
        .rule(
            "qualified_identifier",
            seq([
                field("scope", namespace_identifier()),
                lit("::"),
                field(
                    "name",
                    choice([sym("qualified_identifier"), sym("identifier")]),
                ),
            ]),
        )
        .rule(
            "parenthesized_expression",
            seq([lit("("), sym("_expressions"), lit(")")]),
        )
        .rule(
            "argument_list",
            seq([lit("("), comma_sep(sym("_expression")), lit(")")]),
        )
}
