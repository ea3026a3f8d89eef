//! Lexer tests against the bundled grammars

use grove::lexer::{CharSet, LexerBuilder, Pattern, Token, apply_layout};
use grove::syntax::{Symbol, TextRange, TextSize};
use grove::{Grammar, GrammarRegistry, Parser};
use std::sync::Arc;

fn grammar(language: &str) -> Arc<Grammar> {
    GrammarRegistry::global().load(language).unwrap()
}

/// Names of the significant tokens of `code`
fn kinds(grammar: &Grammar, code: &str) -> Vec<String> {
    grammar
        .lexer()
        .tokenize(code)
        .tokens
        .iter()
        .filter(|token| !token.extra)
        .map(|token| grammar.symbol_name(token.kind).to_string())
        .collect()
}

#[test]
fn test_longest_operator_wins() {
    let python = grammar("python");
    assert_eq!(
        kinds(&python, "a==b**2<=c"),
        ["identifier", "==", "identifier", "**", "integer", "<=", "identifier"]
    );
    assert_eq!(kinds(&python, "x = -1.5e3"), ["identifier", "=", "-", "float"]);
    assert_eq!(kinds(&python, "0x1F 1_000 .5"), ["integer", "integer", "float"]);

    let cpp = grammar("cpp");
    assert_eq!(
        kinds(&cpp, "a <<= b << c"),
        ["identifier", "<<=", "identifier", "<<", "identifier"]
    );
    assert_eq!(kinds(&cpp, "i++ + 1.5f"), ["identifier", "++", "+", "number_literal"]);
}

#[test]
fn test_keywords_are_retagged() {
    let python = grammar("python");
    let output = python.lexer().tokenize("def define elif _if");
    let significant: Vec<&Token> = output.tokens.iter().filter(|token| !token.extra).collect();

    assert_eq!(significant[0].kind, python.literal("def").unwrap());
    assert_eq!(significant[1].kind, python.symbol("identifier").unwrap());
    assert_eq!(significant[2].kind, python.literal("elif").unwrap());
    assert_eq!(significant[3].kind, python.symbol("identifier").unwrap());
    assert!(python.lexer().keyword_count() > 20);

    let cpp = grammar("cpp");
    assert_eq!(kinds(&cpp, "int integer"), ["primitive_type", "identifier"]);
}

#[test]
fn test_strings_and_comments() {
    let python = grammar("python");
    assert_eq!(
        kinds(&python, "s = '''a\nb''' # done"),
        ["identifier", "=", "string"]
    );
    let output = python.lexer().tokenize("x # note");
    let comment = output.tokens.last().unwrap();
    assert_eq!(python.symbol_name(comment.kind), "comment");
    assert!(comment.extra);

    let cpp = grammar("cpp");
    assert_eq!(
        kinds(&cpp, "u8\"x\" L'c' /* a */ // b"),
        ["string_literal", "char_literal"]
    );

    let javascript = grammar("javascript");
    assert_eq!(
        kinds(&javascript, "`a ${b}` 'c' \"d\" 10n"),
        ["template_string", "string", "string", "number"]
    );
}

#[test]
fn test_unmatched_characters_become_errors() {
    let cpp = grammar("cpp");
    let output = cpp.lexer().tokenize("int x = @;");
    assert_eq!(output.errors.len(), 1);
    assert_eq!(
        output.errors[0].span,
        TextRange::new(TextSize::from(8), TextSize::from(9))
    );
    assert_eq!(output.errors[0].to_string(), "Unexpected character: '@'");

    let error = output
        .tokens
        .iter()
        .find(|token| token.kind == Symbol::ERROR)
        .unwrap();
    assert_eq!(error.text, "@");

    let tree = Parser::new().parse(&cpp, "int x = @;").unwrap();
    assert_eq!(tree.lexer_errors().len(), 1);
    assert_eq!(tree.metrics().lexer_errors, 1);
    assert!(tree.has_error());
    assert_eq!(tree.root().range().len(), TextSize::from(10));
}

#[test]
fn test_python_layout_tokens() {
    let python = grammar("python");
    let code = "if x:\n    y\nz\n";
    let tokens = python.lexer().tokenize(code).tokens;
    let layout = python.layout().unwrap();
    let names: Vec<&str> = apply_layout(tokens, code, layout)
        .iter()
        .filter(|token| !token.extra)
        .map(|token| python.symbol_name(token.kind))
        .collect();
    assert_eq!(
        names,
        [
            "if", "identifier", ":", "_newline", "_indent", "identifier", "_newline", "_dedent",
            "identifier", "_newline",
        ]
    );
}

#[test]
fn test_layout_ignores_bracketed_line_breaks() {
    let python = grammar("python");
    let code = "f(a,\n  b)\n";
    let tokens = python.lexer().tokenize(code).tokens;
    let layout = python.layout().unwrap();
    let newlines = apply_layout(tokens, code, layout)
        .iter()
        .filter(|token| token.kind == layout.newline)
        .count();
    assert_eq!(newlines, 1);
    assert!(grammar("cpp").layout().is_none());
}

#[test]
fn test_backslash_continues_python_lines() {
    let python = grammar("python");
    let code = "total = a + \\\n        b\nprint(total)\n";
    let lexed = python.lexer().tokenize(code);
    assert!(lexed.errors.is_empty());
    assert!(
        lexed
            .tokens
            .iter()
            .any(|token| token.extra && python.symbol_name(token.kind) == "_line_continuation")
    );

    let layout = python.layout().unwrap();
    let names: Vec<&str> = apply_layout(lexed.tokens, code, layout)
        .iter()
        .filter(|token| !token.extra)
        .map(|token| python.symbol_name(token.kind))
        .collect();
    assert_eq!(
        names,
        [
            "identifier", "=", "identifier", "+", "identifier", "_newline", "identifier", "(",
            "identifier", ")", "_newline",
        ]
    );
}

#[test]
fn test_regex_and_dfa_rules_share_priorities() {
    let word = Symbol::from_raw(1);
    let number = Symbol::from_raw(2);
    let space = Symbol::from_raw(3);
    let lexer = LexerBuilder::new()
        .token("number", number, Pattern::regex(r"[0-9]+(\.[0-9]+)?"))
        .token("word", word, Pattern::many1(Pattern::class(CharSet::word())))
        .token("_whitespace", space, Pattern::many1(Pattern::class(CharSet::whitespace())))
        .extra(space)
        .build()
        .unwrap();

    let output = lexer.tokenize("12 12.5 12ab");
    let found: Vec<(Symbol, &str)> = output
        .tokens
        .iter()
        .filter(|token| !token.extra)
        .map(|token| (token.kind, token.text.as_str()))
        .collect();
    // "12" ties between both rules; the regex rule is declared first
    assert_eq!(
        found,
        [(number, "12"), (number, "12.5"), (word, "12ab")]
    );
}
