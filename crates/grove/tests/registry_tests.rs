//! Tests for grammar lookup and one-time construction

use grove::error::{Error, GrammarError};
use grove::grammar::{Expr, GrammarBuilder};
use grove::lexer::{CharSet, Pattern};
use grove::{Grammar, GrammarRegistry, TableSource};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn words() -> GrammarBuilder {
    GrammarBuilder::new("words")
        .token("word", Pattern::many1(Pattern::class(CharSet::alpha())))
        .extra("_whitespace", Pattern::many1(Pattern::class(CharSet::whitespace())))
        .rule("text", Expr::items(Expr::sym("word"), []))
}

#[test]
fn test_builtin_grammars_load_and_are_cached() {
    let registry = GrammarRegistry::global();
    for name in ["python", "cpp", "javascript"] {
        let first = registry.load(name).unwrap();
        let second = registry.load(name).unwrap();
        assert!(Arc::ptr_eq(&first, &second), "{name}");
        assert_eq!(first.name(), name);
        assert!(registry.is_loaded(name));
    }
    assert_eq!(registry.names(), ["cpp", "javascript", "python"]);
}

#[test]
fn test_unknown_language_leaves_registry_unchanged() {
    let registry = GrammarRegistry::with_builtin();
    let names_before = registry.names();

    let err = registry.load("ruby").unwrap_err();
    assert!(matches!(err, Error::GrammarNotFound { ref name } if name == "ruby"));
    assert_eq!(err.to_string(), "no grammar registered under 'ruby'");

    assert_eq!(registry.names(), names_before);
    assert!(!registry.is_registered("ruby"));
    assert!(!registry.is_loaded("ruby"));
    for name in &names_before {
        assert!(!registry.is_loaded(name));
    }
}

#[test]
fn test_concurrent_first_loads_build_once() {
    static BUILDS: AtomicUsize = AtomicUsize::new(0);

    let registry = GrammarRegistry::new();
    registry.register("words", || {
        BUILDS.fetch_add(1, Ordering::SeqCst);
        words().build()
    });

    let grammars: Vec<Arc<Grammar>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| registry.load("words").unwrap()))
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
    assert!(grammars.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
}

#[test]
fn test_json_table_source() {
    let json = words().to_table().to_json().unwrap();
    let registry = GrammarRegistry::new();
    registry.register("words", TableSource::new(json));

    let grammar = registry.load("words").unwrap();
    assert_eq!(grammar.symbol_name(grammar.entry()), "text");
    let tree = grove::Parser::new().parse(&grammar, "hello tree").unwrap();
    assert_eq!(tree.root().child_count(), 2);
}

#[test]
fn test_malformed_table_is_a_load_error() {
    let registry = GrammarRegistry::new();
    registry.register("broken", TableSource::new(b"{\"name\": \"broken\", \"rules\": [".to_vec()));

    let err = registry.load("broken").unwrap_err();
    match err {
        Error::GrammarLoad { name, source } => {
            assert_eq!(name, "broken");
            assert!(matches!(source, GrammarError::MalformedTable(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(registry.is_registered("broken"));
    assert!(!registry.is_loaded("broken"));
}

#[test]
fn test_invalid_table_reports_grammar_error() {
    let table = GrammarBuilder::new("bad")
        .rule("start", Expr::sym("missing"))
        .to_table();
    let registry = GrammarRegistry::new();
    registry.register("bad", TableSource::new(table.to_json().unwrap()));

    let err = registry.load("bad").unwrap_err();
    assert!(matches!(
        err,
        Error::GrammarLoad {
            source: GrammarError::UndefinedSymbol { .. },
            ..
        }
    ));
}
