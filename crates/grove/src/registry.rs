//! # Grammar Registry
//!
//! Name → grammar lookup with one-time construction per name.
//!
//! A registry maps names to [`GrammarSource`]s. The first successful
//! [`load`](GrammarRegistry::load) of a name builds its grammar; later loads
//! return the same `Arc`. Concurrent first loads of one name build it
//! exactly once. A failed build is not cached, so the next load retries.
//!
//! ```rust
//! use grove::{GrammarRegistry, error::Error};
//!
//! let registry = GrammarRegistry::with_builtin();
//! let python = registry.load("python")?;
//! assert!(std::sync::Arc::ptr_eq(&python, &registry.load("python")?));
//! assert!(matches!(registry.load("ruby"), Err(Error::GrammarNotFound { .. })));
//! # Ok::<(), Error>(())
//! ```

use crate::error::{Error, GrammarError};
use crate::grammar::{Grammar, GrammarTable};
use crate::languages;
use compact_str::CompactString;
use hashbrown::HashMap;
use once_cell::sync::OnceCell;
use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Something that can build a grammar on demand
pub trait GrammarSource: Send + Sync {
    /// Build the grammar.
    ///
    /// # Errors
    ///
    /// Returns a [`GrammarError`] if the grammar is malformed.
    fn build(&self) -> Result<Grammar, GrammarError>;
}

impl<F> GrammarSource for F
where
    F: Fn() -> Result<Grammar, GrammarError> + Send + Sync,
{
    fn build(&self) -> Result<Grammar, GrammarError> {
        self()
    }
}

/// Grammar stored as a JSON [`GrammarTable`]
#[derive(Debug, Clone)]
pub struct TableSource {
    json: Cow<'static, [u8]>,
}

impl TableSource {
    #[must_use]
    pub fn new(json: impl Into<Vec<u8>>) -> Self {
        Self {
            json: Cow::Owned(json.into()),
        }
    }

    #[must_use]
    pub const fn from_static(json: &'static [u8]) -> Self {
        Self {
            json: Cow::Borrowed(json),
        }
    }
}

impl GrammarSource for TableSource {
    fn build(&self) -> Result<Grammar, GrammarError> {
        GrammarTable::from_json(&self.json)?.build()
    }
}

struct Entry {
    source: Box<dyn GrammarSource>,
    grammar: OnceCell<Arc<Grammar>>,
}

/// Registry of grammars by name
#[derive(Default)]
pub struct GrammarRegistry {
    entries: RwLock<HashMap<CompactString, Arc<Entry>, ahash::RandomState>>,
}

impl GrammarRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `python`, `cpp` and `javascript`
    #[must_use]
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        for &(name, build) in languages::BUILTIN {
            registry.register(name, build);
        }
        registry
    }

    /// Process-wide registry holding the built-in grammars
    pub fn global() -> &'static Self {
        static GLOBAL: OnceCell<GrammarRegistry> = OnceCell::new();
        GLOBAL.get_or_init(Self::with_builtin)
    }

    /// Register `source` under `name`, replacing any previous source and
    /// dropping its cached grammar.
    pub fn register(&self, name: &str, source: impl GrammarSource + 'static) {
        let entry = Arc::new(Entry {
            source: Box::new(source),
            grammar: OnceCell::new(),
        });
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.insert(CompactString::new(name), entry).is_some() {
            tracing::debug!(grammar = name, "replaced grammar source");
        }
    }

    /// Load the grammar registered under `name`, building it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GrammarNotFound`] if nothing is registered under
    /// `name`, or [`Error::GrammarLoad`] if the source is malformed.
    pub fn load(&self, name: &str) -> Result<Arc<Grammar>, Error> {
        let entry = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| Error::GrammarNotFound {
                name: name.to_string(),
            })?;

        if let Some(grammar) = entry.grammar.get() {
            tracing::debug!(grammar = name, "grammar cache hit");
            return Ok(Arc::clone(grammar));
        }

        tracing::debug!(grammar = name, "grammar cache miss");
        entry
            .grammar
            .get_or_try_init(|| {
                let grammar = entry.source.build().map_err(|source| Error::GrammarLoad {
                    name: name.to_string(),
                    source,
                })?;
                tracing::info!(
                    grammar = name,
                    symbols = grammar.symbol_count(),
                    rules = grammar.rule_count(),
                    "constructed grammar"
                );
                Ok(Arc::new(grammar))
            })
            .map(Arc::clone)
    }

    /// Registered names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = entries.keys().map(ToString::to_string).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Whether `name` has been built and cached
    #[must_use]
    pub fn is_loaded(&self, name: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .is_some_and(|entry| entry.grammar.get().is_some())
    }
}

impl fmt::Debug for GrammarRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrammarRegistry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Expr, GrammarBuilder};
    use crate::lexer::{CharSet, Pattern};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn tiny() -> Result<Grammar, GrammarError> {
        GrammarBuilder::new("tiny")
            .token("digit", Pattern::class(CharSet::digits()))
            .rule("number", Expr::plus(Expr::sym("digit")))
            .build()
    }

    #[test]
    fn test_load_caches() {
        let registry = GrammarRegistry::new();
        registry.register("tiny", tiny);
        assert!(registry.is_registered("tiny"));
        assert!(!registry.is_loaded("tiny"));

        let first = registry.load("tiny").unwrap();
        let second = registry.load("tiny").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(registry.is_loaded("tiny"));
    }

    #[test]
    fn test_not_found_leaves_cache_alone() {
        let registry = GrammarRegistry::new();
        registry.register("tiny", tiny);
        let err = registry.load("ruby").unwrap_err();
        assert!(matches!(err, Error::GrammarNotFound { name } if name == "ruby"));
        assert_eq!(registry.names(), ["tiny"]);
        assert!(!registry.is_loaded("tiny"));
        assert!(!registry.is_registered("ruby"));
    }

    #[test]
    fn test_failed_load_is_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let registry = GrammarRegistry::new();
        registry.register("broken", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            GrammarBuilder::new("broken").build()
        });

        for _ in 0..2 {
            let err = registry.load("broken").unwrap_err();
            assert!(matches!(
                err,
                Error::GrammarLoad {
                    source: GrammarError::MissingEntryPoint,
                    ..
                }
            ));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!registry.is_loaded("broken"));
    }

    #[test]
    fn test_table_source() {
        let registry = GrammarRegistry::new();
        registry.register(
            "pair",
            TableSource::from_static(
                br#"{"name": "pair", "tokens": [{"name": "x", "pattern": {"literal": "x"}}],
                    "rules": [{"name": "pair", "expr": {"seq": [{"sym": "x"}, {"sym": "x"}]}}]}"#,
            ),
        );
        registry.register("garbage", TableSource::new("{"));

        assert_eq!(registry.load("pair").unwrap().name(), "pair");
        let err = registry.load("garbage").unwrap_err();
        assert!(matches!(
            err,
            Error::GrammarLoad {
                source: GrammarError::MalformedTable(_),
                ..
            }
        ));
    }

    #[test]
    fn test_register_replaces() {
        let registry = GrammarRegistry::new();
        registry.register("tiny", tiny);
        let first = registry.load("tiny").unwrap();
        registry.register("tiny", tiny);
        assert!(!registry.is_loaded("tiny"));
        let second = registry.load("tiny").unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_builtin_names() {
        let registry = GrammarRegistry::with_builtin();
        assert_eq!(registry.names(), ["cpp", "javascript", "python"]);
    }
}
