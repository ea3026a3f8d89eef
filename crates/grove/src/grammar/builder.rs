use crate::error::GrammarError;
use crate::grammar::expr::{NameUse, Production, ResolvedTail};
use crate::grammar::table::{GrammarTable, RuleDef, TokenDef};
use crate::grammar::validate::check_left_recursion;
use crate::grammar::{Expr, Grammar};
use crate::lexer::{LayoutSymbols, LexerBuilder, Pattern};
use crate::syntax::{FieldId, Symbol, SymbolInfo, SymbolKind};
use compact_str::CompactString;
use hashbrown::HashMap;
use lasso::{Rodeo, Spur};
use smallvec::SmallVec;

/// Names of the layout tokens added by [`GrammarBuilder::indentation`]
pub const NEWLINE: &str = "_newline";
pub const INDENT: &str = "_indent";
pub const DEDENT: &str = "_dedent";

const MAX_SYMBOLS: usize = u16::MAX as usize;

/// Builder for [`Grammar`]s.
///
/// Tokens are declared with patterns, rules with [`Expr`]s. Literal tokens
/// used in rules (`Expr::lit("(")`) are registered automatically; when a
/// word token is set, word-like literals become keywords of that token.
///
/// ```rust
/// use grove::grammar::{Expr, GrammarBuilder};
/// use grove::lexer::{CharSet, Pattern};
///
/// let grammar = GrammarBuilder::new("calc")
///     .token("number", Pattern::many1(Pattern::class(CharSet::digits())))
///     .extra("_whitespace", Pattern::many1(Pattern::literal(" ")))
///     .rule("sum", Expr::binary("binary_expression", "number", &["+", "-"]))
///     .build()?;
///
/// assert_eq!(grammar.symbol_name(grammar.entry()), "sum");
/// # Ok::<(), grove::error::GrammarError>(())
/// ```
#[derive(Debug, Clone)]
pub struct GrammarBuilder {
    table: GrammarTable,
}

impl GrammarBuilder {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            table: GrammarTable::new(name),
        }
    }

    #[must_use]
    pub const fn from_table(table: GrammarTable) -> Self {
        Self { table }
    }

    /// The table accumulated so far
    #[must_use]
    pub fn to_table(&self) -> GrammarTable {
        self.table.clone()
    }

    /// Declare a token. Earlier tokens win ties between equally long matches.
    #[must_use]
    pub fn token(mut self, name: &str, pattern: Pattern) -> Self {
        self.table.tokens.push(TokenDef {
            name: CompactString::new(name),
            pattern,
            extra: false,
        });
        self
    }

    /// Declare a token allowed between any two significant tokens.
    #[must_use]
    pub fn extra(mut self, name: &str, pattern: Pattern) -> Self {
        self.table.tokens.push(TokenDef {
            name: CompactString::new(name),
            pattern,
            extra: true,
        });
        self
    }

    /// Token that keywords are extracted from
    #[must_use]
    pub fn word(mut self, name: &str) -> Self {
        self.table.word = Some(CompactString::new(name));
        self
    }

    /// Enable the indentation layout pass and its `_newline`, `_indent`,
    /// `_dedent` tokens.
    #[must_use]
    pub const fn indentation(mut self) -> Self {
        self.table.indentation = true;
        self
    }

    #[must_use]
    pub fn rule(mut self, name: &str, expr: Expr) -> Self {
        self.table.rules.push(RuleDef {
            name: CompactString::new(name),
            expr,
        });
        self
    }

    /// Entry rule; defaults to the first rule declared
    #[must_use]
    pub fn entry(mut self, name: &str) -> Self {
        self.table.entry = Some(CompactString::new(name));
        self
    }

    /// Resolve names, validate and compile the lexer.
    ///
    /// # Errors
    ///
    /// Returns a [`GrammarError`] for duplicate or undefined names, a missing
    /// or hidden entry rule, left recursion, and invalid token patterns.
    pub fn build(self) -> Result<Grammar, GrammarError> {
        let GrammarTable {
            name,
            entry,
            word,
            indentation,
            tokens,
            rules,
        } = self.table;

        let mut symbols = SymbolTable::new();

        let mut token_symbols = Vec::with_capacity(tokens.len());
        for token in &tokens {
            let symbol = symbols.add_named(&token.name, SymbolKind::Token, token.extra)?;
            token_symbols.push(symbol);
        }

        let layout = if indentation {
            Some(LayoutSymbols {
                newline: symbols.add_named(NEWLINE, SymbolKind::Layout, false)?,
                indent: symbols.add_named(INDENT, SymbolKind::Layout, false)?,
                dedent: symbols.add_named(DEDENT, SymbolKind::Layout, false)?,
            })
        } else {
            None
        };

        let mut rule_symbols = Vec::with_capacity(rules.len());
        for rule in &rules {
            rule_symbols.push(symbols.add_named(&rule.name, SymbolKind::Rule, false)?);
        }

        // Literals, fields and alias targets, in order of first use
        let mut literal_order: Vec<Symbol> = Vec::new();
        for rule in &rules {
            let mut uses: Vec<(&str, NameUse)> = Vec::new();
            rule.expr.visit_names(&mut |name, usage| uses.push((name, usage)));
            for (name, usage) in uses {
                match usage {
                    NameUse::Literal => {
                        if let Some(symbol) = symbols.add_literal(name)? {
                            literal_order.push(symbol);
                        }
                    }
                    NameUse::Field => symbols.add_field(name)?,
                    NameUse::Alias => {
                        if symbols.named_symbol(name).is_none() {
                            symbols.add_named(name, SymbolKind::Alias, false)?;
                        }
                    }
                    NameUse::Symbol => {}
                }
            }
        }

        let mut bodies: Vec<Option<Production>> = vec![None; symbols.len()];
        for (rule, symbol) in rules.iter().zip(&rule_symbols) {
            bodies[symbol.index()] = Some(symbols.resolve(&rule.name, &rule.expr)?);
        }

        let entry_name = entry
            .or_else(|| rules.first().map(|rule| rule.name.clone()))
            .ok_or(GrammarError::MissingEntryPoint)?;
        let entry = symbols
            .named_symbol(&entry_name)
            .filter(|&symbol| {
                let info = symbols.info(symbol);
                info.kind == SymbolKind::Rule && !info.hidden
            })
            .ok_or_else(|| GrammarError::UndefinedRule {
                name: entry_name.to_string(),
            })?;

        check_left_recursion(&bodies, |symbol| symbols.name(symbol).to_string())?;

        let word_symbol = word
            .as_deref()
            .map(|word| {
                symbols
                    .named_symbol(word)
                    .ok_or_else(|| GrammarError::UndefinedSymbol {
                        rule: "word".to_string(),
                        name: word.to_string(),
                    })
            })
            .transpose()?;

        // Literals first so that `.` beats a pattern matching the same text
        let mut lexer = LexerBuilder::new();
        for &symbol in &literal_order {
            let text = symbols.name(symbol);
            lexer = if word_symbol.is_some() && is_word_like(text) {
                lexer.keyword(text, symbol)
            } else {
                lexer.token(text, symbol, Pattern::literal(text))
            };
        }
        for (token, &symbol) in tokens.into_iter().zip(&token_symbols) {
            lexer = lexer.token(&token.name, symbol, token.pattern);
            if token.extra {
                lexer = lexer.extra(symbol);
            }
        }
        if let Some(word) = word_symbol {
            lexer = lexer.word(word);
        }
        let lexer = lexer.build()?;

        let rule_count = rule_symbols.len();
        let grammar = symbols.finish(name, bodies, entry, lexer, layout, rule_count);
        tracing::debug!(
            grammar = grammar.name(),
            symbols = grammar.symbol_count(),
            rules = rule_count,
            "built grammar"
        );
        Ok(grammar)
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn is_word_like(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Symbol and field tables while a grammar is being built
struct SymbolTable {
    names: Rodeo,
    symbols: Vec<SymbolInfo>,
    named: HashMap<Spur, Symbol, ahash::RandomState>,
    literals: HashMap<Spur, Symbol, ahash::RandomState>,
    fields: Vec<Spur>,
    field_ids: HashMap<Spur, FieldId, ahash::RandomState>,
}

impl SymbolTable {
    fn new() -> Self {
        let mut names = Rodeo::default();
        let error = SymbolInfo {
            name: names.get_or_intern_static("ERROR"),
            kind: SymbolKind::Error,
            hidden: false,
            extra: false,
        };
        Self {
            names,
            symbols: vec![error],
            named: HashMap::default(),
            literals: HashMap::default(),
            fields: Vec::new(),
            field_ids: HashMap::default(),
        }
    }

    fn len(&self) -> usize {
        self.symbols.len()
    }

    fn info(&self, symbol: Symbol) -> &SymbolInfo {
        &self.symbols[symbol.index()]
    }

    fn name(&self, symbol: Symbol) -> &str {
        self.names.resolve(&self.info(symbol).name)
    }

    fn named_symbol(&self, name: &str) -> Option<Symbol> {
        self.names.get(name).and_then(|spur| self.named.get(&spur).copied())
    }

    fn push(&mut self, info: SymbolInfo) -> Result<Symbol, GrammarError> {
        let raw = u16::try_from(self.symbols.len())
            .map_err(|_| GrammarError::TooManySymbols { max: MAX_SYMBOLS })?;
        self.symbols.push(info);
        Ok(Symbol::from_raw(raw))
    }

    fn add_named(&mut self, name: &str, kind: SymbolKind, extra: bool) -> Result<Symbol, GrammarError> {
        let spur = self.names.get_or_intern(name);
        if self.named.contains_key(&spur) || name == "ERROR" {
            return Err(GrammarError::DuplicateRule {
                name: name.to_string(),
            });
        }
        let symbol = self.push(SymbolInfo {
            name: spur,
            kind,
            hidden: name.starts_with('_'),
            extra,
        })?;
        self.named.insert(spur, symbol);
        Ok(symbol)
    }

    /// Returns the new symbol, or `None` if the literal already exists
    fn add_literal(&mut self, text: &str) -> Result<Option<Symbol>, GrammarError> {
        if text.is_empty() {
            return Err(GrammarError::EmptyPattern {
                name: "\"\"".to_string(),
            });
        }
        let spur = self.names.get_or_intern(text);
        if self.literals.contains_key(&spur) {
            return Ok(None);
        }
        let symbol = self.push(SymbolInfo {
            name: spur,
            kind: SymbolKind::Literal,
            hidden: false,
            extra: false,
        })?;
        self.literals.insert(spur, symbol);
        Ok(Some(symbol))
    }

    fn add_field(&mut self, name: &str) -> Result<(), GrammarError> {
        let spur = self.names.get_or_intern(name);
        if !self.field_ids.contains_key(&spur) {
            let raw = u16::try_from(self.fields.len())
                .map_err(|_| GrammarError::TooManySymbols { max: MAX_SYMBOLS })?;
            self.fields.push(spur);
            self.field_ids.insert(spur, FieldId::from_raw(raw));
        }
        Ok(())
    }

    fn undefined(rule: &str, name: &str) -> GrammarError {
        GrammarError::UndefinedSymbol {
            rule: rule.to_string(),
            name: name.to_string(),
        }
    }

    fn lookup_named(&self, rule: &str, name: &str) -> Result<Symbol, GrammarError> {
        self.named_symbol(name).ok_or_else(|| Self::undefined(rule, name))
    }

    fn lookup_field(&self, rule: &str, name: &str) -> Result<FieldId, GrammarError> {
        self.names
            .get(name)
            .and_then(|spur| self.field_ids.get(&spur).copied())
            .ok_or_else(|| Self::undefined(rule, name))
    }

    fn lookup_literal(&self, rule: &str, text: &str) -> Result<Symbol, GrammarError> {
        self.names
            .get(text)
            .and_then(|spur| self.literals.get(&spur).copied())
            .ok_or_else(|| Self::undefined(rule, text))
    }

    fn resolve(&self, rule: &str, expr: &Expr) -> Result<Production, GrammarError> {
        Ok(match expr {
            Expr::Sym(name) => {
                let symbol = self.lookup_named(rule, name)?;
                match self.info(symbol).kind {
                    SymbolKind::Rule => Production::Rule(symbol),
                    SymbolKind::Alias => return Err(Self::undefined(rule, name)),
                    _ => Production::Token(symbol),
                }
            }
            Expr::Lit(text) => Production::Token(self.lookup_literal(rule, text)?),
            Expr::Seq(exprs) => Production::Seq(
                exprs
                    .iter()
                    .map(|e| self.resolve(rule, e))
                    .collect::<Result<_, _>>()?,
            ),
            Expr::Choice(exprs) => Production::Choice(
                exprs
                    .iter()
                    .map(|e| self.resolve(rule, e))
                    .collect::<Result<_, _>>()?,
            ),
            Expr::Opt(inner) => Production::Opt(self.resolve_boxed(rule, inner)?),
            Expr::Repeat { expr, min, max } => Production::Repeat {
                expr: self.resolve_boxed(rule, expr)?,
                min: *min,
                max: max.map(|max| max.max(*min)),
            },
            Expr::Field { name, expr } => Production::Field {
                field: self.lookup_field(rule, name)?,
                expr: self.resolve_boxed(rule, expr)?,
            },
            Expr::Alias { name, expr } => Production::Alias {
                symbol: self.lookup_named(rule, name)?,
                expr: self.resolve_boxed(rule, expr)?,
            },
            Expr::LeftFold { operand, tails } => Production::LeftFold {
                operand: self.resolve_boxed(rule, operand)?,
                tails: tails
                    .iter()
                    .map(|tail| {
                        Ok(ResolvedTail {
                            node: self.lookup_named(rule, &tail.node)?,
                            left: tail
                                .left
                                .as_deref()
                                .map(|left| self.lookup_field(rule, left))
                                .transpose()?,
                            expr: self.resolve(rule, &tail.expr)?,
                        })
                    })
                    .collect::<Result<_, GrammarError>>()?,
            },
            Expr::Items { item, end } => Production::Items {
                item: self.resolve_boxed(rule, item)?,
                end: end
                    .iter()
                    .map(|e| match self.resolve(rule, e)? {
                        Production::Token(symbol) => Ok(symbol),
                        _ => Err(Self::undefined(rule, "<end token>")),
                    })
                    .collect::<Result<SmallVec<_>, _>>()?,
            },
            Expr::Eof => Production::Eof,
            Expr::Empty => Production::Empty,
        })
    }

    fn resolve_boxed(&self, rule: &str, expr: &Expr) -> Result<Box<Production>, GrammarError> {
        self.resolve(rule, expr).map(Box::new)
    }

    fn finish(
        self,
        name: CompactString,
        bodies: Vec<Option<Production>>,
        entry: Symbol,
        lexer: crate::lexer::CompiledLexer,
        layout: Option<LayoutSymbols>,
        rule_count: usize,
    ) -> Grammar {
        Grammar {
            name,
            names: self.names.into_reader(),
            symbols: self.symbols,
            named: self.named,
            literals: self.literals,
            fields: self.fields,
            field_ids: self.field_ids,
            rules: bodies,
            rule_count,
            entry,
            lexer,
            layout,
        }
    }
}
