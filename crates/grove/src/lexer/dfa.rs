use super::builder::{LexRule, MAX_CHAR, Pattern};
use crate::error::{GrammarError, LexerError, LexerErrorKind};
use crate::lexer::Token;
use crate::syntax::{Symbol, TextRange, TextSize};
use compact_str::CompactString;
use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;
use std::cmp::Ordering;

/// State ID in the DFA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateId(pub u32);

/// Inclusive range of Unicode code points
type CharRange = (u32, u32);

/// Accepting state information for Maximal Munch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AcceptingState {
    rule: u32,
    priority: u32,
}

/// DFA state with disjoint transitions sorted by range start
#[derive(Debug, Clone, Default)]
struct DfaState {
    transitions: Vec<(CharRange, StateId)>,
    /// Lowest-priority (highest-precedence) rule accepted here
    accepting: Option<AcceptingState>,
}

impl DfaState {
    /// Binary search over the sorted, disjoint ranges
    fn find_transition(&self, c: u32) -> Option<StateId> {
        self.transitions
            .binary_search_by(|((start, end), _)| {
                if c < *start {
                    Ordering::Greater
                } else if c > *end {
                    Ordering::Less
                } else {
                    Ordering::Equal
                }
            })
            .ok()
            .map(|idx| self.transitions[idx].1)
    }
}

#[derive(Debug, Clone, Default)]
struct NfaState {
    transitions: Vec<(CharRange, u32)>,
    epsilon_transitions: Vec<u32>,
    accepting: Option<AcceptingState>,
}

/// Thompson NFA under construction
#[derive(Debug, Clone)]
pub(crate) struct Nfa {
    states: Vec<NfaState>,
    start: u32,
}

impl Nfa {
    pub(crate) fn new() -> Self {
        Self {
            states: vec![NfaState::default()],
            start: 0,
        }
    }

    pub(crate) fn add_state(&mut self) -> u32 {
        self.states.push(NfaState::default());
        u32::try_from(self.states.len() - 1).unwrap_or(u32::MAX)
    }

    fn state_mut(&mut self, id: u32) -> &mut NfaState {
        &mut self.states[id as usize]
    }

    pub(crate) fn add_epsilon_transition(&mut self, from: u32, to: u32) {
        self.state_mut(from).epsilon_transitions.push(to);
    }

    fn add_transition(&mut self, from: u32, range: CharRange, to: u32) {
        self.state_mut(from).transitions.push((range, to));
    }
}

/// A regex nested inside another pattern cannot be expressed in the DFA
#[derive(Debug, Clone, Copy)]
pub(crate) struct NestedRegex;

/// Build the NFA fragment for `pattern` between `start` and `end`
pub(crate) fn pattern_to_nfa(
    pattern: &Pattern,
    nfa: &mut Nfa,
    start: u32,
    end: u32,
) -> Result<(), NestedRegex> {
    match pattern {
        Pattern::Literal(text) => {
            let mut current = start;
            let mut chars = text.chars().peekable();
            if chars.peek().is_none() {
                nfa.add_epsilon_transition(start, end);
            }
            while let Some(c) = chars.next() {
                let next = if chars.peek().is_some() { nfa.add_state() } else { end };
                nfa.add_transition(current, (c as u32, c as u32), next);
                current = next;
            }
        }
        Pattern::CharClass(set) => {
            for range in set.code_point_ranges() {
                nfa.add_transition(start, range, end);
            }
        }
        Pattern::Any => nfa.add_transition(start, (0, MAX_CHAR), end),
        Pattern::Seq(parts) => {
            let mut current = start;
            for part in parts {
                let next = nfa.add_state();
                pattern_to_nfa(part, nfa, current, next)?;
                current = next;
            }
            nfa.add_epsilon_transition(current, end);
        }
        Pattern::Choice(alternatives) => {
            for alternative in alternatives {
                let inner_start = nfa.add_state();
                let inner_end = nfa.add_state();
                nfa.add_epsilon_transition(start, inner_start);
                pattern_to_nfa(alternative, nfa, inner_start, inner_end)?;
                nfa.add_epsilon_transition(inner_end, end);
            }
        }
        Pattern::Repeat { pattern, min, max } => {
            let mut current = start;
            for _ in 0..*min {
                let next = nfa.add_state();
                pattern_to_nfa(pattern, nfa, current, next)?;
                current = next;
            }
            match max {
                None => {
                    let loop_start = nfa.add_state();
                    let loop_end = nfa.add_state();
                    nfa.add_epsilon_transition(current, loop_start);
                    pattern_to_nfa(pattern, nfa, loop_start, loop_end)?;
                    nfa.add_epsilon_transition(loop_end, loop_start);
                    nfa.add_epsilon_transition(loop_end, end);
                }
                Some(max) => {
                    for _ in *min..*max {
                        let next = nfa.add_state();
                        nfa.add_epsilon_transition(current, end);
                        pattern_to_nfa(pattern, nfa, current, next)?;
                        current = next;
                    }
                }
            }
            nfa.add_epsilon_transition(current, end);
        }
        Pattern::Regex(_) => return Err(NestedRegex),
    }
    Ok(())
}

type StateSet = SmallVec<[u32; 8]>;

/// Compute epsilon closure of NFA states, sorted for use as a map key
fn epsilon_closure(nfa: &Nfa, states: impl IntoIterator<Item = u32>) -> StateSet {
    let mut closure: HashSet<u32, ahash::RandomState> = HashSet::default();
    let mut stack: Vec<u32> = Vec::new();
    for state in states {
        if closure.insert(state) {
            stack.push(state);
        }
    }

    while let Some(state) = stack.pop() {
        for &next in &nfa.states[state as usize].epsilon_transitions {
            if closure.insert(next) {
                stack.push(next);
            }
        }
    }

    let mut set: StateSet = closure.into_iter().collect();
    set.sort_unstable();
    set
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Dfa {
    states: Vec<DfaState>,
}

impl Dfa {
    const START: StateId = StateId(0);

    fn add_state(&mut self) -> StateId {
        self.states.push(DfaState::default());
        StateId(u32::try_from(self.states.len() - 1).unwrap_or(u32::MAX))
    }

    fn state(&self, id: StateId) -> &DfaState {
        &self.states[id.0 as usize]
    }

    pub(crate) fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Convert NFA to DFA using subset construction.
    ///
    /// Overlapping NFA ranges are split at every range boundary so the
    /// resulting transitions of each DFA state are disjoint.
    pub(crate) fn from_nfa(nfa: &Nfa) -> Self {
        let mut dfa = Self::default();
        let mut state_map: HashMap<StateSet, StateId, ahash::RandomState> = HashMap::default();
        let mut worklist: Vec<(StateSet, StateId)> = Vec::new();

        let start_closure = epsilon_closure(nfa, [nfa.start]);
        let start = dfa.add_state();
        state_map.insert(start_closure.clone(), start);
        worklist.push((start_closure, start));

        while let Some((nfa_states, dfa_state)) = worklist.pop() {
            let moves: Vec<(CharRange, u32)> = nfa_states
                .iter()
                .flat_map(|&s| nfa.states[s as usize].transitions.iter().copied())
                .collect();

            let mut boundaries: Vec<u32> = moves
                .iter()
                .flat_map(|&((lo, hi), _)| [lo, hi.saturating_add(1)])
                .collect();
            boundaries.sort_unstable();
            boundaries.dedup();

            let mut transitions: Vec<(CharRange, StateId)> = Vec::new();
            for window in boundaries.windows(2) {
                let (lo, hi) = (window[0], window[1] - 1);
                let targets = moves
                    .iter()
                    .filter(|&&((start, end), _)| start <= lo && hi <= end)
                    .map(|&(_, target)| target);
                let closure = epsilon_closure(nfa, targets);
                if closure.is_empty() {
                    continue;
                }

                let target = if let Some(&id) = state_map.get(&closure) {
                    id
                } else {
                    let id = dfa.add_state();
                    state_map.insert(closure.clone(), id);
                    worklist.push((closure, id));
                    id
                };

                match transitions.last_mut() {
                    Some(((_, last_hi), last_target))
                        if *last_target == target && last_hi.saturating_add(1) == lo =>
                    {
                        *last_hi = hi;
                    }
                    _ => transitions.push(((lo, hi), target)),
                }
            }

            let accepting = nfa_states
                .iter()
                .filter_map(|&s| nfa.states[s as usize].accepting)
                .min_by_key(|accepting| accepting.priority);

            let state = &mut dfa.states[dfa_state.0 as usize];
            state.transitions = transitions;
            state.accepting = accepting;
        }

        dfa
    }

    /// Run the DFA from `pos` and return (length, rule) of the longest match
    fn longest_match(&self, input: &str, pos: usize) -> Option<(usize, AcceptingState)> {
        let mut state = Self::START;
        let mut best = None;
        let bytes = input.as_bytes();
        let mut byte_pos = pos;

        while byte_pos < bytes.len() {
            // Fast path: ASCII character (single byte)
            let (c, len) = if bytes[byte_pos].is_ascii() {
                (u32::from(bytes[byte_pos]), 1)
            } else {
                let Some(c) = input[byte_pos..].chars().next() else {
                    break;
                };
                (c as u32, c.len_utf8())
            };

            let Some(next) = self.state(state).find_transition(c) else {
                break;
            };
            state = next;
            byte_pos += len;
            if let Some(accepting) = self.state(state).accepting {
                best = Some((byte_pos - pos, accepting));
            }
        }

        best
    }
}

/// Rule compiled into the DFA
#[derive(Debug, Clone)]
struct DfaRule {
    kind: Symbol,
}

/// Rule matched with the `regex` crate
#[derive(Debug, Clone)]
struct RegexRule {
    regex: regex::Regex,
    kind: Symbol,
    priority: u32,
}

/// Result of tokenizing a whole input
#[derive(Debug, Clone, Default)]
pub struct LexOutput {
    /// Every token, extras included, covering the input without gaps
    pub tokens: Vec<Token>,
    pub errors: Vec<LexerError>,
}

/// Tokenizer compiled from a [`LexerBuilder`](super::LexerBuilder)
#[derive(Debug, Clone)]
pub struct CompiledLexer {
    dfa: Dfa,
    dfa_rules: Vec<DfaRule>,
    regex_rules: Vec<RegexRule>,
    keywords: HashMap<CompactString, Symbol, ahash::RandomState>,
    extras: HashSet<Symbol, ahash::RandomState>,
    word: Option<Symbol>,
}

impl CompiledLexer {
    pub(crate) fn compile(
        rules: &[LexRule],
        keywords: HashMap<CompactString, Symbol, ahash::RandomState>,
        extras: HashSet<Symbol, ahash::RandomState>,
        word: Option<Symbol>,
    ) -> Result<Self, GrammarError> {
        let mut nfa = Nfa::new();
        let mut dfa_rules = Vec::new();
        let mut regex_rules = Vec::new();

        for rule in rules {
            if let Pattern::Regex(source) = &rule.pattern {
                let regex = regex::Regex::new(&format!(r"\A(?:{source})")).map_err(|err| {
                    GrammarError::InvalidRegex {
                        name: rule.name.to_string(),
                        message: err.to_string(),
                    }
                })?;
                if regex.is_match("") {
                    return Err(GrammarError::EmptyPattern {
                        name: rule.name.to_string(),
                    });
                }
                regex_rules.push(RegexRule {
                    regex,
                    kind: rule.kind,
                    priority: rule.priority,
                });
                continue;
            }

            let start = nfa.add_state();
            let end = nfa.add_state();
            pattern_to_nfa(&rule.pattern, &mut nfa, start, end).map_err(|NestedRegex| {
                GrammarError::InvalidRegex {
                    name: rule.name.to_string(),
                    message: "regex patterns cannot be nested".to_string(),
                }
            })?;
            if epsilon_closure(&nfa, [start]).contains(&end) {
                return Err(GrammarError::EmptyPattern {
                    name: rule.name.to_string(),
                });
            }

            nfa.state_mut(end).accepting = Some(AcceptingState {
                rule: u32::try_from(dfa_rules.len()).unwrap_or(u32::MAX),
                priority: rule.priority,
            });
            nfa.add_epsilon_transition(nfa.start, start);
            dfa_rules.push(DfaRule { kind: rule.kind });
        }

        let dfa = Dfa::from_nfa(&nfa);
        tracing::trace!(
            dfa_states = dfa.state_count(),
            regex_rules = regex_rules.len(),
            "compiled lexer"
        );

        Ok(Self {
            dfa,
            dfa_rules,
            regex_rules,
            keywords,
            extras,
            word,
        })
    }

    /// Tokenize `input` completely.
    ///
    /// Runs of characters that no rule matches become a single
    /// [`Symbol::ERROR`] token each, plus a [`LexerError`].
    #[must_use]
    pub fn tokenize(&self, input: &str) -> LexOutput {
        let mut output = LexOutput::default();
        let mut pos = 0;

        while pos < input.len() {
            if let Some((len, kind)) = self.next_match(input, pos) {
                let text = &input[pos..pos + len];
                let kind = self.retag_keyword(kind, text);
                output.tokens.push(Token {
                    kind,
                    text: CompactString::new(text),
                    range: range_of(pos, pos + len),
                    extra: self.extras.contains(&kind),
                });
                pos += len;
                continue;
            }

            let start = pos;
            let first = input[pos..].chars().next().unwrap_or(char::REPLACEMENT_CHARACTER);
            pos += first.len_utf8();
            while pos < input.len() && self.next_match(input, pos).is_none() {
                pos += input[pos..].chars().next().map_or(1, char::len_utf8);
            }

            let range = range_of(start, pos);
            tracing::trace!(%range, "unexpected characters");
            output.tokens.push(Token {
                kind: Symbol::ERROR,
                text: CompactString::new(&input[start..pos]),
                range,
                extra: false,
            });
            output.errors.push(LexerError {
                span: range,
                kind: LexerErrorKind::unexpected_char(first),
            });
        }

        output
    }

    /// Longest non-empty match at `pos`; ties go to the lower priority number
    fn next_match(&self, input: &str, pos: usize) -> Option<(usize, Symbol)> {
        let mut best: Option<(usize, u32, Symbol)> = None;

        if let Some((len, accepting)) = self.dfa.longest_match(input, pos) {
            let kind = self.dfa_rules[accepting.rule as usize].kind;
            Self::update_best(&mut best, len, accepting.priority, kind);
        }

        for rule in &self.regex_rules {
            if let Some(found) = rule.regex.find(&input[pos..]) {
                Self::update_best(&mut best, found.end(), rule.priority, rule.kind);
            }
        }

        best.filter(|(len, _, _)| *len > 0)
            .map(|(len, _, kind)| (len, kind))
    }

    fn update_best(best: &mut Option<(usize, u32, Symbol)>, len: usize, prio: u32, kind: Symbol) {
        match best {
            // Longest match wins; ties go to the rule declared first.
            Some((best_len, best_prio, _)) => {
                if len > *best_len || (len == *best_len && prio < *best_prio) {
                    *best = Some((len, prio, kind));
                }
            }
            None => *best = Some((len, prio, kind)),
        }
    }

    fn retag_keyword(&self, kind: Symbol, text: &str) -> Symbol {
        if self.word == Some(kind) {
            self.keywords.get(text).copied().unwrap_or(kind)
        } else {
            kind
        }
    }

    #[must_use]
    pub fn is_extra(&self, kind: Symbol) -> bool {
        self.extras.contains(&kind)
    }

    #[must_use]
    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }
}

fn range_of(start: usize, end: usize) -> TextRange {
    TextRange::new(
        TextSize::from(u32::try_from(start).unwrap_or(u32::MAX)),
        TextSize::from(u32::try_from(end).unwrap_or(u32::MAX)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{CharSet, LexerBuilder};

    const IDENT: Symbol = Symbol::from_raw(1);
    const NUMBER: Symbol = Symbol::from_raw(2);
    const WHITESPACE: Symbol = Symbol::from_raw(3);
    const LT: Symbol = Symbol::from_raw(4);
    const SHL: Symbol = Symbol::from_raw(5);
    const IF: Symbol = Symbol::from_raw(6);
    const COMMENT: Symbol = Symbol::from_raw(7);
    const FLOAT: Symbol = Symbol::from_raw(8);

    fn test_lexer() -> CompiledLexer {
        let identifier = Pattern::seq([
            Pattern::class(CharSet::alpha().with_chars("_")),
            Pattern::many(Pattern::class(CharSet::word())),
        ]);
        LexerBuilder::new()
            .token("<<", SHL, Pattern::literal("<<"))
            .token("<", LT, Pattern::literal("<"))
            .token("identifier", IDENT, identifier)
            .token("number", NUMBER, Pattern::many1(Pattern::class(CharSet::digits())))
            .token(
                "float",
                FLOAT,
                Pattern::seq([
                    Pattern::many1(Pattern::class(CharSet::digits())),
                    Pattern::literal("."),
                    Pattern::many(Pattern::class(CharSet::digits())),
                ]),
            )
            .token("_whitespace", WHITESPACE, Pattern::many1(Pattern::class(CharSet::whitespace())))
            .token("comment", COMMENT, Pattern::regex(r"#[^\n]*"))
            .keyword("if", IF)
            .extra(WHITESPACE)
            .extra(COMMENT)
            .word(IDENT)
            .build()
            .unwrap()
    }

    fn kinds(output: &LexOutput) -> Vec<Symbol> {
        output.tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_maximal_munch() {
        let lexer = test_lexer();
        let output = lexer.tokenize("a<<b<c");
        assert_eq!(kinds(&output), vec![IDENT, SHL, IDENT, LT, IDENT]);

        let output = lexer.tokenize("12.5 12");
        assert_eq!(kinds(&output), vec![FLOAT, WHITESPACE, NUMBER]);
        assert_eq!(output.tokens[0].text, "12.5");
    }

    #[test]
    fn test_keyword_retagging() {
        let lexer = test_lexer();
        let output = lexer.tokenize("if iffy");
        assert_eq!(kinds(&output), vec![IF, WHITESPACE, IDENT]);
    }

    #[test]
    fn test_extras_flagged_and_regex_fallback() {
        let lexer = test_lexer();
        let output = lexer.tokenize("x # note\ny");
        assert_eq!(kinds(&output), vec![IDENT, WHITESPACE, COMMENT, WHITESPACE, IDENT]);
        assert!(output.tokens[2].extra);
        assert_eq!(output.tokens[2].text, "# note");
        assert!(!output.tokens[0].extra);
    }

    #[test]
    fn test_unmatched_run_becomes_one_error_token() {
        let lexer = test_lexer();
        let output = lexer.tokenize("a $@€ b");
        assert_eq!(
            kinds(&output),
            vec![IDENT, WHITESPACE, Symbol::ERROR, WHITESPACE, IDENT]
        );
        assert_eq!(output.tokens[2].text, "$@€");
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.errors[0].kind, LexerErrorKind::unexpected_char('$'));
        assert_eq!(output.errors[0].span, range_of(2, 7));
    }

    #[test]
    fn test_tokens_cover_input() {
        let lexer = test_lexer();
        let input = "if x<<2 # c\n  $$ 3.";
        let output = lexer.tokenize(input);
        let mut offset = 0;
        for token in &output.tokens {
            assert_eq!(token.range.start().to_usize(), offset);
            assert_eq!(&input[std::ops::Range::from(token.range)], token.text.as_str());
            offset = token.range.end().to_usize();
        }
        assert_eq!(offset, input.len());
    }

    #[test]
    fn test_empty_pattern_rejected() {
        let result = LexerBuilder::new()
            .token("maybe", IDENT, Pattern::many(Pattern::literal("a")))
            .build();
        assert!(matches!(result, Err(GrammarError::EmptyPattern { name }) if name == "maybe"));

        let result = LexerBuilder::new()
            .token("maybe", IDENT, Pattern::regex("a*"))
            .build();
        assert!(matches!(result, Err(GrammarError::EmptyPattern { .. })));
    }

    #[test]
    fn test_invalid_and_nested_regex_rejected() {
        let result = LexerBuilder::new().token("bad", IDENT, Pattern::regex("(")).build();
        assert!(matches!(result, Err(GrammarError::InvalidRegex { .. })));

        let nested = Pattern::seq([Pattern::literal("a"), Pattern::regex("b")]);
        let result = LexerBuilder::new().token("nested", IDENT, nested).build();
        assert!(matches!(result, Err(GrammarError::InvalidRegex { .. })));
    }

    #[test]
    fn test_bounded_repeat() {
        let lexer = LexerBuilder::new()
            .token("hex", NUMBER, Pattern::repeat(Pattern::class(CharSet::hex_digits()), 2, Some(4)))
            .build()
            .unwrap();
        let output = lexer.tokenize("abcdef");
        assert_eq!(output.tokens[0].text, "abcd");
        assert_eq!(output.tokens[1].text, "ef");

        let output = lexer.tokenize("a");
        assert_eq!(kinds(&output), vec![Symbol::ERROR]);
    }

    #[test]
    fn test_overlapping_ranges_are_split() {
        // `[a-m]x` and `[h-z]y` overlap on h-m
        let lexer = LexerBuilder::new()
            .token(
                "ax",
                IDENT,
                Pattern::seq([Pattern::class(CharSet::new(vec![('a', 'm')])), Pattern::literal("x")]),
            )
            .token(
                "hy",
                NUMBER,
                Pattern::seq([Pattern::class(CharSet::new(vec![('h', 'z')])), Pattern::literal("y")]),
            )
            .build()
            .unwrap();
        assert_eq!(kinds(&lexer.tokenize("kx")), vec![IDENT]);
        assert_eq!(kinds(&lexer.tokenize("ky")), vec![NUMBER]);
        assert_eq!(kinds(&lexer.tokenize("by")), vec![Symbol::ERROR]);
    }

    #[test]
    fn test_choice_and_unicode() {
        let lexer = LexerBuilder::new()
            .token(
                "word",
                IDENT,
                Pattern::many1(Pattern::choice([
                    Pattern::class(CharSet::alpha()),
                    Pattern::literal("é"),
                ])),
            )
            .token("other", NUMBER, Pattern::Any)
            .build()
            .unwrap();
        let output = lexer.tokenize("café!");
        assert_eq!(kinds(&output), vec![IDENT, NUMBER]);
        assert_eq!(output.tokens[0].text, "café");
    }
}
