use crate::syntax::{Child, Symbol};
use hashbrown::HashMap;

/// Packrat memo table
///
/// Entries are keyed by (`rule`, `token position`) and remember the
/// children a rule call appended, so a second call at the same position
/// replays them instead of parsing again.
#[derive(Debug)]
pub(crate) struct MemoTable {
    entries: HashMap<MemoKey, MemoEntry, ahash::RandomState>,
    max_entries: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct MemoKey {
    rule: Symbol,
    position: usize,
}

/// Memoized result of one rule call
#[derive(Debug, Clone)]
pub(crate) struct MemoEntry {
    /// Whether the extras before `position` had been emitted when the call
    /// started; a replay is only valid from the same state
    pub(crate) trivia_flushed: bool,
    pub(crate) result: Option<MemoSuccess>,
}

#[derive(Debug, Clone)]
pub(crate) struct MemoSuccess {
    pub(crate) children: Vec<Child>,
    pub(crate) end: usize,
    pub(crate) end_trivia_flushed: bool,
}

impl MemoTable {
    pub(crate) fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::with_hasher(ahash::RandomState::new()),
            max_entries,
        }
    }

    pub(crate) fn get(&self, rule: Symbol, position: usize) -> Option<&MemoEntry> {
        self.entries.get(&MemoKey { rule, position })
    }

    /// Store an entry; the table is cleared once it exceeds its limit.
    pub(crate) fn insert(&mut self, rule: Symbol, position: usize, entry: MemoEntry) {
        if self.entries.len() >= self.max_entries {
            tracing::trace!(entries = self.entries.len(), "memo table full, clearing");
            self.entries.clear();
        }
        self.entries.insert(MemoKey { rule, position }, entry);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
