use std::time::{Duration, Instant};

use serde::Serialize;

use crate::scope::{ScopePatch, ScopeStore};

/// Which list the drill-down explorer is currently showing. Local UI
/// state, deliberately independent of the Scope itself: changing the
/// scope does not move the navigator, and going back does not widen the
/// scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    District,
    Block,
    School,
}

impl Level {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "district" => Some(Self::District),
            "block" => Some(Self::Block),
            "school" => Some(Self::School),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::District => "district",
            Self::Block => "block",
            Self::School => "school",
        }
    }
}

#[derive(Debug)]
pub struct DrilldownNavigator {
    level: Level,
}

impl Default for DrilldownNavigator {
    fn default() -> Self {
        DrilldownNavigator {
            level: Level::District,
        }
    }
}

impl DrilldownNavigator {
    /// Reopening the explorer always lands on the district list.
    pub fn open(&mut self) {
        self.level = Level::District;
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn can_go_back(&self) -> bool {
        self.level != Level::District
    }

    /// Commit a selection at `level` to the store and advance the
    /// visible list one step where the hierarchy continues.
    pub fn select(&mut self, store: &mut ScopeStore, level: Level, code: &str, name: &str) -> Level {
        match level {
            Level::District => {
                store.update(&ScopePatch::district(code, name));
                // Only advance once a real district is committed.
                if !store.read().district_code.is_empty() {
                    self.level = Level::Block;
                }
            }
            Level::Block => {
                store.update(&ScopePatch::block(code, name));
                // The store may refuse the block (no district selected);
                // a school list under no block would be permanently
                // disabled, so only advance on a committed block.
                if !store.read().block_code.is_empty() {
                    self.level = Level::School;
                }
            }
            Level::School => {
                store.update(&ScopePatch::school(code, name));
            }
        }
        self.level
    }

    /// One step up; district is the floor.
    pub fn back(&mut self) -> Level {
        self.level = match self.level {
            Level::School => Level::Block,
            Level::Block | Level::District => Level::District,
        };
        self.level
    }
}

/// Settle delay between the last keystroke and the school-search fetch.
pub const SEARCH_SETTLE: Duration = Duration::from_millis(250);

/// A fired search query plus the generation it was fired under. Results
/// may only be committed while the ticket is still the newest one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub query: String,
    generation: u64,
}

#[derive(Debug)]
struct PendingQuery {
    query: String,
    due: Instant,
}

/// Debounced free-text school search. At most one pending query at a
/// time; a new keystroke replaces the timer outright. Callers inject the
/// clock, so tests drive time directly.
#[derive(Debug, Default)]
pub struct SearchDebouncer {
    pending: Option<PendingQuery>,
    generation: u64,
}

impl SearchDebouncer {
    pub fn input(&mut self, query: &str, now: Instant) {
        self.pending = Some(PendingQuery {
            query: query.to_string(),
            due: now + SEARCH_SETTLE,
        });
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the settled query, if any. Firing bumps the active
    /// generation, orphaning every earlier ticket.
    pub fn poll(&mut self, now: Instant) -> Option<SearchTicket> {
        if !self.pending.as_ref().is_some_and(|p| now >= p.due) {
            return None;
        }
        let fired = self.pending.take()?;
        self.generation += 1;
        Some(SearchTicket {
            query: fired.query,
            generation: self.generation,
        })
    }

    /// A stale response must never overwrite a newer query's results.
    pub fn is_current(&self, ticket: &SearchTicket) -> bool {
        ticket.generation == self.generation
    }

    /// The scope moved under the search: drop the pending query and
    /// orphan any in-flight fetch.
    pub fn invalidate(&mut self) {
        self.pending = None;
        self.generation += 1;
    }
}
