use std::collections::HashMap;

use crate::scope::Scope;

/// Query parameters a scoped data fetch sends along: one pair per
/// selected level, nothing for a level still at "all".
pub fn scope_params(scope: &Scope) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if !scope.district_code.is_empty() {
        params.push(("district_code", scope.district_code.clone()));
    }
    if !scope.block_code.is_empty() {
        params.push(("block_code", scope.block_code.clone()));
    }
    if !scope.udise_code.is_empty() {
        params.push(("udise_code", scope.udise_code.clone()));
    }
    params
}

/// Refetch bookkeeping for one scoped view: fetch once per scope
/// version, and never let a superseded fetch overwrite a newer one. The
/// stale check is a generation ticket, not request cancellation; a slow
/// response simply fails to commit.
#[derive(Debug, Default)]
pub struct RefetchGate {
    fetched_version: Option<u64>,
    active: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct FetchTicket {
    version: u64,
    generation: u64,
}

impl RefetchGate {
    /// True on first sight of a view and after every committed scope
    /// update, including no-op updates (the version still moved).
    pub fn needs_fetch(&self, scope: &Scope) -> bool {
        self.fetched_version != Some(scope.version)
    }

    pub fn begin(&mut self, scope: &Scope) -> FetchTicket {
        self.active += 1;
        FetchTicket {
            version: scope.version,
            generation: self.active,
        }
    }

    /// False when a newer fetch began since this ticket; the caller must
    /// drop the result.
    pub fn commit(&mut self, ticket: FetchTicket) -> bool {
        if ticket.generation != self.active {
            return false;
        }
        self.fetched_version = Some(ticket.version);
        true
    }
}

struct PageEntry {
    gate: RefetchGate,
    data: serde_json::Value,
}

/// Per-path cache of scoped page bodies, keyed by the scope version the
/// data was fetched under. Any committed scope update makes every entry
/// stale via the version comparison.
#[derive(Default)]
pub struct PageCache {
    entries: HashMap<String, PageEntry>,
}

impl PageCache {
    pub fn cached(&self, path: &str, scope: &Scope) -> Option<&serde_json::Value> {
        let entry = self.entries.get(path)?;
        if entry.gate.needs_fetch(scope) {
            None
        } else {
            Some(&entry.data)
        }
    }

    pub fn begin(&mut self, path: &str, scope: &Scope) -> FetchTicket {
        self.entries
            .entry(path.to_string())
            .or_insert_with(|| PageEntry {
                gate: RefetchGate::default(),
                data: serde_json::Value::Null,
            })
            .gate
            .begin(scope)
    }

    pub fn commit(&mut self, path: &str, ticket: FetchTicket, data: serde_json::Value) -> bool {
        let Some(entry) = self.entries.get_mut(path) else {
            return false;
        };
        if !entry.gate.commit(ticket) {
            return false;
        }
        entry.data = data;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::{ScopePatch, ScopeStore};

    #[test]
    fn scope_params_skip_empty_levels() {
        let mut store = ScopeStore::in_memory();
        assert!(scope_params(store.read()).is_empty());

        store.update(&ScopePatch::district("D1", "North"));
        store.update(&ScopePatch::block("B1", "Haveli"));
        let params = scope_params(store.read());
        assert_eq!(
            params,
            vec![
                ("district_code", "D1".to_string()),
                ("block_code", "B1".to_string())
            ]
        );
    }

    #[test]
    fn gate_wants_a_fetch_on_mount_and_after_any_update() {
        let mut store = ScopeStore::in_memory();
        let mut gate = RefetchGate::default();
        assert!(gate.needs_fetch(store.read()));

        let ticket = gate.begin(store.read());
        assert!(gate.commit(ticket));
        assert!(!gate.needs_fetch(store.read()));

        // A no-op update still moves the version, still triggers.
        store.update(&ScopePatch::default());
        assert!(gate.needs_fetch(store.read()));
    }

    #[test]
    fn superseded_ticket_cannot_commit_even_if_it_resolves_later() {
        let mut store = ScopeStore::in_memory();
        let mut gate = RefetchGate::default();

        let slow = gate.begin(store.read());
        store.update(&ScopePatch::district("D1", "North"));
        let fresh = gate.begin(store.read());

        assert!(gate.commit(fresh));
        assert!(!gate.commit(slow), "older fetch resolving later is dropped");
        assert!(
            !gate.needs_fetch(store.read()),
            "the fresh result remains the displayed one"
        );
    }

    #[test]
    fn page_cache_serves_until_the_scope_version_moves() {
        let mut store = ScopeStore::in_memory();
        let mut pages = PageCache::default();
        assert!(pages.cached("executive/kpis", store.read()).is_none());

        let ticket = pages.begin("executive/kpis", store.read());
        assert!(pages.commit("executive/kpis", ticket, serde_json::json!({"n": 1})));
        assert_eq!(
            pages.cached("executive/kpis", store.read()),
            Some(&serde_json::json!({"n": 1}))
        );

        store.update(&ScopePatch::district("D1", "North"));
        assert!(pages.cached("executive/kpis", store.read()).is_none());
    }

    #[test]
    fn page_cache_is_per_path() {
        let store = ScopeStore::in_memory();
        let mut pages = PageCache::default();

        let ticket = pages.begin("teachers/summary", store.read());
        assert!(pages.commit("teachers/summary", ticket, serde_json::json!([1, 2])));
        assert!(pages.cached("enrolment/summary", store.read()).is_none());
    }
}
