use serde::{Deserialize, Serialize};

/// The current drill-down selection shared by every dashboard view.
///
/// Empty string means "nothing selected at this level" (broadest scope).
/// A non-empty block implies a non-empty district, and a non-empty
/// school implies a non-empty block; `ScopeStore::update` maintains this
/// for every input.
///
/// `version` is a per-session change counter used by consumers purely as
/// a cache-invalidation signal. It is not persisted; a reloaded scope
/// starts back at 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Scope {
    pub district_code: String,
    pub district_name: String,
    pub block_code: String,
    pub block_name: String,
    pub udise_code: String,
    pub school_name: String,
    #[serde(skip)]
    pub version: u64,
}

/// A partial scope assignment: any subset of the six fields. `None`
/// leaves the field untouched; `Some("")` explicitly deselects it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ScopePatch {
    pub district_code: Option<String>,
    pub district_name: Option<String>,
    pub block_code: Option<String>,
    pub block_name: Option<String>,
    pub udise_code: Option<String>,
    pub school_name: Option<String>,
}

impl Scope {
    /// Containment must hold for every scope we hand out: a descendant
    /// never outlives an empty ancestor, whatever produced the fields.
    fn normalize(&mut self) {
        if self.district_code.is_empty() {
            self.block_code.clear();
            self.block_name.clear();
        }
        if self.block_code.is_empty() {
            self.udise_code.clear();
            self.school_name.clear();
        }
    }
}

impl ScopePatch {
    pub fn district(code: &str, name: &str) -> Self {
        ScopePatch {
            district_code: Some(code.to_string()),
            district_name: Some(name.to_string()),
            ..ScopePatch::default()
        }
    }

    pub fn block(code: &str, name: &str) -> Self {
        ScopePatch {
            block_code: Some(code.to_string()),
            block_name: Some(name.to_string()),
            ..ScopePatch::default()
        }
    }

    pub fn school(code: &str, name: &str) -> Self {
        ScopePatch {
            udise_code: Some(code.to_string()),
            school_name: Some(name.to_string()),
            ..ScopePatch::default()
        }
    }

    pub fn cleared() -> Self {
        ScopePatch {
            district_code: Some(String::new()),
            district_name: Some(String::new()),
            block_code: Some(String::new()),
            block_name: Some(String::new()),
            udise_code: Some(String::new()),
            school_name: Some(String::new()),
        }
    }
}

/// Where the scope survives between sessions. Implementations must not
/// fail loudly: a load that cannot produce a scope returns `None`, and
/// save errors are logged and swallowed by the store.
pub trait ScopeStorage {
    fn load(&self) -> Option<Scope>;
    fn save(&self, scope: &Scope) -> anyhow::Result<()>;
}

/// In-memory only. Used before a workspace is selected and in tests.
pub struct NullStorage;

impl ScopeStorage for NullStorage {
    fn load(&self) -> Option<Scope> {
        None
    }

    fn save(&self, _scope: &Scope) -> anyhow::Result<()> {
        Ok(())
    }
}

type Subscriber = Box<dyn FnMut(&Scope)>;

/// Single source of truth for the drill-down selection. All writes go
/// through `update`/`clear`; every committed update bumps the version,
/// persists best-effort, and notifies subscribers in registration order.
pub struct ScopeStore {
    scope: Scope,
    storage: Box<dyn ScopeStorage>,
    subscribers: Vec<Subscriber>,
}

impl ScopeStore {
    /// Build the store from persisted state. Absent, corrupt, or
    /// unreadable storage degrades to the all-empty default; a persisted
    /// document that breaks containment (hand-edited, older schema) is
    /// normalized before anyone reads it.
    pub fn open(storage: Box<dyn ScopeStorage>) -> Self {
        let mut scope = storage.load().unwrap_or_default();
        scope.normalize();
        scope.version = 0;
        ScopeStore {
            scope,
            storage,
            subscribers: Vec::new(),
        }
    }

    pub fn in_memory() -> Self {
        Self::open(Box::new(NullStorage))
    }

    pub fn read(&self) -> &Scope {
        &self.scope
    }

    /// Register a callback run after every committed update. The store
    /// does not filter by relevance; each consumer compares the fields
    /// it cares about.
    pub fn subscribe(&mut self, subscriber: Subscriber) {
        self.subscribers.push(subscriber);
    }

    /// Merge a patch, cascade resets, bump the version, persist, notify.
    ///
    /// A call whose merge changes nothing still bumps the version and
    /// still notifies: "update was called" doubles as a force-refresh
    /// signal for consumers.
    pub fn update(&mut self, patch: &ScopePatch) -> &Scope {
        let prior_district = self.scope.district_code.clone();
        let prior_block = self.scope.block_code.clone();

        if let Some(v) = &patch.district_code {
            self.scope.district_code = v.clone();
        }
        if let Some(v) = &patch.district_name {
            self.scope.district_name = v.clone();
        }
        if let Some(v) = &patch.block_code {
            self.scope.block_code = v.clone();
        }
        if let Some(v) = &patch.block_name {
            self.scope.block_name = v.clone();
        }
        if let Some(v) = &patch.udise_code {
            self.scope.udise_code = v.clone();
        }
        if let Some(v) = &patch.school_name {
            self.scope.school_name = v.clone();
        }

        // A changed ancestor invalidates every descendant, even when the
        // patch also assigned them.
        if patch.district_code.is_some() && self.scope.district_code != prior_district {
            self.scope.block_code.clear();
            self.scope.block_name.clear();
            self.scope.udise_code.clear();
            self.scope.school_name.clear();
        }
        // Block comparison happens after the district cascade took effect.
        if patch.block_code.is_some() && self.scope.block_code != prior_block {
            self.scope.udise_code.clear();
            self.scope.school_name.clear();
        }

        // Whatever the patch said, a descendant never outlives an empty
        // ancestor.
        self.scope.normalize();

        self.scope.version += 1;

        // Durability is an optimization, not a correctness requirement.
        if let Err(e) = self.storage.save(&self.scope) {
            log::warn!("scope persist failed, continuing in-memory: {e:#}");
        }

        let snapshot = self.scope.clone();
        for subscriber in &mut self.subscribers {
            subscriber(&snapshot);
        }

        &self.scope
    }

    pub fn clear(&mut self) -> &Scope {
        self.update(&ScopePatch::cleared())
    }
}
