use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use rusqlite::Connection;
use serde::Deserialize;

use crate::backend::BackendClient;
use crate::consumers::PageCache;
use crate::navigator::{DrilldownNavigator, SearchDebouncer};
use crate::scope::ScopeStore;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub store: ScopeStore,
    pub navigator: DrilldownNavigator,
    pub search: Rc<RefCell<SearchDebouncer>>,
    pub pages: PageCache,
    pub backend: Option<BackendClient>,
}

impl AppState {
    pub fn new() -> Self {
        let mut state = AppState {
            workspace: None,
            db: None,
            store: ScopeStore::in_memory(),
            navigator: DrilldownNavigator::default(),
            search: Rc::new(RefCell::new(SearchDebouncer::default())),
            pages: PageCache::default(),
            backend: None,
        };
        state.wire_store_subscriptions();
        state
    }

    /// The debounced search follows the block it searches under: when a
    /// committed update changes `block_code`, its pending query and any
    /// in-flight fetch are orphaned. The page cache instead keys off the
    /// scope version at fetch time, so it needs no subscription.
    pub fn wire_store_subscriptions(&mut self) {
        let search = Rc::clone(&self.search);
        let mut last_block = self.store.read().block_code.clone();
        self.store.subscribe(Box::new(move |scope| {
            if scope.block_code != last_block {
                last_block = scope.block_code.clone();
                search.borrow_mut().invalidate();
            }
        }));
    }
}
