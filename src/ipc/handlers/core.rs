use std::path::PathBuf;

use serde_json::json;

use crate::backend::BackendClient;
use crate::consumers::PageCache;
use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::navigator::{DrilldownNavigator, SearchDebouncer};
use crate::scope::ScopeStore;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    let conn = match db::open_db(&path) {
        Ok(conn) => conn,
        Err(e) => return err(&req.id, "db_open_failed", format!("{e:?}"), None),
    };
    let storage = match db::SqliteScopeStorage::open(&path) {
        Ok(storage) => storage,
        Err(e) => return err(&req.id, "db_open_failed", format!("{e:?}"), None),
    };

    // A new workspace means a new session: the store reloads the
    // persisted scope, everything downstream starts clean.
    state.workspace = Some(path.clone());
    state.db = Some(conn);
    state.store = ScopeStore::open(Box::new(storage));
    state.navigator = DrilldownNavigator::default();
    *state.search.borrow_mut() = SearchDebouncer::default();
    state.pages = PageCache::default();
    state.wire_store_subscriptions();

    let backend = load_backend(state);
    state.backend = backend;

    ok(&req.id, json!({ "workspacePath": path.to_string_lossy() }))
}

fn load_backend(state: &AppState) -> Option<BackendClient> {
    let conn = state.db.as_ref()?;
    let value = match db::settings_get_json(conn, db::BACKEND_URL_KEY) {
        Ok(v) => v?,
        Err(e) => {
            log::warn!("backend config read failed: {e:#}");
            return None;
        }
    };
    let url = value.as_str()?.trim();
    if url.is_empty() {
        return None;
    }
    Some(BackendClient::new(url))
}

fn handle_backend_configure(state: &mut AppState, req: &Request) -> serde_json::Value {
    let url = req
        .params
        .get("baseUrl")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .unwrap_or("");
    if url.is_empty() {
        return err(&req.id, "bad_params", "missing params.baseUrl", None);
    }

    let client = BackendClient::new(url);
    let base = client.base_url().to_string();

    // Best-effort: remember the URL for the next session.
    if let Some(conn) = state.db.as_ref() {
        if let Err(e) = db::settings_set_json(conn, db::BACKEND_URL_KEY, &json!(base)) {
            log::warn!("backend config persist failed: {e:#}");
        }
    }

    state.backend = Some(client);
    ok(&req.id, json!({ "baseUrl": base }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "backend.configure" => Some(handle_backend_configure(state, req)),
        _ => None,
    }
}
