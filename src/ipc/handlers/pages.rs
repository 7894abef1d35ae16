use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};

/// Scoped page fetch: the current selection rides along as query
/// parameters, and bodies are cached per path until the scope version
/// moves. Unlike the selector lists, page data is primary content, so a
/// fetch failure surfaces to the caller.
fn handle_fetch(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .unwrap_or("");
    if path.is_empty() {
        return err(&req.id, "bad_params", "missing params.path", None);
    }

    let Some(backend) = state.backend.as_ref() else {
        return err(&req.id, "no_backend", "configure a backend first", None);
    };

    let scope = state.store.read().clone();
    if let Some(data) = state.pages.cached(path, &scope) {
        return ok(
            &req.id,
            json!({ "data": data, "fromCache": true, "version": scope.version }),
        );
    }

    let ticket = state.pages.begin(path, &scope);
    match backend.fetch_page(path, &scope) {
        Ok(data) => {
            // Single-threaded run-to-completion: nothing can have
            // superseded the ticket here, but the gate stays in the path
            // so the invariant holds if fetches ever overlap.
            state.pages.commit(path, ticket, data.clone());
            ok(
                &req.id,
                json!({ "data": data, "fromCache": false, "version": scope.version }),
            )
        }
        Err(e) => err(&req.id, "fetch_failed", format!("{e:#}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "page.fetch" => Some(handle_fetch(state, req)),
        _ => None,
    }
}
