use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::scope::{Scope, ScopePatch};

fn scope_result(scope: &Scope) -> serde_json::Value {
    json!({ "scope": scope, "version": scope.version })
}

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, scope_result(state.store.read()))
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(raw) = req.params.get("patch") else {
        return err(&req.id, "bad_params", "missing params.patch", None);
    };
    let patch: ScopePatch = match serde_json::from_value(raw.clone()) {
        Ok(p) => p,
        Err(e) => {
            return err(
                &req.id,
                "bad_params",
                format!("invalid patch: {e}"),
                None,
            )
        }
    };

    let scope = state.store.update(&patch);
    ok(&req.id, scope_result(scope))
}

fn handle_clear(state: &mut AppState, req: &Request) -> serde_json::Value {
    let scope = state.store.clear();
    ok(&req.id, scope_result(scope))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "scope.get" => Some(handle_get(state, req)),
        "scope.update" => Some(handle_update(state, req)),
        "scope.clear" => Some(handle_clear(state, req)),
        _ => None,
    }
}
