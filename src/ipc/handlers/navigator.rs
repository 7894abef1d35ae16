use std::time::Instant;

use serde_json::json;

use crate::backend::ListBackend;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::navigator::{Level, SEARCH_SETTLE};

fn handle_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.navigator.open();
    ok(&req.id, json!({ "level": state.navigator.level() }))
}

fn handle_state(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "level": state.navigator.level(),
            "canGoBack": state.navigator.can_go_back()
        }),
    )
}

fn handle_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let level = req.params.get("level").and_then(|v| v.as_str());
    let Some(level) = level.and_then(Level::parse) else {
        return err(
            &req.id,
            "bad_params",
            "params.level must be district|block|school",
            None,
        );
    };
    let Some(code) = req.params.get("code").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing params.code", None);
    };
    let name = req.params.get("name").and_then(|v| v.as_str()).unwrap_or("");

    let next = state.navigator.select(&mut state.store, level, code, name);
    let scope = state.store.read();
    ok(
        &req.id,
        json!({ "level": next, "scope": scope, "version": scope.version }),
    )
}

fn handle_back(state: &mut AppState, req: &Request) -> serde_json::Value {
    let level = state.navigator.back();
    ok(&req.id, json!({ "level": level }))
}

fn handle_search_input(state: &mut AppState, req: &Request) -> serde_json::Value {
    // School search only exists under a selected block.
    if state.store.read().block_code.is_empty() {
        return ok(&req.id, json!({ "disabled": true }));
    }
    let q = req.params.get("q").and_then(|v| v.as_str()).unwrap_or("");
    state.search.borrow_mut().input(q, Instant::now());
    ok(
        &req.id,
        json!({ "settleMs": SEARCH_SETTLE.as_millis() as u64 }),
    )
}

fn handle_search_poll(state: &mut AppState, req: &Request) -> serde_json::Value {
    let ticket = state.search.borrow_mut().poll(Instant::now());
    let Some(ticket) = ticket else {
        let status = if state.search.borrow().has_pending() {
            "pending"
        } else {
            "idle"
        };
        return ok(&req.id, json!({ "status": status }));
    };

    let block = state.store.read().block_code.clone();
    if block.is_empty() {
        // The block was deselected after the query settled.
        return ok(&req.id, json!({ "status": "idle" }));
    }

    let Some(backend) = state.backend.as_ref() else {
        log::warn!("search.poll with no backend configured");
        return ok(
            &req.id,
            json!({ "status": "fired", "q": ticket.query, "schools": [] }),
        );
    };

    match backend.schools(&block, None, Some(&ticket.query)) {
        Ok(rows) => {
            if !state.search.borrow().is_current(&ticket) {
                // A newer query or a scope change superseded this fetch
                // while it ran; its results must not be shown.
                return ok(&req.id, json!({ "status": "stale" }));
            }
            ok(
                &req.id,
                json!({ "status": "fired", "q": ticket.query, "schools": rows }),
            )
        }
        Err(e) => {
            log::warn!("school search fetch failed, degrading to empty: {e:#}");
            ok(
                &req.id,
                json!({ "status": "fired", "q": ticket.query, "schools": [] }),
            )
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "navigator.open" => Some(handle_open(state, req)),
        "navigator.state" => Some(handle_state(state, req)),
        "navigator.select" => Some(handle_select(state, req)),
        "navigator.back" => Some(handle_back(state, req)),
        "search.input" => Some(handle_search_input(state, req)),
        "search.poll" => Some(handle_search_poll(state, req)),
        _ => None,
    }
}
