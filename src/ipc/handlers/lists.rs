use serde_json::json;

use crate::backend::ListBackend;
use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};

/// Selector list faults never surface: the UI shows "no options" and the
/// user re-opens the selector. Returns the rows as JSON or logs and
/// degrades to an empty array.
fn rows_or_empty<T: serde::Serialize>(
    what: &str,
    rows: anyhow::Result<Vec<T>>,
) -> serde_json::Value {
    match rows {
        Ok(rows) => json!(rows),
        Err(e) => {
            log::warn!("{what} list fetch failed, degrading to empty: {e:#}");
            json!([])
        }
    }
}

fn handle_districts(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(backend) = state.backend.as_ref() else {
        log::warn!("scope.districts with no backend configured");
        return ok(&req.id, json!({ "districts": [] }));
    };
    ok(
        &req.id,
        json!({ "districts": rows_or_empty("district", backend.districts()) }),
    )
}

fn handle_blocks(state: &mut AppState, req: &Request) -> serde_json::Value {
    let district = req
        .params
        .get("districtCode")
        .and_then(|v| v.as_str())
        .unwrap_or(&state.store.read().district_code)
        .to_string();
    // Block lists are meaningless without a district; the widget is
    // disabled and cleared, no network call happens.
    if district.is_empty() {
        return ok(&req.id, json!({ "blocks": [], "disabled": true }));
    }

    let Some(backend) = state.backend.as_ref() else {
        log::warn!("scope.blocks with no backend configured");
        return ok(&req.id, json!({ "blocks": [] }));
    };
    ok(
        &req.id,
        json!({ "blocks": rows_or_empty("block", backend.blocks(&district)) }),
    )
}

fn handle_schools(state: &mut AppState, req: &Request) -> serde_json::Value {
    let block = req
        .params
        .get("blockCode")
        .and_then(|v| v.as_str())
        .unwrap_or(&state.store.read().block_code)
        .to_string();
    if block.is_empty() {
        return ok(&req.id, json!({ "schools": [], "disabled": true }));
    }

    let limit = req
        .params
        .get("limit")
        .and_then(|v| v.as_u64())
        .map(|v| v.min(u32::MAX as u64) as u32);
    let q = req.params.get("q").and_then(|v| v.as_str());

    let Some(backend) = state.backend.as_ref() else {
        log::warn!("scope.schools with no backend configured");
        return ok(&req.id, json!({ "schools": [] }));
    };
    ok(
        &req.id,
        json!({ "schools": rows_or_empty("school", backend.schools(&block, limit, q)) }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "scope.districts" => Some(handle_districts(state, req)),
        "scope.blocks" => Some(handle_blocks(state, req)),
        "scope.schools" => Some(handle_schools(state, req)),
        _ => None,
    }
}
