use serde_json::json;

use crate::insights::segment_report;
use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};

/// Segmentation is total: a missing or non-string `text` is treated as
/// empty, and every input yields the four buckets.
fn handle_segment(req: &Request) -> serde_json::Value {
    let text = req.params.get("text").and_then(|v| v.as_str()).unwrap_or("");
    let buckets = segment_report(text);
    ok(&req.id, json!(buckets))
}

pub fn try_handle(_state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "insights.segment" => Some(handle_segment(req)),
        _ => None,
    }
}
