mod test_support;

use serde_json::json;
use test_support::{request_ok, spawn_sidecar, temp_dir};

#[test]
fn report_sections_land_in_their_buckets() {
    let workspace = temp_dir("edudash-insights");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let report = "## Root Cause Signals\nA\n## Recommendations\nB\n## Priority Action Items\nC\n## Misc\nD";
    let buckets = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "insights.segment",
        json!({ "text": report }),
    );

    let root = buckets.get("root").and_then(|v| v.as_str()).unwrap();
    let recs = buckets.get("recs").and_then(|v| v.as_str()).unwrap();
    let actions = buckets.get("actions").and_then(|v| v.as_str()).unwrap();
    let insights = buckets.get("insights").and_then(|v| v.as_str()).unwrap();

    assert!(root.contains('A'));
    assert!(recs.contains('B'));
    assert!(actions.contains('C'));
    assert!(insights.contains('D'));
    for bucket in [root, recs, actions, insights] {
        assert!(bucket.starts_with("### "), "demoted heading: {bucket:?}");
    }

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn segmentation_is_total_over_degenerate_inputs() {
    let workspace = temp_dir("edudash-insights-degenerate");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    // Missing text, non-string text, and malformed markdown all answer.
    let empty = request_ok(&mut stdin, &mut reader, "2", "insights.segment", json!({}));
    assert_eq!(empty.get("insights").and_then(|v| v.as_str()), Some(""));

    let non_string = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "insights.segment",
        json!({ "text": 42 }),
    );
    assert_eq!(non_string.get("root").and_then(|v| v.as_str()), Some(""));

    let ragged = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "insights.segment",
        json!({ "text": "##\n####x\n## Recommendations" }),
    );
    assert!(ragged
        .get("recs")
        .and_then(|v| v.as_str())
        .unwrap()
        .contains("Recommendations"));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
