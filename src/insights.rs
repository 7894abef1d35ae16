use serde::Serialize;

/// The four fixed buckets an AI-generated report is displayed under:
/// general findings, root-cause signals, recommendations, and priority
/// actions. Unmatched sections land in `insights`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InsightBuckets {
    pub insights: String,
    pub root: String,
    pub recs: String,
    pub actions: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Insights,
    Root,
    Recs,
    Actions,
}

/// First match wins; "priority action" stays listed ahead of the broader
/// "priority" to keep the published precedence order readable even
/// though the broader term subsumes it.
fn classify(heading: &str) -> Bucket {
    let h = heading.to_lowercase();
    if h.contains("root cause") {
        Bucket::Root
    } else if h.contains("priority action") || h.contains("action item") || h.contains("priority") {
        Bucket::Actions
    } else if h.contains("recommend") {
        Bucket::Recs
    } else {
        Bucket::Insights
    }
}

/// Heading text of a level-2 heading line: exactly two `#`, then
/// whitespace, then the text. `###` and deeper do not split sections.
fn level2_heading(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("##")?;
    if rest.starts_with('#') {
        return None;
    }
    if !rest.chars().next()?.is_whitespace() {
        return None;
    }
    Some(rest.trim())
}

/// Partition a loosely structured markdown report into the four display
/// buckets. Total over all inputs; never fails.
///
/// No level-2 headings means the whole text goes to `insights` verbatim.
/// Otherwise each `##` section is classified by its heading, demoted to
/// `###` so the surrounding card keeps the only level-2 structure, and
/// same-bucket sections concatenate in document order separated by a
/// blank line.
pub fn segment_report(input: &str) -> InsightBuckets {
    let text = input.trim();
    let mut out = InsightBuckets::default();
    if text.is_empty() {
        return out;
    }

    // Byte offset of every level-2 heading line, in document order.
    let mut headings: Vec<(usize, Bucket)> = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let body = line.trim_end_matches(['\n', '\r']);
        if let Some(heading) = level2_heading(body) {
            headings.push((offset, classify(heading)));
        }
        offset += line.len();
    }

    if headings.is_empty() {
        out.insights = text.to_string();
        return out;
    }

    // Text before the first heading has no label of its own; keep it
    // with the general narrative rather than dropping it.
    let preamble = text[..headings[0].0].trim();
    if !preamble.is_empty() {
        out.insights.push_str(preamble);
    }

    for (i, (start, bucket)) in headings.iter().enumerate() {
        let end = headings
            .get(i + 1)
            .map(|(next, _)| *next)
            .unwrap_or(text.len());
        let section = &text[*start..end];

        let slot = match bucket {
            Bucket::Insights => &mut out.insights,
            Bucket::Root => &mut out.root,
            Bucket::Recs => &mut out.recs,
            Bucket::Actions => &mut out.actions,
        };
        if !slot.is_empty() {
            slot.push_str("\n\n");
        }
        // The section starts at its own `##`; one extra `#` demotes the
        // heading to level 3.
        slot.push('#');
        slot.push_str(section.trim_end());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_whitespace_inputs_yield_empty_buckets() {
        assert_eq!(segment_report(""), InsightBuckets::default());
        assert_eq!(segment_report("   \n\t\n"), InsightBuckets::default());
    }

    #[test]
    fn no_headings_goes_to_insights_verbatim() {
        let out = segment_report("plain text");
        assert_eq!(out.insights, "plain text");
        assert_eq!(out.root, "");
        assert_eq!(out.recs, "");
        assert_eq!(out.actions, "");
    }

    #[test]
    fn sections_classify_by_heading_keywords() {
        let report = "## Root Cause Signals\nA\n## Recommendations\nB\n## Priority Action Items\nC\n## Misc\nD";
        let out = segment_report(report);
        assert!(out.root.contains('A'));
        assert!(out.recs.contains('B'));
        assert!(out.actions.contains('C'));
        assert!(out.insights.contains('D'), "unmatched heading defaults to insights");
        for bucket in [&out.insights, &out.root, &out.recs, &out.actions] {
            assert!(bucket.starts_with("### "), "headings are demoted: {bucket:?}");
            assert!(!bucket.starts_with("## "));
        }
    }

    #[test]
    fn classification_is_case_insensitive() {
        let out = segment_report("## ROOT CAUSE analysis\nX\n## recommended next steps\nY");
        assert!(out.root.contains('X'));
        assert!(out.recs.contains('Y'));
    }

    #[test]
    fn root_cause_wins_over_priority() {
        // "Root Cause of Priority Gaps" matches both vocabularies;
        // precedence says root.
        let out = segment_report("## Root Cause of Priority Gaps\nX");
        assert!(out.root.contains('X'));
        assert_eq!(out.actions, "");
    }

    #[test]
    fn bare_priority_heading_is_an_action() {
        let out = segment_report("## Priority fixes (next 30 days)\nX");
        assert!(out.actions.contains('X'));
    }

    #[test]
    fn same_bucket_sections_concatenate_with_blank_line() {
        let out = segment_report("## Recommendations\nB1\n## Recommendations (no LLM)\nB2");
        assert_eq!(out.recs, "### Recommendations\nB1\n\n### Recommendations (no LLM)\nB2");
    }

    #[test]
    fn level3_headings_do_not_split_sections() {
        let out = segment_report("## Key Findings\ntext\n### sub-point\nmore");
        assert!(out.insights.contains("### sub-point"));
        assert!(out.insights.contains("more"));
    }

    #[test]
    fn hashes_without_whitespace_are_not_headings() {
        let out = segment_report("##NotAHeading\ntext");
        assert_eq!(out.insights, "##NotAHeading\ntext");
    }

    #[test]
    fn preamble_before_first_heading_lands_in_insights() {
        let out = segment_report("intro line\n## Recommendations\nB");
        assert!(out.insights.contains("intro line"));
        assert!(out.recs.contains('B'));
    }

    #[test]
    fn crlf_heading_lines_still_detected() {
        let out = segment_report("## Root Cause Signals\r\nA\r\n## Misc\r\nD");
        assert!(out.root.contains('A'));
        assert!(out.insights.contains('D'));
    }
}
