use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::consumers::scope_params;
use crate::scope::Scope;

pub const DEFAULT_SCHOOL_LIMIT: u32 = 500;
pub const MAX_SCHOOL_LIMIT: u32 = 5000;

/// Marker the selector endpoints send so the backend does not
/// auto-filter them by the currently selected scope; these calls exist
/// to populate the selector itself.
const BYPASS_PARAM: (&str, &str) = ("bypass_scope", "1");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictRow {
    pub district_code: String,
    pub district_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRow {
    pub block_code: String,
    pub block_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolRow {
    pub udise_code: String,
    pub school_name: String,
}

/// The slice of the REST backend the scope subsystem consumes. A trait
/// so tests and offline callers can substitute fixtures for the network.
pub trait ListBackend {
    fn districts(&self) -> anyhow::Result<Vec<DistrictRow>>;
    fn blocks(&self, district_code: &str) -> anyhow::Result<Vec<BlockRow>>;
    fn schools(
        &self,
        block_code: &str,
        limit: Option<u32>,
        q: Option<&str>,
    ) -> anyhow::Result<Vec<SchoolRow>>;
}

pub fn clamp_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_SCHOOL_LIMIT).clamp(1, MAX_SCHOOL_LIMIT)
}

/// Query string for a selector call: caller-specific pairs plus the
/// bypass marker.
fn selector_query(mut pairs: Vec<(String, String)>) -> Vec<(String, String)> {
    pairs.push((BYPASS_PARAM.0.to_string(), BYPASS_PARAM.1.to_string()));
    pairs
}

fn schools_query(limit: Option<u32>, q: Option<&str>) -> Vec<(String, String)> {
    let mut pairs = vec![("limit".to_string(), clamp_limit(limit).to_string())];
    if let Some(q) = q {
        let q = q.trim();
        if !q.is_empty() {
            pairs.push(("q".to_string(), q.to_string()));
        }
    }
    selector_query(pairs)
}

/// Query string for a scoped page fetch: the current selection rides
/// along, empty levels meaning "no filter at this level".
fn page_query(scope: &Scope) -> Vec<(String, String)> {
    scope_params(scope)
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Blocking HTTP client for the dashboard's REST backend.
pub struct BackendClient {
    base: String,
    http: reqwest::blocking::Client,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        BackendClient {
            base: base_url.trim_end_matches('/').to_string(),
            http: reqwest::blocking::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> anyhow::Result<T> {
        let url = format!("{}/{}", self.base, path.trim_start_matches('/'));
        let resp = self
            .http
            .get(&url)
            .query(query)
            .send()
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url}"))?;
        resp.json().with_context(|| format!("decode {url}"))
    }

    /// Primary-content fetch with the scope auto-applied.
    pub fn fetch_page(&self, path: &str, scope: &Scope) -> anyhow::Result<serde_json::Value> {
        self.get_json(path, &page_query(scope))
    }
}

impl ListBackend for BackendClient {
    fn districts(&self) -> anyhow::Result<Vec<DistrictRow>> {
        self.get_json("scope/districts", &selector_query(Vec::new()))
    }

    fn blocks(&self, district_code: &str) -> anyhow::Result<Vec<BlockRow>> {
        self.get_json(
            &format!("scope/districts/{district_code}/blocks"),
            &selector_query(Vec::new()),
        )
    }

    fn schools(
        &self,
        block_code: &str,
        limit: Option<u32>,
        q: Option<&str>,
    ) -> anyhow::Result<Vec<SchoolRow>> {
        self.get_json(
            &format!("scope/blocks/{block_code}/schools"),
            &schools_query(limit, q),
        )
    }
}
