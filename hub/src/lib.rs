//! Client for the Hugging Face datasets-server HTTP API.
//!
//! Resolves a dataset split's label schema through `/info` and pages its rows
//! through `/rows`, producing a [`Corpus`] ready for the query engine.

use emotion_core::loader::validate_labels;
use emotion_core::{Corpus, CorpusStore, DatasetInfo, DatasetSource, LabelIndex, LoadError, Record};
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::task::JoinSet;

pub const DEFAULT_ENDPOINT: &str = "https://datasets-server.huggingface.co";
/// Largest page the rows endpoint serves.
pub const PAGE_SIZE: usize = 100;
pub const LABEL_FEATURE: &str = "label";

#[derive(Debug, Deserialize)]
struct InfoResponse {
    dataset_info: BTreeMap<String, ConfigInfo>,
}

#[derive(Debug, Deserialize)]
struct ConfigInfo {
    #[serde(default)]
    features: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    splits: BTreeMap<String, SplitInfo>,
}

#[derive(Debug, Deserialize)]
struct SplitInfo {
    #[serde(default)]
    num_examples: usize,
}

#[derive(Debug, Deserialize)]
struct RowsPage {
    rows: Vec<RowEntry>,
    #[serde(default)]
    num_rows_total: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RowEntry {
    row_idx: usize,
    row: Record,
    #[serde(default)]
    truncated_cells: Vec<String>,
}

/// Label schema and size of one split, as reported by `/info`.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitSchema {
    pub config: String,
    pub labels: Vec<String>,
    pub num_rows: usize,
}

#[derive(Clone)]
pub struct HubClient {
    client: Client,
    endpoint: String,
    concurrency: usize,
}

impl HubClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, LoadError> {
        let client = Client::builder()
            .user_agent(concat!("emotion-hub/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| LoadError::Unavailable(format!("http client: {e}")))?;
        Ok(Self { client, endpoint: endpoint.trim_end_matches('/').to_string(), concurrency: 8 })
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Fetch the whole split. Returns the corpus and the config it came from.
    pub async fn fetch(&self, source: &DatasetSource) -> Result<(Corpus, String), LoadError> {
        let schema = self.schema(source).await?;
        tracing::info!(
            dataset = %source.dataset,
            config = %schema.config,
            split = %source.split,
            rows = schema.num_rows,
            "fetching split"
        );

        let first = self.page(source, &schema.config, 0).await?;
        let total = first.num_rows_total.unwrap_or(schema.num_rows).max(first.rows.len());
        let mut pages: BTreeMap<usize, Vec<RowEntry>> = BTreeMap::new();
        pages.insert(0, first.rows);

        let mut offsets = (PAGE_SIZE..total).step_by(PAGE_SIZE);
        let mut inflight = JoinSet::new();
        loop {
            while inflight.len() < self.concurrency {
                let Some(offset) = offsets.next() else { break };
                let hub = self.clone();
                let source = source.clone();
                let config = schema.config.clone();
                inflight.spawn(async move { (offset, hub.page(&source, &config, offset).await) });
            }
            let Some(joined) = inflight.join_next().await else { break };
            let (offset, page) =
                joined.map_err(|e| LoadError::Unavailable(format!("page task failed: {e}")))?;
            pages.insert(offset, page?.rows);
            if pages.len() % 20 == 0 {
                tracing::debug!(pages = pages.len(), total, "fetch progress");
            }
        }

        let records = assemble(pages);
        let labels = LabelIndex::new(schema.labels);
        validate_labels(&records, &labels)?;
        if records.len() != total {
            tracing::warn!(
                expected = total,
                fetched = records.len(),
                "row count differs from server total"
            );
        }
        let info = DatasetInfo::new(&source.dataset, &source.split);
        let corpus = Corpus::new(info, labels, CorpusStore::new(records));
        Ok((corpus, schema.config))
    }

    pub async fn schema(&self, source: &DatasetSource) -> Result<SplitSchema, LoadError> {
        let url = format!("{}/info", self.endpoint);
        let query = [("dataset", source.dataset.as_str())];
        let info: InfoResponse = self.get_json(&url, &query, source).await?;
        resolve_schema(info, source)
    }

    async fn page(
        &self,
        source: &DatasetSource,
        config: &str,
        offset: usize,
    ) -> Result<RowsPage, LoadError> {
        let url = format!("{}/rows", self.endpoint);
        let offset = offset.to_string();
        let length = PAGE_SIZE.to_string();
        let query = [
            ("dataset", source.dataset.as_str()),
            ("config", config),
            ("split", source.split.as_str()),
            ("offset", offset.as_str()),
            ("length", length.as_str()),
        ];
        self.get_json(&url, &query, source).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        source: &DatasetSource,
    ) -> Result<T, LoadError> {
        let mut req = self.client.get(url).query(query);
        if let Some(token) = &source.token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let resp = req.send().await.map_err(|e| LoadError::Unavailable(format!("{url}: {e}")))?;
        if let Some(err) = status_error(resp.status(), &source.dataset) {
            return Err(err);
        }
        resp.json::<T>()
            .await
            .map_err(|e| LoadError::Unavailable(format!("{url}: unexpected response: {e}")))
    }
}

/// Map a non-success HTTP status to the loader taxonomy.
pub fn status_error(status: StatusCode, dataset: &str) -> Option<LoadError> {
    match status {
        s if s.is_success() => None,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            let reason = format!("{dataset}: HTTP {status}; check HF_TOKEN");
            Some(LoadError::AuthenticationFailed(reason))
        }
        StatusCode::NOT_FOUND => Some(LoadError::Unavailable(format!("{dataset}: not found"))),
        _ => Some(LoadError::Unavailable(format!("{dataset}: HTTP {status}"))),
    }
}

fn resolve_schema(info: InfoResponse, source: &DatasetSource) -> Result<SplitSchema, LoadError> {
    let dataset = &source.dataset;
    let mut configs = info.dataset_info;
    let config = match &source.config {
        Some(c) => c.clone(),
        None => configs
            .keys()
            .next()
            .cloned()
            .ok_or_else(|| LoadError::Unavailable(format!("{dataset}: no configs listed")))?,
    };
    let cfg = configs
        .remove(&config)
        .ok_or_else(|| LoadError::Unavailable(format!("{dataset}: unknown config {config}")))?;
    let split = cfg
        .splits
        .get(&source.split)
        .ok_or_else(|| {
            LoadError::Unavailable(format!("{dataset}: unknown split {}", source.split))
        })?;
    let labels = cfg
        .features
        .get(LABEL_FEATURE)
        .and_then(class_names)
        .ok_or_else(|| {
            LoadError::Unavailable(format!(
                "{dataset}: `{LABEL_FEATURE}` is not a class-label feature"
            ))
        })?;
    Ok(SplitSchema { config, labels, num_rows: split.num_examples })
}

fn class_names(feature: &serde_json::Value) -> Option<Vec<String>> {
    feature
        .get("names")?
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

fn assemble(pages: BTreeMap<usize, Vec<RowEntry>>) -> Vec<Record> {
    let mut entries: Vec<RowEntry> = pages.into_values().flatten().collect();
    entries.sort_by_key(|e| e.row_idx);
    entries.dedup_by_key(|e| e.row_idx);
    let truncated = entries.iter().filter(|e| !e.truncated_cells.is_empty()).count();
    if truncated > 0 {
        tracing::warn!(truncated, "server truncated some cells");
    }
    entries.into_iter().map(|e| e.row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const INFO: &str = r#"{
        "dataset_info": {
            "split": {
                "features": {
                    "text": {"dtype": "string", "_type": "Value"},
                    "label": {
                        "names": ["sadness", "joy", "love", "anger", "fear", "surprise"],
                        "_type": "ClassLabel"
                    }
                },
                "splits": {
                    "train": {"name": "train", "num_examples": 16000},
                    "test": {"name": "test", "num_examples": 2000}
                }
            },
            "unsplit": {
                "features": {"label": {"names": ["sadness", "joy"], "_type": "ClassLabel"}},
                "splits": {"train": {"name": "train", "num_examples": 416809}}
            }
        },
        "partial": false
    }"#;

    fn info() -> InfoResponse {
        serde_json::from_str(INFO).unwrap()
    }

    #[test]
    fn first_config_is_the_default() {
        let source = DatasetSource::new("dair-ai/emotion", "test");
        let schema = resolve_schema(info(), &source).unwrap();
        assert_eq!(schema.config, "split");
        assert_eq!(schema.num_rows, 2000);
        assert_eq!(schema.labels.len(), 6);
        assert_eq!(schema.labels[1], "joy");
    }

    #[test]
    fn explicit_config_is_honoured() {
        let source =
            DatasetSource::new("dair-ai/emotion", "train").with_config(Some("unsplit".into()));
        let schema = resolve_schema(info(), &source).unwrap();
        assert_eq!(schema.labels, vec!["sadness".to_string(), "joy".to_string()]);
        assert_eq!(schema.num_rows, 416809);
    }

    #[test]
    fn unknown_split_is_unavailable() {
        let source = DatasetSource::new("dair-ai/emotion", "validation_matched");
        let err = resolve_schema(info(), &source).unwrap_err();
        assert!(matches!(err, LoadError::Unavailable(_)));
    }

    #[test]
    fn missing_class_label_is_unavailable() {
        let raw = r#"{"dataset_info": {"default": {
            "features": {"label": {"dtype": "int64", "_type": "Value"}},
            "splits": {"train": {"num_examples": 1}}
        }}}"#;
        let info = serde_json::from_str(raw).unwrap();
        let err = resolve_schema(info, &DatasetSource::new("x", "train")).unwrap_err();
        assert!(err.to_string().contains("class-label"));
    }

    #[test]
    fn statuses_map_to_load_errors() {
        assert!(status_error(StatusCode::OK, "d").is_none());
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            assert!(matches!(status_error(status, "d"), Some(LoadError::AuthenticationFailed(_))));
        }
        for status in [StatusCode::NOT_FOUND, StatusCode::BAD_GATEWAY] {
            assert!(matches!(status_error(status, "d"), Some(LoadError::Unavailable(_))));
        }
    }

    #[test]
    fn pages_assemble_in_row_order() {
        let page_b: RowsPage = serde_json::from_str(
            r#"{
                "rows": [{"row_idx": 2, "row": {"text": "c", "label": 0}, "truncated_cells": []}],
                "num_rows_total": 3
            }"#,
        )
        .unwrap();
        let page_a: RowsPage = serde_json::from_str(
            r#"{"rows": [
                {"row_idx": 1, "row": {"text": "b", "label": 1}},
                {"row_idx": 0, "row": {"text": "a", "label": 0}}
            ]}"#,
        )
        .unwrap();
        let mut pages = BTreeMap::new();
        pages.insert(100, page_b.rows);
        pages.insert(0, page_a.rows);
        let texts: Vec<String> = assemble(pages).into_iter().map(|r| r.text).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }
}
