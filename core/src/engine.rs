use crate::corpus::{Corpus, FormattedRow};
use crate::labels::normalize;
use crate::random::{RandomSource, ThreadRandom};
use crate::LabelId;
use serde::Serialize;
use std::sync::Arc;

pub const DEFAULT_SEARCH_LIMIT: i64 = 5;
pub const MAX_SEARCH_LIMIT: i64 = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountResult {
    pub emotion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_id: Option<LabelId>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub index: usize,
    #[serde(flatten)]
    pub row: FormattedRow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub query: String,
    pub limit: i64,
    pub matches: usize,
    pub results: Vec<SearchHit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionStat {
    pub emotion: String,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionReport {
    pub dataset: String,
    pub split: String,
    pub total: usize,
    pub stats: Vec<EmotionStat>,
}

/// Read-only queries over a loaded corpus. Problems with arguments come back
/// inside the result; nothing here fails.
pub struct QueryEngine {
    corpus: Arc<Corpus>,
    random: Box<dyn RandomSource>,
}

impl QueryEngine {
    pub fn new(corpus: Arc<Corpus>) -> Self {
        Self::with_random(corpus, ThreadRandom)
    }

    pub fn with_random<R: RandomSource + 'static>(corpus: Arc<Corpus>, random: R) -> Self {
        Self { corpus, random: Box::new(random) }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Up to `n` distinct rows drawn uniformly, in draw order.
    pub fn sample(&self, n: i64) -> Vec<FormattedRow> {
        if n <= 0 || self.corpus.is_empty() {
            return Vec::new();
        }
        let total = self.corpus.len();
        let amount = usize::try_from(n).unwrap_or(usize::MAX).min(total);
        self.random
            .sample_positions(total, amount)
            .into_iter()
            .filter_map(|pos| self.corpus.row_at(pos))
            .collect()
    }

    pub fn count_by_emotion(&self, emotion: &str) -> CountResult {
        let emotion = normalize(emotion);
        if emotion.is_empty() {
            return CountResult {
                emotion,
                label_id: None,
                count: 0,
                error: Some("emotion must be non-empty".into()),
            };
        }
        let Some(label_id) = self.corpus.labels.id_of(&emotion, true) else {
            let valid = self.corpus.labels.names().join(", ");
            let error = format!("unknown emotion; valid: [{valid}]");
            return CountResult { emotion, label_id: None, count: 0, error: Some(error) };
        };
        let count = self.corpus.store.label_column().iter().filter(|&&l| l == label_id).count();
        CountResult { emotion, label_id: Some(label_id), count, error: None }
    }

    /// Case-insensitive substring scan in corpus order. Stops as soon as the
    /// clamped limit is reached.
    pub fn search_text(&self, query: &str, limit: i64) -> SearchResult {
        let query = query.trim();
        if query.is_empty() {
            return SearchResult {
                query: String::new(),
                limit,
                matches: 0,
                results: Vec::new(),
                error: Some("query must be non-empty".into()),
            };
        }

        let limit = limit.clamp(1, MAX_SEARCH_LIMIT);
        let cap = limit as usize;
        let needle = query.to_lowercase();
        let mut results = Vec::with_capacity(cap);
        for (index, record) in self.corpus.store.records().iter().enumerate() {
            if record.text.to_lowercase().contains(&needle) {
                results.push(SearchHit { index, row: self.corpus.format_row(record) });
                if results.len() >= cap {
                    break;
                }
            }
        }
        tracing::debug!(query, limit, matches = results.len(), "search_text");
        SearchResult {
            query: query.to_string(),
            limit,
            matches: results.len(),
            results,
            error: None,
        }
    }

    /// Count and share of every label, most frequent first; ties keep label-id order.
    pub fn distribution_analysis(&self) -> DistributionReport {
        let total = self.corpus.len();
        let labels = &self.corpus.labels;
        let mut counts = vec![0usize; labels.len()];
        let mut unknown = 0usize;
        for &label in self.corpus.store.label_column() {
            match counts.get_mut(label as usize) {
                Some(c) => *c += 1,
                None => unknown += 1,
            }
        }
        if unknown > 0 {
            // only hand-built corpora get here; loaders reject unknown labels
            tracing::warn!(unknown, total, "records with labels outside the label index");
        }

        let mut stats: Vec<EmotionStat> = labels
            .names()
            .iter()
            .zip(counts)
            .map(|(name, count)| EmotionStat {
                emotion: name.clone(),
                count,
                percent: percent(count, total),
            })
            .collect();
        // stable sort keeps label-id order among equal counts
        stats.sort_by(|a, b| b.count.cmp(&a.count));

        DistributionReport {
            dataset: self.corpus.info.dataset.clone(),
            split: self.corpus.info.split.clone(),
            total,
            stats,
        }
    }
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = count as f64 / total as f64 * 100.0;
    (pct * 1000.0).round() / 1000.0
}
