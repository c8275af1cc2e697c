use crate::labels::LabelIndex;
use crate::LabelId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub text: String,
    #[serde(rename = "label")]
    pub label_id: LabelId,
}

impl Record {
    pub fn new(text: impl Into<String>, label_id: LabelId) -> Self {
        Self { text: text.into(), label_id }
    }
}

/// A record joined with its emotion name, for output only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedRow {
    pub text: String,
    pub label: LabelId,
    pub emotion: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub dataset: String,
    pub split: String,
}

impl DatasetInfo {
    pub fn new(dataset: impl Into<String>, split: impl Into<String>) -> Self {
        Self { dataset: dataset.into(), split: split.into() }
    }
}

/// Ordered, immutable records. Position is identity.
#[derive(Debug, Clone, Default)]
pub struct CorpusStore {
    records: Vec<Record>,
    label_column: Vec<LabelId>,
}

impl CorpusStore {
    pub fn new(records: Vec<Record>) -> Self {
        let label_column = records.iter().map(|r| r.label_id).collect();
        Self { records, label_column }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Record> {
        self.records.get(position)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Just the label ids, in corpus order.
    pub fn label_column(&self) -> &[LabelId] {
        &self.label_column
    }
}

/// Everything the query engine reads: identity, label schema and records.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub info: DatasetInfo,
    pub labels: LabelIndex,
    pub store: CorpusStore,
}

impl Corpus {
    pub fn new(info: DatasetInfo, labels: LabelIndex, store: CorpusStore) -> Self {
        Self { info, labels, store }
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Resolve a record into an output row. Loaders reject unknown labels, so
    /// the fallback name only shows up for hand-built corpora.
    pub fn format_row(&self, record: &Record) -> FormattedRow {
        let emotion = self.labels.name_of(record.label_id).unwrap_or_default().to_string();
        FormattedRow { text: record.text.clone(), label: record.label_id, emotion }
    }

    pub fn row_at(&self, position: usize) -> Option<FormattedRow> {
        self.store.get(position).map(|r| self.format_row(r))
    }
}
