use crate::corpus::{Corpus, CorpusStore, DatasetInfo, Record};
use crate::labels::LabelIndex;
use crate::LabelId;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("dataset unavailable: {0}")]
    Unavailable(String),
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("{}:{line}: malformed record: {reason}", path.display())]
    Malformed { path: PathBuf, line: usize, reason: String },
    #[error("record {position} has label {label} but only {labels} labels are defined")]
    LabelOutOfRange { position: usize, label: LabelId, labels: usize },
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Anything that can produce the corpus at startup.
pub trait CorpusLoader {
    fn load(&self) -> Result<Corpus, LoadError>;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub dataset: String,
    pub split: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    pub labels: Vec<String>,
    pub num_rows: usize,
    pub created_at: String,
    pub version: u32,
}

/// Paths inside a snapshot directory.
pub struct SnapshotPaths {
    pub root: PathBuf,
}

impl SnapshotPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    pub fn meta(&self) -> PathBuf {
        self.root.join("meta.json")
    }

    pub fn records(&self) -> PathBuf {
        self.root.join("records.jsonl")
    }
}

/// Reads a snapshot directory: `meta.json` plus every `*.jsonl` shard.
pub struct SnapshotLoader {
    paths: SnapshotPaths,
}

impl SnapshotLoader {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { paths: SnapshotPaths::new(root) }
    }
}

impl CorpusLoader for SnapshotLoader {
    fn load(&self) -> Result<Corpus, LoadError> {
        let meta = load_meta(&self.paths)?;
        if meta.version != SNAPSHOT_VERSION {
            return Err(LoadError::UnsupportedVersion(meta.version));
        }
        let labels = LabelIndex::new(meta.labels);

        let mut records = Vec::with_capacity(meta.num_rows);
        for shard in shard_files(&self.paths.root) {
            read_shard(&shard, &mut records)?;
        }
        validate_labels(&records, &labels)?;
        if records.len() != meta.num_rows {
            tracing::warn!(
                expected = meta.num_rows,
                found = records.len(),
                "snapshot row count differs from meta.json"
            );
        }

        tracing::info!(
            dataset = %meta.dataset,
            split = %meta.split,
            rows = records.len(),
            labels = labels.len(),
            "loaded snapshot"
        );
        let info = DatasetInfo::new(meta.dataset, meta.split);
        Ok(Corpus::new(info, labels, CorpusStore::new(records)))
    }
}

pub fn load_meta(paths: &SnapshotPaths) -> Result<SnapshotMeta, LoadError> {
    let path = paths.meta();
    if !path.is_file() {
        return Err(LoadError::Unavailable(format!("no snapshot at {}", paths.root.display())));
    }
    let f = File::open(path)?;
    let meta = serde_json::from_reader(BufReader::new(f))?;
    Ok(meta)
}

/// Write `corpus` as a snapshot directory that [`SnapshotLoader`] can read back.
pub fn save_snapshot(
    paths: &SnapshotPaths,
    corpus: &Corpus,
    config: Option<&str>,
) -> Result<(), LoadError> {
    create_dir_all(&paths.root)?;

    let mut out = BufWriter::new(File::create(paths.records())?);
    for record in corpus.store.records() {
        serde_json::to_writer(&mut out, record)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    let meta = SnapshotMeta {
        dataset: corpus.info.dataset.clone(),
        split: corpus.info.split.clone(),
        config: config.map(str::to_string),
        labels: corpus.labels.names().to_vec(),
        num_rows: corpus.len(),
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default(),
        version: SNAPSHOT_VERSION,
    };
    let mut f = File::create(paths.meta())?;
    f.write_all(serde_json::to_string_pretty(&meta)?.as_bytes())?;
    Ok(())
}

/// Every label must index into the label list.
pub fn validate_labels(records: &[Record], labels: &LabelIndex) -> Result<(), LoadError> {
    match records.iter().position(|r| !labels.contains(r.label_id)) {
        Some(position) => Err(LoadError::LabelOutOfRange {
            position,
            label: records[position].label_id,
            labels: labels.len(),
        }),
        None => Ok(()),
    }
}

fn shard_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("jsonl"))
        .collect()
}

fn read_shard(path: &Path, records: &mut Vec<Record>) -> Result<(), LoadError> {
    let reader = BufReader::new(File::open(path)?);
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: Record = serde_json::from_str(&line).map_err(|e| LoadError::Malformed {
            path: path.to_path_buf(),
            line: i + 1,
            reason: e.to_string(),
        })?;
        records.push(record);
    }
    Ok(())
}
