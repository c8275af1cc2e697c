use std::fmt;

pub const DEFAULT_DATASET: &str = "dair-ai/emotion";
pub const DEFAULT_SPLIT: &str = "train";

/// Names a dataset split on the hub, plus the credential used to read it.
#[derive(Clone, PartialEq, Eq)]
pub struct DatasetSource {
    pub dataset: String,
    pub split: String,
    /// datasets-server config; the first one listed is used when unset
    pub config: Option<String>,
    pub token: Option<String>,
}

impl DatasetSource {
    pub fn new(dataset: impl Into<String>, split: impl Into<String>) -> Self {
        Self { dataset: dataset.into(), split: split.into(), config: None, token: None }
    }

    pub fn with_config(mut self, config: Option<String>) -> Self {
        self.config = config.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }
}

impl Default for DatasetSource {
    fn default() -> Self {
        Self::new(DEFAULT_DATASET, DEFAULT_SPLIT)
    }
}

// Tokens stay out of logs.
impl fmt::Debug for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetSource")
            .field("dataset", &self.dataset)
            .field("split", &self.split)
            .field("config", &self.config)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
