pub mod config;
pub mod corpus;
pub mod engine;
pub mod labels;
pub mod loader;
pub mod random;

pub use config::DatasetSource;
pub use corpus::{Corpus, CorpusStore, DatasetInfo, FormattedRow, Record};
pub use engine::{
    CountResult, DistributionReport, EmotionStat, QueryEngine, SearchHit, SearchResult,
};
pub use labels::LabelIndex;
pub use loader::{CorpusLoader, LoadError, SnapshotLoader};
pub use random::{RandomSource, SeededRandom, ThreadRandom};

pub type LabelId = u32;
