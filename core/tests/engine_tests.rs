use emotion_core::{Corpus, CorpusStore, DatasetInfo, LabelIndex, QueryEngine, Record, SeededRandom};
use std::collections::HashSet;
use std::sync::Arc;

fn tiny_corpus() -> Arc<Corpus> {
    Arc::new(Corpus::new(
        DatasetInfo::new("dair-ai/emotion", "train"),
        LabelIndex::new(["sadness", "joy"]),
        CorpusStore::new(vec![
            Record::new("I am happy", 1),
            Record::new("I am sad", 0),
            Record::new("I feel joyful", 1),
        ]),
    ))
}

fn empty_corpus() -> Arc<Corpus> {
    Arc::new(Corpus::new(
        DatasetInfo::new("dair-ai/emotion", "test"),
        LabelIndex::new(["sadness", "joy", "love"]),
        CorpusStore::default(),
    ))
}

fn numbered_corpus(n: usize) -> Arc<Corpus> {
    let records = (0..n)
        .map(|i| Record::new(format!("feeling number {i}"), (i % 3) as u32))
        .collect();
    Arc::new(Corpus::new(
        DatasetInfo::new("local", "train"),
        LabelIndex::new(["anger", "fear", "surprise"]),
        CorpusStore::new(records),
    ))
}

#[test]
fn sample_non_positive_is_empty() {
    let engine = QueryEngine::new(tiny_corpus());
    for n in [0, -1, -1000, i64::MIN] {
        assert!(engine.sample(n).is_empty());
    }
}

#[test]
fn sample_larger_than_corpus_returns_every_row_once() {
    let engine = QueryEngine::with_random(tiny_corpus(), SeededRandom::new(42));
    let rows = engine.sample(i64::MAX);
    assert_eq!(rows.len(), 3);
    let texts: HashSet<_> = rows.iter().map(|r| r.text.clone()).collect();
    assert_eq!(texts.len(), 3);
    for row in &rows {
        let expected = if row.label == 1 { "joy" } else { "sadness" };
        assert_eq!(row.emotion, expected);
    }
}

#[test]
fn sample_never_repeats_a_position() {
    let engine = QueryEngine::with_random(numbered_corpus(200), SeededRandom::new(1));
    for n in [1, 7, 50, 199, 200] {
        let rows = engine.sample(n);
        assert_eq!(rows.len(), n as usize);
        let unique: HashSet<_> = rows.iter().map(|r| r.text.clone()).collect();
        assert_eq!(unique.len(), rows.len());
    }
}

#[test]
fn sample_with_same_seed_is_reproducible() {
    let a = QueryEngine::with_random(numbered_corpus(100), SeededRandom::new(9)).sample(10);
    let b = QueryEngine::with_random(numbered_corpus(100), SeededRandom::new(9)).sample(10);
    assert_eq!(a, b);
}

#[test]
fn sample_on_empty_corpus_is_empty() {
    let engine = QueryEngine::new(empty_corpus());
    assert!(engine.sample(5).is_empty());
}

#[test]
fn count_resolves_known_emotion() {
    let engine = QueryEngine::new(tiny_corpus());
    let res = engine.count_by_emotion("joy");
    assert_eq!(res.emotion, "joy");
    assert_eq!(res.label_id, Some(1));
    assert_eq!(res.count, 2);
    assert!(res.error.is_none());
}

#[test]
fn count_ignores_case_and_whitespace() {
    let engine = QueryEngine::new(tiny_corpus());
    let base = engine.count_by_emotion("Joy");
    assert_eq!(engine.count_by_emotion(" joy "), base);
    assert_eq!(engine.count_by_emotion("JOY"), base);
}

#[test]
fn count_empty_emotion_reports_error() {
    let engine = QueryEngine::new(tiny_corpus());
    for input in ["", "   "] {
        let res = engine.count_by_emotion(input);
        assert_eq!(res.count, 0);
        assert_eq!(res.label_id, None);
        assert_eq!(res.error.as_deref(), Some("emotion must be non-empty"));
    }
}

#[test]
fn count_unknown_emotion_lists_valid_names() {
    let engine = QueryEngine::new(tiny_corpus());
    let res = engine.count_by_emotion("Boredom");
    assert_eq!(res.emotion, "boredom");
    assert_eq!(res.count, 0);
    let err = res.error.expect("error for unknown emotion");
    for name in engine.corpus().labels.names() {
        assert!(err.contains(name.as_str()), "{err} should mention {name}");
    }
}

#[test]
fn count_on_empty_corpus_is_zero() {
    let engine = QueryEngine::new(empty_corpus());
    let res = engine.count_by_emotion("love");
    assert_eq!(res.label_id, Some(2));
    assert_eq!(res.count, 0);
    assert!(res.error.is_none());
}

#[test]
fn search_returns_earliest_match_first() {
    let engine = QueryEngine::new(tiny_corpus());
    let res = engine.search_text("I am", 1);
    assert_eq!(res.matches, 1);
    assert_eq!(res.results.len(), 1);
    assert_eq!(res.results[0].index, 0);
    assert_eq!(res.results[0].row.emotion, "joy");
}

#[test]
fn search_is_case_insensitive_and_echoes_trimmed_query() {
    let engine = QueryEngine::new(tiny_corpus());
    let res = engine.search_text("  JOYful ", 5);
    assert_eq!(res.query, "JOYful");
    assert_eq!(res.limit, 5);
    let indexes: Vec<usize> = res.results.iter().map(|h| h.index).collect();
    assert_eq!(indexes, vec![2]);
}

#[test]
fn search_stops_at_limit_in_position_order() {
    let engine = QueryEngine::new(numbered_corpus(500));
    let res = engine.search_text("feeling", 7);
    let indexes: Vec<usize> = res.results.iter().map(|h| h.index).collect();
    assert_eq!(indexes, (0..7).collect::<Vec<_>>());
    assert_eq!(res.matches, res.results.len());
}

#[test]
fn search_limit_is_clamped() {
    let engine = QueryEngine::new(numbered_corpus(500));
    let low = engine.search_text("feeling", -3);
    assert_eq!(low.limit, 1);
    assert_eq!(low.matches, 1);

    let high = engine.search_text("feeling", 10_000);
    assert_eq!(high.limit, 50);
    assert_eq!(high.matches, 50);
}

#[test]
fn search_empty_query_reports_error_and_echoes_limit() {
    let engine = QueryEngine::new(tiny_corpus());
    let res = engine.search_text("   ", 12);
    assert_eq!(res.matches, 0);
    assert!(res.results.is_empty());
    assert_eq!(res.limit, 12);
    assert_eq!(res.error.as_deref(), Some("query must be non-empty"));
}

#[test]
fn search_without_matches_is_empty() {
    let engine = QueryEngine::new(tiny_corpus());
    let res = engine.search_text("furious", 5);
    assert_eq!(res.matches, 0);
    assert!(res.error.is_none());
}

#[test]
fn distribution_matches_worked_example() {
    let engine = QueryEngine::new(tiny_corpus());
    let report = engine.distribution_analysis();
    assert_eq!(report.dataset, "dair-ai/emotion");
    assert_eq!(report.split, "train");
    assert_eq!(report.total, 3);
    let stats: Vec<(&str, usize, f64)> =
        report.stats.iter().map(|s| (s.emotion.as_str(), s.count, s.percent)).collect();
    assert_eq!(stats, vec![("joy", 2, 66.667), ("sadness", 1, 33.333)]);
}

#[test]
fn distribution_covers_every_label_and_sums_to_total() {
    let corpus = Arc::new(Corpus::new(
        DatasetInfo::new("local", "train"),
        LabelIndex::new(["sadness", "joy", "love", "anger"]),
        CorpusStore::new(vec![
            Record::new("a", 3),
            Record::new("b", 1),
            Record::new("c", 3),
            Record::new("d", 0),
        ]),
    ));
    let report = QueryEngine::new(corpus).distribution_analysis();
    let names: Vec<&str> = report.stats.iter().map(|s| s.emotion.as_str()).collect();
    // ties (sadness, joy) and the zero label keep label-id order
    assert_eq!(names, vec!["anger", "sadness", "joy", "love"]);
    assert_eq!(report.stats.iter().map(|s| s.count).sum::<usize>(), report.total);
    assert!(report.stats.windows(2).all(|w| w[0].count >= w[1].count));
    assert_eq!(report.stats[3].percent, 0.0);
}

#[test]
fn distribution_on_empty_corpus_is_all_zero() {
    let report = QueryEngine::new(empty_corpus()).distribution_analysis();
    assert_eq!(report.total, 0);
    assert_eq!(report.stats.len(), 3);
    assert!(report.stats.iter().all(|s| s.count == 0 && s.percent == 0.0));
    let names: Vec<&str> = report.stats.iter().map(|s| s.emotion.as_str()).collect();
    assert_eq!(names, vec!["sadness", "joy", "love"]);
}

#[test]
fn results_serialize_with_expected_fields() {
    let engine = QueryEngine::new(tiny_corpus());
    let count = serde_json::to_value(engine.count_by_emotion("joy")).unwrap();
    assert_eq!(count, serde_json::json!({"emotion": "joy", "label_id": 1, "count": 2}));

    let search = serde_json::to_value(engine.search_text("sad", 5)).unwrap();
    assert_eq!(
        search["results"][0],
        serde_json::json!({"index": 1, "text": "I am sad", "label": 0, "emotion": "sadness"})
    );
    assert!(search.get("error").is_none());
}

#[test]
fn concurrent_samples_stay_distinct() {
    let engine = Arc::new(QueryEngine::with_random(numbered_corpus(1_000), SeededRandom::new(11)));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || {
                for _ in 0..200 {
                    let rows = engine.sample(300);
                    let unique: HashSet<_> = rows.iter().map(|r| r.text.as_str()).collect();
                    assert_eq!(rows.len(), 300);
                    assert_eq!(unique.len(), 300);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("sampling thread panicked");
    }
}

#[test]
fn distribution_skips_labels_outside_the_index() {
    let corpus = Arc::new(Corpus::new(
        DatasetInfo::new("local", "train"),
        LabelIndex::new(["sadness", "joy"]),
        CorpusStore::new(vec![Record::new("a", 1), Record::new("b", 7)]),
    ));
    let report = QueryEngine::new(corpus).distribution_analysis();
    assert_eq!(report.total, 2);
    assert_eq!(report.stats.iter().map(|s| s.count).sum::<usize>(), 1);
}
