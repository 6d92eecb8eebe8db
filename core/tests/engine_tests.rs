use search_core::persist::{load_metadata, save_metadata};
use search_core::testing::sample_snapshot;
use search_core::{BodyRanking, Field, PostingLocation, SearchConfig, SearchEngine, SearchError, Term};
use tempfile::{tempdir, TempDir};

fn open_sample(config: SearchConfig) -> (TempDir, SearchEngine) {
    let dir = tempdir().unwrap();
    sample_snapshot().write(dir.path()).unwrap();
    let engine = SearchEngine::open(dir.path(), config).unwrap();
    (dir, engine)
}

fn ids(hits: &[(String, String)]) -> Vec<&str> {
    hits.iter().map(|(id, _)| id.as_str()).collect()
}

#[test]
fn body_tfidf_ranks_by_partial_cosine() {
    let (_dir, engine) = open_sample(SearchConfig::default());

    // single-term queries score every match 1.0, ties by id
    let hits = engine.search_body("python");
    assert_eq!(ids(&hits), vec!["10", "20", "40"]);

    let hits = engine.search_body("Python programming");
    assert_eq!(ids(&hits), vec!["10", "20", "30", "40", "50"]);
    assert_eq!(hits[0].1, "Python (programming language)");
}

#[test]
fn body_bm25_prefers_frequent_term_in_short_docs() {
    let (_dir, engine) = open_sample(SearchConfig::default());
    let hits = engine.search_body_with("python", BodyRanking::Bm25);
    assert_eq!(ids(&hits), vec!["10", "20", "40"]);

    let config = SearchConfig { body_ranking: BodyRanking::Bm25, body_top_k: 2, ..SearchConfig::default() };
    let (_dir, engine) = open_sample(config);
    assert_eq!(ids(&engine.search_body("python")), vec!["10", "20"]);
}

#[test]
fn title_search_counts_distinct_terms() {
    let (_dir, engine) = open_sample(SearchConfig::default());
    let hits = engine.search_title("python programming python");
    assert_eq!(ids(&hits), vec!["10", "20", "30", "40", "50"]);
    assert_eq!(hits[1].1, "Monty Python");
    assert!(engine.search_title("haskell").is_empty());
}

#[test]
fn anchor_search_sums_frequencies() {
    let (_dir, engine) = open_sample(SearchConfig::default());
    let hits = engine.search_anchor("python");
    assert_eq!(ids(&hits), vec!["10", "20"]);
}

#[test]
fn fused_search_mixes_bm25_title_and_authority() {
    let (_dir, engine) = open_sample(SearchConfig::default());
    let hits = engine.search("python");
    // doc 20 has lower bm25 than doc 10 but much higher pagerank
    assert_eq!(ids(&hits), vec!["20", "10", "40"]);
    assert_eq!(hits[0].1, "Monty Python");
}

#[test]
fn blank_and_stopword_queries_return_nothing() {
    let (_dir, engine) = open_sample(SearchConfig::default());
    for q in ["", "   ", "the and of", "a b"] {
        assert!(engine.search(q).is_empty(), "{q:?}");
        assert!(engine.search_body(q).is_empty(), "{q:?}");
        assert!(engine.search_body_with(q, BodyRanking::Bm25).is_empty(), "{q:?}");
        assert!(engine.search_title(q).is_empty(), "{q:?}");
        assert!(engine.search_anchor(q).is_empty(), "{q:?}");
    }
}

#[test]
fn authority_lookups_align_with_input() {
    let (_dir, engine) = open_sample(SearchConfig::default());
    assert_eq!(engine.get_authority(&["10", "abc", "99", " 20 "]), vec![1e-6, 0.0, 0.0, 2e-5]);
    assert_eq!(engine.get_views(&["10", "30", "x"]), vec![1500, 42, 0]);
    assert!(engine.get_views::<&str>(&[]).is_empty());
}

#[test]
fn every_posting_list_matches_its_statistics() {
    let (_dir, engine) = open_sample(SearchConfig::default());
    let store = engine.store();
    for field in Field::ALL {
        let meta = store.metadata(field).unwrap();
        assert!(meta.num_terms() > 0);
        for (term, &df) in &meta.document_frequency {
            let list = store.read_posting_list(field, term).unwrap();
            assert_eq!(list.len(), df as usize, "{field} {term}");
            let total: u64 = list.iter().map(|p| p.tf as u64).sum();
            assert_eq!(total, meta.term_total[term], "{field} {term}");
        }
    }
}

#[test]
fn repeated_queries_are_stable_and_cached() {
    let (_dir, engine) = open_sample(SearchConfig::default());
    let first = engine.search("python programming");
    assert_eq!(first, engine.search("python programming"));
    assert_eq!(engine.store().cached_terms(Field::Body), 2);
}

#[test]
fn cache_limit_comes_from_config() {
    let (_dir, engine) = open_sample(SearchConfig { cache_terms: 1, ..SearchConfig::default() });
    let first = engine.search("python programming");
    assert_eq!(first, engine.search("python programming"));
    assert_eq!(engine.store().cached_terms(Field::Body), 1);
}

#[test]
fn corpus_size_override_changes_idf() {
    // with N = 2 a term found in three documents has idf log10(3/3) = 0
    let config = SearchConfig { corpus_size: Some(2), ..SearchConfig::default() };
    let (_dir, engine) = open_sample(config);
    assert!(engine.search_body("python").is_empty());
    assert_eq!(ids(&engine.search_body("snake")), vec!["40"]);
}

#[test]
fn unreadable_list_only_drops_its_term() {
    let dir = tempdir().unwrap();
    let paths = sample_snapshot().write(dir.path()).unwrap();
    let mut meta = load_metadata(&paths, Field::Body).unwrap();
    let python = Term::new("python").unwrap();
    meta.posting_locations.insert(python.clone(), vec![PostingLocation { segment: "999.bin".into(), offset: 0 }]);
    save_metadata(&paths, Field::Body, &meta).unwrap();

    let engine = SearchEngine::open(dir.path(), SearchConfig::default()).unwrap();
    assert!(engine.store().read_posting_list(Field::Body, &python).is_err());
    assert_eq!(ids(&engine.search_body("python programming")), vec!["10", "30", "50"]);
    assert_eq!(ids(&engine.search_title("python")), vec!["10", "20", "40"]);
}

#[test]
fn missing_body_index_is_fatal() {
    let dir = tempdir().unwrap();
    let paths = sample_snapshot().write(dir.path()).unwrap();
    std::fs::remove_file(paths.metadata(Field::Body)).unwrap();
    let err = SearchEngine::open(dir.path(), SearchConfig::default()).err().unwrap();
    assert!(matches!(err, SearchError::MissingIndex { field: Field::Body, .. }));
}

#[test]
fn missing_tables_degrade_to_placeholders() {
    let dir = tempdir().unwrap();
    let mut fixture = sample_snapshot();
    fixture.titles.clear();
    fixture.pagerank.clear();
    fixture.write(dir.path()).unwrap();
    let engine = SearchEngine::open(dir.path(), SearchConfig::default()).unwrap();

    let hits = engine.search_anchor("python");
    assert_eq!(hits[0], ("10".to_string(), "doc_10".to_string()));
    assert_eq!(engine.get_authority(&["10"]), vec![0.0]);
    // without titles or authority the fused order follows bm25
    assert_eq!(ids(&engine.search("python")), vec!["10", "20", "40"]);
}

#[test]
fn hits_carry_stored_titles() {
    let (_dir, engine) = open_sample(SearchConfig::default());
    let hits = engine.search_body("snake");
    assert_eq!(hits, vec![("40".to_string(), "Ball python".to_string())]);
}
