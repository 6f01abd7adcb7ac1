mod helpers;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use helpers::*;
use unimem::memory::backend::{DeskStore, DiaryStore, LibraryStore};
use unimem::{EngineOptions, MemoryError, MemoryQuery, MemorySource, UnifiedMemoryQueryEngine};

struct Fixture {
    library: Arc<FakeLibrary>,
    desk: Arc<FakeDesk>,
    diary: Arc<FakeDiary>,
    embedder: Arc<CountingEmbedder>,
}

impl Fixture {
    fn new(library: FakeLibrary, desk: FakeDesk, diary: FakeDiary) -> Self {
        Self {
            library: Arc::new(library),
            desk: Arc::new(desk),
            diary: Arc::new(diary),
            embedder: CountingEmbedder::new(test_embedding(0)),
        }
    }

    fn engine_without_provider(&self, options: EngineOptions) -> UnifiedMemoryQueryEngine {
        UnifiedMemoryQueryEngine::new(
            Arc::clone(&self.library) as Arc<dyn LibraryStore>,
            Arc::clone(&self.desk) as Arc<dyn DeskStore>,
            Arc::clone(&self.diary) as Arc<dyn DiaryStore>,
            options,
        )
    }

    fn engine_with(&self, options: EngineOptions) -> UnifiedMemoryQueryEngine {
        self.engine_without_provider(options)
            .with_embedding_provider(Arc::clone(&self.embedder) as Arc<dyn unimem::embedding::EmbeddingProvider>)
    }

    fn engine(&self) -> UnifiedMemoryQueryEngine {
        self.engine_with(EngineOptions::default())
    }

    fn backend_calls(&self) -> usize {
        self.library.calls.load(Ordering::SeqCst)
            + self.desk.calls.load(Ordering::SeqCst)
            + self.diary.calls.load(Ordering::SeqCst)
    }
}

fn react_diary() -> FakeDiary {
    FakeDiary {
        facts: vec![fact_row("React hooks", 8)],
        summaries: vec![summary_row("We discussed React hooks and effects")],
        decisions: vec![decision_row("Use React hooks for state", "low")],
        ..Default::default()
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[tokio::test]
async fn diary_only_query_skips_embedding() {
    let f = Fixture::new(FakeLibrary::default(), FakeDesk::default(), react_diary());
    let query = MemoryQuery::new("React hooks", "u1").sources([MemorySource::Diary]);

    let result = f.engine().search_memory(&query).await.unwrap();

    assert_eq!(result.sources_searched, vec![MemorySource::Diary]);
    assert_eq!(f.embedder.calls(), 0);
    assert_eq!(f.library.calls.load(Ordering::SeqCst), 0);
    assert_eq!(f.diary.calls.load(Ordering::SeqCst), 3);
    assert!(result.metadata.embedding_time_ms.is_none());

    let scores: Vec<f64> = result.results.iter().map(|r| r.relevance).collect();
    assert_eq!(scores.len(), 3);
    assert!(approx(scores[0], 0.8));
    assert!(approx(scores[1], 0.7));
    assert!(approx(scores[2], 0.5));
    assert!(result.results.len() <= 10);
    assert_eq!(result.query, "React hooks");
}

#[tokio::test]
async fn high_threshold_drops_weak_library_matches() {
    let diary = FakeDiary {
        summaries: vec![summary_row("hooks recap")],
        ..Default::default()
    };
    let f = Fixture::new(
        FakeLibrary::with(vec![library_chunk("weak", 0.4)]),
        FakeDesk::default(),
        diary,
    );
    let query = MemoryQuery::new("hooks", "u1").threshold(0.9);

    let result = f.engine().search_memory(&query).await.unwrap();

    assert_eq!(result.count_from(MemorySource::Library), 0);
    assert_eq!(result.total_results, 1);
    assert_eq!(result.results[0].source, MemorySource::Diary);
}

#[tokio::test]
async fn library_outage_is_isolated() {
    let diary = FakeDiary {
        summaries: vec![summary_row("hooks recap")],
        ..Default::default()
    };
    let f = Fixture::new(
        FakeLibrary::failing(),
        FakeDesk::with(vec![desk_candidate("persona notes", test_embedding(0))]),
        diary,
    );
    let query = MemoryQuery::new("hooks", "u1").personality("p1");

    let result = f.engine().search_memory(&query).await.unwrap();

    assert_eq!(result.sources_searched, MemorySource::ALL.to_vec());
    assert_eq!(result.total_results, 2);
    assert_eq!(result.count_from(MemorySource::Library), 0);
    assert_eq!(result.results[0].source, MemorySource::Desk);
    assert!(approx(result.results[0].relevance, 1.0));
}

#[tokio::test]
async fn diary_outage_is_isolated() {
    let f = Fixture::new(
        FakeLibrary::with(vec![library_chunk("hooks guide", 0.8)]),
        FakeDesk::default(),
        FakeDiary {
            behaviour: Behaviour::Fail,
            ..react_diary()
        },
    );

    let result = f
        .engine()
        .search_memory(&MemoryQuery::new("hooks", "u1"))
        .await
        .unwrap();

    assert_eq!(result.total_results, 1);
    assert_eq!(result.results[0].source, MemorySource::Library);
}

#[tokio::test]
async fn desk_requires_personality() {
    let f = Fixture::new(
        FakeLibrary::default(),
        FakeDesk::with(vec![desk_candidate("persona notes", test_embedding(0))]),
        FakeDiary::default(),
    );
    let query = MemoryQuery::new("hooks", "u1").sources(MemorySource::ALL);

    let result = f.engine().search_memory(&query).await.unwrap();

    assert_eq!(
        result.sources_searched,
        vec![MemorySource::Library, MemorySource::Diary]
    );
    assert_eq!(f.desk.calls.load(Ordering::SeqCst), 0);
    assert_eq!(result.count_from(MemorySource::Desk), 0);
}

#[tokio::test]
async fn equal_relevance_results_are_both_kept() {
    let diary = FakeDiary {
        facts: vec![fact_row("deploy window", 7)],
        summaries: vec![summary_row("deploy window discussion")],
        ..Default::default()
    };
    let f = Fixture::new(FakeLibrary::default(), FakeDesk::default(), diary);
    let query = MemoryQuery::new("deploy window", "u1").sources([MemorySource::Diary]);

    let result = f.engine().search_memory(&query).await.unwrap();

    assert_eq!(result.results.len(), 2);
    assert!(result.results.iter().all(|r| approx(r.relevance, 0.7)));
    let kinds: Vec<&str> = result
        .results
        .iter()
        .filter_map(|r| r.metadata.get("kind").and_then(|k| k.as_str()))
        .collect();
    assert!(kinds.contains(&"fact"));
    assert!(kinds.contains(&"summary"));
}

#[tokio::test]
async fn empty_query_is_rejected_before_any_call() {
    let f = Fixture::new(FakeLibrary::default(), FakeDesk::default(), react_diary());

    let err = f
        .engine()
        .search_memory(&MemoryQuery::new("", "u1"))
        .await
        .unwrap_err();

    assert!(matches!(err, MemoryError::InvalidQuery(_)));
    assert_eq!(f.backend_calls(), 0);
    assert_eq!(f.embedder.calls(), 0);
}

#[tokio::test]
async fn results_are_bounded_sorted_and_truncated() {
    let library = FakeLibrary::with(vec![
        library_chunk("a", 0.55),
        library_chunk("b", 0.99),
        library_chunk("c", 0.75),
    ]);
    let desk = FakeDesk::with(vec![
        desk_candidate("d", embedding_at(0, 1, 0.6)),
        desk_candidate("e", embedding_at(0, 2, 0.9)),
    ]);
    let diary = FakeDiary {
        facts: vec![fact_row("x", 10), fact_row("y", 3)],
        summaries: vec![summary_row("z")],
        decisions: vec![decision_row("w", "urgent")],
        ..Default::default()
    };
    let f = Fixture::new(library, desk, diary);
    let query = MemoryQuery::new("x", "u1").personality("p1").limit(3);

    let result = f.engine().search_memory(&query).await.unwrap();

    assert_eq!(result.results.len(), 3);
    assert_eq!(result.total_results, 3 + 2 + 3);
    assert!(result
        .results
        .iter()
        .all(|r| (0.0..=1.0).contains(&r.relevance)));
    assert!(result
        .results
        .windows(2)
        .all(|w| w[0].relevance >= w[1].relevance));
    assert!(approx(result.results[0].relevance, 1.0));
}

#[tokio::test]
async fn one_embedding_serves_library_and_desk() {
    let f = Fixture::new(
        FakeLibrary::with(vec![library_chunk("doc", 0.8)]),
        FakeDesk::with(vec![desk_candidate("persona", test_embedding(0))]),
        FakeDiary::default(),
    );
    let query = MemoryQuery::new("hooks", "u1").personality("p1");

    let result = f.engine().search_memory(&query).await.unwrap();

    assert_eq!(f.embedder.calls(), 1);
    assert!(result.metadata.embedding_time_ms.is_some());
    assert_eq!(result.total_results, 2);
}

#[tokio::test]
async fn vector_source_without_provider_is_not_initialized() {
    let f = Fixture::new(FakeLibrary::default(), FakeDesk::default(), react_diary());
    let engine = f.engine_without_provider(EngineOptions::default());

    let err = engine
        .search_memory(&MemoryQuery::new("hooks", "u1"))
        .await
        .unwrap_err();
    assert!(matches!(err, MemoryError::NotInitialized));

    let diary_only = MemoryQuery::new("React hooks", "u1").sources([MemorySource::Diary]);
    let result = engine.search_memory(&diary_only).await.unwrap();
    assert_eq!(result.total_results, 3);
}

#[tokio::test]
async fn gated_desk_alone_needs_no_embedding() {
    let f = Fixture::new(FakeLibrary::default(), FakeDesk::default(), FakeDiary::default());
    let engine = f.engine_without_provider(EngineOptions::default());
    let query = MemoryQuery::new("hooks", "u1").sources([MemorySource::Desk]);

    let result = engine.search_memory(&query).await.unwrap();

    assert!(result.sources_searched.is_empty());
    assert!(result.results.is_empty());
    assert_eq!(f.backend_calls(), 0);
}

#[tokio::test]
async fn embedding_failure_aborts_the_search() {
    let f = Fixture::new(FakeLibrary::default(), FakeDesk::default(), react_diary());
    let engine = f
        .engine_without_provider(EngineOptions::default())
        .with_embedding_provider(Arc::new(FailingEmbedder));

    let err = engine
        .search_memory(&MemoryQuery::new("hooks", "u1"))
        .await
        .unwrap_err();

    assert!(matches!(err, MemoryError::Embedding(ref msg) if msg.contains("429")));
    assert_eq!(f.backend_calls(), 0);
}

#[tokio::test]
async fn slow_source_times_out_without_blocking_others() {
    let diary = FakeDiary {
        summaries: vec![summary_row("hooks recap")],
        ..Default::default()
    };
    let library = FakeLibrary {
        chunks: vec![library_chunk("never seen", 0.9)],
        behaviour: Behaviour::Hang(Duration::from_secs(5)),
        ..Default::default()
    };
    let f = Fixture::new(library, FakeDesk::default(), diary);
    let engine = f.engine_with(EngineOptions {
        adapter_timeout: Some(Duration::from_millis(50)),
        ..Default::default()
    });

    let started = Instant::now();
    let result = engine
        .search_memory(&MemoryQuery::new("hooks", "u1"))
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(result.total_results, 1);
    assert_eq!(result.results[0].source, MemorySource::Diary);
}

#[tokio::test]
async fn desk_skips_mismatched_and_weak_candidates() {
    let desk = FakeDesk::with(vec![
        desk_candidate("good", test_embedding(0)),
        desk_candidate("truncated", vec![1.0, 0.0, 0.0]),
        desk_candidate("weak", embedding_at(0, 1, 0.3)),
    ]);
    let f = Fixture::new(FakeLibrary::default(), desk, FakeDiary::default());
    let query = MemoryQuery::new("hooks", "u1")
        .personality("p1")
        .sources([MemorySource::Desk]);

    let result = f.engine().search_memory(&query).await.unwrap();

    assert_eq!(result.sources_searched, vec![MemorySource::Desk]);
    assert_eq!(result.results.len(), 1);
    assert_eq!(result.results[0].content, "good");
    assert_eq!(result.results[0].metadata["file_name"], "persona.txt");
}

#[tokio::test]
async fn invalid_parameters_are_rejected() {
    let f = Fixture::new(FakeLibrary::default(), FakeDesk::default(), FakeDiary::default());
    let engine = f.engine();

    for query in [
        MemoryQuery::new("hooks", " "),
        MemoryQuery::new("hooks", "u1").limit(0),
        MemoryQuery::new("hooks", "u1").threshold(-0.1),
    ] {
        let err = engine.search_memory(&query).await.unwrap_err();
        assert!(matches!(err, MemoryError::InvalidQuery(_)));
    }
    assert_eq!(f.backend_calls(), 0);
}
