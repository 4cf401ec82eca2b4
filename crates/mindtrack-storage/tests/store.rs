use mindtrack_core::ids::{ResponseId, ScoringSystemId};
use mindtrack_core::models::score::{AdditionalData, ResponseScore};
use mindtrack_storage::error::StorageError;
use mindtrack_storage::json::write_json_atomic;
use mindtrack_storage::ledger::{LEDGER_VERSION, Ledger};
use mindtrack_storage::{JsonFileScoreStore, MemoryScoreStore, ScoreStore};

const SYSTEM_A: ScoringSystemId = ScoringSystemId(1);
const SYSTEM_B: ScoringSystemId = ScoringSystemId(2);

fn score(response_id: ResponseId, system_id: ScoringSystemId, raw_score: f64) -> ResponseScore {
    ResponseScore {
        response_id,
        scoring_system_id: system_id,
        raw_score,
        score_range: None,
        z_score: None,
        percentile: None,
        additional_data: AdditionalData::default(),
        notes: String::new(),
        calculated_at: jiff::Timestamp::UNIX_EPOCH,
    }
}

/// Behaviour every store must share.
fn exercise(store: &dyn ScoreStore) {
    let first = ResponseId::new();
    let second = ResponseId::new();

    assert!(store.upsert(score(first, SYSTEM_A, 10.0)).unwrap().is_none());
    assert!(store.upsert(score(second, SYSTEM_A, 20.0)).unwrap().is_none());
    assert!(store.upsert(score(first, SYSTEM_B, 99.0)).unwrap().is_none());

    // Rescoring overwrites rather than duplicating.
    let replaced = store.upsert(score(first, SYSTEM_A, 12.0)).unwrap();
    assert_eq!(replaced.map(|s| s.raw_score), Some(10.0));
    assert_eq!(store.scores_for(SYSTEM_A).unwrap().len(), 2);

    assert_eq!(store.get(first, SYSTEM_A).unwrap().map(|s| s.raw_score), Some(12.0));
    assert!(store.get(second, SYSTEM_B).unwrap().is_none());

    assert_eq!(store.population(SYSTEM_A, None).unwrap(), vec![12.0, 20.0]);
    assert_eq!(store.population(SYSTEM_A, Some(first)).unwrap(), vec![20.0]);
    assert_eq!(store.population(SYSTEM_B, Some(second)).unwrap(), vec![99.0]);

    let order: Vec<ResponseId> = store
        .scores_for(SYSTEM_A)
        .unwrap()
        .iter()
        .map(|s| s.response_id)
        .collect();
    assert_eq!(order, vec![first, second]);
}

#[test]
fn memory_store_upserts_by_response_and_system() {
    let store = MemoryScoreStore::new();
    exercise(&store);
    assert_eq!(store.len().unwrap(), 3);
    assert!(!store.is_empty().unwrap());
}

#[test]
fn file_store_upserts_by_response_and_system() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileScoreStore::open(dir.path().join("scores.json")).unwrap();
    exercise(&store);
}

#[test]
fn file_store_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("scores.json");
    let response = ResponseId::new();

    {
        let store = JsonFileScoreStore::open(&path).unwrap();
        store.upsert(score(response, SYSTEM_A, 7.5)).unwrap();
    }
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());

    let reopened = JsonFileScoreStore::open(&path).unwrap();
    let stored = reopened.get(response, SYSTEM_A).unwrap().unwrap();
    assert_eq!(stored.raw_score, 7.5);
    assert_eq!(stored.calculated_at, jiff::Timestamp::UNIX_EPOCH);

    let raw: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(raw["ledger_version"], LEDGER_VERSION);
    assert_eq!(raw["scores"].as_array().map(Vec::len), Some(1));
}

#[test]
fn non_finite_scores_never_reach_the_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scores.json");
    let kept = ResponseId::new();
    let overflowed = ResponseId::new();

    {
        let store = JsonFileScoreStore::open(&path).unwrap();
        store.upsert(score(kept, SYSTEM_A, 4.0)).unwrap();

        let err = store
            .upsert(score(overflowed, SYSTEM_A, f64::INFINITY))
            .unwrap_err();
        assert!(matches!(
            err,
            StorageError::NonFiniteScore { field: "raw_score", .. }
        ));

        let mut bad_z = score(kept, SYSTEM_A, 5.0);
        bad_z.z_score = Some(f64::NAN);
        assert!(store.upsert(bad_z).is_err());
        assert_eq!(store.population(SYSTEM_A, None).unwrap(), vec![4.0]);
    }

    let reopened = JsonFileScoreStore::open(&path).unwrap();
    assert_eq!(reopened.population(SYSTEM_A, None).unwrap(), vec![4.0]);
    assert!(reopened.get(overflowed, SYSTEM_A).unwrap().is_none());

    let memory = MemoryScoreStore::new();
    assert!(memory.upsert(score(kept, SYSTEM_B, f64::NAN)).is_err());
    assert!(memory.is_empty().unwrap());
}

#[test]
fn missing_ledger_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileScoreStore::open(dir.path().join("absent.json")).unwrap();
    assert!(store.population(SYSTEM_A, None).unwrap().is_empty());
}

#[test]
fn newer_ledger_versions_are_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scores.json");
    let future = Ledger {
        ledger_version: LEDGER_VERSION + 1,
        scores: Vec::new(),
    };
    write_json_atomic(&path, &future).unwrap();

    let err = JsonFileScoreStore::open(&path).unwrap_err();
    assert!(matches!(err, StorageError::UnsupportedLedgerVersion { .. }));
}

#[test]
fn corrupt_ledger_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scores.json");
    std::fs::write(&path, b"{ not json").unwrap();
    assert!(matches!(
        JsonFileScoreStore::open(&path),
        Err(StorageError::Serialization(_))
    ));
}

#[test]
fn concurrent_upserts_keep_one_score_per_pair() {
    let store = std::sync::Arc::new(MemoryScoreStore::new());
    let response = ResponseId::new();
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            std::thread::spawn(move || {
                store.upsert(score(response, SYSTEM_A, i as f64)).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(store.scores_for(SYSTEM_A).unwrap().len(), 1);
}
