//! Service-level tests over real SQLite files.

use cognitus::config::Config;
use cognitus::service::SqliteCognitus;
use cognitus::sqlite_store::SqliteCardStore;
use cognitus_core::admission::Admission;
use cognitus_core::classify::Classification;
use cognitus_core::reconcile::NoProgress;
use cognitus_core::store::CardStore;
use tempfile::TempDir;

fn test_config(tmp: &TempDir) -> Config {
    let mut cfg = Config::minimal();
    cfg.index.path = tmp.path().join("data").join("index.sqlite");
    cfg.collection.path = tmp.path().join("data").join("collection.sqlite");
    cfg
}

async fn seed_collection(cfg: &Config, cards: &[(&str, &str, &str)]) -> Vec<cognitus_core::CardId> {
    let store = SqliteCardStore::open(&cfg.collection.path).await.unwrap();
    let mut ids = Vec::new();
    for (topic, front, back) in cards {
        ids.push(store.create_card(topic, front, back).await.unwrap());
    }
    store.close().await;
    ids
}

#[tokio::test]
async fn test_sync_mirrors_existing_collection() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    seed_collection(
        &cfg,
        &[
            ("Biology", "What is the powerhouse of the cell?", "The mitochondria"),
            ("Geography", "Capital of France?", "Paris"),
        ],
    )
    .await;

    let service = SqliteCognitus::open(&cfg).await.unwrap();
    let report = service.sync(&NoProgress).await.unwrap();
    assert_eq!(report.collection_size, 2);
    assert_eq!(report.inserted, 2);
    assert_eq!(report.deleted, 0);

    let again = service.sync(&NoProgress).await.unwrap();
    assert_eq!(again.inserted, 0);
    assert_eq!(again.deleted, 0);

    let health = service.health().await.unwrap();
    assert_eq!(health.collection, 2);
    assert_eq!(health.indexed, 2);
    service.close().await;
}

#[tokio::test]
async fn test_duplicate_rejected_and_novel_admitted() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let ids = seed_collection(
        &cfg,
        &[("Biology", "The mitochondria is the powerhouse of the cell", "")],
    )
    .await;

    let service = SqliteCognitus::open(&cfg).await.unwrap();
    service.sync(&NoProgress).await.unwrap();

    let verdict = service
        .classify("The mitochondria is the powerhouse of the cell", "")
        .await
        .unwrap();
    assert_eq!(
        verdict,
        Classification::Duplicate {
            matched_id: ids[0],
            score: 100
        }
    );

    let rejected = service
        .admit("Biology", "The mitochondria is the powerhouse of the cell!", "")
        .await
        .unwrap();
    assert_eq!(
        rejected,
        Admission::Rejected {
            matched_id: ids[0],
            score: 100
        }
    );

    let admitted = service
        .admit("History", "In which year did the Berlin Wall fall?", "1989")
        .await
        .unwrap();
    let Admission::Admitted { id, indexed } = admitted else {
        panic!("expected admission, got {:?}", admitted);
    };
    assert!(indexed);
    assert!(id > ids[0]);

    let health = service.health().await.unwrap();
    assert_eq!(health.collection, 2);
    assert_eq!(health.indexed, 2);
    assert_eq!(health.missing, 0);
    service.close().await;
}

#[tokio::test]
async fn test_external_changes_heal_on_next_sync() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let ids = seed_collection(
        &cfg,
        &[
            ("t", "first question", "first answer"),
            ("t", "second question", "second answer"),
        ],
    )
    .await;

    let service = SqliteCognitus::open(&cfg).await.unwrap();
    service.sync(&NoProgress).await.unwrap();
    service.close().await;

    // Edit the collection behind the index's back.
    let store = SqliteCardStore::open(&cfg.collection.path).await.unwrap();
    store.delete_card(ids[0]).await.unwrap();
    store
        .create_card("t", "third question", "third answer")
        .await
        .unwrap();
    store.close().await;

    let service = SqliteCognitus::open(&cfg).await.unwrap();
    let before = service.health().await.unwrap();
    assert_eq!(before.missing, 1);
    assert_eq!(before.stale, 1);

    let report = service.sync(&NoProgress).await.unwrap();
    assert_eq!(report.deleted, 1);
    assert_eq!(report.inserted, 1);

    let after = service.health().await.unwrap();
    assert_eq!(after.missing, 0);
    assert_eq!(after.stale, 0);
    assert_eq!(after.collection, 2);
    service.close().await;
}

#[tokio::test]
async fn test_remove_deletes_card_and_entry() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let ids = seed_collection(&cfg, &[("t", "What is DNA?", "Genetic material")]).await;

    let service = SqliteCognitus::open(&cfg).await.unwrap();
    service.sync(&NoProgress).await.unwrap();

    assert!(service.remove(ids[0]).await.unwrap());
    assert!(!service.remove(ids[0]).await.unwrap());
    assert_eq!(
        service.classify("What is DNA?", "Genetic material").await.unwrap(),
        Classification::Novel
    );
    service.close().await;
}

#[tokio::test]
async fn test_admit_requires_sync() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);

    let service = SqliteCognitus::open(&cfg).await.unwrap();
    let err = service.admit("t", "front", "back").await.unwrap_err();
    assert!(matches!(err, cognitus_core::Error::NotSynced));
    service.close().await;
}

#[tokio::test]
async fn test_corrupt_index_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    std::fs::create_dir_all(cfg.index.path.parent().unwrap()).unwrap();
    std::fs::write(&cfg.index.path, vec![0x5au8; 16 * 1024]).unwrap();

    let err = match SqliteCognitus::open(&cfg).await {
        Ok(_) => panic!("corrupt index opened"),
        Err(e) => e,
    };
    let chain = format!("{:#}", err);
    assert!(chain.contains("Failed to open index"), "{}", chain);
    assert!(chain.contains("corrupt"), "{}", chain);

    let garbage = std::fs::read(&cfg.index.path).unwrap();
    assert!(garbage.iter().all(|b| *b == 0x5a));
}

#[tokio::test]
async fn test_index_persists_across_restarts() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);

    let service = SqliteCognitus::open(&cfg).await.unwrap();
    service.sync(&NoProgress).await.unwrap();
    service
        .admit("t", "Speed of light in vacuum?", "299,792,458 m/s")
        .await
        .unwrap();
    service.close().await;

    let service = SqliteCognitus::open(&cfg).await.unwrap();
    let report = service.sync(&NoProgress).await.unwrap();
    assert_eq!(report.inserted, 0);
    assert!(service
        .classify("Speed of light in vacuum?", "299,792,458 m/s")
        .await
        .unwrap()
        .is_duplicate());
    service.close().await;
}
