use opsgate_core::config::StorageConfig;
use opsgate_core::models::{SearchQuery, SearchRequest, Visibility};
use opsgate_core::traits::IDocumentStore;
use opsgate_storage::migrations;
use opsgate_storage::StorageEngine;
use serde_json::json;

fn file_config(dir: &tempfile::TempDir) -> StorageConfig {
    StorageConfig {
        db_path: dir.path().join("ops.db").to_string_lossy().into_owned(),
        ..Default::default()
    }
}

#[test]
fn documents_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = file_config(&dir);
    {
        let store = StorageEngine::open(&config).unwrap();
        store
            .write("ops-runs", Some("run_1"), &json!({"workflow": "ticket_triage"}), Visibility::Immediate)
            .unwrap();
    }
    let store = StorageEngine::open(&config).unwrap();
    let doc = store.get("ops-runs", "run_1").unwrap().unwrap();
    assert_eq!(doc.source["workflow"], "ticket_triage");
    let resp = store
        .search(&SearchRequest::new("ops-runs", SearchQuery::MatchAll, 10))
        .unwrap();
    assert_eq!(resp.total, 1);
}

#[test]
fn file_store_uses_wal_and_latest_schema() {
    let dir = tempfile::tempdir().unwrap();
    let store = StorageEngine::open(&file_config(&dir)).unwrap();
    let (wal, version) = store
        .pool()
        .writer
        .with_conn(|conn| {
            Ok((
                opsgate_storage::pool::pragmas::verify_wal_mode(conn)?,
                migrations::current_version(conn)?,
            ))
        })
        .unwrap();
    assert!(wal);
    assert_eq!(version, migrations::LATEST_VERSION);
    assert!(store.pool().readers.is_some());
}

#[test]
fn readers_see_writer_commits() {
    let dir = tempfile::tempdir().unwrap();
    let store = StorageEngine::open(&file_config(&dir)).unwrap();
    for i in 0..10 {
        store
            .write("tickets", Some(format!("T-{i}").as_str()), &json!({"subject": "slow dashboard"}), Visibility::Immediate)
            .unwrap();
    }
    // Round-robin touches every read connection.
    for _ in 0..8 {
        assert_eq!(store.count("tickets").unwrap(), 10);
    }
}
