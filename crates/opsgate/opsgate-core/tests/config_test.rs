use opsgate_core::config::*;

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = OpsgateConfig::from_toml("").unwrap();

    // Storage defaults
    assert_eq!(config.storage.db_path, "opsgate.db");
    assert_eq!(config.storage.busy_timeout_ms, 5_000);
    assert_eq!(config.storage.read_pool_size, 4);
    assert_eq!(config.storage.refresh_interval_ms, 1_000);

    // Embedding defaults
    assert_eq!(config.embedding.provider, "hash");
    assert_eq!(config.embedding.dimensions, 384);

    // Retrieval defaults
    assert_eq!(config.retrieval.rrf_k, 60);
    assert_eq!(config.retrieval.knn_num_candidates, 50);
    assert_eq!(config.retrieval.hybrid_num_candidates, 100);

    // Detection defaults
    assert_eq!(config.detection.spike_window_secs, 300);
    assert_eq!(config.detection.spike_threshold, 40);
    assert_eq!(config.detection.incident_dedup_window_secs, 600);
    assert_eq!(config.detection.critical_error_count, 500);

    // Triage defaults
    assert_eq!(config.triage.duplicate_similarity_threshold, 0.95);
    assert_eq!(config.triage.min_citations, 2);
    assert_eq!(config.triage.citations_per_source, 2);

    // Observability defaults
    assert_eq!(config.observability.log_level, "info");
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
[storage]
db_path = "/var/lib/opsgate/ops.db"
busy_timeout_ms = 250

[detection]
spike_threshold = 10
"#;
    let config = OpsgateConfig::from_toml(toml).unwrap();
    assert_eq!(config.storage.db_path, "/var/lib/opsgate/ops.db");
    assert_eq!(config.storage.busy_timeout_ms, 250);
    assert_eq!(config.storage.read_pool_size, 4); // default
    assert_eq!(config.detection.spike_threshold, 10);
    assert_eq!(config.detection.spike_window_secs, 300); // default
}

#[test]
fn spike_and_dedup_windows_are_configured_independently() {
    let config = OpsgateConfig::from_toml("[detection]\nspike_window_secs = 60\n").unwrap();
    assert_eq!(config.detection.spike_window_secs, 60);
    assert_eq!(config.detection.incident_dedup_window_secs, 600);
}

#[test]
fn malformed_toml_is_a_config_error() {
    let err = OpsgateConfig::from_toml("[storage\nbusy_timeout_ms = ").unwrap_err();
    assert!(matches!(err, opsgate_core::OpsgateError::ConfigError(_)));
}

#[test]
fn config_serde_roundtrip() {
    let config = OpsgateConfig::default();
    let toml_str = toml::to_string(&config).unwrap();
    let roundtripped = OpsgateConfig::from_toml(&toml_str).unwrap();
    assert_eq!(roundtripped.storage.db_path, config.storage.db_path);
    assert_eq!(roundtripped.triage.min_citations, config.triage.min_citations);
}

#[test]
fn load_reads_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("opsgate.toml");
    std::fs::write(&path, "[triage]\nmin_citations = 3\n").unwrap();
    let config = OpsgateConfig::load(&path).unwrap();
    assert_eq!(config.triage.min_citations, 3);
}
