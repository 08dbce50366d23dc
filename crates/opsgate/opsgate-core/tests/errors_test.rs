use opsgate_core::errors::*;

#[test]
fn not_found_carries_collection_and_id() {
    let err = OpsgateError::not_found("tickets", "TKT-1");
    let msg = err.to_string();
    assert!(msg.contains("tickets"));
    assert!(msg.contains("TKT-1"));
    assert!(err.is_not_found());
    assert!(err.run_id().is_none());
}

#[test]
fn evidence_required_carries_counts() {
    let err = OpsgateError::EvidenceRequired {
        provided: 1,
        required: 2,
    };
    let msg = err.to_string();
    assert!(msg.contains('1'));
    assert!(msg.contains('2'));
}

#[test]
fn busy_storage_error_converts_with_timeout() {
    let err: OpsgateError = StorageError::Busy { timeout_ms: 5000 }.into();
    assert!(matches!(err, OpsgateError::StorageError(StorageError::Busy { .. })));
    assert!(err.to_string().contains("5000"));
}

#[test]
fn run_failed_exposes_run_id() {
    let err: OpsgateError = WorkflowError::RunFailed {
        run_id: "run_1_abcd".into(),
        workflow: "ticket_triage".into(),
        reason: "store unavailable".into(),
    }
    .into();
    assert_eq!(err.run_id(), Some("run_1_abcd"));
    assert!(err.to_string().contains("ticket_triage"));
    assert!(!err.is_not_found());
}

#[test]
fn serde_json_errors_convert() {
    let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err: OpsgateError = parse.into();
    assert!(matches!(err, OpsgateError::SerializationError(_)));
}

#[test]
fn embedding_dimension_mismatch_carries_values() {
    let err = EmbeddingError::DimensionMismatch {
        expected: 384,
        actual: 12,
    };
    let msg = err.to_string();
    assert!(msg.contains("384"));
    assert!(msg.contains("12"));
}
