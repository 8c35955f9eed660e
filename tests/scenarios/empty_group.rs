//! Test: Empty Group - a group without devices is a successful no-op

use crate::helpers::*;
use releasectl::core::RunState;
use releasectl::execution::{PushEvent, PushOutcome};
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn test_empty_group_stops_after_listing() {
    let dir = tempfile::tempdir().unwrap();
    let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
    let service = FakeService::new(Vec::new(), calls.clone());
    let generator = FakeGenerator::new(calls.clone());

    let run = run_pipeline(service, generator, settings(dir.path()), "empty-group", calls).await;

    match &run.result {
        Ok(PushOutcome::EmptyGroup { group }) => assert_eq!(group.as_str(), "empty-group"),
        other => panic!("expected an empty group outcome, got {:?}", other),
    }
    assert_eq!(
        run.calls,
        vec![Call::ListDevices {
            group: "empty-group".to_string()
        }]
    );
    assert_eq!(run.generate_calls(), 0);
    assert_eq!(run.upload_calls(), 0);
    assert_eq!(run.deploy_calls(), 0);
    assert_eq!(run.state.state(), RunState::EmptyGroup);
    assert!(run.state.artifact.is_none());
    assert!(run.events.contains(&PushEvent::EmptyGroup {
        group: "empty-group".to_string()
    }));
}

/// Device type resolution is not attempted for an empty group
#[tokio::test]
async fn test_empty_group_without_device_type() {
    let dir = tempfile::tempdir().unwrap();
    let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
    let service = FakeService::new(Vec::new(), calls.clone());
    let generator = FakeGenerator::new(calls.clone());
    let mut settings = settings(dir.path());
    settings.device_type = None;

    let run = run_pipeline(service, generator, settings, "empty-group", calls).await;

    assert!(matches!(run.result, Ok(PushOutcome::EmptyGroup { .. })));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
