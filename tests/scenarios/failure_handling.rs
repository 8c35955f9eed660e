//! Test: Failure Handling - the first failing step ends the run

use crate::helpers::*;
use releasectl::core::{Credential, Group, PushConfig, PushState, RunState, ServerConfig};
use releasectl::execution::{PushError, PushEvent, PushOutcome, ReleasePipeline, Stage};
use std::sync::{Arc, Mutex};

fn new_calls() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Device listing rejected: nothing else runs
#[tokio::test]
async fn test_directory_unauthorized() {
    let dir = tempfile::tempdir().unwrap();
    let calls = new_calls();
    let service = FakeService::new(vec![device("dev1", "raspberrypi4")], calls.clone())
        .failing_directory(401);
    let generator = FakeGenerator::new(calls.clone());

    let run = run_pipeline(service, generator, settings(dir.path()), "qa-fleet", calls).await;

    let err = run.error();
    assert!(matches!(err, PushError::Directory(_)));
    assert_eq!(err.stage(), Stage::Directory);
    assert_eq!(err.status(), Some(401));
    assert_eq!(run.calls.len(), 1);
    assert_eq!(run.state.state(), RunState::DirectoryFailed);
}

/// Generator failure: no upload, no deployment, no file
#[tokio::test]
async fn test_generation_failure() {
    let dir = tempfile::tempdir().unwrap();
    let calls = new_calls();
    let service = FakeService::new(vec![device("dev1", "raspberrypi4")], calls.clone());
    let generator = FakeGenerator::new(calls.clone()).failing(127);

    let run = run_pipeline(service, generator, settings(dir.path()), "qa-fleet", calls).await;

    let err = run.error();
    assert!(matches!(err, PushError::Generation { .. }));
    assert_eq!(err.stage(), Stage::Generation);
    assert!(err.hint().unwrap().contains("installed"));
    assert_eq!(run.generate_calls(), 1);
    assert_eq!(run.upload_calls(), 0);
    assert_eq!(run.deploy_calls(), 0);
    assert_eq!(run.state.state(), RunState::GenerationFailed);
    assert!(run.state.artifact.is_none());
}

/// Upload failure: artifact stays on disk and no deployment is made
#[tokio::test]
async fn test_upload_failure_keeps_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let calls = new_calls();
    let service = FakeService::new(vec![device("dev1", "raspberrypi4")], calls.clone())
        .failing_upload(500);
    let generator = FakeGenerator::new(calls.clone());

    let run = run_pipeline(service, generator, settings(dir.path()), "qa-fleet", calls).await;

    let err = run.error();
    assert!(matches!(err, PushError::Upload { .. }));
    assert_eq!(err.stage(), Stage::Upload);
    assert_eq!(err.status(), Some(500));
    assert_eq!(run.deploy_calls(), 0);

    let path = dir.path().join("qa-fleet-2024-01-01T00:00:00Z.mender");
    assert!(path.exists());
    assert_eq!(err.retained_artifact(), Some(path.as_path()));
    assert!(run.events.contains(&PushEvent::ArtifactRetained { path }));
    assert_eq!(run.state.state(), RunState::UploadFailed);
}

/// Deployment rejected: status is reported and the artifact is kept
#[tokio::test]
async fn test_deployment_failure() {
    let dir = tempfile::tempdir().unwrap();
    let calls = new_calls();
    let service = FakeService::new(vec![device("dev1", "raspberrypi4")], calls.clone())
        .failing_deploy(409);
    let generator = FakeGenerator::new(calls.clone());

    let run = run_pipeline(service, generator, settings(dir.path()), "qa-fleet", calls).await;

    let err = run.error();
    assert!(matches!(err, PushError::Deployment { .. }));
    assert_eq!(err.stage(), Stage::Deployment);
    assert_eq!(err.status(), Some(409));
    assert_eq!(run.upload_calls(), 1);
    assert_eq!(run.deploy_calls(), 1);
    assert!(dir.path().join("qa-fleet-2024-01-01T00:00:00Z.mender").exists());
    assert_eq!(run.state.state(), RunState::DeploymentFailed);
}

/// Devices with different types and no configured type: nothing is built
#[tokio::test]
async fn test_conflicting_device_types() {
    let dir = tempfile::tempdir().unwrap();
    let calls = new_calls();
    let service = FakeService::new(
        vec![device("dev1", "raspberrypi4"), device("dev2", "beaglebone")],
        calls.clone(),
    );
    let generator = FakeGenerator::new(calls.clone());
    let mut settings = settings(dir.path());
    settings.device_type = None;

    let run = run_pipeline(service, generator, settings, "mixed", calls).await;

    let err = run.error();
    assert!(matches!(err, PushError::DeviceType { .. }));
    assert_eq!(err.stage(), Stage::DeviceType);
    assert!(err.hint().unwrap().contains("--device-type"));
    assert_eq!(run.generate_calls(), 0);
    assert_eq!(run.state.state(), RunState::DeviceTypeFailed);
    assert!(run.events.contains(&PushEvent::StepFailed {
        stage: Stage::DeviceType,
        error: err.to_string(),
    }));
}

/// Generator failure hint names the configured executable
#[tokio::test]
async fn test_generation_hint_uses_configured_generator() {
    let dir = tempfile::tempdir().unwrap();
    let calls = new_calls();
    let service = FakeService::new(vec![device("dev1", "raspberrypi4")], calls.clone());
    let generator = FakeGenerator::new(calls.clone()).failing(1);
    let mut settings = settings(dir.path());
    settings.generator = "/opt/custom-gen".to_string();

    let run = run_pipeline(service, generator, settings, "qa-fleet", calls).await;

    let hint = run.error().hint().unwrap();
    assert!(hint.contains("/opt/custom-gen"), "{}", hint);
}

/// A state that already ran is turned away before any call
#[tokio::test]
async fn test_finished_state_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let calls = new_calls();
    let pipeline = pipeline_with_token(&dir.path().join("authtoken"), dir.path(), calls.clone());

    let mut state = PushState::new(Group::new("qa-fleet").unwrap());
    state.transition(RunState::DevicesResolved);
    state.transition(RunState::EmptyGroup);

    let err = pipeline
        .run(&mut state, &Credential::new("token"))
        .await
        .unwrap_err();

    assert!(matches!(err, PushError::AlreadyStarted(RunState::EmptyGroup)));
    assert_eq!(err.stage(), Stage::Setup);
    assert_eq!(state.state(), RunState::EmptyGroup);
    assert!(calls.lock().unwrap().is_empty());
}

/// A failed step is reported once as an event
#[tokio::test]
async fn test_single_failure_event() {
    let dir = tempfile::tempdir().unwrap();
    let calls = new_calls();
    let service = FakeService::new(vec![device("dev1", "raspberrypi4")], calls.clone())
        .failing_deploy(500);
    let generator = FakeGenerator::new(calls.clone());

    let run = run_pipeline(service, generator, settings(dir.path()), "qa-fleet", calls).await;

    let failures: Vec<_> = run
        .events
        .iter()
        .filter(|e| matches!(e, PushEvent::StepFailed { .. }))
        .collect();
    assert_eq!(failures.len(), 1);
    assert!(matches!(
        failures[0],
        PushEvent::StepFailed {
            stage: Stage::Deployment,
            ..
        }
    ));
}

fn pipeline_with_token(
    token_path: &std::path::Path,
    output_dir: &std::path::Path,
    calls: CallLog,
) -> ReleasePipeline<FakeService, FakeGenerator> {
    let service = FakeService::new(vec![device("dev1", "raspberrypi4")], calls.clone());
    let generator = FakeGenerator::new(calls);
    let config = PushConfig::new(
        ServerConfig::default().with_token_path(token_path),
        settings(output_dir),
    );
    ReleasePipeline::new(service, generator, config)
}

/// No token on disk: nothing is sent
#[tokio::test]
async fn test_missing_token_file() {
    let dir = tempfile::tempdir().unwrap();
    let calls = new_calls();
    let pipeline = pipeline_with_token(&dir.path().join("authtoken"), dir.path(), calls.clone());

    let err = pipeline.push("qa-fleet").await.unwrap_err();

    assert!(matches!(err, PushError::Credential(_)));
    assert_eq!(err.stage(), Stage::Setup);
    assert_eq!(err.hint().as_deref(), Some("Please log in first"));
    assert!(calls.lock().unwrap().is_empty());
}

/// Group names with spaces or slashes are rejected before any call
#[tokio::test]
async fn test_invalid_group_name() {
    let dir = tempfile::tempdir().unwrap();
    let token = dir.path().join("authtoken");
    std::fs::write(&token, "tok\n").unwrap();
    let calls = new_calls();
    let pipeline = pipeline_with_token(&token, dir.path(), calls.clone());

    for group in ["", "qa fleet", "qa/fleet"] {
        let err = pipeline.push(group).await.unwrap_err();
        assert!(matches!(err, PushError::InvalidGroup(_)), "{:?}", group);
    }
    assert!(calls.lock().unwrap().is_empty());
}

/// A readable token lets the run go through
#[tokio::test]
async fn test_push_reads_token() {
    let dir = tempfile::tempdir().unwrap();
    let token = dir.path().join("authtoken");
    std::fs::write(&token, "tok\n").unwrap();
    let calls = new_calls();
    let pipeline = pipeline_with_token(&token, dir.path(), calls.clone());

    let outcome = pipeline.push("qa-fleet").await.unwrap();

    assert!(matches!(outcome, PushOutcome::Deployed { device_count: 1, .. }));
    assert_eq!(calls.lock().unwrap().len(), 4);
}
