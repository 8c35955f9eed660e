//! Test utilities: recording fakes for the service and the generator

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use releasectl::artifact::{ArtifactGenerator, GenerateRequest, GenerationError};
use releasectl::client::{
    ApiError, ArtifactStore, DeploymentError, DeploymentRequest, DeploymentService,
    DeviceDirectory, DirectoryError, UploadError, UploadRequest,
};
use releasectl::core::{
    Attribute, Credential, Device, DeviceSet, Group, PushConfig, PushState, ReleaseSettings,
    ServerConfig,
};
use releasectl::execution::{PushError, PushEvent, PushOutcome, ReleasePipeline};
use reqwest::{Method, StatusCode};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// A call made to one of the fakes, in the order it happened
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListDevices { group: String },
    Generate(GenerateRequest),
    Upload(UploadRequest),
    Deploy(DeploymentRequest),
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn device(id: &str, device_type: &str) -> Device {
    Device {
        id: id.to_string(),
        attributes: vec![Attribute {
            name: "device_type".to_string(),
            value: serde_json::Value::String(device_type.to_string()),
            description: None,
        }],
        updated_ts: Some("2024-01-01T00:00:00Z".to_string()),
    }
}

fn status_error(method: Method, status: u16) -> ApiError {
    ApiError::Status {
        method,
        url: "http://fake".to_string(),
        status: StatusCode::from_u16(status).unwrap(),
        body: String::new(),
    }
}

/// Management service fake that answers from canned data
pub struct FakeService {
    devices: Vec<Device>,
    directory_status: Option<u16>,
    upload_status: Option<u16>,
    deploy_status: Option<u16>,
    calls: CallLog,
}

impl FakeService {
    pub fn new(devices: Vec<Device>, calls: CallLog) -> Self {
        Self {
            devices,
            directory_status: None,
            upload_status: None,
            deploy_status: None,
            calls,
        }
    }

    /// Make device listing fail with `status`
    pub fn failing_directory(mut self, status: u16) -> Self {
        self.directory_status = Some(status);
        self
    }

    /// Make the upload fail with `status`
    pub fn failing_upload(mut self, status: u16) -> Self {
        self.upload_status = Some(status);
        self
    }

    /// Make deployment creation fail with `status`
    pub fn failing_deploy(mut self, status: u16) -> Self {
        self.deploy_status = Some(status);
        self
    }
}

#[async_trait]
impl DeviceDirectory for FakeService {
    async fn list_devices(
        &self,
        group: &Group,
        _credential: &Credential,
    ) -> Result<DeviceSet, DirectoryError> {
        self.calls.lock().unwrap().push(Call::ListDevices {
            group: group.to_string(),
        });
        match self.directory_status {
            Some(status) => Err(DirectoryError {
                group: group.to_string(),
                source: status_error(Method::GET, status),
            }),
            None => Ok(DeviceSet::new(self.devices.clone())),
        }
    }
}

#[async_trait]
impl ArtifactStore for FakeService {
    async fn upload(
        &self,
        request: &UploadRequest,
        _credential: &Credential,
    ) -> Result<(), UploadError> {
        self.calls.lock().unwrap().push(Call::Upload(request.clone()));
        assert!(
            request.path.exists(),
            "upload called without an artifact on disk"
        );
        match self.upload_status {
            Some(status) => Err(UploadError {
                path: request.path.clone(),
                source: status_error(Method::POST, status),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DeploymentService for FakeService {
    async fn deploy(
        &self,
        request: &DeploymentRequest,
        _credential: &Credential,
    ) -> Result<(), DeploymentError> {
        self.calls.lock().unwrap().push(Call::Deploy(request.clone()));
        match self.deploy_status {
            Some(status) => Err(DeploymentError {
                artifact_name: request.artifact_name.clone(),
                source: status_error(Method::POST, status),
            }),
            None => Ok(()),
        }
    }
}

/// Generator fake that writes a small file, or fails without writing one
pub struct FakeGenerator {
    fail_with_code: Option<i32>,
    calls: CallLog,
}

impl FakeGenerator {
    pub fn new(calls: CallLog) -> Self {
        Self {
            fail_with_code: None,
            calls,
        }
    }

    pub fn failing(mut self, code: i32) -> Self {
        self.fail_with_code = Some(code);
        self
    }
}

#[async_trait]
impl ArtifactGenerator for FakeGenerator {
    async fn generate(&self, request: &GenerateRequest) -> Result<(), GenerationError> {
        self.calls.lock().unwrap().push(Call::Generate(request.clone()));
        if let Some(code) = self.fail_with_code {
            return Err(GenerationError::Exit {
                code: Some(code),
                stderr: "packaging failed".to_string(),
            });
        }
        tokio::fs::write(&request.output_path, b"artifact")
            .await
            .map_err(|source| GenerationError::Spawn {
                program: "fake".to_string(),
                source,
            })?;
        Ok(())
    }
}

/// Release settings writing artifacts into `output_dir`
pub fn settings(output_dir: &Path) -> ReleaseSettings {
    ReleaseSettings::new()
        .with_device_type("raspberrypi4")
        .with_output_dir(output_dir)
        .with_progress(false)
}

/// Everything observed from one run
pub struct RunResult {
    pub result: Result<PushOutcome, PushError>,
    pub state: PushState,
    pub calls: Vec<Call>,
    pub events: Vec<PushEvent>,
}

impl RunResult {
    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(*c)).count()
    }

    pub fn generate_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::Generate(_)))
    }

    pub fn upload_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::Upload(_)))
    }

    pub fn deploy_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::Deploy(_)))
    }

    pub fn error(&self) -> &PushError {
        self.result.as_ref().expect_err("run should have failed")
    }
}

/// Run the pipeline for `group` with a fixed clock, recording calls and events
pub async fn run_pipeline<S, G>(
    service: S,
    generator: G,
    settings: ReleaseSettings,
    group: &str,
    calls: CallLog,
) -> RunResult
where
    S: DeviceDirectory + ArtifactStore + DeploymentService,
    G: ArtifactGenerator,
{
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();

    let config = PushConfig::new(ServerConfig::default(), settings);
    let mut pipeline = ReleasePipeline::new(service, generator, config).with_clock(fixed_time);
    pipeline.add_event_handler(move |event| sink.lock().unwrap().push(event.clone()));

    let mut state = PushState::new(Group::new(group).unwrap());
    let result = pipeline.run(&mut state, &Credential::new("token")).await;

    let calls = calls.lock().unwrap().clone();
    let events = events.lock().unwrap().clone();
    RunResult {
        result,
        state,
        calls,
        events,
    }
}
