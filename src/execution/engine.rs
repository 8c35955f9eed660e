//! Release pipeline - runs one push from device lookup to deployment

use crate::{
    artifact::{Artifact, ArtifactGenerator, DirectoryArtifactGen, GenerateRequest},
    client::{
        ApiError, ArtifactStore, DeploymentRequest, DeploymentService, DeviceDirectory,
        ManagementClient, UploadRequest,
    },
    core::{Credential, Group, PushConfig, PushState, RunState},
    execution::{PushError, Stage},
};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Events that can occur during a push run
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    RunStarted {
        run_id: Uuid,
        group: String,
    },
    DevicesResolved {
        group: String,
        count: usize,
    },
    EmptyGroup {
        group: String,
    },
    ArtifactGenerated {
        name: String,
        path: PathBuf,
        device_type: String,
    },
    ArtifactUploaded {
        name: String,
    },
    DeploymentCreated {
        name: String,
        device_count: usize,
    },
    ArtifactRemoved {
        path: PathBuf,
    },
    StepFailed {
        stage: Stage,
        error: String,
    },
    /// The artifact file was kept on disk after a failure
    ArtifactRetained {
        path: PathBuf,
    },
}

/// How a successful run ended
#[derive(Debug, Clone, PartialEq)]
pub enum PushOutcome {
    /// The group had no devices; nothing was built or deployed
    EmptyGroup { group: Group },

    /// The artifact was deployed to every device in the group
    Deployed {
        run_id: Uuid,
        artifact_name: String,
        device_count: usize,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(&PushEvent) + Send + Sync>;

/// Source of the timestamp embedded in artifact names
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Runs the push workflow against a management service and a generator
///
/// Steps run strictly in order and the first failure ends the run. Nothing
/// done by an earlier step is undone: a generated artifact stays on disk
/// unless the deployment was created.
pub struct ReleasePipeline<S, G> {
    service: S,
    generator: G,
    config: PushConfig,
    clock: Clock,
    event_handlers: Vec<EventHandler>,
}

impl ReleasePipeline<ManagementClient, DirectoryArtifactGen> {
    /// Build a pipeline that talks to the configured server and runs the
    /// configured generator executable
    pub fn from_config(config: PushConfig) -> Result<Self, ApiError> {
        let service = ManagementClient::new(&config.server)?;
        let generator = DirectoryArtifactGen::new(
            config.release.generator.clone(),
            config.release.generator_timeout_secs,
        );
        Ok(Self::new(service, generator, config))
    }
}

impl<S, G> ReleasePipeline<S, G>
where
    S: DeviceDirectory + ArtifactStore + DeploymentService,
    G: ArtifactGenerator,
{
    pub fn new(service: S, generator: G, config: PushConfig) -> Self {
        Self {
            service,
            generator,
            config,
            clock: Arc::new(Utc::now),
            event_handlers: Vec::new(),
        }
    }

    /// Replace the clock used to timestamp artifact names
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(&PushEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    fn emit(&self, event: PushEvent) {
        for handler in &self.event_handlers {
            handler(&event);
        }
    }

    /// Record a failed step and hand the error back
    fn fail(&self, state: &mut PushState, next: RunState, err: PushError) -> PushError {
        state.transition(next);
        debug!("Push to group {} failed during {}: {}", state.group, err.stage(), err);
        self.emit(PushEvent::StepFailed {
            stage: err.stage(),
            error: err.to_string(),
        });
        if let Some(path) = err.retained_artifact() {
            self.emit(PushEvent::ArtifactRetained {
                path: path.to_path_buf(),
            });
        }
        err
    }

    /// Push a release to `group`
    ///
    /// Validates the group name and reads the credential before anything is
    /// sent to the service.
    pub async fn push(&self, group: &str) -> Result<PushOutcome, PushError> {
        let group = Group::new(group)?;
        let credential = Credential::from_file(&self.config.server.token_path).await?;
        let mut state = PushState::new(group);
        self.run(&mut state, &credential).await
    }

    /// Run every step for a fresh state
    ///
    /// A state that has already left `Start` is rejected without any call.
    pub async fn run(
        &self,
        state: &mut PushState,
        credential: &Credential,
    ) -> Result<PushOutcome, PushError> {
        if state.state() != RunState::Start {
            return Err(PushError::AlreadyStarted(state.state()));
        }

        let settings = &self.config.release;
        info!("Starting push to group {} ({})", state.group, state.run_id);
        self.emit(PushEvent::RunStarted {
            run_id: state.run_id,
            group: state.group.to_string(),
        });

        // Resolve devices
        let devices = match self.service.list_devices(&state.group, credential).await {
            Ok(devices) => devices,
            Err(e) => {
                return Err(self.fail(state, RunState::DirectoryFailed, PushError::Directory(e)))
            }
        };
        state.devices = devices;
        state.transition(RunState::DevicesResolved);
        info!("Group {} has {} devices", state.group, state.devices.len());
        self.emit(PushEvent::DevicesResolved {
            group: state.group.to_string(),
            count: state.devices.len(),
        });

        if state.devices.is_empty() {
            state.transition(RunState::EmptyGroup);
            info!("No devices in group {}, nothing to deploy", state.group);
            self.emit(PushEvent::EmptyGroup {
                group: state.group.to_string(),
            });
            return Ok(PushOutcome::EmptyGroup {
                group: state.group.clone(),
            });
        }

        // Generate artifact
        let device_type = match &settings.device_type {
            Some(device_type) => device_type.clone(),
            None => match state.devices.common_device_type() {
                Ok(device_type) => device_type,
                Err(source) => {
                    let err = PushError::DeviceType {
                        group: state.group.to_string(),
                        source,
                    };
                    return Err(self.fail(state, RunState::DeviceTypeFailed, err));
                }
            },
        };

        let artifact = Artifact::for_group(&state.group, (self.clock)(), &settings.output_dir);
        let request = GenerateRequest {
            artifact_name: artifact.name.clone(),
            device_type: device_type.clone(),
            source_dir: settings.source_dir.clone(),
            dest_dir: settings.dest_dir.clone(),
            output_path: artifact.path.clone(),
        };
        if let Err(source) = self.generator.generate(&request).await {
            let err = PushError::Generation {
                artifact_name: artifact.name.clone(),
                program: settings.generator.clone(),
                source,
            };
            return Err(self.fail(state, RunState::GenerationFailed, err));
        }
        state.artifact = Some(artifact.clone());
        state.transition(RunState::ArtifactGenerated);
        info!("Generated artifact {} for device type {}", artifact.name, device_type);
        self.emit(PushEvent::ArtifactGenerated {
            name: artifact.name.clone(),
            path: artifact.path.clone(),
            device_type,
        });

        // Upload artifact
        let upload = UploadRequest {
            description: format!("Release for group {}", state.group),
            path: artifact.path.clone(),
            show_progress: settings.show_progress,
        };
        if let Err(source) = self.service.upload(&upload, credential).await {
            let err = PushError::Upload {
                artifact: artifact.clone(),
                source,
            };
            return Err(self.fail(state, RunState::UploadFailed, err));
        }
        state.transition(RunState::ArtifactUploaded);
        self.emit(PushEvent::ArtifactUploaded {
            name: artifact.name.clone(),
        });

        // Create deployment
        let deployment = DeploymentRequest {
            artifact_name: artifact.name.clone(),
            devices: state.devices.ids(),
            name: artifact.name.clone(),
        };
        if let Err(source) = self.service.deploy(&deployment, credential).await {
            let err = PushError::Deployment {
                artifact: artifact.clone(),
                source,
            };
            return Err(self.fail(state, RunState::DeploymentFailed, err));
        }
        state.transition(RunState::DeploymentCreated);
        self.emit(PushEvent::DeploymentCreated {
            name: deployment.name.clone(),
            device_count: deployment.devices.len(),
        });

        match tokio::fs::remove_file(&artifact.path).await {
            Ok(()) => self.emit(PushEvent::ArtifactRemoved {
                path: artifact.path.clone(),
            }),
            Err(e) => warn!("Could not remove {}: {}", artifact.path.display(), e),
        }

        info!("Push to group {} completed", state.group);
        Ok(PushOutcome::Deployed {
            run_id: state.run_id,
            artifact_name: artifact.name,
            device_count: deployment.devices.len(),
            started_at: state.started_at,
            finished_at: state.finished_at.unwrap_or_else(Utc::now),
        })
    }
}
