//! Push run state models

use crate::artifact::Artifact;
use crate::core::{DeviceSet, Group};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a push run currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    /// Nothing has run yet
    Start,
    /// Devices in the group were listed
    DevicesResolved,
    /// The group has no devices; nothing to do
    EmptyGroup,
    /// The artifact file was written
    ArtifactGenerated,
    /// The service stored the artifact
    ArtifactUploaded,
    /// The deployment exists
    DeploymentCreated,
    /// Listing devices failed
    DirectoryFailed,
    /// No single device type could be chosen for the group
    DeviceTypeFailed,
    /// Building the artifact failed
    GenerationFailed,
    /// Uploading the artifact failed
    UploadFailed,
    /// Creating the deployment failed
    DeploymentFailed,
}

impl RunState {
    /// Check if the run has stopped in this state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::EmptyGroup
                | RunState::DeploymentCreated
                | RunState::DirectoryFailed
                | RunState::DeviceTypeFailed
                | RunState::GenerationFailed
                | RunState::UploadFailed
                | RunState::DeploymentFailed
        )
    }

    /// Check if this is a successful terminal state
    pub fn is_success(&self) -> bool {
        matches!(self, RunState::EmptyGroup | RunState::DeploymentCreated)
    }

    /// Whether the run may move from this state to `next`
    pub fn can_transition_to(&self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (Start, DevicesResolved)
                | (Start, DirectoryFailed)
                | (DevicesResolved, EmptyGroup)
                | (DevicesResolved, ArtifactGenerated)
                | (DevicesResolved, DeviceTypeFailed)
                | (DevicesResolved, GenerationFailed)
                | (ArtifactGenerated, ArtifactUploaded)
                | (ArtifactGenerated, UploadFailed)
                | (ArtifactUploaded, DeploymentCreated)
                | (ArtifactUploaded, DeploymentFailed)
        )
    }
}

/// Data threaded through one push run
#[derive(Debug, Clone)]
pub struct PushState {
    /// Unique run ID
    pub run_id: Uuid,

    /// Target group
    pub group: Group,

    /// Devices resolved at the start of the run
    pub devices: DeviceSet,

    /// The artifact built for this run, once generated
    pub artifact: Option<Artifact>,

    state: RunState,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run reached a terminal state
    pub finished_at: Option<DateTime<Utc>>,
}

impl PushState {
    pub fn new(group: Group) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            group,
            devices: DeviceSet::default(),
            artifact: None,
            state: RunState::Start,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Move to the next state
    ///
    /// Panics in debug builds when the move skips or revisits a step.
    pub fn transition(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid push transition {:?} -> {:?}",
            self.state,
            next
        );
        self.state = next;
        if next.is_terminal() {
            self.finished_at = Some(Utc::now());
        }
    }
}
