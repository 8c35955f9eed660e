//! CLI output formatting

use crate::execution::{PushError, PushEvent, PushOutcome};
use console::Emoji;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static PACKAGE: Emoji<'_, '_> = Emoji("📦 ", "# ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Format a push event for display
pub fn format_push_event(event: &PushEvent) -> String {
    match event {
        PushEvent::RunStarted { run_id, group } => format!(
            "{} Pushing release to group {} ({})",
            ROCKET,
            style(group).bold(),
            style(&run_id.to_string()[..8]).dim()
        ),
        PushEvent::DevicesResolved { group, count } => format!(
            "{} Found {} devices in {}",
            INFO,
            style(count).cyan(),
            style(group).bold()
        ),
        PushEvent::EmptyGroup { group } => format!(
            "{} No devices in group {}, nothing to deploy",
            INFO,
            style(group).bold()
        ),
        PushEvent::ArtifactGenerated {
            name,
            path,
            device_type,
        } => format!(
            "{} Generated {} for {} at {}",
            PACKAGE,
            style(name).cyan(),
            style(device_type).bold(),
            style(path.display()).dim()
        ),
        PushEvent::ArtifactUploaded { name } => {
            format!("{} Uploaded {}", CHECK, style(name).green())
        }
        PushEvent::DeploymentCreated { name, device_count } => format!(
            "{} Deployment {} created for {} devices",
            CHECK,
            style(name).green(),
            style(device_count).cyan()
        ),
        PushEvent::ArtifactRemoved { path } => {
            format!("{} Removed {}", INFO, style(path.display()).dim())
        }
        PushEvent::StepFailed { stage, .. } => {
            format!("{} {} failed", CROSS, style(stage).red())
        }
        PushEvent::ArtifactRetained { path } => format!(
            "{} Artifact kept for inspection at {}",
            WARN,
            style(path.display()).yellow()
        ),
    }
}

/// Format the final line for a successful run
pub fn format_outcome(outcome: &PushOutcome) -> String {
    match outcome {
        PushOutcome::EmptyGroup { group } => format!(
            "{} Nothing to do for group {}",
            CHECK,
            style(group).bold()
        ),
        PushOutcome::Deployed {
            artifact_name,
            device_count,
            started_at,
            finished_at,
            ..
        } => {
            let elapsed = finished_at.signed_duration_since(*started_at);
            format!(
                "{} Released {} to {} devices {} ({}s)",
                CHECK,
                style(artifact_name).bold(),
                style(device_count).cyan(),
                style("successfully").green(),
                elapsed.num_seconds()
            )
        }
    }
}

/// Format a failed run: the error, then an optional hint
pub fn format_failure(err: &PushError) -> String {
    let mut message = format!("{} {}", CROSS, style(err).red());
    if let Some(hint) = err.hint() {
        message.push_str(&format!("\n{} {}", INFO, hint));
    }
    message
}
