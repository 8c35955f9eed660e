//! Push execution: the release pipeline and its failures

pub mod engine;
pub mod error;

pub use engine::{Clock, EventHandler, PushEvent, PushOutcome, ReleasePipeline};
pub use error::{PushError, Stage};
