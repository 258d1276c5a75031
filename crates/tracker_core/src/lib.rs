//! Tracker core: pure upload-tracking state machine and view-model helpers.
mod effect;
mod error;
mod msg;
mod settings;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, Timer};
pub use error::TrackerError;
pub use msg::{Msg, ResultUpdate, StatusUpdate, SubmittedUpload};
pub use settings::{PollSchedule, TrackerSettings, DEFAULT_LOG_SOURCE};
pub use state::{JobId, Phase, Stage, TimerHandle, TrackerState, UploadJob};
pub use update::update;
pub use view_model::{StageRowView, StageStatus, TrackerViewModel};
