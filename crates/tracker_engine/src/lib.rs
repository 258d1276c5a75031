//! Tracker engine: HTTP clients, timers and effect execution.
mod api;
mod engine;
mod envelope;
mod scheduler;
mod submit;
mod types;

pub use api::{ApiSettings, Backend, ProgressApi, ReqwestBackend, UploadApi};
pub use engine::{TrackerConfig, TrackerHandle};
pub use envelope::{
    decode_result, decode_status, decode_upload_ticket, unwrap_envelope, EnvelopeError,
};
pub use submit::submit_upload;
pub use types::{ApiError, Artifact, FailureKind, ResultLookup, UploadTicket};
