use crate::{JobId, Stage, TimerHandle, TrackerError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Begin tracking an already-submitted job.
    Start {
        job_id: Option<JobId>,
        submitted_at: Option<String>,
    },
    /// Upload a video first, then track the job the backend assigns.
    SubmitRequested { user_id: String, file_name: String },
    /// Submission pipeline finished.
    SubmitCompleted(Result<SubmittedUpload, TrackerError>),
    /// A scheduled timer fired. Stale handles are ignored.
    TimerFired(TimerHandle),
    /// Decoded status endpoint response.
    StatusReceived(Result<StatusUpdate, TrackerError>),
    /// Decoded result-lookup endpoint response.
    ResultReceived(Result<ResultUpdate, TrackerError>),
    /// Cancel every timer. Idempotent.
    Stop,
}

/// What one status poll reported.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusUpdate {
    /// `None` when the payload carried no progress level.
    pub stage: Option<Stage>,
    pub report: Option<String>,
}

/// What one result lookup reported.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultUpdate {
    /// Set only when the backend reported `found` together with a URL.
    pub artifact_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedUpload {
    pub job_id: JobId,
    pub submitted_at: String,
    /// Non-fatal problem, e.g. the secondary upload destination failed.
    pub warning: Option<String>,
}
