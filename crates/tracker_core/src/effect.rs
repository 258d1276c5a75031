use std::time::Duration;

use crate::{JobId, TimerHandle};

/// The three timers a tracker may hold at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    StatusPoll,
    ResultPoll,
    Deadline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fire `TimerFired(handle)` after `delay`, then every `interval` if set.
    ArmTimer {
        handle: TimerHandle,
        delay: Duration,
        interval: Option<Duration>,
    },
    CancelTimer { handle: TimerHandle },
    PollStatus { log_source: String },
    LookupResult { job_id: JobId, submitted_at: String },
    SubmitUpload { user_id: String, file_name: String },
}
