use std::time::Duration;

/// Log group the analysis backend reports frame progress into.
pub const DEFAULT_LOG_SOURCE: &str = "/aws/lambda/CrashTruth-AnalyzeFrames";

/// Wait `delay` after start, then poll every `interval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub delay: Duration,
    pub interval: Duration,
}

impl PollSchedule {
    pub const fn from_secs(delay: u64, interval: u64) -> Self {
        Self {
            delay: Duration::from_secs(delay),
            interval: Duration::from_secs(interval),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerSettings {
    pub status: PollSchedule,
    pub result: PollSchedule,
    pub deadline: Duration,
    pub log_source: String,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            status: PollSchedule::from_secs(30, 15),
            result: PollSchedule::from_secs(20, 10),
            deadline: Duration::from_secs(600),
            log_source: DEFAULT_LOG_SOURCE.to_string(),
        }
    }
}
