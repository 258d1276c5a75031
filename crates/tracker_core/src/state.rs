use std::time::Duration;

use crate::view_model::{StageRowView, StageStatus, TrackerViewModel};
use crate::{Effect, StatusUpdate, Timer, TrackerError, TrackerSettings};

/// Opaque job identifier assigned by the backend.
pub type JobId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Stage {
    #[default]
    Uploaded = 1,
    ProcessingFrames = 2,
    Analyzing = 3,
    ReportReady = 4,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Uploaded,
        Stage::ProcessingFrames,
        Stage::Analyzing,
        Stage::ReportReady,
    ];

    /// Maps a backend progress level; anything outside 1..=4 is rejected.
    pub fn from_level(level: i64) -> Option<Self> {
        match level {
            1 => Some(Stage::Uploaded),
            2 => Some(Stage::ProcessingFrames),
            3 => Some(Stage::Analyzing),
            4 => Some(Stage::ReportReady),
            _ => None,
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Uploaded => "Upload Complete",
            Stage::ProcessingFrames => "Processing Frames",
            Stage::Analyzing => "Analyzing Data",
            Stage::ReportReady => "Report Generated",
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Stage::ReportReady
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Tracking,
    Terminal,
    TimedOut,
    InputError,
    SubmissionFailed,
    Stopped,
}

impl Phase {
    /// No timer can be armed again once a tracker reaches one of these.
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            Phase::Terminal
                | Phase::TimedOut
                | Phase::InputError
                | Phase::SubmissionFailed
                | Phase::Stopped
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadJob {
    pub job_id: JobId,
    pub submitted_at: Option<String>,
    pub stage: Stage,
    pub report: Option<String>,
    pub result_url: Option<String>,
    pub result_found: bool,
    pub error: Option<TrackerError>,
    pub warning: Option<String>,
}

impl UploadJob {
    fn new(job_id: JobId, submitted_at: Option<String>) -> Self {
        Self {
            job_id,
            submitted_at,
            stage: Stage::default(),
            report: None,
            result_url: None,
            result_found: false,
            error: None,
            warning: None,
        }
    }
}

/// Identifies one arming of a timer. Re-arming the same [`Timer`] yields a new
/// generation, so fire messages from an earlier arming no longer match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    pub timer: Timer,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct TimerSlots {
    status: Option<TimerHandle>,
    result: Option<TimerHandle>,
    deadline: Option<TimerHandle>,
}

impl TimerSlots {
    fn slot_mut(&mut self, timer: Timer) -> &mut Option<TimerHandle> {
        match timer {
            Timer::StatusPoll => &mut self.status,
            Timer::ResultPoll => &mut self.result,
            Timer::Deadline => &mut self.deadline,
        }
    }

    fn slot(&self, timer: Timer) -> Option<TimerHandle> {
        match timer {
            Timer::StatusPoll => self.status,
            Timer::ResultPoll => self.result,
            Timer::Deadline => self.deadline,
        }
    }

    fn armed(&self) -> usize {
        [self.status, self.result, self.deadline]
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackerState {
    settings: TrackerSettings,
    phase: Phase,
    job: Option<UploadJob>,
    /// Fatal error raised before a job record exists.
    fatal_error: Option<TrackerError>,
    timers: TimerSlots,
    next_generation: u64,
    dirty: bool,
}

impl TrackerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: TrackerSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn job(&self) -> Option<&UploadJob> {
        self.job.as_ref()
    }

    /// Number of timers currently held.
    pub fn armed_timers(&self) -> usize {
        self.timers.armed()
    }

    pub fn is_armed(&self, timer: Timer) -> bool {
        self.timers.slot(timer).is_some()
    }

    /// True when `handle` is the arming currently held for its timer.
    pub fn is_current(&self, handle: TimerHandle) -> bool {
        self.timers.slot(handle.timer) == Some(handle)
    }

    /// Returns whether the state changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn view(&self) -> TrackerViewModel {
        let stage = self.job.as_ref().map(|job| job.stage).unwrap_or_default();
        let stages = Stage::ALL
            .iter()
            .map(|&row| StageRowView {
                stage: row,
                label: row.label(),
                status: stage_status(row, stage),
            })
            .collect();
        let error = self
            .job
            .as_ref()
            .and_then(|job| job.error.as_ref())
            .or(self.fatal_error.as_ref())
            .map(ToString::to_string);
        let status_line = match &error {
            Some(message) => message.clone(),
            None => status_line(self.phase).to_string(),
        };

        TrackerViewModel {
            phase: self.phase,
            job_id: self.job.as_ref().map(|job| job.job_id.clone()),
            stage,
            stages,
            report: self.job.as_ref().and_then(|job| job.report.clone()),
            result_url: self.job.as_ref().and_then(|job| job.result_url.clone()),
            result_found: self.job.as_ref().is_some_and(|job| job.result_found),
            error,
            warning: self.job.as_ref().and_then(|job| job.warning.clone()),
            status_line,
            dirty: self.dirty,
        }
    }

    pub(crate) fn begin_submission(&mut self) {
        self.phase = Phase::Submitting;
        self.dirty = true;
    }

    /// Creates the job record and arms the status, result and deadline timers.
    pub(crate) fn begin_tracking(
        &mut self,
        job_id: Option<JobId>,
        submitted_at: Option<String>,
    ) -> Vec<Effect> {
        let job_id = match job_id.map(|id| id.trim().to_string()) {
            Some(id) if !id.is_empty() => id,
            _ => {
                self.fail(
                    Phase::InputError,
                    TrackerError::Input("missing job identifier".to_string()),
                );
                return Vec::new();
            }
        };
        let submitted_at = submitted_at
            .map(|ts| ts.trim().to_string())
            .filter(|ts| !ts.is_empty());

        let track_result = submitted_at.is_some();
        self.job = Some(UploadJob::new(job_id, submitted_at));
        self.phase = Phase::Tracking;
        self.dirty = true;

        let status = self.settings.status;
        let result = self.settings.result;
        let deadline = self.settings.deadline;

        let mut effects = Vec::with_capacity(3);
        effects.push(self.arm(Timer::StatusPoll, status.delay, Some(status.interval)));
        if track_result {
            effects.push(self.arm(Timer::ResultPoll, result.delay, Some(result.interval)));
        }
        effects.push(self.arm(Timer::Deadline, deadline, None));
        effects
    }

    pub(crate) fn fail(&mut self, phase: Phase, error: TrackerError) {
        self.phase = phase;
        self.fatal_error = Some(error);
        self.dirty = true;
    }

    pub(crate) fn set_warning(&mut self, warning: String) {
        if let Some(job) = self.job.as_mut() {
            job.warning = Some(warning);
            self.dirty = true;
        }
    }

    /// Applies a status poll. Returns teardown effects when the terminal stage
    /// is reached.
    pub(crate) fn apply_status(&mut self, update: StatusUpdate) -> Vec<Effect> {
        let Some(job) = self.job.as_mut() else {
            return Vec::new();
        };
        let mut changed = job.error.take().is_some();
        if let Some(stage) = update.stage {
            if job.stage != stage {
                job.stage = stage;
                changed = true;
            }
        }
        if update.report.is_some() && job.report != update.report {
            job.report = update.report;
            changed = true;
        }
        let terminal = job.stage.is_terminal();
        self.dirty |= changed;

        if terminal {
            self.phase = Phase::Terminal;
            self.dirty = true;
            self.teardown()
        } else {
            Vec::new()
        }
    }

    /// Records a found artifact and cancels only the result poller.
    pub(crate) fn apply_result(&mut self, artifact_url: Option<String>) -> Vec<Effect> {
        let Some(job) = self.job.as_mut() else {
            return Vec::new();
        };
        let mut changed = job.error.take().is_some();
        let mut effects = Vec::new();
        if let Some(url) = artifact_url {
            job.result_url = Some(url);
            job.result_found = true;
            changed = true;
            effects.extend(self.cancel(Timer::ResultPoll));
        }
        self.dirty |= changed;
        effects
    }

    /// Overwrites the observable error; polling is left untouched.
    pub(crate) fn record_error(&mut self, error: TrackerError) {
        if let Some(job) = self.job.as_mut() {
            if job.error.as_ref() != Some(&error) {
                job.error = Some(error);
                self.dirty = true;
            }
        }
    }

    pub(crate) fn time_out(&mut self) -> Vec<Effect> {
        let after = self.settings.deadline;
        self.phase = Phase::TimedOut;
        if let Some(job) = self.job.as_mut() {
            job.error = Some(TrackerError::Timeout { after });
        }
        self.dirty = true;
        self.teardown()
    }

    pub(crate) fn stop(&mut self) -> Vec<Effect> {
        match self.phase {
            Phase::Tracking | Phase::Submitting => {
                self.phase = Phase::Stopped;
                self.dirty = true;
                self.teardown()
            }
            _ => Vec::new(),
        }
    }

    fn arm(&mut self, timer: Timer, delay: Duration, interval: Option<Duration>) -> Effect {
        self.next_generation += 1;
        let handle = TimerHandle {
            timer,
            generation: self.next_generation,
        };
        *self.timers.slot_mut(timer) = Some(handle);
        Effect::ArmTimer {
            handle,
            delay,
            interval,
        }
    }

    fn cancel(&mut self, timer: Timer) -> Option<Effect> {
        self.timers
            .slot_mut(timer)
            .take()
            .map(|handle| Effect::CancelTimer { handle })
    }

    /// Releases every held handle exactly once.
    fn teardown(&mut self) -> Vec<Effect> {
        [Timer::StatusPoll, Timer::ResultPoll, Timer::Deadline]
            .into_iter()
            .filter_map(|timer| self.cancel(timer))
            .collect()
    }
}

fn stage_status(row: Stage, current: Stage) -> StageStatus {
    if row < current || (current.is_terminal() && row == current) {
        StageStatus::Complete
    } else if row == current {
        StageStatus::Active
    } else {
        StageStatus::Pending
    }
}

fn status_line(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "Waiting to start",
        Phase::Submitting => "Uploading video...",
        Phase::Tracking => "Please wait while we analyze your video...",
        Phase::Terminal => "Analysis complete!",
        Phase::Stopped => "Tracking stopped",
        Phase::TimedOut | Phase::InputError | Phase::SubmissionFailed => "Tracking failed",
    }
}
