use std::sync::Arc;

use bytes::Bytes;
use chrono::{SecondsFormat, Utc};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracker_core::{
    update, Effect, Msg, ResultUpdate, TrackerError, TrackerSettings, TrackerState,
    TrackerViewModel,
};
use tracker_logging::{tracker_debug, tracker_info, tracker_warn};

use crate::scheduler::TimerScheduler;
use crate::submit::submit_upload;
use crate::Backend;

#[derive(Clone)]
pub struct TrackerConfig {
    pub settings: TrackerSettings,
    /// Client-side submission timestamp, RFC 3339 in UTC.
    pub submitted_utc: Arc<dyn Fn() -> String + Send + Sync>,
}

impl TrackerConfig {
    pub fn new(settings: TrackerSettings) -> Self {
        Self {
            settings,
            submitted_utc: Arc::new(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::new(TrackerSettings::default())
    }
}

enum TrackerCommand {
    Dispatch(Msg),
    Submit {
        user_id: String,
        file_name: String,
        payload: Bytes,
    },
}

/// Handle to one running upload tracker.
///
/// All state lives in a single task that applies messages one at a time, so
/// poll handlers interleave but never run concurrently. Dropping the handle
/// stops the tracker.
pub struct TrackerHandle {
    cmd_tx: mpsc::UnboundedSender<TrackerCommand>,
    view_rx: watch::Receiver<TrackerViewModel>,
    task: JoinHandle<TrackerState>,
}

impl TrackerHandle {
    /// Spawns the tracker task on the current tokio runtime.
    pub fn spawn(backend: Arc<dyn Backend>, config: TrackerConfig) -> Self {
        let state = TrackerState::with_settings(config.settings.clone());
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(state.view());

        let task = tokio::spawn(run_tracker(state, backend, config, cmd_rx, view_tx));

        Self {
            cmd_tx,
            view_rx,
            task,
        }
    }

    /// Begin tracking an existing job.
    pub fn start(&self, job_id: Option<String>, submitted_at: Option<String>) {
        self.dispatch(Msg::Start {
            job_id,
            submitted_at,
        });
    }

    /// Upload `payload`, then track the job the backend assigns.
    pub fn submit(
        &self,
        user_id: impl Into<String>,
        file_name: impl Into<String>,
        payload: impl Into<Bytes>,
    ) {
        let _ = self.cmd_tx.send(TrackerCommand::Submit {
            user_id: user_id.into(),
            file_name: file_name.into(),
            payload: payload.into(),
        });
    }

    /// Cancel every timer. Safe to call any number of times.
    pub fn stop(&self) {
        self.dispatch(Msg::Stop);
    }

    pub fn view(&self) -> TrackerViewModel {
        self.view_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackerViewModel> {
        self.view_rx.clone()
    }

    /// Waits until the tracker reaches a finished phase and returns that view.
    pub async fn finished(&self) -> TrackerViewModel {
        let mut rx = self.view_rx.clone();
        loop {
            let view = rx.borrow_and_update().clone();
            if view.phase.is_finished() {
                return view;
            }
            if rx.changed().await.is_err() {
                return self.view();
            }
        }
    }

    /// Stops the tracker and returns its final state.
    pub async fn shutdown(self) -> Option<TrackerState> {
        let Self { cmd_tx, task, .. } = self;
        drop(cmd_tx);
        task.await.ok()
    }

    fn dispatch(&self, msg: Msg) {
        let _ = self.cmd_tx.send(TrackerCommand::Dispatch(msg));
    }
}

async fn run_tracker(
    state: TrackerState,
    backend: Arc<dyn Backend>,
    config: TrackerConfig,
    mut cmd_rx: mpsc::UnboundedReceiver<TrackerCommand>,
    view_tx: watch::Sender<TrackerViewModel>,
) -> TrackerState {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let mut runner = EffectRunner {
        backend,
        submitted_utc: config.submitted_utc,
        scheduler: TimerScheduler::new(event_tx.clone()),
        events: event_tx,
        pending_upload: None,
    };
    let mut state = state;

    loop {
        let msg = tokio::select! {
            biased;
            command = cmd_rx.recv() => match command {
                Some(TrackerCommand::Dispatch(msg)) => msg,
                Some(TrackerCommand::Submit { user_id, file_name, payload }) => {
                    state = runner.submit(state, user_id, file_name, payload, &view_tx);
                    continue;
                }
                None => break,
            },
            Some(msg) = event_rx.recv() => msg,
        };
        state = runner.dispatch(state, msg, &view_tx);
    }

    tracker_debug!("Tracker handle dropped; tearing down");
    state = runner.dispatch(state, Msg::Stop, &view_tx);
    runner.scheduler.cancel_all();
    state
}

struct EffectRunner {
    backend: Arc<dyn Backend>,
    submitted_utc: Arc<dyn Fn() -> String + Send + Sync>,
    scheduler: TimerScheduler,
    events: mpsc::UnboundedSender<Msg>,
    pending_upload: Option<Bytes>,
}

impl EffectRunner {
    fn dispatch(
        &mut self,
        state: TrackerState,
        msg: Msg,
        view_tx: &watch::Sender<TrackerViewModel>,
    ) -> TrackerState {
        let (mut state, effects) = update(state, msg);
        for effect in effects {
            self.execute(effect);
        }
        if state.consume_dirty() {
            view_tx.send_replace(state.view());
        }
        state
    }

    /// Dispatches a submit request. The payload is only held while the
    /// resulting `SubmitUpload` effect picks it up; a rejected request drops it.
    fn submit(
        &mut self,
        state: TrackerState,
        user_id: String,
        file_name: String,
        payload: Bytes,
        view_tx: &watch::Sender<TrackerViewModel>,
    ) -> TrackerState {
        self.pending_upload = Some(payload);
        let state = self.dispatch(state, Msg::SubmitRequested { user_id, file_name }, view_tx);
        if self.pending_upload.take().is_some() {
            tracker_debug!("Submit request rejected in phase {:?}", state.phase());
        }
        state
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::ArmTimer {
                handle,
                delay,
                interval,
            } => self.scheduler.arm(handle, delay, interval),
            Effect::CancelTimer { handle } => self.scheduler.cancel(handle),
            Effect::PollStatus { log_source } => {
                let backend = Arc::clone(&self.backend);
                let events = self.events.clone();
                tokio::spawn(async move {
                    let result = backend
                        .fetch_status(&log_source)
                        .await
                        .map_err(TrackerError::from);
                    match &result {
                        Ok(status) => tracker_debug!("Status poll: {:?}", status.stage),
                        Err(err) => tracker_warn!("Status poll failed: {}", err),
                    }
                    let _ = events.send(Msg::StatusReceived(result));
                });
            }
            Effect::LookupResult {
                job_id,
                submitted_at,
            } => {
                let backend = Arc::clone(&self.backend);
                let events = self.events.clone();
                tokio::spawn(async move {
                    let result = backend
                        .lookup_result(&job_id, &submitted_at)
                        .await
                        .map(ResultUpdate::from)
                        .map_err(TrackerError::from);
                    match &result {
                        Ok(ResultUpdate {
                            artifact_url: Some(url),
                        }) => tracker_info!("Result for job {} found at {}", job_id, url),
                        Ok(_) => tracker_debug!("Result for job {} not ready", job_id),
                        Err(err) => tracker_warn!("Result lookup failed: {}", err),
                    }
                    let _ = events.send(Msg::ResultReceived(result));
                });
            }
            Effect::SubmitUpload { user_id, file_name } => {
                let backend = Arc::clone(&self.backend);
                let events = self.events.clone();
                let submitted_utc = Arc::clone(&self.submitted_utc);
                let payload = self.pending_upload.take().unwrap_or_default();
                tokio::spawn(async move {
                    let result = submit_upload(
                        backend.as_ref(),
                        &user_id,
                        &file_name,
                        payload,
                        submitted_utc.as_ref(),
                    )
                    .await;
                    if let Err(err) = &result {
                        tracker_warn!("Submission for user {} failed: {}", user_id, err);
                    }
                    let _ = events.send(Msg::SubmitCompleted(result));
                });
            }
        }
    }
}
