use crate::{Effect, Msg, Phase, Timer, TrackerError, TrackerState};

const DEFAULT_FILE_NAME: &str = "video.mp4";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: TrackerState, msg: Msg) -> (TrackerState, Vec<Effect>) {
    let effects = match msg {
        Msg::Start {
            job_id,
            submitted_at,
        } => {
            if state.phase() == Phase::Idle {
                state.begin_tracking(job_id, submitted_at)
            } else {
                Vec::new()
            }
        }
        Msg::SubmitRequested { user_id, file_name } => {
            if state.phase() != Phase::Idle {
                return (state, Vec::new());
            }
            let user_id = user_id.trim().to_string();
            if user_id.is_empty() {
                state.fail(
                    Phase::InputError,
                    TrackerError::Input("missing user identifier".to_string()),
                );
                return (state, Vec::new());
            }
            let file_name = match file_name.trim() {
                "" => DEFAULT_FILE_NAME.to_string(),
                name => name.to_string(),
            };
            state.begin_submission();
            vec![Effect::SubmitUpload { user_id, file_name }]
        }
        Msg::SubmitCompleted(result) => {
            // A stop during submission wins over a late completion.
            if state.phase() != Phase::Submitting {
                return (state, Vec::new());
            }
            match result {
                Ok(upload) => {
                    let effects =
                        state.begin_tracking(Some(upload.job_id), Some(upload.submitted_at));
                    if let Some(warning) = upload.warning {
                        state.set_warning(warning);
                    }
                    effects
                }
                Err(err) => {
                    let err = match err {
                        TrackerError::Submission(_) => err,
                        other => TrackerError::Submission(other.to_string()),
                    };
                    state.fail(Phase::SubmissionFailed, err);
                    Vec::new()
                }
            }
        }
        Msg::TimerFired(handle) => {
            if state.phase() != Phase::Tracking || !state.is_current(handle) {
                return (state, Vec::new());
            }
            match handle.timer {
                Timer::StatusPoll => vec![Effect::PollStatus {
                    log_source: state.settings().log_source.clone(),
                }],
                Timer::ResultPoll => match state.job() {
                    Some(job) if !job.result_found => match &job.submitted_at {
                        Some(submitted_at) => vec![Effect::LookupResult {
                            job_id: job.job_id.clone(),
                            submitted_at: submitted_at.clone(),
                        }],
                        None => Vec::new(),
                    },
                    _ => Vec::new(),
                },
                Timer::Deadline => state.time_out(),
            }
        }
        Msg::StatusReceived(result) => {
            // Late responses after a terminal phase are dropped.
            if state.phase() != Phase::Tracking {
                return (state, Vec::new());
            }
            match result {
                Ok(status) => state.apply_status(status),
                Err(err) => {
                    state.record_error(err);
                    Vec::new()
                }
            }
        }
        Msg::ResultReceived(result) => {
            let accepting = state.phase() == Phase::Tracking
                && state.job().is_some_and(|job| !job.result_found);
            if !accepting {
                return (state, Vec::new());
            }
            match result {
                Ok(lookup) => state.apply_result(lookup.artifact_url),
                Err(err) => {
                    state.record_error(err);
                    Vec::new()
                }
            }
        }
        Msg::Stop => state.stop(),
    };

    (state, effects)
}
