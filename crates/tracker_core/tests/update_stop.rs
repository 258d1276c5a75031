use tracker_core::{update, Effect, Msg, Phase, Timer, TrackerState};

fn start_tracking() -> (TrackerState, Vec<Effect>) {
    update(
        TrackerState::new(),
        Msg::Start {
            job_id: Some("abc".to_string()),
            submitted_at: Some("2024-01-01T00:00:00Z".to_string()),
        },
    )
}

#[test]
fn stop_cancels_every_held_timer_once() {
    let (state, armed) = start_tracking();
    let (state, effects) = update(state, Msg::Stop);

    assert_eq!(state.phase(), Phase::Stopped);
    assert_eq!(state.armed_timers(), 0);
    let armed_handles: Vec<_> = armed
        .iter()
        .filter_map(|effect| match effect {
            Effect::ArmTimer { handle, .. } => Some(*handle),
            _ => None,
        })
        .collect();
    let cancelled: Vec<_> = effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::CancelTimer { handle } => Some(*handle),
            _ => None,
        })
        .collect();
    assert_eq!(cancelled, armed_handles);
}

#[test]
fn stop_is_idempotent() {
    let (state, _) = start_tracking();
    let (once, _) = update(state, Msg::Stop);

    let mut repeated = once.clone();
    for _ in 0..3 {
        let (next, effects) = update(repeated, Msg::Stop);
        assert!(effects.is_empty());
        repeated = next;
    }
    assert_eq!(repeated, once);
}

#[test]
fn no_handler_runs_after_stop() {
    let (state, armed) = start_tracking();
    let (state, _) = update(state, Msg::Stop);

    let mut state = state;
    for effect in armed {
        if let Effect::ArmTimer { handle, .. } = effect {
            let (next, effects) = update(state, Msg::TimerFired(handle));
            assert!(effects.is_empty(), "{:?} fired after stop", handle.timer);
            state = next;
        }
    }
    assert_eq!(state.phase(), Phase::Stopped);
    assert!(!state.is_armed(Timer::Deadline));
}

#[test]
fn stop_after_terminal_stage_emits_nothing() {
    let (state, _) = start_tracking();
    let (state, _) = update(
        state,
        Msg::StatusReceived(Ok(tracker_core::StatusUpdate {
            stage: Some(tracker_core::Stage::ReportReady),
            report: None,
        })),
    );
    assert_eq!(state.phase(), Phase::Terminal);

    let (state, effects) = update(state, Msg::Stop);
    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Terminal);
}
