use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracker_core::{Msg, TimerHandle};
use tracker_logging::tracker_trace;

/// Owns one tokio task per armed timer. Each task only ever sends
/// `Msg::TimerFired` into the tracker's event channel.
pub(crate) struct TimerScheduler {
    events: UnboundedSender<Msg>,
    armed: HashMap<TimerHandle, AbortHandle>,
}

impl TimerScheduler {
    pub(crate) fn new(events: UnboundedSender<Msg>) -> Self {
        Self {
            events,
            armed: HashMap::new(),
        }
    }

    pub(crate) fn arm(&mut self, handle: TimerHandle, delay: Duration, interval: Option<Duration>) {
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            time::sleep(delay).await;
            if events.send(Msg::TimerFired(handle)).is_err() {
                return;
            }
            // tokio intervals panic on a zero period
            let Some(interval) = interval.filter(|period| !period.is_zero()) else {
                return;
            };
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if events.send(Msg::TimerFired(handle)).is_err() {
                    break;
                }
            }
        });
        tracker_trace!("Armed {:?} delay={:?} interval={:?}", handle, delay, interval);
        if let Some(previous) = self.armed.insert(handle, task.abort_handle()) {
            previous.abort();
        }
    }

    pub(crate) fn cancel(&mut self, handle: TimerHandle) {
        if let Some(task) = self.armed.remove(&handle) {
            task.abort();
            tracker_trace!("Cancelled {:?}", handle);
        }
    }

    pub(crate) fn cancel_all(&mut self) {
        for (_, task) in self.armed.drain() {
            task.abort();
        }
    }
}

impl Drop for TimerScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
