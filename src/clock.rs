use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::model::truncate_to_minute;

pub fn local_now() -> NaiveDateTime {
    truncate_to_minute(Local::now().naive_local())
}

/// Periodic "now" publisher driving the current-time line.
/// Dropping the handle stops the task.
pub struct Clock {
    rx: watch::Receiver<NaiveDateTime>,
    task: JoinHandle<()>,
}

impl Clock {
    /// Spawn a task that publishes the local time every `period`.
    pub fn spawn(period: Duration) -> Self {
        Self::spawn_with(period, local_now)
    }

    /// Same as `spawn` with an injectable time source.
    pub fn spawn_with<F>(period: Duration, now: F) -> Self
    where
        F: Fn() -> NaiveDateTime + Send + 'static,
    {
        let (tx, rx) = watch::channel(now());
        let task = tokio::spawn(run_clock(tx, period, now));
        Self { rx, task }
    }

    pub fn subscribe(&self) -> watch::Receiver<NaiveDateTime> {
        self.rx.clone()
    }

    pub fn now(&self) -> NaiveDateTime {
        *self.rx.borrow()
    }
}

impl Drop for Clock {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_clock<F>(tx: watch::Sender<NaiveDateTime>, period: Duration, now: F)
where
    F: Fn() -> NaiveDateTime,
{
    let mut interval = tokio::time::interval(period);
    // First tick completes immediately; the initial value is already published.
    interval.tick().await;
    loop {
        interval.tick().await;
        let t = now();
        if tx.send(t).is_err() {
            debug!("clock has no receivers left, stopping");
            return;
        }
    }
}
