use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, sleep};

/// Invoke `callback` once after `delay` has elapsed.
///
/// The callback never runs immediately. Abort the returned handle to cancel
/// the timer before it fires.
pub fn run_after<F>(delay: Duration, callback: F) -> JoinHandle<()>
where
    F: FnOnce() + Send + 'static,
{
    tokio::spawn(async move {
        sleep(delay).await;
        callback();
    })
}

/// Invoke `callback` once per `period`, until the returned handle is aborted.
pub fn run_every<F>(period: Duration, mut callback: F) -> JoinHandle<()>
where
    F: FnMut() + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = interval(period);
        // The first tick of an interval completes immediately; skip it so the
        // callback only runs after a full period.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            callback();
        }
    })
}
