use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::debug;

type BoxFuture<R> = Pin<Box<dyn Future<Output = R> + Send>>;

/// Pending-call slot: the instant the current window closes, plus the channel
/// carrying the opening call's settlement.
struct Slot<R> {
    expires_at: Instant,
    settled: watch::Receiver<Option<R>>,
}

enum Role<R> {
    /// This call opened the window and performs the underlying dispatch.
    Lead(watch::Sender<Option<R>>),
    /// This call landed inside an open window and replays its settlement.
    Follow(watch::Receiver<Option<R>>),
}

/// Wraps an async request function so that calls issued within a fixed time
/// window share a single underlying dispatch.
///
/// The first call after an empty or expired window dispatches the request and
/// broadcasts its settlement; every call arriving before the window closes
/// receives that same settlement, values and errors alike, without issuing a
/// second request. The opening call's argument wins for the dispatch. Once the
/// window has elapsed, the next call opens a fresh one.
pub struct Throttled<A, R> {
    window: Duration,
    dispatch: Box<dyn Fn(A) -> BoxFuture<R> + Send + Sync>,
    slot: Mutex<Option<Slot<R>>>,
    // Serializes underlying dispatches: even when a window expires while its
    // call is still in flight, two requests never run concurrently.
    in_flight: tokio::sync::Mutex<()>,
}

impl<A, R> Throttled<A, R>
where
    R: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(window: Duration, dispatch: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        Self {
            window,
            dispatch: Box::new(move |arg| Box::pin(dispatch(arg))),
            slot: Mutex::new(None),
            in_flight: tokio::sync::Mutex::new(()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Issue a call, either dispatching the underlying request or replaying
    /// the settlement of the call that opened the current window.
    pub async fn call(&self, arg: A) -> R {
        let role = {
            let now = Instant::now();
            let mut slot = self.slot.lock().expect("throttle slot lock poisoned");
            match slot.as_ref() {
                Some(active) if now < active.expires_at => Role::Follow(active.settled.clone()),
                _ => {
                    let (tx, rx) = watch::channel(None);
                    *slot = Some(Slot {
                        expires_at: now + self.window,
                        settled: rx,
                    });
                    Role::Lead(tx)
                }
            }
        };

        match role {
            Role::Lead(tx) => {
                let _guard = self.in_flight.lock().await;
                debug!("dispatching underlying call");
                let result = (self.dispatch)(arg).await;
                let _ = tx.send(Some(result.clone()));
                result
            }
            Role::Follow(mut settled) => {
                debug!("coalescing into the call that opened the window");
                match settled.wait_for(Option::is_some).await.map(|value| (*value).clone()) {
                    Ok(Some(result)) => result,
                    // The opening call was dropped before settling; dispatch
                    // directly rather than hanging every coalesced caller.
                    _ => {
                        let _guard = self.in_flight.lock().await;
                        (self.dispatch)(arg).await
                    }
                }
            }
        }
    }
}
