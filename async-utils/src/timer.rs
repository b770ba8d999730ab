use crate::OrCancelExt;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::time::Instant;
use tokio::time::MissedTickBehavior;
use tokio::time::interval_at;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Runs a callback once after `delay` unless cancelled first.
///
/// Dropping the handle cancels the pending callback.
#[derive(Debug)]
pub struct DelayedTask {
    token: CancellationToken,
    fired: Arc<AtomicBool>,
}

impl DelayedTask {
    pub fn spawn<F>(delay: Duration, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let token = CancellationToken::new();
        let fired = Arc::new(AtomicBool::new(false));
        let child = token.clone();
        let fired_flag = Arc::clone(&fired);
        tokio::spawn(async move {
            if sleep(delay).or_cancel(&child).await.is_err() || child.is_cancelled() {
                return;
            }
            fired_flag.store(true, Ordering::SeqCst);
            callback();
        });
        Self { token, fired }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// True once the callback has run.
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

impl Drop for DelayedTask {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Invokes a callback every `period` (first call after one full period)
/// until cancelled or dropped.
#[derive(Debug)]
pub struct Ticker {
    token: CancellationToken,
}

impl Ticker {
    pub fn spawn<F>(period: Duration, mut callback: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let token = CancellationToken::new();
        let child = token.clone();
        tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                if interval.tick().or_cancel(&child).await.is_err() || child.is_cancelled() {
                    break;
                }
                callback();
            }
        });
        Self { token }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
