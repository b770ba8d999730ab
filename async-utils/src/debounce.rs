use crate::DelayedTask;
use std::sync::Arc;
use std::time::Duration;

/// Emits a value only after the input has been quiet for a fixed period.
///
/// Each `push` restarts the quiet period; intermediate values are dropped.
/// Cancelling or dropping the debouncer discards the pending value.
pub struct Debouncer<T> {
    quiet: Duration,
    emit: Arc<dyn Fn(T) + Send + Sync>,
    pending: Option<DelayedTask>,
}

impl<T> Debouncer<T>
where
    T: Send + 'static,
{
    pub fn new<F>(quiet: Duration, emit: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            quiet,
            emit: Arc::new(emit),
            pending: None,
        }
    }

    pub fn push(&mut self, value: T) {
        if let Some(previous) = self.pending.take() {
            previous.cancel();
        }
        let emit = Arc::clone(&self.emit);
        self.pending = Some(DelayedTask::spawn(self.quiet, move || emit(value)));
    }

    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.cancel();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|task| !task.has_fired() && !task.is_cancelled())
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }
}

impl<T> std::fmt::Debug for Debouncer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("quiet", &self.quiet)
            .field("pending", &self.pending.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use tokio::time::sleep;

    fn recording_debouncer(quiet_ms: u64) -> (Debouncer<String>, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let debouncer = Debouncer::new(Duration::from_millis(quiet_ms), move |value: String| {
            if let Ok(mut guard) = sink.lock() {
                guard.push(value);
            }
        });
        (debouncer, seen)
    }

    fn snapshot(seen: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
        seen.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    #[tokio::test(start_paused = true)]
    async fn burst_emits_only_final_value() {
        let (mut debouncer, seen) = recording_debouncer(150);
        for text in ["j", "ja", "jaz", "jazz"] {
            debouncer.push(text.to_string());
            sleep(Duration::from_millis(100)).await;
        }
        assert!(debouncer.is_pending());
        assert!(snapshot(&seen).is_empty());

        sleep(Duration::from_millis(100)).await;
        assert_eq!(snapshot(&seen), vec!["jazz".to_string()]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn separate_bursts_each_settle() {
        let (mut debouncer, seen) = recording_debouncer(150);
        debouncer.push("rock".to_string());
        sleep(Duration::from_millis(200)).await;
        debouncer.push("rockabilly".to_string());
        sleep(Duration::from_millis(200)).await;

        assert_eq!(
            snapshot(&seen),
            vec!["rock".to_string(), "rockabilly".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_drops_pending_value() {
        let (mut debouncer, seen) = recording_debouncer(150);
        debouncer.push("folk".to_string());
        sleep(Duration::from_millis(50)).await;
        drop(debouncer);

        sleep(Duration::from_secs(1)).await;
        assert!(snapshot(&seen).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_discards_pending_value() {
        let (mut debouncer, seen) = recording_debouncer(150);
        debouncer.push("blues".to_string());
        debouncer.cancel();
        assert!(!debouncer.is_pending());

        sleep(Duration::from_secs(1)).await;
        assert!(snapshot(&seen).is_empty());
    }
}
