use crate::executor::Completion;
use tokio::sync::mpsc::UnboundedSender;

/// Everything that mutates the overlay from outside a direct user action.
/// Timers and network tasks post these instead of touching overlay state, so
/// all mutation happens on the task that owns the [`crate::OverlayController`].
#[derive(Debug)]
pub enum OverlayEvent {
    /// The input has been stable for the debounce quiet period.
    InputSettled(String),

    /// A network request finished. The controller decides whether it is
    /// still relevant.
    SearchCompleted(Completion),

    /// The spinner delay for request `seq` elapsed.
    SpinnerDue { seq: u64 },

    /// Time to show the next placeholder hint.
    PlaceholderTick,
}

#[derive(Clone, Debug)]
pub struct OverlayEventSender {
    tx: UnboundedSender<OverlayEvent>,
}

impl OverlayEventSender {
    pub fn new(tx: UnboundedSender<OverlayEvent>) -> Self {
        Self { tx }
    }

    /// A closed receiver means the overlay is gone; the event is dropped.
    pub fn send(&self, event: OverlayEvent) {
        if let Err(err) = self.tx.send(event) {
            tracing::debug!("dropping overlay event: {err}");
        }
    }
}
