use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::lifecycle::Liveness;

/// Trailing-edge debouncer.
///
/// Each [`Debouncer::submit`] restarts the quiet period; only the last value
/// submitted before the period elapses is delivered. Delivery goes through a
/// channel so the value lands back on the owner's event loop. Nothing is
/// delivered once the owner's [`Liveness`] flag is down.
pub struct Debouncer<T> {
    delay: Duration,
    tx: UnboundedSender<T>,
    liveness: Liveness,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    #[must_use]
    pub fn new(delay: Duration, tx: UnboundedSender<T>, liveness: Liveness) -> Self {
        Self {
            delay,
            tx,
            liveness,
            pending: None,
        }
    }

    /// Restart the timer with `value`. Must be called inside a tokio runtime.
    pub fn submit(&mut self, value: T) {
        self.cancel();
        if !self.liveness.is_alive() {
            return;
        }

        let delay = self.delay;
        let tx = self.tx.clone();
        let liveness = self.liveness.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !liveness.is_alive() {
                tracing::trace!("debounced value dropped after teardown");
                return;
            }
            if tx.send(value).is_err() {
                tracing::debug!("debounce receiver closed");
            }
        }));
    }

    /// Abort the pending timer, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
