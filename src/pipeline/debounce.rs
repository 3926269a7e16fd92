//! Input debouncing
//!
//! Each new value cancels the pending timer and starts a fresh one; only the
//! latest value reaches the handler, after a quiet period with no new input.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Quiet period before a typed value settles
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

type Handler<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Must be used inside a Tokio runtime; the timer is a spawned task.
pub struct Debouncer<T> {
    delay: Duration,
    handler: Handler<T>,
    pending: Arc<Mutex<Option<T>>>,
    timer: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration, handler: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            delay,
            handler: Arc::new(handler),
            pending: Arc::new(Mutex::new(None)),
            timer: None,
        }
    }

    /// Record a new value and restart the quiet period
    pub fn push(&mut self, value: T) {
        self.abort_timer();
        if let Ok(mut pending) = self.pending.lock() {
            *pending = Some(value);
        }

        let pending = Arc::clone(&self.pending);
        let handler = Arc::clone(&self.handler);
        let delay = self.delay;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let value = pending.lock().ok().and_then(|mut p| p.take());
            if let Some(value) = value {
                handler(value);
            }
        }));
    }

    /// Emit the pending value now instead of waiting. Returns whether one was pending.
    pub fn flush(&mut self) -> bool {
        self.abort_timer();
        match self.take_pending() {
            Some(value) => {
                (self.handler)(value);
                true
            }
            None => false,
        }
    }

    /// Drop the pending value without emitting it
    pub fn cancel(&mut self) {
        self.abort_timer();
        let _ = self.take_pending();
    }

    pub fn is_pending(&self) -> bool {
        self.pending.lock().map(|p| p.is_some()).unwrap_or(false)
    }

    fn take_pending(&self) -> Option<T> {
        self.pending.lock().ok().and_then(|mut p| p.take())
    }

    fn abort_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
