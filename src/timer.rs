use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

type TickFn = Box<dyn FnMut() + Send>;

/// Shared cancellation flag for a scheduled callback.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A periodic callback slot driven by an external scheduler.
///
/// The engine never owns a clock: the host (or a test) calls [`fire`] on
/// whatever cadence it likes. `cancel` takes the callback out of the slot
/// under the lock, so once it returns the callback can never run again — the
/// teardown guarantee is a lock-ordering fact, not a race.
///
/// [`fire`]: TimerHandle::fire
pub struct TimerHandle {
    token: CancellationToken,
    slot: Arc<Mutex<Option<TickFn>>>,
    period_ms: u64,
}

impl TimerHandle {
    pub fn new(period_ms: u64, callback: TickFn) -> Self {
        Self {
            token: CancellationToken::new(),
            slot: Arc::new(Mutex::new(Some(callback))),
            period_ms,
        }
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Runs one tick. Returns false when the handle is cancelled (a driver
    /// should stop rescheduling at that point).
    pub fn fire(&self) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        let Ok(mut slot) = self.slot.lock() else {
            return false;
        };
        match slot.as_mut() {
            Some(cb) => {
                cb();
                true
            }
            None => false,
        }
    }

    /// Cancels the timer. Safe to call multiple times; after the first call
    /// returns, `fire` can never invoke the callback again.
    pub fn cancel(&self) {
        self.token.cancel();
        if let Ok(mut slot) = self.slot.lock() {
            slot.take();
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    fn counting_handle() -> (TimerHandle, Arc<AtomicU32>) {
        let count = Arc::new(AtomicU32::new(0));
        let inner = Arc::clone(&count);
        let handle = TimerHandle::new(
            50,
            Box::new(move || {
                inner.fetch_add(1, Ordering::SeqCst);
            }),
        );
        (handle, count)
    }

    #[test]
    fn fire_runs_the_callback() {
        let (handle, count) = counting_handle();
        assert!(handle.fire());
        assert!(handle.fire());
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cancel_then_fire_never_runs() {
        let (handle, count) = counting_handle();
        handle.cancel();
        assert!(!handle.fire());
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(handle.is_cancelled());
    }

    #[test]
    fn cancel_is_idempotent() {
        let (handle, _count) = counting_handle();
        handle.cancel();
        handle.cancel();
        assert!(!handle.fire());
    }

    #[test]
    fn token_observes_cancellation() {
        let (handle, _count) = counting_handle();
        let token = handle.token();
        assert!(!token.is_cancelled());
        handle.cancel();
        assert!(token.is_cancelled());
    }
}
