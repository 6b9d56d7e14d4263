//! Observer registration for smoothed amplitude updates.

use std::sync::{Arc, Mutex};

/// Receiver of smoothed amplitude values.
///
/// Called once per scheduler tick, always from the scheduler's task and
/// never concurrently with itself.  Any `Fn(f32) + Send + Sync` closure is
/// an observer.
pub trait AmplitudeObserver: Send + Sync {
    fn on_amplitude(&self, value: f32);
}

impl<F> AmplitudeObserver for F
where
    F: Fn(f32) + Send + Sync,
{
    fn on_amplitude(&self, value: f32) {
        self(value)
    }
}

/// Slot holding at most one observer, shared between the pipeline (which
/// writes it) and the scheduler task (which reads it every tick).
#[derive(Clone, Default)]
pub struct ObserverSlot {
    inner: Arc<Mutex<Option<Arc<dyn AmplitudeObserver>>>>,
}

impl ObserverSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `observer`, replacing any previous one.
    pub fn register(&self, observer: Arc<dyn AmplitudeObserver>) {
        *self.lock() = Some(observer);
    }

    /// Remove the current observer.  Ticks keep running and discard values.
    pub fn clear(&self) {
        *self.lock() = None;
    }

    pub fn is_registered(&self) -> bool {
        self.lock().is_some()
    }

    /// Deliver `value` to the current observer, if any.  Returns whether a
    /// delivery happened.
    ///
    /// The lock is only held long enough to clone the `Arc`, so an observer
    /// may re-register itself from inside the callback.
    pub fn notify(&self, value: f32) -> bool {
        let observer = self.lock().clone();
        match observer {
            Some(observer) => {
                observer.on_amplitude(value);
                true
            }
            None => false,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Arc<dyn AmplitudeObserver>>> {
        // A panicking observer poisons nothing we care about; keep going.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for ObserverSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverSlot")
            .field("registered", &self.is_registered())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn empty_slot_discards() {
        let slot = ObserverSlot::new();
        assert!(!slot.is_registered());
        assert!(!slot.notify(0.5));
    }

    #[test]
    fn closure_receives_values() {
        let slot = ObserverSlot::new();
        let last = Arc::new(AtomicU32::new(0));
        let sink = Arc::clone(&last);
        slot.register(Arc::new(move |v: f32| sink.store(v.to_bits(), Ordering::Relaxed)));

        assert!(slot.notify(0.25));
        assert_eq!(f32::from_bits(last.load(Ordering::Relaxed)), 0.25);

        slot.clear();
        assert!(!slot.notify(0.75));
        assert_eq!(f32::from_bits(last.load(Ordering::Relaxed)), 0.25);
    }

    #[test]
    fn observer_may_clear_itself() {
        let slot = ObserverSlot::new();
        let inner = slot.clone();
        slot.register(Arc::new(move |_v: f32| inner.clear()));

        assert!(slot.notify(1.0));
        assert!(!slot.is_registered());
    }
}
