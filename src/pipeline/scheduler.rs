//! Periodic amplitude sampling.
//!
//! [`AnalysisScheduler`] owns one tokio task.  Every period the task reads
//! the amplitude source, pushes the reading into its
//! [`RollingAverageBuffer`], and hands the window average to the registered
//! observer.
//!
//! ```text
//! interval tick ──▶ source.read() ──▶ buffer.push ──▶ buffer.average
//!                                                      │
//!                                   armed? ──yes──▶ observer.on_amplitude
//! ```
//!
//! The buffer and the observer are only touched from that one task, so
//! neither needs locking beyond the observer slot's short `Arc` clone.
//!
//! # Disarm guarantee
//!
//! [`disarm`](AnalysisScheduler::disarm) clears a shared flag and aborts the
//! task.  The flag is checked right before each delivery, so once `disarm`
//! returns at most one tick that already passed the check can still reach
//! the observer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::audio::RollingAverageBuffer;
use crate::dsp::AmplitudeSource;

use super::observer::ObserverSlot;

/// Drives the tick task.  At most one task is alive per scheduler.
#[derive(Debug, Default)]
pub struct AnalysisScheduler {
    task: Option<JoinHandle<()>>,
    armed: Option<Arc<AtomicBool>>,
}

impl AnalysisScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start ticking every `period` on `runtime`.  The first tick fires one
    /// period from now.  A scheduler that is already armed is disarmed
    /// first.
    pub fn arm(
        &mut self,
        runtime: &Handle,
        period: Duration,
        source: Arc<dyn AmplitudeSource>,
        mut buffer: RollingAverageBuffer,
        observers: ObserverSlot,
    ) {
        self.disarm();

        let armed = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&armed);

        let task = runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let smoothed = tick(source.as_ref(), &mut buffer);
                if !flag.load(Ordering::Acquire) {
                    break;
                }
                observers.notify(smoothed);
            }
        });

        log::debug!("analysis scheduler armed ({period:?} period)");
        self.task = Some(task);
        self.armed = Some(armed);
    }

    /// Stop ticking.  Idempotent.
    pub fn disarm(&mut self) {
        if let Some(armed) = self.armed.take() {
            armed.store(false, Ordering::Release);
        }
        if let Some(task) = self.task.take() {
            task.abort();
            log::debug!("analysis scheduler disarmed");
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
            .as_ref()
            .is_some_and(|armed| armed.load(Ordering::Acquire))
    }
}

impl Drop for AnalysisScheduler {
    fn drop(&mut self) {
        self.disarm();
    }
}

/// One sampling step: read, push, average.
pub fn tick(source: &dyn AmplitudeSource, buffer: &mut RollingAverageBuffer) -> f32 {
    let reading = source.read();
    // The meter already sanitises; this keeps foreign sources honest.
    let reading = if reading.is_finite() && reading > 0.0 {
        reading
    } else {
        0.0
    };
    buffer.push(f64::from(reading));
    buffer.average() as f32
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, AtomicUsize};
    use std::sync::Mutex;

    use crate::dsp::AmplitudeMeter;

    const PERIOD: Duration = Duration::from_millis(10);

    fn counting_slot() -> (ObserverSlot, Arc<AtomicUsize>) {
        let slot = ObserverSlot::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        slot.register(Arc::new(move |_v: f32| {
            c.fetch_add(1, Ordering::SeqCst);
        }));
        (slot, count)
    }

    fn constant_source(value: f32) -> Arc<AmplitudeMeter> {
        let meter = Arc::new(AmplitudeMeter::new());
        meter.publish(value);
        meter
    }

    // ---- tick() ------------------------------------------------------------

    #[test]
    fn tick_reads_pushes_and_averages() {
        let meter = constant_source(1.0);
        let mut buf = RollingAverageBuffer::new(10);

        let first = tick(meter.as_ref(), &mut buf);
        assert!((first - 0.1).abs() < 1e-6);

        let mut last = first;
        for _ in 0..9 {
            last = tick(meter.as_ref(), &mut buf);
        }
        assert_eq!(last, 1.0);
    }

    #[test]
    fn tick_treats_bad_readings_as_silence() {
        struct Broken;
        impl AmplitudeSource for Broken {
            fn read(&self) -> f32 {
                f32::NAN
            }
        }
        let mut buf = RollingAverageBuffer::new(2);
        assert_eq!(tick(&Broken, &mut buf), 0.0);
    }

    // ---- armed task --------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn delivers_once_per_period() {
        let (slot, count) = counting_slot();
        let mut sched = AnalysisScheduler::new();
        sched.arm(
            &Handle::current(),
            PERIOD,
            constant_source(0.5),
            RollingAverageBuffer::new(10),
            slot,
        );
        assert!(sched.is_armed());

        // Ticks at 10, 20, ..., 100 ms.
        tokio::time::sleep(Duration::from_millis(105)).await;
        assert_eq!(count.load(Ordering::SeqCst), 10);
        sched.disarm();
    }

    #[tokio::test(start_paused = true)]
    async fn constant_input_converges_after_capacity_ticks() {
        let slot = ObserverSlot::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        slot.register(Arc::new(move |v: f32| s.lock().unwrap().push(v)));

        let mut sched = AnalysisScheduler::new();
        sched.arm(
            &Handle::current(),
            PERIOD,
            constant_source(0.5),
            RollingAverageBuffer::new(4),
            slot,
        );

        tokio::time::sleep(Duration::from_millis(65)).await;
        sched.disarm();

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen, vec![0.125, 0.25, 0.375, 0.5, 0.5, 0.5]);
    }

    #[tokio::test(start_paused = true)]
    async fn no_observer_is_harmless() {
        let slot = ObserverSlot::new();
        let mut sched = AnalysisScheduler::new();
        sched.arm(
            &Handle::current(),
            PERIOD,
            constant_source(0.5),
            RollingAverageBuffer::new(10),
            slot.clone(),
        );

        tokio::time::sleep(Duration::from_millis(55)).await;

        // Registering late starts deliveries on the next tick.
        let last = Arc::new(AtomicU32::new(0));
        let l = Arc::clone(&last);
        slot.register(Arc::new(move |v: f32| l.store(v.to_bits(), Ordering::SeqCst)));
        tokio::time::sleep(Duration::from_millis(10)).await;

        // Six ticks have filled the window with 0.5 even though the first
        // five were discarded.
        assert_eq!(f32::from_bits(last.load(Ordering::SeqCst)), 0.3);
        sched.disarm();
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_after_disarm() {
        let (slot, count) = counting_slot();
        let mut sched = AnalysisScheduler::new();
        sched.arm(
            &Handle::current(),
            PERIOD,
            constant_source(0.5),
            RollingAverageBuffer::new(10),
            slot,
        );

        tokio::time::sleep(Duration::from_millis(35)).await;
        sched.disarm();
        assert!(!sched.is_armed());
        let at_disarm = count.load(Ordering::SeqCst);
        assert_eq!(at_disarm, 3);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(count.load(Ordering::SeqCst) <= at_disarm + 1);

        // Idempotent.
        sched.disarm();
    }

    #[tokio::test(start_paused = true)]
    async fn rearm_replaces_task() {
        let (slot, count) = counting_slot();
        let mut sched = AnalysisScheduler::new();
        for _ in 0..3 {
            sched.arm(
                &Handle::current(),
                PERIOD,
                constant_source(0.5),
                RollingAverageBuffer::new(10),
                slot.clone(),
            );
        }

        tokio::time::sleep(Duration::from_millis(105)).await;
        assert_eq!(count.load(Ordering::SeqCst), 10);
    }
}
