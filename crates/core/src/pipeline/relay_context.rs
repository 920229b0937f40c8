use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::availability_signal::AvailabilitySignal;

/// Granularity of interruptible sleeps.
const POLL_SLICE: Duration = Duration::from_millis(50);

/// State shared by the Acquirer, the Processor and the shutdown coordinator.
///
/// Cheap to clone: every clone observes the same running flag and signal.
#[derive(Clone)]
pub struct RelayContext {
    running: Arc<AtomicBool>,
    signal: AvailabilitySignal,
    capture_path: PathBuf,
    processed_path: PathBuf,
}

impl RelayContext {
    pub fn new(
        capture_path: impl Into<PathBuf>,
        processed_path: impl Into<PathBuf>,
        queue_capacity: usize,
    ) -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
            signal: AvailabilitySignal::new(queue_capacity),
            capture_path: capture_path.into(),
            processed_path: processed_path.into(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Clears the running flag. Returns `true` only for the call that
    /// actually flipped it.
    pub fn stop(&self) -> bool {
        self.running
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Sleeps for `duration` unless shutdown is requested first. A duration
    /// too large to add to the clock sleeps until shutdown.
    ///
    /// Returns whether the relay is still running afterwards.
    pub fn sleep_while_running(&self, duration: Duration) -> bool {
        let deadline = Instant::now().checked_add(duration);
        while self.is_running() {
            let slice = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return true;
                    }
                    POLL_SLICE.min(deadline - now)
                }
                None => POLL_SLICE,
            };
            thread::sleep(slice);
        }
        false
    }

    pub fn signal(&self) -> &AvailabilitySignal {
        &self.signal
    }

    pub fn capture_path(&self) -> &Path {
        &self.capture_path
    }

    pub fn processed_path(&self) -> &Path {
        &self.processed_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> RelayContext {
        RelayContext::new("captured_image.jpg", "processed_image.jpg", 1)
    }

    #[test]
    fn test_starts_running() {
        assert!(context().is_running());
    }

    #[test]
    fn test_stop_flips_exactly_once() {
        let ctx = context();
        assert!(ctx.stop());
        assert!(!ctx.stop());
        assert!(!ctx.is_running());
    }

    #[test]
    fn test_clones_share_flag_and_signal() {
        let ctx = context();
        let other = ctx.clone();
        other.signal().release(crate::capture::domain::captured_image::CapturedImage::new(
            1,
            Vec::new(),
        ));
        other.stop();
        assert!(!ctx.is_running());
        assert_eq!(ctx.signal().pending(), 1);
    }

    #[test]
    fn test_sleep_runs_full_duration_when_not_stopped() {
        let ctx = context();
        let start = Instant::now();
        assert!(ctx.sleep_while_running(Duration::from_millis(60)));
        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[test]
    fn test_sleep_returns_early_on_stop() {
        let ctx = context();
        let stopper = ctx.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            stopper.stop();
        });
        let start = Instant::now();
        assert!(!ctx.sleep_while_running(Duration::from_secs(10)));
        assert!(start.elapsed() < Duration::from_secs(2));
        handle.join().unwrap();
    }

    #[test]
    fn test_unbounded_sleep_waits_for_stop_without_panicking() {
        let ctx = context();
        let stopper = ctx.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            stopper.stop();
        });
        assert!(!ctx.sleep_while_running(Duration::MAX));
        handle.join().unwrap();
    }

    #[test]
    fn test_paths() {
        let ctx = context();
        assert_eq!(ctx.capture_path(), Path::new("captured_image.jpg"));
        assert_eq!(ctx.processed_path(), Path::new("processed_image.jpg"));
    }
}
