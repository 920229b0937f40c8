use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::capture::domain::captured_image::CapturedImage;

/// Hand-off between the Acquirer and the Processor.
///
/// A bounded channel that carries the captured image itself, so `pending()`
/// is the count of produced-but-unclaimed captures and the Processor always
/// consumes exactly the bytes that were fetched. Releasing never blocks:
/// at capacity the oldest unclaimed capture is evicted.
#[derive(Clone)]
pub struct AvailabilitySignal {
    tx: Sender<CapturedImage>,
    rx: Receiver<CapturedImage>,
}

impl AvailabilitySignal {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(capacity.max(1));
        Self { tx, rx }
    }

    /// Publishes a capture. Returns the sequence of the capture it evicted,
    /// if the signal was full.
    pub fn release(&self, image: CapturedImage) -> Option<u64> {
        let mut superseded = None;
        let mut image = image;
        loop {
            match self.tx.try_send(image) {
                Ok(()) => return superseded,
                Err(TrySendError::Full(returned)) => {
                    if let Ok(stale) = self.rx.try_recv() {
                        superseded = Some(stale.sequence);
                    }
                    image = returned;
                }
                // Both ends live in `self`, so this cannot happen while `self` exists.
                Err(TrySendError::Disconnected(_)) => return superseded,
            }
        }
    }

    /// Waits up to `timeout` for a capture.
    pub fn acquire(&self, timeout: Duration) -> Option<CapturedImage> {
        self.rx.recv_timeout(timeout).ok()
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    pub fn capacity(&self) -> usize {
        self.tx.capacity().unwrap_or(usize::MAX)
    }
}
