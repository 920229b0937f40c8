use std::time::{Duration, Instant};

use crate::capture::domain::captured_image::CapturedImage;
use crate::capture::domain::snapshot_source::{CaptureError, SnapshotSource};
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::relay_context::RelayContext;
use crate::shared::atomic_file::write_atomically;

/// Counters for one Acquirer run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AcquireStats {
    pub captured: u64,
    pub failed: u64,
    pub superseded: u64,
}

/// Acquirer loop: fetch → persist → signal, then wait out the interval.
///
/// Never waits on the Processor; a failed cycle is logged and skipped
/// without touching the signal.
pub struct AcquireImagesUseCase {
    source: Box<dyn SnapshotSource>,
    context: RelayContext,
    interval: Duration,
    logger: Box<dyn PipelineLogger>,
    next_sequence: u64,
    stats: AcquireStats,
}

impl AcquireImagesUseCase {
    pub fn new(
        source: Box<dyn SnapshotSource>,
        context: RelayContext,
        interval: Duration,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            source,
            context,
            interval,
            logger,
            next_sequence: 1,
            stats: AcquireStats::default(),
        }
    }

    /// Runs until the context stops. Returns the run's counters.
    pub fn run(mut self) -> AcquireStats {
        while self.context.is_running() {
            if let Err(e) = self.run_cycle() {
                log::warn!("Capture skipped: {e}");
            }
            self.context.sleep_while_running(self.interval);
        }
        self.logger.summary();
        self.stats
    }

    /// One fetch attempt. On success returns the sequence of the published
    /// capture.
    pub fn run_cycle(&mut self) -> Result<u64, CaptureError> {
        let started = Instant::now();
        let fetched = self.source.fetch();
        self.logger
            .timing("fetch", started.elapsed().as_secs_f64() * 1000.0);

        let bytes = match fetched {
            Ok(bytes) => bytes,
            Err(e) => {
                self.stats.failed += 1;
                return Err(e);
            }
        };

        let path = self.context.capture_path();
        if let Err(e) = write_atomically(path, &bytes) {
            self.stats.failed += 1;
            return Err(CaptureError::Persist {
                path: path.to_path_buf(),
                source: e,
            });
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.stats.captured += 1;

        if let Some(stale) = self
            .context
            .signal()
            .release(CapturedImage::new(sequence, bytes))
        {
            self.stats.superseded += 1;
            log::info!("Capture #{stale} superseded by #{sequence} before processing");
        }
        self.logger
            .metric("pending", self.context.signal().pending() as f64);
        self.logger.info(&format!(
            "Captured image #{sequence} to {}",
            path.display()
        ));
        Ok(sequence)
    }

    pub fn context(&self) -> &RelayContext {
        &self.context
    }

    pub fn stats(&self) -> &AcquireStats {
        &self.stats
    }
}
