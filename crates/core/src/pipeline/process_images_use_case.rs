use std::path::PathBuf;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::capture::domain::captured_image::CapturedImage;
use crate::detection::domain::face_detector::FaceDetector;
use crate::imaging::domain::frame_enhancer::FrameEnhancer;
use crate::imaging::domain::image_writer::ImageWriter;
use crate::imaging::infrastructure::image_decoder::decode_frame;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::region_filter::filter_regions;
use crate::pipeline::relay_context::RelayContext;
use crate::upload::domain::image_uploader::ImageUploader;

const DEFAULT_SIGNAL_WAIT: Duration = Duration::from_secs(5);
const DEFAULT_MIN_FACE_SIZE: u32 = 30;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("failed to decode capture: {0}")]
    Decode(#[from] image::ImageError),
    #[error("face detection failed: {0}")]
    Detect(String),
    #[error("annotation failed: {0}")]
    Annotate(String),
    #[error("failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },
}

/// Counters for one Processor run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessStats {
    pub processed: u64,
    pub faces: u64,
    pub uploaded: u64,
    pub upload_failures: u64,
    pub skipped: u64,
}

/// Result of one processed capture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleOutcome {
    pub sequence: u64,
    pub faces: usize,
    pub uploaded: bool,
}

/// Processor loop: wait → decode → detect → filter → annotate → write → upload.
pub struct ProcessImagesUseCase {
    context: RelayContext,
    detector: Box<dyn FaceDetector>,
    annotator: Box<dyn FrameAnnotator>,
    image_writer: Box<dyn ImageWriter>,
    uploader: Box<dyn ImageUploader>,
    logger: Box<dyn PipelineLogger>,
    enhancer: Option<FrameEnhancer>,
    wait: Duration,
    min_face_size: u32,
    stats: ProcessStats,
}

impl ProcessImagesUseCase {
    pub fn new(
        context: RelayContext,
        detector: Box<dyn FaceDetector>,
        annotator: Box<dyn FrameAnnotator>,
        image_writer: Box<dyn ImageWriter>,
        uploader: Box<dyn ImageUploader>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            context,
            detector,
            annotator,
            image_writer,
            uploader,
            logger,
            enhancer: None,
            wait: DEFAULT_SIGNAL_WAIT,
            min_face_size: DEFAULT_MIN_FACE_SIZE,
            stats: ProcessStats::default(),
        }
    }

    /// Enhances the detection input. Boxes are still drawn on the
    /// unmodified frame.
    pub fn with_enhancer(mut self, enhancer: FrameEnhancer) -> Self {
        self.enhancer = Some(enhancer);
        self
    }

    /// Upper bound on each wait for the signal, and so on shutdown latency.
    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    pub fn with_min_face_size(mut self, min_face_size: u32) -> Self {
        self.min_face_size = min_face_size;
        self
    }

    /// Runs until the context stops. Returns the run's counters.
    pub fn run(mut self) -> ProcessStats {
        while self.context.is_running() {
            let Some(capture) = self.context.signal().acquire(self.wait) else {
                continue;
            };
            if let Err(e) = self.process(&capture) {
                self.stats.skipped += 1;
                log::warn!("Capture #{} skipped: {e}", capture.sequence);
            }
        }
        self.logger.summary();
        self.stats
    }

    /// Processes one capture end to end. Upload failures are logged and
    /// counted, not returned.
    pub fn process(&mut self, capture: &CapturedImage) -> Result<CycleOutcome, ProcessError> {
        self.logger
            .metric("capture_age_ms", elapsed_ms(capture.captured_at));

        let started = Instant::now();
        let mut frame = decode_frame(&capture.bytes, capture.sequence)?;
        self.logger.timing("decode", elapsed_ms(started));

        let started = Instant::now();
        let regions = match &self.enhancer {
            Some(enhancer) => self.detector.detect(&enhancer.enhance(&frame)),
            None => self.detector.detect(&frame),
        }
        .map_err(|e| ProcessError::Detect(e.to_string()))?;
        let faces = filter_regions(&regions, self.min_face_size);
        self.logger.timing("detect", elapsed_ms(started));
        self.logger.metric("faces", faces.len() as f64);

        self.annotator
            .annotate(&mut frame, &faces)
            .map_err(|e| ProcessError::Annotate(e.to_string()))?;

        let path = self.context.processed_path();
        let started = Instant::now();
        self.image_writer
            .write(path, &frame)
            .map_err(|e| ProcessError::Write {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        self.logger.timing("write", elapsed_ms(started));

        self.stats.processed += 1;
        self.stats.faces += faces.len() as u64;

        let started = Instant::now();
        let uploaded = match self.uploader.upload(path) {
            Ok(()) => {
                self.stats.uploaded += 1;
                true
            }
            Err(e) => {
                self.stats.upload_failures += 1;
                log::warn!("Upload of capture #{} failed: {e}", capture.sequence);
                false
            }
        };
        self.logger.timing("upload", elapsed_ms(started));

        self.logger.info(&format!(
            "Capture #{}: {} face(s), {}",
            capture.sequence,
            faces.len(),
            if uploaded { "uploaded" } else { "not uploaded" }
        ));

        Ok(CycleOutcome {
            sequence: capture.sequence,
            faces: faces.len(),
            uploaded,
        })
    }

    pub fn stats(&self) -> &ProcessStats {
        &self.stats
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
