use std::path::PathBuf;
use std::process;

use clap::Parser;

use camrelay_core::annotation::infrastructure::box_annotator::BoxAnnotator;
use camrelay_core::capture::infrastructure::http_snapshot_source::HttpSnapshotSource;
use camrelay_core::detection::domain::face_detector::FaceDetector;
use camrelay_core::detection::infrastructure::model_resolver;
use camrelay_core::detection::infrastructure::onnx_yolo_detector::OnnxYoloFaceDetector;
use camrelay_core::imaging::domain::frame_enhancer::FrameEnhancer;
use camrelay_core::imaging::infrastructure::image_file_writer::ImageFileWriter;
use camrelay_core::pipeline::acquire_images_use_case::AcquireImagesUseCase;
use camrelay_core::pipeline::infrastructure::threaded_relay_executor::ThreadedRelayExecutor;
use camrelay_core::pipeline::pipeline_logger::LogPipelineLogger;
use camrelay_core::pipeline::process_images_use_case::ProcessImagesUseCase;
use camrelay_core::pipeline::relay_context::RelayContext;
use camrelay_core::pipeline::relay_executor::{RelayExecutor, RelayReport};
use camrelay_core::pipeline::shutdown::ShutdownCoordinator;
use camrelay_core::shared::constants::{YOLO_MODEL_NAME, YOLO_MODEL_URL};
use camrelay_core::shared::relay_config::RelayConfig;
use camrelay_core::upload::infrastructure::multipart_uploader::MultipartUploader;

/// Periodically captures camera snapshots, boxes detected faces and uploads
/// the annotated image back to the camera host.
#[derive(Parser)]
#[command(name = "camrelay")]
struct Cli {
    /// JSON config file (defaults to the user config directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Camera host, optionally with port.
    #[arg(long)]
    host: Option<String>,

    /// Seconds between capture attempts.
    #[arg(long)]
    capture_interval: Option<f64>,

    /// Seconds the processor waits for a capture before re-checking shutdown.
    #[arg(long)]
    signal_wait: Option<f64>,

    /// Minimum face width and height in pixels (0 keeps every detection).
    #[arg(long)]
    min_face_size: Option<u32>,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long)]
    confidence: Option<f64>,

    /// Sharpen and brighten snapshots before detection.
    #[arg(long)]
    enhance: bool,

    /// Directory searched for a bundled detection model before downloading.
    #[arg(long)]
    model_dir: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli)?;

    let detector = build_detector(&config)?;
    let context = RelayContext::new(
        &config.capture_path,
        &config.processed_path,
        config.queue_capacity,
    );

    let source = HttpSnapshotSource::new(config.capture_url(), config.capture_timeout())?;
    let acquirer = AcquireImagesUseCase::new(
        Box::new(source),
        context.clone(),
        config.capture_interval(),
        Box::new(LogPipelineLogger::new("Acquirer")),
    );

    let uploader = MultipartUploader::new(
        config.upload_url(),
        config.upload_field.as_str(),
        config.upload_timeout(),
    )?;
    let mut processor = ProcessImagesUseCase::new(
        context.clone(),
        detector,
        Box::new(BoxAnnotator::new(config.box_color, config.box_thickness)),
        Box::new(ImageFileWriter::new()),
        Box::new(uploader),
        Box::new(LogPipelineLogger::new("Processor")),
    )
    .with_wait(config.signal_wait())
    .with_min_face_size(config.min_face_size);
    if config.enhance {
        processor = processor.with_enhancer(FrameEnhancer::default());
    }

    ShutdownCoordinator::new(context).install()?;
    log::info!(
        "Relaying {} -> {} every {:.1}s (Ctrl-C to stop)",
        config.capture_url(),
        config.upload_url(),
        config.capture_interval_secs
    );

    let report = ThreadedRelayExecutor::new().execute(acquirer, processor)?;
    log_report(&report);
    Ok(())
}

fn load_config(cli: Cli) -> Result<RelayConfig, Box<dyn std::error::Error>> {
    let mut config = RelayConfig::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(interval) = cli.capture_interval {
        config.capture_interval_secs = interval;
    }
    if let Some(wait) = cli.signal_wait {
        config.signal_wait_secs = wait;
    }
    if let Some(min_face_size) = cli.min_face_size {
        config.min_face_size = min_face_size;
    }
    if let Some(confidence) = cli.confidence {
        config.confidence = confidence;
    }
    if cli.enhance {
        config.enhance = true;
    }
    if cli.model_dir.is_some() {
        config.model_dir = cli.model_dir;
    }
    config.validate()?;
    Ok(config)
}

fn build_detector(config: &RelayConfig) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
    log::info!("Resolving model: {YOLO_MODEL_NAME}");
    let model_path = model_resolver::resolve(
        YOLO_MODEL_NAME,
        YOLO_MODEL_URL,
        config.model_dir.as_deref(),
        Some(Box::new(download_progress)),
    )?;
    eprintln!();

    Ok(Box::new(OnnxYoloFaceDetector::new(
        &model_path,
        config.confidence,
    )?))
}

fn log_report(report: &RelayReport) {
    let RelayReport { acquire, process } = report;
    log::info!(
        "Stopped: {} captured ({} failed, {} superseded), {} processed ({} skipped), {} faces, {} uploaded ({} failed)",
        acquire.captured,
        acquire.failed,
        acquire.superseded,
        process.processed,
        process.skipped,
        process.faces,
        process.uploaded,
        process.upload_failures
    );
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
}
