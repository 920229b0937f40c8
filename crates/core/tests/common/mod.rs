use std::io::Cursor;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use camrelay_core::detection::domain::face_detector::FaceDetector;
use camrelay_core::shared::frame::Frame;
use camrelay_core::shared::region::Region;
use tokio::sync::oneshot;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::Filter;

/// One multipart POST received on `/upload`.
#[derive(Clone, Debug)]
pub struct ReceivedUpload {
    pub content_type: String,
    pub body: Vec<u8>,
}

impl ReceivedUpload {
    pub fn contains(&self, needle: &[u8]) -> bool {
        self.body.windows(needle.len()).any(|w| w == needle)
    }
}

/// In-process stand-in for the camera host: `GET /capture` serves a
/// snapshot, `POST /upload` records what it receives.
pub struct StubCamera {
    addr: SocketAddr,
    capture_status: Arc<AtomicU16>,
    upload_status: Arc<AtomicU16>,
    captures_served: Arc<AtomicUsize>,
    uploads: Arc<Mutex<Vec<ReceivedUpload>>>,
    shutdown: Option<oneshot::Sender<()>>,
    server: Option<JoinHandle<()>>,
}

impl StubCamera {
    pub fn start(snapshot: Vec<u8>) -> Self {
        let capture_status = Arc::new(AtomicU16::new(200));
        let upload_status = Arc::new(AtomicU16::new(200));
        let captures_served = Arc::new(AtomicUsize::new(0));
        let uploads = Arc::new(Mutex::new(Vec::new()));

        let capture = {
            let status = capture_status.clone();
            let served = captures_served.clone();
            warp::get()
                .and(warp::path("capture"))
                .and(warp::path::end())
                .map(move || {
                    served.fetch_add(1, Ordering::SeqCst);
                    warp::reply::with_status(snapshot.clone(), status_code(&status))
                })
        };
        let upload = {
            let status = upload_status.clone();
            let uploads = uploads.clone();
            warp::post()
                .and(warp::path("upload"))
                .and(warp::path::end())
                .and(warp::header::<String>("content-type"))
                .and(warp::body::bytes())
                .map(move |content_type: String, body: Bytes| {
                    uploads.lock().unwrap().push(ReceivedUpload {
                        content_type,
                        body: body.to_vec(),
                    });
                    warp::reply::with_status("ok", status_code(&status))
                })
        };
        let routes = capture.or(upload);

        let (addr_tx, addr_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown(
                    ([127, 0, 0, 1], 0),
                    async {
                        let _ = shutdown_rx.await;
                    },
                );
                addr_tx.send(addr).unwrap();
                server.await;
            });
        });
        let addr = addr_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        Self {
            addr,
            capture_status,
            upload_status,
            captures_served,
            uploads,
            shutdown: Some(shutdown_tx),
            server: Some(server),
        }
    }

    /// `host:port`, as the relay config expects.
    pub fn host(&self) -> String {
        self.addr.to_string()
    }

    pub fn set_capture_status(&self, status: u16) {
        self.capture_status.store(status, Ordering::SeqCst);
    }

    pub fn set_upload_status(&self, status: u16) {
        self.upload_status.store(status, Ordering::SeqCst);
    }

    pub fn captures_served(&self) -> usize {
        self.captures_served.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> Vec<ReceivedUpload> {
        self.uploads.lock().unwrap().clone()
    }
}

impl Drop for StubCamera {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(server) = self.server.take() {
            let _ = server.join();
        }
    }
}

fn status_code(status: &AtomicU16) -> StatusCode {
    StatusCode::from_u16(status.load(Ordering::SeqCst)).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// JPEG snapshot: dark background with one bright rectangle at
/// `(20, 16)`, 24×20 pixels.
pub fn snapshot_jpeg() -> Vec<u8> {
    let mut img = image::RgbImage::from_pixel(64, 48, image::Rgb([20, 20, 20]));
    for y in 16..36 {
        for x in 20..44 {
            img.put_pixel(x, y, image::Rgb([240, 240, 240]));
        }
    }
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Jpeg).unwrap();
    buf.into_inner()
}

/// Detector that reports the bounding box of bright pixels as a single face.
pub struct BrightSpotDetector;

impl FaceDetector for BrightSpotDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        let (w, h) = (frame.width() as i32, frame.height() as i32);
        let mut bounds: Option<(i32, i32, i32, i32)> = None;
        for y in 0..h {
            for x in 0..w {
                let idx = ((y * w + x) * 3) as usize;
                if frame.data()[idx] > 180 {
                    bounds = Some(match bounds {
                        None => (x, y, x, y),
                        Some((x1, y1, x2, y2)) => (x1.min(x), y1.min(y), x2.max(x), y2.max(y)),
                    });
                }
            }
        }
        Ok(bounds
            .map(|(x1, y1, x2, y2)| vec![Region::new(x1, y1, x2 - x1 + 1, y2 - y1 + 1, 0.9)])
            .unwrap_or_default())
    }
}

pub fn is_jpeg_file(path: &Path) -> bool {
    std::fs::read(path)
        .map(|bytes| bytes.starts_with(&[0xFF, 0xD8]))
        .unwrap_or(false)
}
