pub const YOLO_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const YOLO_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

/// Address of the ESP32-CAM the relay talks to when nothing overrides it.
pub const DEFAULT_CAMERA_HOST: &str = "192.168.254.176";

pub const CAPTURE_ENDPOINT: &str = "capture";
pub const UPLOAD_ENDPOINT: &str = "upload";

/// Multipart field the camera firmware reads the processed image from.
pub const UPLOAD_FIELD_NAME: &str = "plain";

pub const CAPTURED_IMAGE_FILENAME: &str = "captured_image.jpg";
pub const PROCESSED_IMAGE_FILENAME: &str = "processed_image.jpg";

pub const APP_DIR_NAME: &str = "CamRelay";
