//! YOLO face detector using ONNX Runtime via `ort`.
//!
//! Letterboxes each frame to the model's square input, runs inference,
//! keeps boxes above the confidence threshold, applies NMS and maps the
//! survivors back to frame coordinates.

use std::path::Path;

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Fallback input resolution when the model doesn't declare one.
const DEFAULT_INPUT_SIZE: u32 = 640;

pub const DEFAULT_CONFIDENCE: f64 = 0.5;

const NMS_IOU_THRESH: f64 = 0.45;

/// Letterbox padding value (YOLO convention).
const PAD_VALUE: f32 = 114.0 / 255.0;

pub struct OnnxYoloFaceDetector {
    session: ort::session::Session,
    confidence: f64,
    input_size: u32,
}

impl OnnxYoloFaceDetector {
    /// Load a YOLO face model. The input resolution is read from the model's
    /// NCHW input shape, falling back to 640 for dynamic shapes.
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?.commit_from_file(model_path)?;

        let input_size = session
            .inputs()
            .first()
            .and_then(|input| match input.dtype() {
                ort::value::ValueType::Tensor { ref shape, .. }
                    if shape.len() >= 4 && shape[2] > 0 =>
                {
                    Some(shape[2] as u32)
                }
                _ => None,
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        log::info!(
            "Loaded face model {} (input {input_size}x{input_size})",
            model_path.display()
        );

        Ok(Self {
            session,
            confidence,
            input_size,
        })
    }
}

impl FaceDetector for OnnxYoloFaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        let letterbox = Letterbox::fit(frame.width(), frame.height(), self.input_size);
        let input_tensor = letterbox.tensor(frame);

        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("YOLO model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape().to_vec();
        let data = tensor.as_slice().ok_or("Cannot get tensor slice")?;

        let candidates = decode_rows(data, &shape, self.confidence)?
            .into_iter()
            .filter_map(|row| letterbox.to_region(&row, frame.width(), frame.height()))
            .collect();

        Ok(Region::suppress_overlaps(candidates, NMS_IOU_THRESH))
    }
}

/// One model output row: box center, size (letterbox pixels) and score.
#[derive(Clone, Debug, PartialEq)]
struct RawBox {
    cx: f64,
    cy: f64,
    w: f64,
    h: f64,
    score: f64,
}

/// Reads `[1, features, detections]` or `[1, detections, features]` output
/// and keeps rows scoring at least `confidence`. Features beyond the fifth
/// (pose keypoints) are ignored.
fn decode_rows(
    data: &[f32],
    shape: &[usize],
    confidence: f64,
) -> Result<Vec<RawBox>, Box<dyn std::error::Error>> {
    if shape.len() != 3 {
        return Err(format!("Unexpected YOLO output shape: {shape:?}").into());
    }
    let transposed = shape[1] < shape[2];
    let (num_dets, num_feats) = if transposed {
        (shape[2], shape[1])
    } else {
        (shape[1], shape[2])
    };
    if num_feats < 5 {
        return Ok(Vec::new());
    }

    let at = |det: usize, feat: usize| -> f64 {
        if transposed {
            data[feat * num_dets + det] as f64
        } else {
            data[det * num_feats + feat] as f64
        }
    };

    Ok((0..num_dets)
        .filter(|&i| at(i, 4) >= confidence)
        .map(|i| RawBox {
            cx: at(i, 0),
            cy: at(i, 1),
            w: at(i, 2),
            h: at(i, 3),
            score: at(i, 4),
        })
        .collect())
}

/// Aspect-preserving resize into a `size × size` square with centered padding.
#[derive(Clone, Copy, Debug)]
struct Letterbox {
    size: u32,
    scale: f64,
    new_w: u32,
    new_h: u32,
    pad_x: u32,
    pad_y: u32,
}

impl Letterbox {
    fn fit(frame_w: u32, frame_h: u32, size: u32) -> Self {
        let target = size as f64;
        let scale = (target / frame_w as f64).min(target / frame_h as f64);
        let new_w = ((frame_w as f64 * scale).round() as u32).min(size);
        let new_h = ((frame_h as f64 * scale).round() as u32).min(size);
        Self {
            size,
            scale,
            new_w,
            new_h,
            pad_x: (size - new_w) / 2,
            pad_y: (size - new_h) / 2,
        }
    }

    /// Nearest-neighbour resize into a normalized NCHW float tensor.
    fn tensor(&self, frame: &Frame) -> ndarray::Array4<f32> {
        let s = self.size as usize;
        let mut tensor = ndarray::Array4::<f32>::from_elem((1, 3, s, s), PAD_VALUE);

        let src = frame.as_ndarray();
        let src_h = frame.height() as usize;
        let src_w = frame.width() as usize;

        for y in 0..self.new_h as usize {
            let src_y = ((y as f64 / self.scale) as usize).min(src_h - 1);
            for x in 0..self.new_w as usize {
                let src_x = ((x as f64 / self.scale) as usize).min(src_w - 1);
                let ty = self.pad_y as usize + y;
                let tx = self.pad_x as usize + x;
                for c in 0..3 {
                    tensor[[0, c, ty, tx]] = src[[src_y, src_x, c]] as f32 / 255.0;
                }
            }
        }
        tensor
    }

    fn to_region(&self, b: &RawBox, frame_w: u32, frame_h: u32) -> Option<Region> {
        let unmap_x = |v: f64| (v - self.pad_x as f64) / self.scale;
        let unmap_y = |v: f64| (v - self.pad_y as f64) / self.scale;
        Region::from_corners(
            unmap_x(b.cx - b.w / 2.0),
            unmap_y(b.cy - b.h / 2.0),
            unmap_x(b.cx + b.w / 2.0),
            unmap_y(b.cy + b.h / 2.0),
            frame_w,
            frame_h,
            b.score,
        )
    }
}
