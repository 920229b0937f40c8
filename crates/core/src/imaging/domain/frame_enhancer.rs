use crate::shared::frame::Frame;

pub const DEFAULT_CONTRAST: f32 = 1.5;
pub const DEFAULT_BRIGHTNESS: f32 = 20.0;

/// 3×3 sharpening kernel (row-major), weights sum to 1.
const SHARPEN_KERNEL: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 9.0, -1.0, -1.0, -1.0, -1.0];

/// Pre-detection enhancement for dim or soft camera snapshots.
///
/// Sharpens with a 3×3 kernel (borders mirror without repeating the edge
/// pixel, `dcb|abcd|cba`), then
/// applies `clamp(contrast * v + brightness)` per channel. The input frame
/// is left untouched; detection runs on the returned copy while boxes are
/// drawn on the original.
#[derive(Clone, Debug)]
pub struct FrameEnhancer {
    contrast: f32,
    brightness: f32,
}

impl FrameEnhancer {
    pub fn new(contrast: f32, brightness: f32) -> Self {
        Self {
            contrast,
            brightness,
        }
    }

    pub fn enhance(&self, frame: &Frame) -> Frame {
        let sharpened = sharpen(
            frame.data(),
            frame.width() as usize,
            frame.height() as usize,
            frame.channels() as usize,
        );
        let adjusted = sharpened
            .into_iter()
            .map(|v| saturate(self.contrast * v as f32 + self.brightness))
            .collect();
        Frame::new(
            adjusted,
            frame.width(),
            frame.height(),
            frame.channels(),
            frame.sequence(),
        )
    }
}

impl Default for FrameEnhancer {
    fn default() -> Self {
        Self::new(DEFAULT_CONTRAST, DEFAULT_BRIGHTNESS)
    }
}

fn sharpen(data: &[u8], width: usize, height: usize, channels: usize) -> Vec<u8> {
    let mut out = vec![0u8; data.len()];
    if width == 0 || height == 0 {
        return out;
    }
    let mirror_x = |x: isize| reflect_101(x, width);
    let mirror_y = |y: isize| reflect_101(y, height);

    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut sum = 0.0f32;
                for (k, &w) in SHARPEN_KERNEL.iter().enumerate() {
                    let sx = mirror_x(x as isize + (k % 3) as isize - 1);
                    let sy = mirror_y(y as isize + (k / 3) as isize - 1);
                    sum += data[(sy * width + sx) * channels + c] as f32 * w;
                }
                out[(y * width + x) * channels + c] = saturate(sum);
            }
        }
    }
    out
}

/// Maps an index one step outside `0..len` back inside by reflection.
fn reflect_101(i: isize, len: usize) -> usize {
    let last = len as isize - 1;
    if last == 0 {
        return 0;
    }
    if i < 0 {
        (-i) as usize
    } else if i > last {
        (2 * last - i) as usize
    } else {
        i as usize
    }
}

fn saturate(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
