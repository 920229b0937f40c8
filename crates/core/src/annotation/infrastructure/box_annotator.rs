use image::{ImageBuffer, Rgb};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

pub const DEFAULT_BOX_COLOR: [u8; 3] = [0, 0, 255];
pub const DEFAULT_BOX_THICKNESS: u32 = 2;

/// Draws a hollow rectangle around each region.
///
/// Thickness grows inward, so every drawn pixel stays inside the detected
/// rectangle.
pub struct BoxAnnotator {
    color: [u8; 3],
    thickness: u32,
}

impl BoxAnnotator {
    pub fn new(color: [u8; 3], thickness: u32) -> Self {
        Self {
            color,
            thickness: thickness.max(1),
        }
    }
}

impl Default for BoxAnnotator {
    fn default() -> Self {
        Self::new(DEFAULT_BOX_COLOR, DEFAULT_BOX_THICKNESS)
    }
}

impl FrameAnnotator for BoxAnnotator {
    fn annotate(
        &self,
        frame: &mut Frame,
        regions: &[Region],
    ) -> Result<(), Box<dyn std::error::Error>> {
        if frame.channels() != 3 {
            return Err(format!("BoxAnnotator expects RGB frames, got {} channels", frame.channels()).into());
        }
        let (width, height) = (frame.width(), frame.height());
        let mut canvas = ImageBuffer::<Rgb<u8>, &mut [u8]>::from_raw(width, height, frame.data_mut())
            .ok_or("Frame buffer does not match its dimensions")?;
        let color = Rgb(self.color);

        for region in regions {
            for inset in 0..self.thickness as i32 {
                let w = region.width - 2 * inset;
                let h = region.height - 2 * inset;
                if w <= 0 || h <= 0 {
                    break;
                }
                let rect = Rect::at(region.x + inset, region.y + inset).of_size(w as u32, h as u32);
                draw_hollow_rect_mut(&mut canvas, rect, color);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_frame(width: u32, height: u32) -> Frame {
        Frame::new(vec![128; (width * height * 3) as usize], width, height, 3, 0)
    }

    fn pixel(frame: &Frame, x: u32, y: u32) -> [u8; 3] {
        let i = ((y * frame.width() + x) * 3) as usize;
        [frame.data()[i], frame.data()[i + 1], frame.data()[i + 2]]
    }

    #[test]
    fn test_no_regions_leaves_pixels_unchanged() {
        let mut frame = make_frame(20, 20);
        let before = frame.data().to_vec();
        BoxAnnotator::default().annotate(&mut frame, &[]).unwrap();
        assert_eq!(frame.data(), &before[..]);
    }

    #[test]
    fn test_draws_border_of_requested_thickness() {
        let mut frame = make_frame(40, 40);
        let region = Region::new(10, 10, 20, 20, 0.9);
        BoxAnnotator::new([0, 0, 255], 2).annotate(&mut frame, &[region]).unwrap();

        assert_eq!(pixel(&frame, 10, 10), [0, 0, 255]);
        assert_eq!(pixel(&frame, 11, 11), [0, 0, 255]);
        assert_eq!(pixel(&frame, 29, 20), [0, 0, 255]);
        // third ring and interior untouched
        assert_eq!(pixel(&frame, 12, 12), [128, 128, 128]);
        assert_eq!(pixel(&frame, 20, 20), [128, 128, 128]);
        // outside untouched
        assert_eq!(pixel(&frame, 9, 9), [128, 128, 128]);
        assert_eq!(pixel(&frame, 30, 30), [128, 128, 128]);
    }

    #[test]
    fn test_region_at_frame_edge_is_clipped() {
        let mut frame = make_frame(16, 16);
        let region = Region::new(8, 8, 20, 20, 0.9);
        BoxAnnotator::default().annotate(&mut frame, &[region]).unwrap();
        assert_eq!(pixel(&frame, 8, 8), [0, 0, 255]);
    }

    #[test]
    fn test_tiny_region_does_not_panic() {
        let mut frame = make_frame(16, 16);
        let region = Region::new(3, 3, 1, 1, 0.9);
        BoxAnnotator::new([255, 0, 0], 4).annotate(&mut frame, &[region]).unwrap();
        assert_eq!(pixel(&frame, 3, 3), [255, 0, 0]);
    }

    #[test]
    fn test_rejects_non_rgb_frame() {
        let mut frame = Frame::new(vec![0; 16], 4, 4, 1, 0);
        assert!(BoxAnnotator::default()
            .annotate(&mut frame, &[Region::new(0, 0, 2, 2, 1.0)])
            .is_err());
    }
}
