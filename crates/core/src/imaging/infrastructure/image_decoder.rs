use crate::shared::frame::Frame;

/// Decodes encoded snapshot bytes (JPEG from the camera, or anything else
/// the `image` crate recognises) into an RGB [`Frame`].
pub fn decode_frame(bytes: &[u8], sequence: u64) -> Result<Frame, image::ImageError> {
    let rgb = image::load_from_memory(bytes)?.to_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(Frame::new(rgb.into_raw(), width, height, 3, sequence))
}
