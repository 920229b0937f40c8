use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Domain interface for marking detected regions on a frame.
///
/// Implementations draw in-place (`&mut Frame`); an empty region list
/// leaves the pixels unchanged.
pub trait FrameAnnotator: Send {
    fn annotate(&self, frame: &mut Frame, regions: &[Region])
        -> Result<(), Box<dyn std::error::Error>>;
}
