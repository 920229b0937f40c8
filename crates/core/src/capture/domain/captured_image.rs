use std::time::Instant;

/// Raw snapshot bytes from one successful fetch.
///
/// `sequence` increases by one per successful capture, so the Processor can
/// tell which fetch it is working on even when older captures were
/// superseded before it got to them.
#[derive(Clone, Debug)]
pub struct CapturedImage {
    pub sequence: u64,
    pub bytes: Vec<u8>,
    pub captured_at: Instant,
}

impl CapturedImage {
    pub fn new(sequence: u64, bytes: Vec<u8>) -> Self {
        Self {
            sequence,
            bytes,
            captured_at: Instant::now(),
        }
    }
}
