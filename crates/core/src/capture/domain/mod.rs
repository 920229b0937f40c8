pub mod captured_image;
pub mod snapshot_source;
