pub mod frame_enhancer;
pub mod image_writer;
