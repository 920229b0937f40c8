pub mod image_uploader;
