pub mod multipart_uploader;
