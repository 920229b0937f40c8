pub mod atomic_file;
pub mod constants;
pub mod frame;
pub mod region;
pub mod relay_config;
