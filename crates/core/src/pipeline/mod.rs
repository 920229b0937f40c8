pub mod acquire_images_use_case;
pub mod availability_signal;
pub mod infrastructure;
pub mod pipeline_logger;
pub mod process_images_use_case;
pub mod region_filter;
pub mod relay_context;
pub mod relay_executor;
pub mod shutdown;
