pub mod annotation;
pub mod capture;
pub mod detection;
pub mod imaging;
pub mod pipeline;
pub mod shared;
pub mod upload;
