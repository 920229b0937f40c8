use crate::pipeline::acquire_images_use_case::{AcquireImagesUseCase, AcquireStats};
use crate::pipeline::process_images_use_case::{ProcessImagesUseCase, ProcessStats};

/// Combined statistics of both workers after a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelayReport {
    pub acquire: AcquireStats,
    pub process: ProcessStats,
}

/// Abstracts how the Acquirer and Processor workers are run.
///
/// This is a port (application-layer interface). Infrastructure provides
/// concrete implementations. Both workers share a `RelayContext`; the
/// executor returns once that context stops and both workers have exited.
pub trait RelayExecutor: Send {
    fn execute(
        &self,
        acquirer: AcquireImagesUseCase,
        processor: ProcessImagesUseCase,
    ) -> Result<RelayReport, Box<dyn std::error::Error>>;
}
