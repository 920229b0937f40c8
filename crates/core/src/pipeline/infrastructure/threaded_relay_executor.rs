use std::thread;

use crate::pipeline::acquire_images_use_case::{AcquireImagesUseCase, AcquireStats};
use crate::pipeline::process_images_use_case::ProcessImagesUseCase;
use crate::pipeline::relay_context::RelayContext;
use crate::pipeline::relay_executor::{RelayExecutor, RelayReport};

const ACQUIRER_THREAD_NAME: &str = "acquirer";

/// Runs the relay on two OS threads.
///
/// Layout: `acquirer thread → signal → calling thread [processor]`
///
/// The Processor runs on the caller's thread so the detector session never
/// crosses a thread boundary after construction. The Acquirer is joined
/// once the Processor returns. If the Acquirer exits early, including by
/// panicking, the relay is stopped so the Processor does not wait forever.
#[derive(Default)]
pub struct ThreadedRelayExecutor;

impl ThreadedRelayExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl RelayExecutor for ThreadedRelayExecutor {
    fn execute(
        &self,
        acquirer: AcquireImagesUseCase,
        processor: ProcessImagesUseCase,
    ) -> Result<RelayReport, Box<dyn std::error::Error>> {
        let stop_on_exit = StopOnDrop(acquirer.context().clone());
        let acquirer_handle = thread::Builder::new()
            .name(ACQUIRER_THREAD_NAME.into())
            .spawn(move || {
                let _stop_on_exit = stop_on_exit;
                acquirer.run()
            })?;

        let process = processor.run();
        let acquire = join_acquirer(acquirer_handle)?;

        Ok(RelayReport { acquire, process })
    }
}

/// Stops the relay when dropped, which also happens while unwinding.
struct StopOnDrop(RelayContext);

impl Drop for StopOnDrop {
    fn drop(&mut self) {
        if self.0.stop() {
            log::warn!("Acquirer exited, stopping relay");
        }
    }
}

fn join_acquirer(
    handle: thread::JoinHandle<AcquireStats>,
) -> Result<AcquireStats, Box<dyn std::error::Error>> {
    handle.join().map_err(|_| "Acquirer thread panicked".into())
}
