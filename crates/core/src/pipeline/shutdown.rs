use thiserror::Error;

use crate::pipeline::relay_context::RelayContext;

/// Exit status used when a second interrupt aborts a graceful shutdown.
pub const FORCED_EXIT_CODE: i32 = 130;

#[derive(Error, Debug)]
#[error("failed to install interrupt handler: {0}")]
pub struct ShutdownError(#[from] ctrlc::Error);

/// What an interrupt should do given the relay's current state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterruptAction {
    /// First interrupt: workers finish their current cycle and exit.
    Graceful,
    /// Interrupt while already shutting down: exit now.
    Force,
}

/// Turns process interrupts into a cooperative stop of the relay.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    context: RelayContext,
}

impl ShutdownCoordinator {
    pub fn new(context: RelayContext) -> Self {
        Self { context }
    }

    /// Routes Ctrl-C (SIGINT) through [`Self::handle_interrupt`]. A forced
    /// interrupt exits the process with [`FORCED_EXIT_CODE`].
    pub fn install(&self) -> Result<(), ShutdownError> {
        let coordinator = self.clone();
        ctrlc::set_handler(move || {
            if coordinator.handle_interrupt() == InterruptAction::Force {
                std::process::exit(FORCED_EXIT_CODE);
            }
        })?;
        Ok(())
    }

    pub fn handle_interrupt(&self) -> InterruptAction {
        if self.context.stop() {
            log::info!("Interrupt received, finishing current cycle (press Ctrl-C again to force)");
            InterruptAction::Graceful
        } else {
            log::warn!("Second interrupt received, exiting immediately");
            InterruptAction::Force
        }
    }

    /// Stops the relay without an interrupt. Returns `false` if it was
    /// already stopping.
    pub fn request_shutdown(&self) -> bool {
        let flipped = self.context.stop();
        if flipped {
            log::info!("Shutdown requested");
        }
        flipped
    }
}
