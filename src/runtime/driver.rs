//! # Background drivers.
//!
//! A [`Driver`] is one long-running loop owned by the
//! [`Simulation`](super::Simulation): the tick driver and the request
//! generator are the built-in ones. Each receives a child
//! [`CancellationToken`] and must return promptly once it is cancelled.
//!
//! ## Contract
//! - Check the token at loop-top and race it against every timed wait.
//! - Never hold the building lock across an `.await` (the building API is
//!   synchronous, so this holds automatically).
//! - `Err(DriverError::Fatal)` or a panic ends the whole simulation.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::DriverError;

/// One cooperative background loop.
#[async_trait]
pub trait Driver: Send + Sync + 'static {
    /// Stable name used in events and stuck-driver reports.
    fn name(&self) -> &'static str;

    /// Runs until `token` is cancelled or the driver is done.
    async fn run(&self, token: CancellationToken) -> Result<(), DriverError>;
}
