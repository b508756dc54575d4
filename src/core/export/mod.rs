//! Export orchestration
//!
//! - [`orchestrator`] - Submission and the status poll state machine
//! - [`poll`] - Cancellation context and delay strategy for the poll loop

pub mod orchestrator;
pub mod poll;

pub use orchestrator::{default_location, ExportOrchestrator};
pub use poll::{Delay, ExportContext, TokioDelay};
