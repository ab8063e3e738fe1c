//! Embassy async tasks
//!
//! The display and bus tasks run on the high-priority interrupt
//! executor; the control task runs on the thread executor.

pub mod control;
pub mod display;
pub mod transfer;

pub use control::control_task;
pub use display::{display_task, DisplayParts};
pub use transfer::transfer_task;
