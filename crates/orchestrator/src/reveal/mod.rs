#![forbid(unsafe_code)]

mod queue;
mod scheduler;

pub use queue::{COMPACT_MAX_WIDTH, RevealQueue, Viewport};
pub use scheduler::{REVEAL_STEP_DELAY, RevealBatch, RevealInputs, RevealScheduler};
