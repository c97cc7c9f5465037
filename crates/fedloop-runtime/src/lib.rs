//! Runtime — the collect → gate → aggregate → drain → publish cycle.
//!
//! `CycleOrchestrator` runs one cycle at a time; `Scheduler` repeats it on
//! a fixed interval, isolating failed cycles and stopping only between
//! cycles.

pub mod drain;
pub mod orchestrator;
pub mod publish;
pub mod scheduler;
pub mod types;

pub use orchestrator::CycleOrchestrator;
pub use publish::VersionPublisher;
pub use scheduler::{shutdown_on_ctrl_c, Scheduler};
pub use types::*;
