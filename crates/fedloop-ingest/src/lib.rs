//! fedloop Ingest — update artifact intake and queue producer.
//!
//! `UpdateIntake` scans the queue directory and parses every recognized
//! artifact into an `UpdateBatch`, skipping entries that fail to parse.
//! `UpdateQueue` is the producer side used by `fedloop submit`.

pub mod intake;
pub mod queue;
pub mod types;

pub use intake::UpdateIntake;
pub use queue::UpdateQueue;
pub use types::*;
