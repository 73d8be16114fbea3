//! Core domain types for the zkc sequencer pipeline.

mod job;
mod types;
mod witness;

pub use job::{auto_payload, Job, JobId, JobKind, JobStatus};
pub use types::{QueryKey, QueryKeyError};
pub use witness::{RawWitness, TxWitness};
