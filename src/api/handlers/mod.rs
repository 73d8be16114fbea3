//! Ingress request handlers.

mod jobs;
mod send;

pub use jobs::get_job;
pub use send::send_transaction;
