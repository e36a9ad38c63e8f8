//! The dispatch-and-completion engine.
//!
//! Fans a set of input documents out to an external document service (one
//! [`Job`](docrelay_core::job::Job) per input, one concurrent worker per
//! job) and drives every job to a terminal state through one of two
//! completion strategies:
//!
//! - **synchronous** — the full result is already in the dispatch
//!   response body ([`completion::complete_sync`]);
//! - **polling** — the provider delivers the result later into a shared
//!   object store under the job's correlation id
//!   ([`completion::complete_polling`]).
//!
//! [`batcher::Batcher`] is the entry point; it owns the join barrier and
//! guarantees that one job's failure or timeout never cancels, blocks, or
//! corrupts its siblings.

pub mod batcher;
pub mod client;
pub mod completion;
pub mod config;
pub mod error;

pub use batcher::{BatchInput, Batcher};
pub use client::DispatchClient;
pub use config::PollConfig;
pub use error::DispatchError;
