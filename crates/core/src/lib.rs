//! Core model types and pure helpers for the docrelay dispatch engine.
//!
//! This crate holds the job abstraction ([`job::Job`]), the service
//! descriptor ([`descriptor::ServiceDescriptor`]) with its payload
//! construction, and the filesystem/JSON helpers shared by the dispatch
//! layer. It has zero internal dependencies and performs no network I/O.

pub mod descriptor;
pub mod error;
pub mod files;
pub mod job;
pub mod types;
