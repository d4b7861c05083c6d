//! Durable state is organized through [state_store::FileStore].
//! The basic idea is:
//!  - There is a directory holding one JSON file per record.
//!  - Three records exist: the habit list, the completion record, and the
//!    profile flags.
//!  - Absent or malformed records read as their empty defaults, so reads
//!    never fail.

pub mod entities;
pub mod state_store;
