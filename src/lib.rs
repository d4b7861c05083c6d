//! Core of a local-first daily habit tracker. A small set of named, colored
//! habits is persisted on the user's device together with a per-day
//! completion record, and pure aggregation functions derive monthly scores,
//! weekly breakdowns, and streaks from that record for display.
//!

pub mod stats;
pub mod store;
pub mod utils;
