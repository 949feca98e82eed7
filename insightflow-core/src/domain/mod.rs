//! Core domain types
//!
//! These types are what the poller and the views work with. Wire shapes
//! live in [`crate::dto`] and are converted into these after validation.

pub mod job;
pub mod phase;
pub mod research;
