//! Data Transfer Objects for the research backend API
//!
//! These mirror the backend JSON exactly. Nothing here enforces the
//! job invariants; see [`crate::domain::job::JobSnapshot`] for that.

pub mod research;
pub mod status;
