//! InsightFlow Core
//!
//! Core types shared by the InsightFlow client and CLI.
//!
//! This crate contains:
//! - Domain types: validated job snapshots, research results, progress phases
//! - DTOs: the JSON shapes exchanged with the research backend

pub mod domain;
pub mod dto;
