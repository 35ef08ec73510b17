//! Release orchestration.
//!
//! This module provides the [`Pipeline`] orchestrator that drives one
//! release from the source resource tree to a single published artifact.
//!
//! # Module Organization
//!
//! - [`checksum`] - SHA256 checksum of the final artifact
//! - `orchestrator` - [`Pipeline`] and its stage sequence
//! - `observer` - [`Stage`] notifications for progress output
//! - `report` - JSON [`ReleaseReport`]
//! - [`tool_detection`] - required and optional tool checks

pub mod checksum;
mod observer;
mod orchestrator;
mod report;
pub mod tool_detection;

pub use observer::{NoopObserver, Stage, StageObserver};
pub use orchestrator::{Pipeline, ReleaseOutcome};
pub use report::ReleaseReport;
