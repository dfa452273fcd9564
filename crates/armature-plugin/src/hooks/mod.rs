//! Hook orchestration engine.
//!
//! Stages, their argument payloads, the per-stage participant sequences,
//! the execution runners, and the failure types they produce.

pub mod args;
pub mod error;
pub mod registry;
pub mod runner;
pub mod stage;
pub mod vote;
