//! Speech-quality analysis engine: turns a timed transcript into
//! deterministic metrics (rate, fillers, pauses, phrasing) under a tiered
//! single-flight cache, bounded concurrency and a best-effort advisory stage.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
