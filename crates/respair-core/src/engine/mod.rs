//! # Engine Module
//!
//! Drives the external tools and owns everything stateful about a run.
//!
//! - **Configuration** ([`config`]) - Tool commands, extraction and analysis settings,
//!   output locations
//! - **Error Handling** ([`error`]) - Engine-specific error types
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Tool Seam** ([`tool`]) - The narrow `run(program, stdin_script)` interface and
//!   its child-process implementation
//! - **Drivers** ([`extraction`], [`analysis`]) - Per-pair structure extraction and
//!   energy evaluation

pub mod analysis;
pub mod config;
pub mod error;
pub mod extraction;
pub mod progress;
pub mod tool;
