//! # ResPair Core Library
//!
//! Pairwise residue interaction energy analysis for molecular-dynamics trajectories
//! stored in the Tinker archive (ARC/XYZ) text format.
//!
//! The library never evaluates a force field itself. It segments a trajectory's atom
//! list into residues, works out which atom ranges an external extraction tool must
//! cut out for every residue pair, drives an external energy-decomposition tool on the
//! extracted structure and turns its textual report into per-pair statistics.
//!
//! ## Architectural Philosophy
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Atom`, `Residue`,
//!   `ResiduePair`), trajectory and artifact text I/O, the index-selection decision
//!   table, the energy-report grammar and the running statistics.
//!
//! - **[`engine`]: The Drivers.** Configuration, errors and progress reporting, the
//!   [`engine::tool::ExternalTool`] seam behind which every child process lives, and the
//!   extraction and energy-analysis drivers built on top of it.
//!
//! - **[`workflows`]: The Public API.** Ties `engine` and `core` together into the
//!   complete pairwise pipeline over one or many trajectory files.

pub mod core;
pub mod engine;
pub mod workflows;
