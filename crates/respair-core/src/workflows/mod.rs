//! # Workflows Module
//!
//! High-level entry points that run the complete pairwise interaction energy pipeline.
//!
//! - **Pair Energy Workflow** ([`pair_energy`]) - Segments a trajectory into residues,
//!   extracts and evaluates every residue pair through the external tools, and
//!   aggregates the per-pair energy statistics into the results file.
//!
//! Per-pair and per-file failures are logged and recorded in the returned summaries;
//! only failures that would affect every remaining pair (an unwritable results file,
//! for example) abort a run.

pub mod pair_energy;
