//! Input/output for the Tinker archive format and the results files.
//!
//! [`arc`] reads trajectories and rewrites the connectivity of extracted pair
//! artifacts; [`results`] appends the per-pair text blocks and writes the optional CSV
//! summary.

pub mod arc;
pub mod results;
