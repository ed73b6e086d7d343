//! # Core Module
//!
//! Stateless building blocks of the pairwise energy pipeline.
//!
//! - **Molecular Representation** ([`models`]) - Atoms, residues, the backbone-triad
//!   segmenter and residue-pair enumeration
//! - **File I/O** ([`io`]) - Tinker archive reading, connectivity normalization of
//!   extracted artifacts and results-file writing
//! - **Index Selection** ([`selection`]) - The ordered decision table that turns a
//!   residue pair into the extraction tool's exclusion script
//! - **Energy Reports** ([`energy`]) - The line-oriented report grammar and the
//!   per-component running statistics

pub mod energy;
pub mod io;
pub mod models;
pub mod selection;
