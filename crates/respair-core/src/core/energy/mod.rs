//! Energy report parsing and per-pair statistics.
//!
//! The energy tool's stdout is free text. [`report`] scans it with a table of
//! [`report::ReportRule`]s supplied as data, and [`statistics`] accumulates the
//! resulting observations per residue pair and per component.

pub mod report;
pub mod statistics;
