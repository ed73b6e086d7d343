//! Data structures for atoms, residues and residue pairs.
//!
//! Atoms are kept in file order and addressed by their 1-based serial. A residue owns a
//! contiguous run of those atoms; pairs refer to residues by their enumeration index.

pub mod atom;
pub mod pair;
pub mod residue;
