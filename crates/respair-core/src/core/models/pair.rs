use itertools::Itertools;
use std::fmt;

/// An unordered residue pair, stored with `first < second`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResiduePair {
    pub first: usize,
    pub second: usize,
}

impl ResiduePair {
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            first: a.min(b),
            second: a.max(b),
        }
    }

    /// File stem used for the pair's temporary structure artifact.
    pub fn artifact_stem(&self) -> String {
        format!("pair_{}_{}", self.first, self.second)
    }
}

impl fmt::Display for ResiduePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "res {} - res {}", self.first, self.second)
    }
}

/// Enumerates every pair `(i, j)` with `1 <= i < j < residue_count`.
///
/// Residue 0 is the structural reference and never takes part in a pair.
pub fn enumerate_pairs(residue_count: usize) -> impl Iterator<Item = ResiduePair> {
    (1..residue_count)
        .tuple_combinations()
        .map(|(i, j)| ResiduePair::new(i, j))
}

/// Number of pairs [`enumerate_pairs`] yields for `residue_count` residues.
pub fn pair_count(residue_count: usize) -> usize {
    let n = residue_count.saturating_sub(1);
    n * n.saturating_sub(1) / 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_orders_the_indices() {
        let pair = ResiduePair::new(5, 2);
        assert_eq!(pair.first, 2);
        assert_eq!(pair.second, 5);
    }

    #[test]
    fn display_matches_results_row_prefix() {
        assert_eq!(ResiduePair::new(1, 3).to_string(), "res 1 - res 3");
    }

    #[test]
    fn artifact_stem_is_keyed_by_both_indices() {
        assert_eq!(ResiduePair::new(4, 7).artifact_stem(), "pair_4_7");
    }

    #[test]
    fn enumerate_pairs_skips_the_reference_residue() {
        let pairs: Vec<_> = enumerate_pairs(4).collect();
        assert_eq!(
            pairs,
            vec![
                ResiduePair::new(1, 2),
                ResiduePair::new(1, 3),
                ResiduePair::new(2, 3),
            ]
        );
    }

    #[test]
    fn enumerate_pairs_is_empty_for_fewer_than_three_residues() {
        assert_eq!(enumerate_pairs(0).count(), 0);
        assert_eq!(enumerate_pairs(1).count(), 0);
        assert_eq!(enumerate_pairs(2).count(), 0);
    }

    #[test]
    fn pair_count_matches_enumeration() {
        for n in 0..12 {
            assert_eq!(pair_count(n), enumerate_pairs(n).count());
        }
    }
}
