//! Index selection for the extraction tool.
//!
//! Isolating a residue pair means telling the extraction tool which atom-serial ranges
//! to drop from every frame. The ranges depend on how the two residues sit relative to
//! each other in serial order, which is captured by [`SelectionRule`], an ordered
//! decision table whose last arm is unconditional.

use crate::core::models::residue::SerialSpan;
use std::fmt;
use std::path::{Path, PathBuf};

/// Serial layout of a reference system made of exactly two residues.
///
/// When the first residue of a pair starts at `first_serial` and the second at
/// `partner_first_serial`, only the atoms after the partner are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceGeometry {
    pub first_serial: usize,
    pub partner_first_serial: usize,
}

impl Default for ReferenceGeometry {
    fn default() -> Self {
        Self {
            first_serial: 1,
            partner_first_serial: 17,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionRule {
    /// The pair matches the configured two-residue reference geometry.
    ReferencePair,
    /// The second residue starts right after the first one ends.
    Adjacent,
    /// Non-adjacent, the first residue precedes the second in serial order.
    Ordered,
    /// The residues' serial order is reversed relative to enumeration order.
    Reversed,
}

impl SelectionRule {
    /// Evaluation order of the decision table. The first matching rule wins.
    pub const ORDER: [SelectionRule; 4] = [
        SelectionRule::ReferencePair,
        SelectionRule::Adjacent,
        SelectionRule::Ordered,
        SelectionRule::Reversed,
    ];

    /// Picks the rule for residues `a` (lower index) and `b` (higher index).
    pub fn classify(a: SerialSpan, b: SerialSpan, reference: Option<&ReferenceGeometry>) -> Self {
        if Self::ReferencePair.guard(a, b, reference) {
            Self::ReferencePair
        } else if Self::Adjacent.guard(a, b, reference) {
            Self::Adjacent
        } else if Self::Ordered.guard(a, b, reference) {
            Self::Ordered
        } else {
            Self::Reversed
        }
    }

    /// The rule's own condition, evaluated without regard to earlier rules.
    pub fn guard(
        &self,
        a: SerialSpan,
        b: SerialSpan,
        reference: Option<&ReferenceGeometry>,
    ) -> bool {
        match self {
            Self::ReferencePair => reference.is_some_and(|geometry| {
                a.first == geometry.first_serial && b.first == geometry.partner_first_serial
            }),
            Self::Adjacent => a.last + 1 == b.first,
            Self::Ordered => a.first < b.first,
            Self::Reversed => true,
        }
    }

    /// Boundary serials handed to the tool, before the frame header bound.
    fn boundaries(&self, a: SerialSpan, b: SerialSpan) -> Vec<usize> {
        let before = |span: SerialSpan| span.first.saturating_sub(1);
        let after = |span: SerialSpan| span.last + 1;
        match self {
            Self::ReferencePair => vec![after(b)],
            Self::Adjacent => vec![1, before(a), after(b)],
            Self::Ordered => vec![1, before(a), after(a), before(b), after(b)],
            Self::Reversed => vec![1, before(b), after(b), before(a), after(a)],
        }
    }

    fn inclusion_flag(&self) -> u8 {
        match self {
            Self::ReferencePair | Self::Adjacent => 0,
            Self::Ordered | Self::Reversed => 1,
        }
    }
}

/// The typed exclusion list for one residue pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomSelection {
    pub rule: SelectionRule,
    pub boundaries: Vec<usize>,
    pub inclusion_flag: u8,
}

impl AtomSelection {
    pub fn for_pair(a: SerialSpan, b: SerialSpan, reference: Option<&ReferenceGeometry>) -> Self {
        let rule = SelectionRule::classify(a, b, reference);
        Self {
            rule,
            boundaries: rule.boundaries(a, b),
            inclusion_flag: rule.inclusion_flag(),
        }
    }

    /// Renders the exclusion line, closing the ranges with the frame header bound.
    pub fn render(&self, header: &str) -> String {
        let mut line = String::new();
        for boundary in &self.boundaries {
            line.push_str(&format!("-{} ", boundary));
        }
        line.push_str(&format!("-{} {}", header, self.inclusion_flag));
        line
    }
}

/// Inclusive frame range and stride handed to the extraction tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRange {
    pub start: usize,
    pub end: usize,
    pub stride: usize,
}

impl FrameRange {
    pub fn all(frame_count: usize, stride: usize) -> Self {
        Self {
            start: 1,
            end: frame_count,
            stride,
        }
    }
}

/// The complete stdin script for one extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionScript {
    pub trajectory: PathBuf,
    pub mode: u32,
    pub selection: AtomSelection,
    pub header: String,
    pub frames: FrameRange,
}

impl ExtractionScript {
    pub fn new(
        trajectory: &Path,
        mode: u32,
        selection: AtomSelection,
        header: &str,
        frames: FrameRange,
    ) -> Self {
        Self {
            trajectory: trajectory.to_path_buf(),
            mode,
            selection,
            header: header.to_string(),
            frames,
        }
    }
}

impl fmt::Display for ExtractionScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.trajectory.display())?;
        writeln!(f, "{}", self.mode)?;
        writeln!(f, "{}", self.selection.render(&self.header))?;
        writeln!(
            f,
            "{} {} {}",
            self.frames.start, self.frames.end, self.frames.stride
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn span(first: usize, last: usize) -> SerialSpan {
        SerialSpan::new(first, last)
    }

    #[test]
    fn reference_geometry_selects_reference_pair_rule() {
        let reference = ReferenceGeometry::default();
        let selection = AtomSelection::for_pair(span(1, 16), span(17, 30), Some(&reference));
        assert_eq!(selection.rule, SelectionRule::ReferencePair);
        assert_eq!(selection.boundaries, vec![31]);
        assert_eq!(selection.render("250"), "-31 -250 0");
    }

    #[test]
    fn reference_pair_takes_precedence_over_adjacency() {
        let reference = ReferenceGeometry::default();
        let (a, b) = (span(1, 16), span(17, 30));
        assert!(SelectionRule::Adjacent.guard(a, b, Some(&reference)));
        assert_eq!(
            SelectionRule::classify(a, b, Some(&reference)),
            SelectionRule::ReferencePair
        );
    }

    #[test]
    fn disabled_reference_geometry_falls_through_to_adjacency() {
        let selection = AtomSelection::for_pair(span(1, 16), span(17, 30), None);
        assert_eq!(selection.rule, SelectionRule::Adjacent);
    }

    #[test]
    fn adjacent_residues_select_adjacent_rule() {
        let selection = AtomSelection::for_pair(span(20, 35), span(36, 50), None);
        assert_eq!(selection.rule, SelectionRule::Adjacent);
        assert_eq!(selection.boundaries, vec![1, 19, 51]);
        assert_eq!(selection.render("400"), "-1 -19 -51 -400 0");
    }

    #[test]
    fn separated_residues_select_ordered_rule() {
        let selection = AtomSelection::for_pair(span(20, 35), span(60, 70), None);
        assert_eq!(selection.rule, SelectionRule::Ordered);
        assert_eq!(selection.render("400"), "-1 -19 -36 -59 -71 -400 1");
    }

    #[test]
    fn reversed_residues_swap_the_exclusion_ranges() {
        let selection = AtomSelection::for_pair(span(60, 70), span(20, 35), None);
        assert_eq!(selection.rule, SelectionRule::Reversed);
        assert_eq!(selection.render("400"), "-1 -19 -36 -59 -71 -400 1");
    }

    #[test]
    fn header_text_is_rendered_verbatim() {
        let selection = AtomSelection::for_pair(span(20, 35), span(36, 50), None);
        assert_eq!(selection.render("0400"), "-1 -19 -51 -0400 0");
    }

    #[test]
    fn script_follows_the_extraction_protocol() {
        let selection = AtomSelection::for_pair(span(20, 35), span(36, 50), None);
        let script = ExtractionScript::new(
            Path::new("run/test.arc"),
            3,
            selection,
            "400",
            FrameRange::all(5, 1),
        );
        assert_eq!(
            script.to_string(),
            "run/test.arc\n3\n-1 -19 -51 -400 0\n1 5 1\n"
        );
    }

    #[test]
    fn exactly_one_rule_fires_for_random_layouts() {
        let mut rng = StdRng::seed_from_u64(42);
        let reference = ReferenceGeometry::default();

        for _ in 0..1000 {
            let a_first = rng.gen_range(1..60);
            let a = span(a_first, a_first + rng.gen_range(0..20));
            let b_first = if rng.gen_bool(0.3) {
                a.last + 1
            } else {
                rng.gen_range(1..90)
            };
            let b = span(b_first, b_first + rng.gen_range(0..20));
            let geometry = rng.gen_bool(0.5).then_some(&reference);

            let winners: Vec<_> = SelectionRule::ORDER
                .iter()
                .enumerate()
                .filter(|(i, rule)| {
                    rule.guard(a, b, geometry)
                        && SelectionRule::ORDER[..*i]
                            .iter()
                            .all(|earlier| !earlier.guard(a, b, geometry))
                })
                .map(|(_, rule)| *rule)
                .collect();

            assert_eq!(winners.len(), 1, "layout {:?} / {:?}", a, b);
            assert_eq!(winners[0], SelectionRule::classify(a, b, geometry));
        }
    }

    #[test]
    fn every_rule_is_reachable() {
        let reference = ReferenceGeometry::default();
        let layouts = [
            (span(1, 16), span(17, 20), SelectionRule::ReferencePair),
            (span(2, 5), span(6, 9), SelectionRule::Adjacent),
            (span(2, 5), span(8, 9), SelectionRule::Ordered),
            (span(8, 9), span(2, 5), SelectionRule::Reversed),
        ];
        for (a, b, expected) in layouts {
            assert_eq!(SelectionRule::classify(a, b, Some(&reference)), expected);
        }
    }
}
