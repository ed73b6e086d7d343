use super::atom::Atom;

/// The backbone anchor whose appearance marks the start of the next residue.
pub const BACKBONE_TRIAD: [&str; 3] = ["N", "CA", "C"];

/// Inclusive range of atom serials covered by a residue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SerialSpan {
    pub first: usize,
    pub last: usize,
}

impl SerialSpan {
    pub fn new(first: usize, last: usize) -> Self {
        Self { first, last }
    }
}

/// A contiguous run of atoms forming one amino-acid unit.
///
/// Residues are indexed in enumeration order. Index 0 is the structural reference and
/// is the only residue that may be empty, which happens when the atom list opens with
/// a backbone triad.
#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    pub index: usize,
    pub(crate) atoms: Vec<Atom>,
}

impl Residue {
    pub(crate) fn new(index: usize, atoms: Vec<Atom>) -> Self {
        Self { index, atoms }
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn first_serial(&self) -> Option<usize> {
        self.atoms.first().map(|atom| atom.serial)
    }

    pub fn last_serial(&self) -> Option<usize> {
        self.atoms.last().map(|atom| atom.serial)
    }

    pub fn span(&self) -> Option<SerialSpan> {
        Some(SerialSpan::new(self.first_serial()?, self.last_serial()?))
    }
}

/// Groups an ordered atom sequence into residues using the backbone-triad heuristic.
///
/// Atoms are accumulated one by one. Whenever the last three accumulated symbols are
/// exactly `N`, `CA`, `C`, everything before them is sealed off as a residue and the
/// triad seeds the next one. Whatever is still accumulated at the end of the input
/// (a lone trailing triad included) becomes the final residue. Only the literal symbol
/// sequence is inspected; no chemistry is validated.
pub fn segment_residues(atoms: impl IntoIterator<Item = Atom>) -> Vec<Residue> {
    let mut residues = Vec::new();
    let mut current: Vec<Atom> = Vec::new();

    for atom in atoms {
        current.push(atom);
        if ends_with_backbone_triad(&current) {
            let seed = current.split_off(current.len() - BACKBONE_TRIAD.len());
            let sealed = std::mem::replace(&mut current, seed);
            residues.push(Residue::new(residues.len(), sealed));
        }
    }

    if !current.is_empty() {
        residues.push(Residue::new(residues.len(), current));
    }

    residues
}

fn ends_with_backbone_triad(atoms: &[Atom]) -> bool {
    atoms.len() >= BACKBONE_TRIAD.len()
        && atoms[atoms.len() - BACKBONE_TRIAD.len()..]
            .iter()
            .zip(BACKBONE_TRIAD)
            .all(|(atom, symbol)| atom.symbol == symbol)
}
