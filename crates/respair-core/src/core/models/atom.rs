use nalgebra::Point3;

/// One atom record of a Tinker archive frame.
///
/// Bond lists never contain the fixed-width padding sentinel `0`; it is stripped when
/// the record is parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The 1-based serial number, matching the row order in the frame.
    pub serial: usize,
    /// The atom name or element tag (e.g., "N", "CA", "C", "HA").
    pub symbol: String,
    /// Cartesian coordinates in Angstroms.
    pub position: Point3<f64>,
    /// The force field atom type code.
    pub type_code: i64,
    /// Serials of the atoms bonded to this one.
    pub bonds: Vec<usize>,
}

impl Atom {
    pub fn new(serial: usize, symbol: &str, position: Point3<f64>, type_code: i64) -> Self {
        Self {
            serial,
            symbol: symbol.to_string(),
            position,
            type_code,
            bonds: Vec::new(),
        }
    }

    pub fn with_bonds(mut self, bonds: impl IntoIterator<Item = usize>) -> Self {
        self.bonds = strip_bond_padding(bonds);
        self
    }
}

/// Removes the `0` padding sentinels from a bond list, keeping the order of real bonds.
pub fn strip_bond_padding(bonds: impl IntoIterator<Item = usize>) -> Vec<usize> {
    bonds.into_iter().filter(|&serial| serial != 0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_atom_without_bonds() {
        let atom = Atom::new(3, "CA", Point3::new(1.0, 2.0, 3.0), 8);
        assert_eq!(atom.serial, 3);
        assert_eq!(atom.symbol, "CA");
        assert_eq!(atom.position, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(atom.type_code, 8);
        assert!(atom.bonds.is_empty());
    }

    #[test]
    fn with_bonds_drops_padding_zeros() {
        let atom = Atom::new(1, "N", Point3::origin(), 7).with_bonds([5, 0, 9, 0]);
        assert_eq!(atom.bonds, vec![5, 9]);
    }

    #[test]
    fn strip_bond_padding_is_idempotent() {
        let once = strip_bond_padding([0, 5, 0, 9, 0]);
        let twice = strip_bond_padding(once.clone());
        assert_eq!(once, vec![5, 9]);
        assert_eq!(once, twice);
    }

    #[test]
    fn strip_bond_padding_of_only_zeros_is_empty() {
        assert!(strip_bond_padding([0, 0, 0]).is_empty());
    }
}
