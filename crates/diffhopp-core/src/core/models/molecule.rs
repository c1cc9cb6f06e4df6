use nalgebra::Point3;

/// Represents a single atom in a small molecule.
///
/// Only the element symbol and 3D position are tracked; generated structures
/// carry no partial charges or force field typing until they are prepared for
/// docking by an external tool.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The element symbol as written in the source file (e.g., "C", "N", "Cl").
    pub element: String,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
}

impl Atom {
    /// Creates a new atom with the given element symbol and position.
    pub fn new(element: &str, position: Point3<f64>) -> Self {
        Self {
            element: element.to_string(),
            position,
        }
    }

    /// Returns `true` if this atom is a hydrogen.
    pub fn is_hydrogen(&self) -> bool {
        self.element.eq_ignore_ascii_case("H")
    }
}

/// A covalent bond between two atoms, stored as zero-based atom indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bond {
    /// Index of the first atom in the parent molecule's atom list.
    pub a: usize,
    /// Index of the second atom in the parent molecule's atom list.
    pub b: usize,
    /// Bond order as encoded in the source file (1 = single, 2 = double, ...).
    pub order: u8,
}

impl Bond {
    /// Creates a new bond between atoms `a` and `b`.
    pub fn new(a: usize, b: usize, order: u8) -> Self {
        Self { a, b, order }
    }
}

/// An in-memory molecular graph with 3D coordinates.
///
/// This is the unit the pipeline moves between stages: the generation stage
/// writes molecules to SDF files, and the evaluation stage reads them back to
/// compute docking boxes and connectivity statistics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Molecule {
    /// The molecule title from the source file, often a complex identifier.
    pub name: String,
    /// All atoms, in file order.
    pub atoms: Vec<Atom>,
    /// All bonds, referencing atoms by index.
    pub bonds: Vec<Bond>,
}

impl Molecule {
    /// Creates an empty molecule with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            atoms: Vec::new(),
            bonds: Vec::new(),
        }
    }

    /// Returns the number of atoms in the molecule.
    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }

    /// Returns the number of bonds in the molecule.
    pub fn num_bonds(&self) -> usize {
        self.bonds.len()
    }

    /// Returns `true` if the molecule contains no atoms.
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Returns the number of non-hydrogen atoms.
    pub fn heavy_atom_count(&self) -> usize {
        self.atoms.iter().filter(|a| !a.is_hydrogen()).count()
    }

    /// Computes the geometric center over all atoms, or `None` for an empty
    /// molecule.
    ///
    /// The center defines the docking search box for every scoring engine.
    /// Hydrogens are included, matching the conformers as the sampler wrote
    /// them.
    pub fn center(&self) -> Option<Point3<f64>> {
        if self.atoms.is_empty() {
            return None;
        }
        let mut sum = Point3::origin();
        for atom in &self.atoms {
            sum += atom.position.coords;
        }
        Some(sum / self.atoms.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> Molecule {
        let mut mol = Molecule::new("water");
        mol.atoms.push(Atom::new("O", Point3::new(0.0, 0.0, 0.0)));
        mol.atoms.push(Atom::new("H", Point3::new(0.96, 0.0, 0.0)));
        mol.atoms.push(Atom::new("H", Point3::new(-0.24, 0.93, 0.0)));
        mol.bonds.push(Bond::new(0, 1, 1));
        mol.bonds.push(Bond::new(0, 2, 1));
        mol
    }

    #[test]
    fn center_averages_all_atoms() {
        let mol = water();
        let center = mol.center().unwrap();
        assert!((center.x - 0.24).abs() < 1e-9);
        assert!((center.y - 0.31).abs() < 1e-9);
        assert!((center.z - 0.0).abs() < 1e-9);
    }

    #[test]
    fn center_of_empty_molecule_is_none() {
        let mol = Molecule::new("empty");
        assert!(mol.center().is_none());
    }

    #[test]
    fn heavy_atom_count_skips_hydrogens() {
        let mol = water();
        assert_eq!(mol.num_atoms(), 3);
        assert_eq!(mol.heavy_atom_count(), 1);
    }
}
