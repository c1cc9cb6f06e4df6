use std::path::{Path, PathBuf};

/// A protein pocket paired with its reference ligand, as laid out on disk by
/// the dataset preprocessing step.
///
/// Complexes are referenced by path rather than parsed eagerly: the protein
/// structure is only ever consumed by external tools, and the reference ligand
/// is read lazily when a stage needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Complex {
    /// The complex identifier, taken from its directory name (e.g., a PDB code).
    pub id: String,
    /// Path to the protein structure (`protein.pdb`).
    pub protein_path: PathBuf,
    /// Path to the reference ligand (`ligand.sdf`).
    pub ligand_path: PathBuf,
}

impl Complex {
    /// Creates a complex rooted at `dir`, using the directory name as its id.
    ///
    /// Returns `None` if the directory name is not valid UTF-8.
    pub fn from_dir(dir: &Path) -> Option<Self> {
        let id = dir.file_name()?.to_str()?.to_string();
        Some(Self {
            id,
            protein_path: dir.join("protein.pdb"),
            ligand_path: dir.join("ligand.sdf"),
        })
    }

    /// Returns `true` if both the protein and ligand files exist on disk.
    pub fn is_complete(&self) -> bool {
        self.protein_path.is_file() && self.ligand_path.is_file()
    }
}
