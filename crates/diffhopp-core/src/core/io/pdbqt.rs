use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdbqtError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("No ATOM or HETATM records found in '{}'", .0.display())]
    NoAtoms(PathBuf),
}

/// Collects the AutoDock atom types present in a PDBQT stream.
///
/// The atom type is the final whitespace-separated token of each `ATOM` or
/// `HETATM` record. The result is deduplicated and sorted, which is the order
/// grid parameter files expect map declarations in.
pub fn atom_types(reader: &mut impl BufRead) -> Result<Vec<String>, PdbqtError> {
    let mut types = BTreeSet::new();
    for line in reader.lines() {
        let line = line?;
        if line.starts_with("ATOM") || line.starts_with("HETATM") {
            if let Some(atom_type) = line.split_whitespace().last() {
                types.insert(atom_type.to_string());
            }
        }
    }
    Ok(types.into_iter().collect())
}

/// Collects the AutoDock atom types present in a PDBQT file, failing if the
/// file declares no atoms at all.
pub fn atom_types_from_path(path: &Path) -> Result<Vec<String>, PdbqtError> {
    let file = File::open(path)?;
    let types = atom_types(&mut BufReader::new(file))?;
    if types.is_empty() {
        return Err(PdbqtError::NoAtoms(path.to_path_buf()));
    }
    Ok(types)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECEPTOR_FRAGMENT: &str = "\
REMARK prepared for docking
ATOM      1  N   MET A   1      27.340  24.430   2.614  1.00  0.00     0.187 N
ATOM      2  CA  MET A   1      26.266  25.413   2.842  1.00  0.00     0.128 C
HETATM    3  ZN  ZN  A 200      20.000  20.000  20.000  1.00  0.00     2.000 Zn
ATOM      4  CB  MET A   1      26.913  26.639   3.531  1.00  0.00     0.055 C
TER
";

    #[test]
    fn collects_sorted_unique_atom_types() {
        let types = atom_types(&mut RECEPTOR_FRAGMENT.as_bytes()).unwrap();
        assert_eq!(types, vec!["C", "N", "Zn"]);
    }

    #[test]
    fn ignores_non_atom_records() {
        let types = atom_types(&mut "REMARK nothing\nTER\nEND\n".as_bytes()).unwrap();
        assert!(types.is_empty());
    }

    #[test]
    fn empty_file_from_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.pdbqt");
        std::fs::write(&path, "REMARK empty\n").unwrap();
        let err = atom_types_from_path(&path).unwrap_err();
        assert!(matches!(err, PdbqtError::NoAtoms(_)));
    }
}
