//! Docking engine adapters.
//!
//! Each adapter builds the engine's command line from a shared set of search
//! parameters, runs it, and parses a binding score in kcal/mol out of its
//! output. Scoring failures for a single molecule are errors the caller is
//! expected to record and move past; they never abort a run.

pub mod autodock_gpu;
pub mod gnina;
pub(crate) mod grid;
pub mod prepare;
pub mod qvina;

use crate::core::io::pdbqt::PdbqtError;
use crate::core::io::sdf::SdfError;
use crate::core::models::molecule::Molecule;
use crate::engine::config::{DockingEngineKind, ScoringOptions, ToolPaths};
use crate::engine::exec::ExecError;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("failed to read molecule '{path}': {source}", path = path.display())]
    InvalidMolecule {
        path: PathBuf,
        #[source]
        source: SdfError,
    },
    #[error("molecule '{path}' has no atoms", path = path.display())]
    EmptyMolecule { path: PathBuf },
    #[error("could not parse a binding score from {engine} output")]
    UnparseableOutput { engine: &'static str },
    #[error("docking output file missing: {}", .0.display())]
    MissingOutput(PathBuf),
    #[error("PDBQT error: {0}")]
    Pdbqt(#[from] PdbqtError),
    #[error(transparent)]
    Exec(#[from] ExecError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Scores one molecule against its receptor with the selected engine.
///
/// The docking box is centered on the molecule's mean atom position; an
/// empty molecule cannot define a box and is rejected up front.
pub fn score_molecule(
    engine: DockingEngineKind,
    protein: &Path,
    ligand_sdf: &Path,
    molecule: &Molecule,
    options: &ScoringOptions,
    tools: &ToolPaths,
) -> Result<f64, ScoringError> {
    let center = molecule
        .center()
        .ok_or_else(|| ScoringError::EmptyMolecule {
            path: ligand_sdf.to_path_buf(),
        })?;

    match engine {
        DockingEngineKind::Gnina => gnina::score(protein, ligand_sdf, center, options, tools),
        DockingEngineKind::QVina => qvina::score(protein, ligand_sdf, center, options, tools),
        DockingEngineKind::AutoDockGpu => {
            autodock_gpu::score(protein, ligand_sdf, center, options, tools)
        }
    }
}
