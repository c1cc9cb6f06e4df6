use super::config::ConfigError;
use super::exec::ExecError;
use super::report::ReportError;
use super::scoring::ScoringError;
use crate::core::checkpoints::CheckpointError;
use crate::core::dataset::DatasetError;
use crate::core::io::sdf::SdfError;
use crate::core::models::record::ManifestError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Tool execution failed: {0}")]
    Tool(#[from] ExecError),

    #[error("Scoring failed: {0}")]
    Scoring(#[from] ScoringError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Molecule file error: {0}")]
    MoleculeFile(#[from] SdfError),

    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("The sampler produced no molecules for '{complex_id}' in '{dir}'", dir = dir.display())]
    NoSamplesProduced { complex_id: String, dir: PathBuf },

    #[error("Results directory not found: {}", .0.display())]
    ResultsDirNotFound(PathBuf),

    #[error("No SDF files found in '{}'", .0.display())]
    NoSdfFiles(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
