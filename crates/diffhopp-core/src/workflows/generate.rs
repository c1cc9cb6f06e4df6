//! Custom generation workflow.
//!
//! Samples molecules for one protein-ligand pair outside any dataset, then
//! parses what the sampler wrote and measures each file. Unlike the
//! evaluation pipeline there is no docking here; the caller gets structure
//! metrics per emitted file and decides what to keep.

use crate::core::io::sdf::SdfFile;
use crate::core::metrics::connectivity::ConnectivityReport;
use crate::engine::config::GenerationConfig;
use crate::engine::error::EngineError;
use crate::engine::exec::ToolCommand;
use crate::engine::generation;
use crate::engine::progress::{Progress, ProgressReporter};
use std::fs;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

/// One file the sampler emitted, with its measured outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedMolecule {
    pub path: PathBuf,
    /// Structure metrics, when the file parsed.
    pub connectivity: Option<ConnectivityReport>,
    /// Parse failure reason otherwise.
    pub failure: Option<String>,
}

impl GeneratedMolecule {
    pub fn is_valid(&self) -> bool {
        self.connectivity.is_some()
    }
}

pub(crate) fn generation_command(config: &GenerationConfig) -> ToolCommand {
    ToolCommand::new(&config.tools.sampler)
        .arg("--input_molecule")
        .arg_path(&config.input_molecule)
        .arg("--input_protein")
        .arg_path(&config.input_protein)
        .arg("--output")
        .arg_path(&config.output_dir)
        .arg("--checkpoint_path")
        .arg_path(&config.checkpoint_path)
        .arg("--num_samples")
        .arg(config.num_samples.to_string())
}

/// Runs the sampler once and measures every SDF file it produced.
#[instrument(skip_all, name = "generation_workflow")]
pub fn run(
    config: &GenerationConfig,
    reporter: &ProgressReporter,
) -> Result<Vec<GeneratedMolecule>, EngineError> {
    if !config.input_molecule.is_file() {
        return Err(EngineError::InputNotFound(config.input_molecule.clone()));
    }
    if !config.input_protein.is_file() {
        return Err(EngineError::InputNotFound(config.input_protein.clone()));
    }
    fs::create_dir_all(&config.output_dir)?;

    reporter.report(Progress::PhaseStart {
        name: "Generating molecules",
    });
    let command = generation_command(config);
    info!(command = %command.rendered(), "launching sampler");
    let output = command.run()?;
    output.require_success(&config.tools.sampler)?;

    let files = generation::sdf_files_in(&config.output_dir)?;
    if files.is_empty() {
        return Err(EngineError::NoSdfFiles(config.output_dir.clone()));
    }

    reporter.report(Progress::TaskStart {
        total_steps: files.len() as u64,
    });
    let mut molecules = Vec::with_capacity(files.len());
    for path in files {
        let molecule = match SdfFile::read_single_from_path(&path) {
            Ok(molecule) => GeneratedMolecule {
                connectivity: Some(ConnectivityReport::of(&molecule)),
                failure: None,
                path,
            },
            Err(error) => {
                warn!(file = %path.display(), %error, "emitted file failed to parse");
                GeneratedMolecule {
                    connectivity: None,
                    failure: Some(error.to_string()),
                    path,
                }
            }
        };
        molecules.push(molecule);
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    info!(
        total = molecules.len(),
        valid = molecules.iter().filter(|m| m.is_valid()).count(),
        "generation run finished"
    );
    Ok(molecules)
}
