//! Receptor and ligand preparation for PDBQT-based engines.
//!
//! Preparation prefers the MGLTools receptor script, falls back to Open
//! Babel, and finally degrades to copying the input file verbatim with a
//! warning. Only a missing tool triggers a fallback; a tool that is present
//! but fails is a hard error. Existing `.pdbqt` outputs are reused.

use super::ScoringError;
use crate::engine::config::ToolPaths;
use crate::engine::exec::{ToolCommand, tool_available};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub(crate) fn receptor_script_command(
    tools: &ToolPaths,
    input: &Path,
    output: &Path,
) -> ToolCommand {
    ToolCommand::new(&tools.prepare_receptor)
        .arg("-r")
        .arg_path(input)
        .arg("-o")
        .arg_path(output)
}

pub(crate) fn obabel_receptor_command(
    tools: &ToolPaths,
    input: &Path,
    output: &Path,
) -> ToolCommand {
    ToolCommand::new(&tools.obabel)
        .arg_path(input)
        .arg("-O")
        .arg_path(output)
        .args(["-xr", "--partialcharge", "gasteiger", "-p", "7.4"])
}

pub(crate) fn obabel_ligand_command(tools: &ToolPaths, input: &Path, output: &Path) -> ToolCommand {
    ToolCommand::new(&tools.obabel)
        .arg_path(input)
        .arg("-O")
        .arg_path(output)
        .args(["--partialcharge", "gasteiger", "-p", "7.4"])
}

fn ensure_written(path: PathBuf) -> Result<PathBuf, ScoringError> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(ScoringError::MissingOutput(path))
    }
}

/// Converts a receptor PDB to PDBQT next to the input file.
pub fn prepare_receptor(protein: &Path, tools: &ToolPaths) -> Result<PathBuf, ScoringError> {
    let output = protein.with_extension("pdbqt");
    if output.is_file() {
        debug!(file = %output.display(), "reusing existing receptor PDBQT");
        return Ok(output);
    }

    if tool_available(&tools.prepare_receptor) {
        let command = receptor_script_command(tools, protein, &output);
        command.run()?.require_success(&tools.prepare_receptor)?;
        return ensure_written(output);
    }
    if tool_available(&tools.obabel) {
        let command = obabel_receptor_command(tools, protein, &output);
        command.run()?.require_success(&tools.obabel)?;
        return ensure_written(output);
    }

    warn!(
        file = %protein.display(),
        "neither {} nor {} is available; copying the receptor unchanged",
        tools.prepare_receptor,
        tools.obabel
    );
    fs::copy(protein, &output)?;
    Ok(output)
}

/// Converts a ligand SDF to PDBQT next to the input file.
pub fn prepare_ligand(ligand: &Path, tools: &ToolPaths) -> Result<PathBuf, ScoringError> {
    let output = ligand.with_extension("pdbqt");
    if output.is_file() {
        debug!(file = %output.display(), "reusing existing ligand PDBQT");
        return Ok(output);
    }

    if tool_available(&tools.obabel) {
        let command = obabel_ligand_command(tools, ligand, &output);
        command.run()?.require_success(&tools.obabel)?;
        return ensure_written(output);
    }

    warn!(
        file = %ligand.display(),
        "{} is not available; copying the ligand unchanged",
        tools.obabel
    );
    fs::copy(ligand, &output)?;
    Ok(output)
}
