//! Molecule generation through the external sampler.
//!
//! The diffusion model itself lives behind a sampler binary; this module
//! builds its command line, runs it once per pocket, and collects the SDF
//! files it writes. Repainting runs reuse the same binary with the inpaint
//! switches added.

use crate::engine::config::ToolPaths;
use crate::engine::error::EngineError;
use crate::engine::exec::ToolCommand;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Repaint schedule forwarded to the sampler for inpaint generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InpaintParams {
    pub resampling_steps: u32,
    pub jump_length: u32,
}

/// One sampler invocation for a single protein pocket.
#[derive(Debug, Clone)]
pub struct SamplerRequest<'a> {
    /// Identifier of the complex, used in diagnostics.
    pub complex_id: &'a str,
    /// Reference ligand the scaffold is hopped from.
    pub ligand: &'a Path,
    /// Protein pocket the samples are conditioned on.
    pub protein: &'a Path,
    /// Directory the sampler writes its SDF files into.
    pub output_dir: &'a Path,
    pub checkpoint: &'a Path,
    pub num_samples: usize,
    pub batch_size: usize,
    /// `Some` switches the sampler into inpaint mode.
    pub inpaint: Option<InpaintParams>,
}

pub(crate) fn sampler_command(tools: &ToolPaths, request: &SamplerRequest) -> ToolCommand {
    let mut command = ToolCommand::new(&tools.sampler)
        .arg("--input_molecule")
        .arg_path(request.ligand)
        .arg("--input_protein")
        .arg_path(request.protein)
        .arg("--output")
        .arg_path(request.output_dir)
        .arg("--checkpoint_path")
        .arg_path(request.checkpoint)
        .arg("--num_samples")
        .arg(request.num_samples.to_string())
        .arg("--batch_size")
        .arg(request.batch_size.to_string());
    if let Some(inpaint) = request.inpaint {
        command = command
            .arg("--inpaint")
            .arg("--r")
            .arg(inpaint.resampling_steps.to_string())
            .arg("--j")
            .arg(inpaint.jump_length.to_string());
    }
    command
}

/// Runs the sampler and returns the SDF files it produced, sorted by name.
pub fn run_sampler(tools: &ToolPaths, request: &SamplerRequest) -> Result<Vec<PathBuf>, EngineError> {
    fs::create_dir_all(request.output_dir)?;

    let command = sampler_command(tools, request);
    let output = command.run()?;
    output.require_success(&tools.sampler)?;

    let samples = sdf_files_in(request.output_dir)?;
    if samples.is_empty() {
        return Err(EngineError::NoSamplesProduced {
            complex_id: request.complex_id.to_string(),
            dir: request.output_dir.to_path_buf(),
        });
    }
    Ok(samples)
}

/// Copies the reference ligand into the staging directory so the ground
/// truth stage is scored from the same bundle layout as generated samples.
pub fn snapshot_ground_truth(ligand: &Path, output_dir: &Path) -> Result<PathBuf, EngineError> {
    if !ligand.is_file() {
        return Err(EngineError::InputNotFound(ligand.to_path_buf()));
    }
    fs::create_dir_all(output_dir)?;
    let target = output_dir.join("ligand.sdf");
    fs::copy(ligand, &target)?;
    Ok(target)
}

/// Lists the `.sdf` files directly inside `dir`, sorted by file name.
pub fn sdf_files_in(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "sdf") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
