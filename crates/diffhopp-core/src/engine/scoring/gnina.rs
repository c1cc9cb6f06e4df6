//! gnina adapter.
//!
//! gnina consumes PDB and SDF inputs directly, so no PDBQT preparation is
//! needed. The run uses `--minimize` with CNN rescoring, which keeps scoring
//! fast while still producing a Vina-style result table.

use super::ScoringError;
use crate::engine::config::{ScoringOptions, ToolPaths};
use crate::engine::exec::{ToolCommand, ToolOutput};
use nalgebra::Point3;
use std::path::Path;
use tracing::trace;

pub(crate) fn gnina_command(
    tools: &ToolPaths,
    protein: &Path,
    ligand: &Path,
    center: Point3<f64>,
    options: &ScoringOptions,
) -> ToolCommand {
    ToolCommand::new(&tools.gnina)
        .arg("-r")
        .arg_path(protein)
        .arg("-l")
        .arg_path(ligand)
        .arg("--center_x")
        .arg(format!("{:.3}", center.x))
        .arg("--center_y")
        .arg(format!("{:.3}", center.y))
        .arg("--center_z")
        .arg(format!("{:.3}", center.z))
        .arg("--size_x")
        .arg(options.box_size.to_string())
        .arg("--size_y")
        .arg(options.box_size.to_string())
        .arg("--size_z")
        .arg(options.box_size.to_string())
        .arg("--exhaustiveness")
        .arg(options.exhaustiveness.to_string())
        .args(["--cnn_scoring", "rescore", "--minimize"])
}

/// Extracts the binding affinity from gnina stdout: the rank-1 row of the
/// result table when present, otherwise the `Affinity:` line `--minimize`
/// prints.
pub(crate) fn parse_output(stdout: &str) -> Option<f64> {
    let mut lines = stdout.lines();
    while let Some(line) = lines.next() {
        if line.trim_start().starts_with("-----") {
            let row = lines.next()?;
            let mut parts = row.split_whitespace();
            if parts.next() != Some("1") {
                return None;
            }
            return parts.next().and_then(|value| value.parse().ok());
        }
    }

    stdout.lines().find_map(|line| {
        line.trim_start()
            .strip_prefix("Affinity:")
            .and_then(|rest| rest.split_whitespace().next())
            .and_then(|value| value.parse().ok())
    })
}

pub fn score(
    protein: &Path,
    ligand: &Path,
    center: Point3<f64>,
    options: &ScoringOptions,
    tools: &ToolPaths,
) -> Result<f64, ScoringError> {
    let command = gnina_command(tools, protein, ligand, center, options);
    let output = command.run()?;

    if !output.success() {
        // gnina routes Open Babel chatter to stderr; drop it so the error
        // excerpt shows the actual failure.
        let stderr: Vec<&str> = output
            .stderr
            .lines()
            .filter(|line| !line.contains("Open Babel Warning"))
            .collect();
        let filtered = ToolOutput {
            status: output.status,
            stdout: String::new(),
            stderr: stderr.join("\n"),
        };
        filtered.require_success(&tools.gnina)?;
    }

    trace!(stdout_bytes = output.stdout.len(), "parsing gnina output");
    parse_output(&output.stdout).ok_or(ScoringError::UnparseableOutput { engine: "gnina" })
}
