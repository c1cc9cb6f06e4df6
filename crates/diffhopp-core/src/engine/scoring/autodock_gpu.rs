//! AutoDock-GPU adapter.
//!
//! AutoDock-GPU docks against precomputed affinity maps rather than raw
//! structures, so each call stages a scratch directory: the receptor PDBQT is
//! copied in, a grid parameter file is rendered from the atom types present
//! on both sides, `autogrid4` fills the maps, and the docking run reads them
//! through the `.maps.fld` index. Everything in the GPF is a relative file
//! name, which is why both tool invocations run with the scratch directory
//! as their working directory.

use super::ScoringError;
use super::grid::{self, GridSpec};
use super::prepare;
use crate::core::io::pdbqt;
use crate::engine::config::{ScoringOptions, ToolPaths};
use crate::engine::exec::ToolCommand;
use nalgebra::Point3;
use std::path::Path;
use tempfile::TempDir;

/// Docking energy evaluations budgeted per unit of exhaustiveness.
const NEV_PER_EXHAUSTIVENESS: u64 = 312_500;

/// Receptor file name inside the scratch directory. The GPF references the
/// receptor and its maps by relative name, so a fixed stem keeps every
/// derived file name predictable.
const STAGED_RECEPTOR: &str = "receptor.pdbqt";
const GPF_NAME: &str = "receptor.gpf";
const GLG_NAME: &str = "receptor.glg";
const FLD_NAME: &str = "receptor.maps.fld";

/// Stem of the docking log written by AutoDock-GPU.
const RESULT_STEM: &str = "docking_result";

pub(crate) fn autodock_command(
    tools: &ToolPaths,
    fld_name: &str,
    ligand_pdbqt: &Path,
    options: &ScoringOptions,
) -> ToolCommand {
    let evaluations = u64::from(options.exhaustiveness) * NEV_PER_EXHAUSTIVENESS;
    ToolCommand::new(&tools.autodock_gpu)
        .arg("--ffile")
        .arg(fld_name)
        .arg("--lfile")
        .arg_path(ligand_pdbqt)
        .arg("--nrun")
        .arg("1")
        .arg("--nev")
        .arg(evaluations.to_string())
        .arg("--resnam")
        .arg(RESULT_STEM)
        .arg("--dlgoutput")
        .arg("1")
        .arg("--xmloutput")
        .arg("0")
}

/// Extracts the best binding energy from a DLG docking log.
///
/// A rank-1 `RANKING` row wins outright. Otherwise the last
/// `Estimated Free Energy of Binding` line seen is used, which is the form
/// single-run logs actually contain.
pub(crate) fn parse_dlg(contents: &str) -> Option<f64> {
    let mut fallback = None;
    for line in contents.lines() {
        if line.trim_start().starts_with("RANKING") {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() >= 3 && parts[1] == "1" {
                return parts[2].parse().ok();
            }
        } else if line.contains("Estimated Free Energy of Binding") {
            if let Some((_, rest)) = line.split_once('=') {
                if let Some(Ok(value)) = rest.split_whitespace().next().map(str::parse) {
                    fallback = Some(value);
                }
            }
        }
    }
    fallback
}

pub fn score(
    protein: &Path,
    ligand: &Path,
    center: Point3<f64>,
    options: &ScoringOptions,
    tools: &ToolPaths,
) -> Result<f64, ScoringError> {
    let receptor_pdbqt = prepare::prepare_receptor(protein, tools)?;
    let ligand_pdbqt = prepare::prepare_ligand(ligand, tools)?;

    let receptor_types = pdbqt::atom_types_from_path(&receptor_pdbqt)?;
    let ligand_types = pdbqt::atom_types_from_path(&ligand_pdbqt)?;

    let workdir = TempDir::new()?;
    std::fs::copy(&receptor_pdbqt, workdir.path().join(STAGED_RECEPTOR))?;

    let spec = GridSpec {
        receptor_file_name: STAGED_RECEPTOR,
        center,
        receptor_types: &receptor_types,
        ligand_types: &ligand_types,
    };
    grid::write_gpf(&spec, &workdir.path().join(GPF_NAME))?;

    let autogrid =
        grid::autogrid_command(tools, GPF_NAME, GLG_NAME).current_dir(workdir.path());
    let output = autogrid.run()?;
    output.require_success(&tools.autogrid)?;

    let docking = autodock_command(tools, FLD_NAME, &ligand_pdbqt, options)
        .current_dir(workdir.path());
    let output = docking.run()?;
    output.require_success(&tools.autodock_gpu)?;

    let dlg_path = workdir.path().join(format!("{RESULT_STEM}.dlg"));
    if !dlg_path.is_file() {
        return Err(ScoringError::MissingOutput(dlg_path));
    }
    let contents = std::fs::read_to_string(&dlg_path)?;
    parse_dlg(&contents).ok_or(ScoringError::UnparseableOutput {
        engine: "autodock-gpu",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_matches_the_documented_invocation() {
        let options = ScoringOptions {
            box_size: 20.0,
            exhaustiveness: 8,
        };
        let command = autodock_command(
            &ToolPaths::default(),
            FLD_NAME,
            Path::new("/work/sample.pdbqt"),
            &options,
        );
        assert_eq!(
            command.rendered(),
            "autodock_gpu_64wi --ffile receptor.maps.fld --lfile /work/sample.pdbqt \
             --nrun 1 --nev 2500000 --resnam docking_result --dlgoutput 1 --xmloutput 0"
        );
    }

    #[test]
    fn rank_one_ranking_row_wins_outright() {
        let dlg = "\
DOCKED: USER    Estimated Free Energy of Binding    =   -5.10 kcal/mol
RANKING    1      -7.52      0.00      0.00
DOCKED: USER    Estimated Free Energy of Binding    =   -4.00 kcal/mol
";
        assert_eq!(parse_dlg(dlg), Some(-7.52));
    }

    #[test]
    fn free_energy_fallback_keeps_the_last_value() {
        let dlg = "\
DOCKED: USER    Estimated Free Energy of Binding    =   -5.10 kcal/mol
DOCKED: USER    Estimated Free Energy of Binding    =   -6.42 kcal/mol
";
        assert_eq!(parse_dlg(dlg), Some(-6.42));
    }

    #[test]
    fn non_rank_one_rows_are_skipped() {
        let dlg = "\
RANKING    2      -9.99      0.00      0.00
DOCKED: USER    Estimated Free Energy of Binding    =   -5.10 kcal/mol
";
        assert_eq!(parse_dlg(dlg), Some(-5.10));
    }

    #[test]
    fn empty_log_yields_none() {
        assert_eq!(parse_dlg(""), None);
        assert_eq!(parse_dlg("Run complete.\n"), None);
    }
}
