//! QuickVina 2.1 adapter.
//!
//! QuickVina requires PDBQT inputs for both sides, so receptor and ligand go
//! through [`super::prepare`] first.

use super::ScoringError;
use super::prepare;
use crate::engine::config::{ScoringOptions, ToolPaths};
use crate::engine::exec::ToolCommand;
use nalgebra::Point3;
use std::path::Path;

const TABLE_RULE: &str = "-----+------------+----------+----------";

pub(crate) fn qvina_command(
    tools: &ToolPaths,
    receptor_pdbqt: &Path,
    ligand_pdbqt: &Path,
    center: Point3<f64>,
    options: &ScoringOptions,
) -> ToolCommand {
    ToolCommand::new(&tools.qvina)
        .arg("--receptor")
        .arg_path(receptor_pdbqt)
        .arg("--ligand")
        .arg_path(ligand_pdbqt)
        .arg("--center_x")
        .arg(center.x.to_string())
        .arg("--center_y")
        .arg(center.y.to_string())
        .arg("--center_z")
        .arg(center.z.to_string())
        .arg("--size_x")
        .arg(options.box_size.to_string())
        .arg("--size_y")
        .arg(options.box_size.to_string())
        .arg("--size_z")
        .arg(options.box_size.to_string())
        .arg("--exhaustiveness")
        .arg(options.exhaustiveness.to_string())
}

/// Extracts the rank-1 affinity from the QuickVina result table.
pub(crate) fn parse_output(stdout: &str) -> Option<f64> {
    let mut lines = stdout.lines();
    while let Some(line) = lines.next() {
        if line.starts_with(TABLE_RULE) {
            let row = lines.next()?;
            let mut parts = row.split_whitespace();
            if parts.next() != Some("1") {
                return None;
            }
            return parts.next().and_then(|value| value.parse().ok());
        }
    }
    None
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

    let command = qvina_command(tools, &receptor_pdbqt, &ligand_pdbqt, center, options);
    let output = command.run()?;
    output.require_success(&tools.qvina)?;

    parse_output(&output.stdout).ok_or(ScoringError::UnparseableOutput { engine: "qvina" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_matches_the_documented_invocation() {
        let options = ScoringOptions {
            box_size: 20.0,
            exhaustiveness: 16,
        };
        let command = qvina_command(
            &ToolPaths::default(),
            Path::new("protein.pdbqt"),
            Path::new("sample.pdbqt"),
            Point3::new(10.5, 0.0, -3.25),
            &options,
        );
        assert_eq!(
            command.rendered(),
            "qvina2.1 --receptor protein.pdbqt --ligand sample.pdbqt \
             --center_x 10.5 --center_y 0 --center_z -3.25 \
             --size_x 20 --size_y 20 --size_z 20 --exhaustiveness 16"
        );
    }

    #[test]
    fn parses_the_rank_one_table_row() {
        let stdout = "\
mode |   affinity | dist from best mode
     | (kcal/mol) | rmsd l.b.| rmsd u.b.
-----+------------+----------+----------
   1         -8.4      0.000      0.000
   2         -7.9      2.112      4.808
";
        assert_eq!(parse_output(stdout), Some(-8.4));
    }

    #[test]
    fn missing_table_yields_none() {
        assert_eq!(parse_output("Reading input ... done.\n"), None);
        let wrong_rank = "\
-----+------------+----------+----------
   3         -7.9      2.112      4.808
";
        assert_eq!(parse_output(wrong_rank), None);
    }
}
