//! Grid parameter files for autogrid4.

use crate::engine::config::ToolPaths;
use crate::engine::exec::ToolCommand;
use nalgebra::Point3;
use std::io;
use std::path::Path;

/// Inputs of one grid parameter file, all referring to files that sit inside
/// the same working directory autogrid will run in.
pub(crate) struct GridSpec<'a> {
    /// Receptor PDBQT file name (not path) inside the working directory.
    pub receptor_file_name: &'a str,
    /// Center of the search box.
    pub center: Point3<f64>,
    /// Sorted unique atom types of the receptor.
    pub receptor_types: &'a [String],
    /// Sorted unique atom types of the ligand; one affinity map per type.
    pub ligand_types: &'a [String],
}

/// Renders the `.gpf` content. The fixed constants (40-point grid, 0.375 A
/// spacing, distance-dependent dielectric) match what the maps are consumed
/// with downstream.
pub(crate) fn render_gpf(spec: &GridSpec) -> String {
    let stem = Path::new(spec.receptor_file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(spec.receptor_file_name);

    let mut lines = vec![
        "npts 40 40 40".to_string(),
        format!("gridfld {stem}.maps.fld"),
        "spacing 0.375".to_string(),
        format!("receptor_types {}", spec.receptor_types.join(" ")),
        format!("ligand_types {}", spec.ligand_types.join(" ")),
        format!("receptor {}", spec.receptor_file_name),
        format!(
            "gridcenter {:.3} {:.3} {:.3}",
            spec.center.x, spec.center.y, spec.center.z
        ),
        "smooth 0.5".to_string(),
    ];
    for atom_type in spec.ligand_types {
        lines.push(format!("map {stem}.{atom_type}.map"));
    }
    lines.push(format!("elecmap {stem}.e.map"));
    lines.push(format!("dsolvmap {stem}.d.map"));
    lines.push("dielectric -0.1465".to_string());

    let mut content = lines.join("\n");
    content.push('\n');
    content
}

/// Writes the grid parameter file into the working directory.
pub(crate) fn write_gpf(spec: &GridSpec, path: &Path) -> io::Result<()> {
    std::fs::write(path, render_gpf(spec))
}

/// The autogrid invocation, run with the working directory as cwd so the
/// relative file names inside the GPF resolve.
pub(crate) fn autogrid_command(tools: &ToolPaths, gpf_name: &str, log_name: &str) -> ToolCommand {
    ToolCommand::new(&tools.autogrid)
        .arg("-p")
        .arg(gpf_name)
        .arg("-l")
        .arg(log_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpf_content_matches_the_autogrid_contract() {
        let receptor_types = vec!["C".to_string(), "N".to_string(), "OA".to_string()];
        let ligand_types = vec!["C".to_string(), "HD".to_string()];
        let spec = GridSpec {
            receptor_file_name: "protein.pdbqt",
            center: Point3::new(12.3456, -7.0, 0.125),
            receptor_types: &receptor_types,
            ligand_types: &ligand_types,
        };

        let expected = "\
npts 40 40 40
gridfld protein.maps.fld
spacing 0.375
receptor_types C N OA
ligand_types C HD
receptor protein.pdbqt
gridcenter 12.346 -7.000 0.125
smooth 0.5
map protein.C.map
map protein.HD.map
elecmap protein.e.map
dsolvmap protein.d.map
dielectric -0.1465
";
        assert_eq!(render_gpf(&spec), expected);
    }

    #[test]
    fn autogrid_command_names_parameter_and_log_files() {
        let command = autogrid_command(&ToolPaths::default(), "protein.gpf", "protein.glg");
        assert_eq!(command.rendered(), "autogrid4 -p protein.gpf -l protein.glg");
    }
}
