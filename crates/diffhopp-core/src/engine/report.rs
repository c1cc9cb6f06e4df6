//! Result persistence and report rendering.
//!
//! Every run writes into one bundle directory keyed by checkpoint, dataset
//! and scorer. The generation half stages SDF files and molecule manifests
//! there; the evaluation half adds scored results as JSON, CSV and HTML,
//! plus a cumulative `summary.txt` covering all evaluated stages.

use crate::core::models::record::{ResultSet, ScoredRecord, Stage};
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// The per-run output directory and the artifact paths inside it.
///
/// Layout: `<output_dir>/<checkpoint_stem>/<dataset>/<scorer>/`, with one
/// manifest, staging directory, and result trio per stage.
#[derive(Debug, Clone)]
pub struct Bundle {
    root: PathBuf,
}

impl Bundle {
    /// Creates (or reuses) the bundle directory for one run.
    pub fn create(
        output_dir: &Path,
        checkpoint: &str,
        dataset: &str,
        scorer: &str,
    ) -> io::Result<Self> {
        let root = output_dir.join(checkpoint).join(dataset).join(scorer);
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The manifest the generation half writes for `stage`.
    pub fn molecules_manifest(&self, stage: Stage) -> PathBuf {
        self.root.join(format!("molecules_{}.json", stage.stem()))
    }

    /// Directory the generated SDF files of `stage` are staged under.
    pub fn molecules_dir(&self, stage: Stage) -> PathBuf {
        self.root.join(format!("molecules_{}", stage.stem()))
    }

    /// Staging directory for one complex within a stage.
    pub fn complex_dir(&self, stage: Stage, complex_id: &str) -> PathBuf {
        self.molecules_dir(stage).join(complex_id)
    }

    pub fn results_manifest(&self, stage: Stage) -> PathBuf {
        self.root.join(format!("results_{}.json", stage.stem()))
    }

    pub fn results_csv(&self, stage: Stage) -> PathBuf {
        self.root.join(format!("results_{}.csv", stage.stem()))
    }

    pub fn results_html(&self, stage: Stage) -> PathBuf {
        self.root.join(format!("results_{}.html", stage.stem()))
    }

    pub fn summary_path(&self) -> PathBuf {
        self.root.join("summary.txt")
    }
}

/// Aggregate statistics over one stage's scored results.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSummary {
    pub stage: Stage,
    pub num_molecules: usize,
    /// Molecules whose SDF file parsed into a structure.
    pub num_valid: usize,
    /// Molecules with a usable docking score.
    pub num_scored: usize,
    pub score_mean: Option<f64>,
    pub score_std: Option<f64>,
    /// Lowest binding energy seen, which is the best pose.
    pub score_best: Option<f64>,
    pub mean_connectivity_ratio: Option<f64>,
    pub num_disconnected: usize,
    pub num_poorly_connected: usize,
}

impl StageSummary {
    pub fn from_results(results: &ResultSet) -> Self {
        let scores = results.scores();
        let (score_mean, score_std) = match mean_and_std(&scores) {
            Some((mean, std)) => (Some(mean), Some(std)),
            None => (None, None),
        };
        let score_best = scores.iter().copied().reduce(f64::min);

        let reports: Vec<_> = results
            .records
            .iter()
            .filter_map(|r| r.connectivity.as_ref())
            .collect();
        let ratios: Vec<f64> = reports.iter().map(|r| r.connectivity_ratio).collect();

        Self {
            stage: results.stage,
            num_molecules: results.records.len(),
            num_valid: reports.len(),
            num_scored: scores.len(),
            score_mean,
            score_std,
            score_best,
            mean_connectivity_ratio: mean_and_std(&ratios).map(|(mean, _)| mean),
            num_disconnected: reports.iter().filter(|r| r.is_disconnected()).count(),
            num_poorly_connected: reports.iter().filter(|r| r.is_poorly_connected()).count(),
        }
    }

    /// Renders the stage's block of the cumulative summary file.
    pub fn render_block(&self) -> String {
        let mut block = format!("{} results:\n", block_title(self.stage));
        let _ = writeln!(block, "  molecules:          {}", self.num_molecules);
        let _ = writeln!(
            block,
            "  valid:              {} ({:.1}%)",
            self.num_valid,
            percent(self.num_valid, self.num_molecules)
        );
        let _ = writeln!(
            block,
            "  scored:             {} ({:.1}%)",
            self.num_scored,
            percent(self.num_scored, self.num_molecules)
        );
        match (self.score_mean, self.score_std, self.score_best) {
            (Some(mean), Some(std), Some(best)) => {
                let _ = writeln!(
                    block,
                    "  docking score:      mean {mean:.2}, std {std:.2}, best {best:.2}"
                );
            }
            _ => {
                let _ = writeln!(block, "  docking score:      n/a");
            }
        }
        match self.mean_connectivity_ratio {
            Some(ratio) => {
                let _ = writeln!(block, "  connectivity ratio: mean {ratio:.2}");
            }
            None => {
                let _ = writeln!(block, "  connectivity ratio: n/a");
            }
        }
        let _ = writeln!(block, "  disconnected:       {}", self.num_disconnected);
        let _ = writeln!(block, "  poorly connected:   {}", self.num_poorly_connected);
        block
    }
}

/// Writes the flat per-molecule table next to the JSON results.
pub fn write_csv(results: &ResultSet, path: &Path) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "complex_id",
        "sample_index",
        "sdf_path",
        "docking_score",
        "num_atoms",
        "num_bonds",
        "connectivity_ratio",
        "min_distance",
        "failure",
    ])?;
    for scored in &results.records {
        writer.write_record(&csv_row(scored))?;
    }
    writer.flush()?;
    Ok(())
}

fn csv_row(scored: &ScoredRecord) -> [String; 9] {
    let connectivity = scored.connectivity.as_ref();
    [
        scored.record.complex_id.clone(),
        scored.record.sample_index.to_string(),
        scored.record.sdf_path.display().to_string(),
        scored
            .docking_score
            .map(|s| format!("{s:.4}"))
            .unwrap_or_default(),
        connectivity
            .map(|c| c.num_atoms.to_string())
            .unwrap_or_default(),
        connectivity
            .map(|c| c.num_bonds.to_string())
            .unwrap_or_default(),
        connectivity
            .map(|c| format!("{:.4}", c.connectivity_ratio))
            .unwrap_or_default(),
        connectivity
            .and_then(|c| c.min_distance)
            .map(|d| format!("{d:.4}"))
            .unwrap_or_default(),
        scored.failure.clone().unwrap_or_default(),
    ]
}

/// Writes a self-contained HTML rendition of the results table.
pub fn write_html(results: &ResultSet, path: &Path) -> Result<(), ReportError> {
    fs::write(path, render_html(results))?;
    Ok(())
}

fn render_html(results: &ResultSet) -> String {
    let title = format!("{} results", block_title(results.stage));
    let mut html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape(&title));
    html.push_str(
        "<style>body{font-family:sans-serif}table{border-collapse:collapse}\
         th,td{border:1px solid #aaa;padding:4px 8px;text-align:left}</style>\n</head>\n<body>\n",
    );
    let _ = writeln!(html, "<h1>{}</h1>", escape(&title));
    let _ = writeln!(
        html,
        "<p>Checkpoint: {} | Dataset: {} | Scorer: {} | Created: {}</p>",
        escape(&results.checkpoint),
        escape(&results.dataset),
        escape(&results.scorer),
        escape(&results.created_at),
    );
    html.push_str(
        "<table>\n<tr><th>Complex</th><th>Sample</th><th>Docking score</th>\
         <th>Atoms</th><th>Bonds</th><th>Conn. ratio</th><th>Min dist</th><th>Failure</th></tr>\n",
    );
    for scored in &results.records {
        let row = csv_row(scored);
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&row[0]),
            escape(&row[1]),
            escape(&row[3]),
            escape(&row[4]),
            escape(&row[5]),
            escape(&row[6]),
            escape(&row[7]),
            escape(&row[8]),
        );
    }
    html.push_str("</table>\n</body>\n</html>\n");
    html
}

fn block_title(stage: Stage) -> &'static str {
    match stage {
        Stage::GroundTruth => "Ground truth",
        Stage::LigandGeneration => "Ligand generation",
        Stage::InpaintGeneration => "Inpaint generation",
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 * 100.0 / total as f64
}

fn mean_and_std(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance.sqrt()))
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metrics::connectivity::ConnectivityReport;
    use crate::core::models::record::MoleculeRecord;

    fn record(complex_id: &str, sample_index: usize) -> MoleculeRecord {
        MoleculeRecord {
            complex_id: complex_id.to_string(),
            sample_index,
            sdf_path: PathBuf::from(format!("molecules/{complex_id}/{sample_index}.sdf")),
            protein_path: PathBuf::from(format!("data/test/{complex_id}/protein.pdb")),
        }
    }

    fn connectivity(num_atoms: usize, num_bonds: usize) -> ConnectivityReport {
        ConnectivityReport {
            num_atoms,
            num_bonds,
            close_pairs: 0,
            connectivity_ratio: num_bonds as f64 / (num_atoms.max(2) - 1) as f64,
            min_distance: Some(1.09),
            mean_distance: Some(2.4),
        }
    }

    fn sample_results() -> ResultSet {
        let records = vec![
            ScoredRecord {
                record: record("1abc", 0),
                docking_score: Some(-7.5),
                connectivity: Some(connectivity(20, 19)),
                failure: None,
            },
            ScoredRecord {
                record: record("1abc", 1),
                docking_score: Some(-6.5),
                connectivity: Some(connectivity(20, 4)),
                failure: None,
            },
            ScoredRecord {
                record: record("2xyz", 0),
                docking_score: None,
                connectivity: None,
                failure: Some("gnina exited with status 1".to_string()),
            },
        ];
        ResultSet::new(
            Stage::LigandGeneration,
            "gvp_conditional",
            "pdbbind_filtered",
            "gnina",
            records,
        )
    }

    #[test]
    fn bundle_paths_follow_the_documented_layout() {
        let dir = tempfile::tempdir().unwrap();
        let bundle =
            Bundle::create(dir.path(), "gvp_conditional", "pdbbind_filtered", "gnina").unwrap();

        let root = dir
            .path()
            .join("gvp_conditional")
            .join("pdbbind_filtered")
            .join("gnina");
        assert!(root.is_dir());
        assert_eq!(bundle.root(), root);
        assert_eq!(
            bundle.molecules_manifest(Stage::LigandGeneration),
            root.join("molecules_ligand_generation.json")
        );
        assert_eq!(
            bundle.complex_dir(Stage::GroundTruth, "1abc"),
            root.join("molecules_ground_truth").join("1abc")
        );
        assert_eq!(
            bundle.results_csv(Stage::InpaintGeneration),
            root.join("results_inpaint_generation.csv")
        );
        assert_eq!(bundle.summary_path(), root.join("summary.txt"));
    }

    #[test]
    fn summary_aggregates_scores_and_structure_counts() {
        let summary = StageSummary::from_results(&sample_results());

        assert_eq!(summary.num_molecules, 3);
        assert_eq!(summary.num_valid, 2);
        assert_eq!(summary.num_scored, 2);
        assert_eq!(summary.score_mean, Some(-7.0));
        assert_eq!(summary.score_best, Some(-7.5));
        assert_eq!(summary.num_disconnected, 0);
        assert_eq!(summary.num_poorly_connected, 1);
    }

    #[test]
    fn summary_block_is_titled_after_the_stage() {
        let block = StageSummary::from_results(&sample_results()).render_block();
        assert!(block.starts_with("Ligand generation results:\n"));
        assert!(block.contains("molecules:          3"));
        assert!(block.contains("scored:             2 (66.7%)"));
    }

    #[test]
    fn csv_rows_blank_out_missing_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        write_csv(&sample_results(), &path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next(),
            Some(
                "complex_id,sample_index,sdf_path,docking_score,num_atoms,num_bonds,\
                 connectivity_ratio,min_distance,failure"
            )
        );
        assert_eq!(
            lines.next(),
            Some("1abc,0,molecules/1abc/0.sdf,-7.5000,20,19,1.0000,1.0900,")
        );
        let failed = lines.nth(1).unwrap();
        assert!(failed.starts_with("2xyz,0,molecules/2xyz/0.sdf,,,,,,"));
    }

    #[test]
    fn html_report_escapes_reserved_characters() {
        let mut results = sample_results();
        results.records[0].record.complex_id = "1abc<&>".to_string();

        let html = render_html(&results);
        assert!(html.contains("<td>1abc&lt;&amp;&gt;</td>"));
        assert!(html.contains("<title>Ligand generation results</title>"));
    }
}
