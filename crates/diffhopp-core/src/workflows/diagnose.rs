//! Connectivity diagnosis workflow.
//!
//! Re-measures structure metrics over a directory of previously generated
//! molecules, without docking anything. Useful when a run produced
//! suspicious structures and the question is whether the model or the
//! scorer is at fault.

use crate::core::checkpoints::{self, Checkpoint};
use crate::core::io::sdf::SdfFile;
use crate::core::metrics::connectivity::{
    ConnectivityReport, ConnectivitySummary, GOOD_RATIO_THRESHOLD,
};
use crate::engine::error::EngineError;
use crate::engine::generation;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Fraction of poorly connected molecules above which a warning is raised.
const POOR_FRACTION_WARNING: f64 = 0.2;

/// Metrics of one SDF file in the scanned directory.
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub file_name: String,
    pub report: ConnectivityReport,
}

/// Everything the diagnosis gathered over one results directory.
#[derive(Debug, Clone)]
pub struct Diagnosis {
    pub dir: PathBuf,
    pub files: Vec<FileReport>,
    /// Files that failed to parse and were left out of the statistics.
    pub num_skipped: usize,
    /// Aggregate statistics; `None` when no file parsed.
    pub summary: Option<ConnectivitySummary>,
    /// Metadata of the checkpoint under suspicion, when one was named.
    pub checkpoint: Option<Checkpoint>,
}

impl Diagnosis {
    /// Warnings for the generation failure modes worth flagging.
    pub fn warnings(&self) -> Vec<String> {
        let Some(summary) = &self.summary else {
            return Vec::new();
        };
        let mut warnings = Vec::new();
        if summary.zero_bond_count > 0 {
            warnings.push(format!(
                "{} molecules have zero bonds; this indicates severe coordinate \
                 errors during generation",
                summary.zero_bond_count
            ));
        }
        if summary.poorly_connected as f64 > summary.total as f64 * POOR_FRACTION_WARNING {
            warnings.push(format!(
                "{}/{} molecules are poorly connected; the connectivity ratio \
                 should be close to 1.0",
                summary.poorly_connected, summary.total
            ));
        }
        warnings
    }

    /// `true` when the mean connectivity ratio clears the good threshold.
    pub fn connectivity_is_good(&self) -> bool {
        self.summary
            .as_ref()
            .is_some_and(|s| s.mean_ratio > GOOD_RATIO_THRESHOLD)
    }
}

/// Scans `results_dir` for SDF files and measures each one.
#[instrument(skip_all, name = "diagnosis_workflow")]
pub fn run(results_dir: &Path, checkpoint: Option<&Path>) -> Result<Diagnosis, EngineError> {
    if !results_dir.is_dir() {
        return Err(EngineError::ResultsDirNotFound(results_dir.to_path_buf()));
    }
    let files = generation::sdf_files_in(results_dir)?;
    if files.is_empty() {
        return Err(EngineError::NoSdfFiles(results_dir.to_path_buf()));
    }
    info!(dir = %results_dir.display(), files = files.len(), "analyzing generated molecules");

    let mut reports = Vec::with_capacity(files.len());
    let mut num_skipped = 0;
    for path in &files {
        match SdfFile::read_single_from_path(path) {
            Ok(molecule) => {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                reports.push(FileReport {
                    file_name,
                    report: ConnectivityReport::of(&molecule),
                });
            }
            Err(error) => {
                warn!(file = %path.display(), %error, "skipping unreadable SDF file");
                num_skipped += 1;
            }
        }
    }

    let measured: Vec<ConnectivityReport> = reports.iter().map(|f| f.report.clone()).collect();
    let checkpoint = match checkpoint {
        Some(path) => Some(checkpoints::inspect(path)?),
        None => None,
    };

    Ok(Diagnosis {
        dir: results_dir.to_path_buf(),
        files: reports,
        num_skipped,
        summary: ConnectivitySummary::from_reports(&measured),
        checkpoint,
    })
}
