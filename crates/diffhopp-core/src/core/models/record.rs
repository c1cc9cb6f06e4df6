use crate::core::metrics::connectivity::ConnectivityReport;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One pipeline stage over a checkpoint, identifying which population of
/// molecules an artifact describes.
///
/// Stage names double as artifact stems: the manifest for the ligand
/// generation stage is `molecules_ligand_generation.json` and its scored
/// counterpart is `results_ligand_generation.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Reference ligands taken verbatim from the test set.
    GroundTruth,
    /// Molecules sampled from scratch inside the pocket.
    LigandGeneration,
    /// Molecules produced by inpainting around a fixed fragment.
    InpaintGeneration,
}

impl Stage {
    /// The artifact stem used in manifest and result file names.
    pub fn stem(&self) -> &'static str {
        match self {
            Stage::GroundTruth => "ground_truth",
            Stage::LigandGeneration => "ligand_generation",
            Stage::InpaintGeneration => "inpaint_generation",
        }
    }

    /// A human-readable label for progress output.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::GroundTruth => "ground truth",
            Stage::LigandGeneration => "ligand generation",
            Stage::InpaintGeneration => "inpaint generation",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stem())
    }
}

/// Provenance of one generated (or reference) molecule awaiting evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoleculeRecord {
    /// Identifier of the protein-ligand complex the molecule belongs to.
    pub complex_id: String,
    /// Zero-based index of the sample within its pocket.
    pub sample_index: usize,
    /// Path to the molecule's SDF file.
    pub sdf_path: PathBuf,
    /// Path to the protein structure used as the docking receptor.
    pub protein_path: PathBuf,
}

/// The manifest written by the generation stage and consumed by the
/// evaluation stage.
///
/// Persisting the manifest between the two halves lets `--only-generation`
/// and `--only-evaluation` runs happen in separate invocations, on separate
/// machines if the output directory is shared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoleculeSet {
    /// The stage that produced these molecules.
    pub stage: Stage,
    /// Checkpoint stem the molecules were sampled from.
    pub checkpoint: String,
    /// Dataset the pockets were drawn from.
    pub dataset: String,
    /// RFC 3339 timestamp of when the manifest was written.
    pub created_at: String,
    /// One record per molecule, ordered by complex and sample index.
    pub records: Vec<MoleculeRecord>,
}

/// Evaluation outcome for a single molecule record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    /// The molecule this score belongs to.
    pub record: MoleculeRecord,
    /// Binding score in kcal/mol reported by the docking engine, when docking
    /// succeeded and its output could be parsed.
    pub docking_score: Option<f64>,
    /// Connectivity statistics, when the SDF file could be parsed.
    pub connectivity: Option<ConnectivityReport>,
    /// Error message for molecules that failed docking or parsing.
    pub failure: Option<String>,
}

impl ScoredRecord {
    /// Returns `true` if the record produced a usable docking score.
    pub fn is_scored(&self) -> bool {
        self.docking_score.is_some()
    }
}

/// The scored result set written at the end of the evaluation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    /// The stage these results evaluate.
    pub stage: Stage,
    /// Checkpoint stem the molecules were sampled from.
    pub checkpoint: String,
    /// Dataset the pockets were drawn from.
    pub dataset: String,
    /// Name of the docking engine that produced the scores.
    pub scorer: String,
    /// RFC 3339 timestamp of when the results were written.
    pub created_at: String,
    /// One entry per evaluated molecule.
    pub records: Vec<ScoredRecord>,
}

/// Errors raised while reading or writing manifest files.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to access manifest '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse manifest '{path}': {source}", path = path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), ManifestError> {
    let file = File::create(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::to_writer_pretty(BufWriter::new(file), value).map_err(|source| {
        ManifestError::Format {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ManifestError> {
    if !path.is_file() {
        return Err(ManifestError::NotFound(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ManifestError::Format {
        path: path.to_path_buf(),
        source,
    })
}

impl MoleculeSet {
    /// Creates a manifest stamped with the current time.
    pub fn new(stage: Stage, checkpoint: &str, dataset: &str, records: Vec<MoleculeRecord>) -> Self {
        Self {
            stage,
            checkpoint: checkpoint.to_string(),
            dataset: dataset.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            records,
        }
    }

    /// Serializes the manifest to pretty-printed JSON at `path`.
    pub fn write_to_path(&self, path: &Path) -> Result<(), ManifestError> {
        write_json(self, path)
    }

    /// Reads a manifest back from `path`.
    pub fn read_from_path(path: &Path) -> Result<Self, ManifestError> {
        read_json(path)
    }
}

impl ResultSet {
    /// Creates a result set stamped with the current time.
    pub fn new(
        stage: Stage,
        checkpoint: &str,
        dataset: &str,
        scorer: &str,
        records: Vec<ScoredRecord>,
    ) -> Self {
        Self {
            stage,
            checkpoint: checkpoint.to_string(),
            dataset: dataset.to_string(),
            scorer: scorer.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            records,
        }
    }

    /// Serializes the result set to pretty-printed JSON at `path`.
    pub fn write_to_path(&self, path: &Path) -> Result<(), ManifestError> {
        write_json(self, path)
    }

    /// Reads a result set back from `path`.
    pub fn read_from_path(path: &Path) -> Result<Self, ManifestError> {
        read_json(path)
    }

    /// All parsed docking scores, in record order.
    pub fn scores(&self) -> Vec<f64> {
        self.records.iter().filter_map(|r| r.docking_score).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_records() -> Vec<MoleculeRecord> {
        vec![
            MoleculeRecord {
                complex_id: "1abc".into(),
                sample_index: 0,
                sdf_path: PathBuf::from("molecules_ligand_generation/1abc/sample_000.sdf"),
                protein_path: PathBuf::from("data/pdbbind_filtered/test/1abc/protein.pdb"),
            },
            MoleculeRecord {
                complex_id: "1abc".into(),
                sample_index: 1,
                sdf_path: PathBuf::from("molecules_ligand_generation/1abc/sample_001.sdf"),
                protein_path: PathBuf::from("data/pdbbind_filtered/test/1abc/protein.pdb"),
            },
        ]
    }

    #[test]
    fn stage_stems_match_artifact_naming() {
        assert_eq!(Stage::GroundTruth.stem(), "ground_truth");
        assert_eq!(Stage::LigandGeneration.stem(), "ligand_generation");
        assert_eq!(Stage::InpaintGeneration.stem(), "inpaint_generation");
        assert_eq!(Stage::LigandGeneration.to_string(), "ligand_generation");
    }

    #[test]
    fn manifest_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("molecules_ligand_generation.json");

        let set = MoleculeSet::new(
            Stage::LigandGeneration,
            "gvp_conditional",
            "pdbbind_filtered",
            sample_records(),
        );
        set.write_to_path(&path).unwrap();

        let loaded = MoleculeSet::read_from_path(&path).unwrap();
        assert_eq!(loaded, set);
    }

    #[test]
    fn missing_manifest_is_reported_as_not_found() {
        let err = MoleculeSet::read_from_path(Path::new("/nonexistent/molecules.json"))
            .unwrap_err();
        assert!(matches!(err, ManifestError::NotFound(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn corrupt_manifest_is_a_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("molecules_ligand_generation.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = MoleculeSet::read_from_path(&path).unwrap_err();
        assert!(matches!(err, ManifestError::Format { .. }));
    }

    #[test]
    fn result_set_collects_parsed_scores() {
        let records = sample_records();
        let scored = vec![
            ScoredRecord {
                record: records[0].clone(),
                docking_score: Some(-7.3),
                connectivity: None,
                failure: None,
            },
            ScoredRecord {
                record: records[1].clone(),
                docking_score: None,
                connectivity: None,
                failure: Some("docking engine exited with status 1".into()),
            },
        ];
        let results = ResultSet::new(
            Stage::LigandGeneration,
            "gvp_conditional",
            "pdbbind_filtered",
            "gnina",
            scored,
        );
        assert_eq!(results.scores(), vec![-7.3]);
        assert!(results.records[0].is_scored());
        assert!(!results.records[1].is_scored());
    }
}
