//! Checkpoint evaluation workflow.
//!
//! The pipeline runs in two halves that communicate only through the bundle
//! directory. The generation half samples molecules for every test pocket
//! and writes one manifest per stage; the evaluation half reads the
//! manifests back, docks and measures every molecule, and renders the
//! reports. Because the halves share nothing but files, `--only-generation`
//! and `--only-evaluation` runs can happen in separate invocations.

use crate::core::dataset::DatasetIndex;
use crate::core::io::sdf::SdfFile;
use crate::core::metrics::connectivity::ConnectivityReport;
use crate::core::models::record::{MoleculeRecord, MoleculeSet, ResultSet, ScoredRecord, Stage};
use crate::engine::config::{EvaluationConfig, Mode};
use crate::engine::error::EngineError;
use crate::engine::generation::{self, InpaintParams, SamplerRequest};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::report::{self, Bundle, StageSummary};
use crate::engine::scoring;
use std::fs;
use tracing::{info, instrument, warn};

/// Runs the full evaluation pipeline and returns the bundle it wrote.
#[instrument(skip_all, name = "evaluation_workflow")]
pub fn run(config: &EvaluationConfig, reporter: &ProgressReporter) -> Result<Bundle, EngineError> {
    let bundle = Bundle::create(
        &config.output_dir,
        &config.checkpoint.name,
        &config.dataset,
        config.engine.name(),
    )?;
    info!(
        checkpoint = %config.checkpoint.name,
        dataset = %config.dataset,
        scorer = config.engine.name(),
        bundle = %bundle.root().display(),
        "starting evaluation run"
    );

    let stages = selected_stages(config.mode, config.checkpoint.is_repainting_compatible());

    if config.run_generation {
        let mut index = DatasetIndex::load(&config.data_root, &config.dataset)?;
        index.truncate(config.limit_samples);
        for &stage in &stages {
            generate_stage(config, &bundle, stage, &index, reporter)?;
        }
    }

    if config.run_evaluation {
        let mut summary = format!("Output path: {}\n", bundle.root().display());
        summary.push_str(&format!("Device: {}\n\n", device_name()));
        for &stage in &stages {
            let results = evaluate_stage(config, &bundle, stage, reporter)?;
            summary.push_str(&StageSummary::from_results(&results).render_block());
            summary.push('\n');
        }
        fs::write(bundle.summary_path(), summary)?;
        info!(summary = %bundle.summary_path().display(), "wrote run summary");
    }

    Ok(bundle)
}

/// Stages selected for a run, in execution order.
///
/// Ground truth is also staged for a pure inpaint run because inpainting is
/// judged against the reference ligands, and inpaint generation only joins
/// an `all` run when the checkpoint supports repainting.
pub(crate) fn selected_stages(mode: Mode, repaint_compatible: bool) -> Vec<Stage> {
    let mut stages = Vec::new();
    if matches!(mode, Mode::GroundTruth | Mode::All)
        || (mode == Mode::InpaintGeneration && repaint_compatible)
    {
        stages.push(Stage::GroundTruth);
    }
    if matches!(mode, Mode::LigandGeneration | Mode::All) {
        stages.push(Stage::LigandGeneration);
    }
    if mode == Mode::InpaintGeneration || (mode == Mode::All && repaint_compatible) {
        stages.push(Stage::InpaintGeneration);
    }
    stages
}

fn generate_stage(
    config: &EvaluationConfig,
    bundle: &Bundle,
    stage: Stage,
    index: &DatasetIndex,
    reporter: &ProgressReporter,
) -> Result<(), EngineError> {
    reporter.report(Progress::PhaseStart {
        name: generation_phase(stage),
    });
    reporter.report(Progress::TaskStart {
        total_steps: index.len() as u64,
    });

    let mut records = Vec::new();
    for complex in &index.complexes {
        reporter.report(Progress::StatusUpdate {
            text: complex.id.clone(),
        });
        let staging = bundle.complex_dir(stage, &complex.id);
        match stage {
            Stage::GroundTruth => {
                let copied = generation::snapshot_ground_truth(&complex.ligand_path, &staging)?;
                records.push(MoleculeRecord {
                    complex_id: complex.id.clone(),
                    sample_index: 0,
                    sdf_path: copied,
                    protein_path: complex.protein_path.clone(),
                });
            }
            Stage::LigandGeneration | Stage::InpaintGeneration => {
                let inpaint = (stage == Stage::InpaintGeneration).then_some(InpaintParams {
                    resampling_steps: config.resampling_steps,
                    jump_length: config.jump_length,
                });
                let request = SamplerRequest {
                    complex_id: &complex.id,
                    ligand: &complex.ligand_path,
                    protein: &complex.protein_path,
                    output_dir: &staging,
                    checkpoint: &config.checkpoint.path,
                    num_samples: config.molecules_per_pocket,
                    batch_size: config.batch_size,
                    inpaint,
                };
                let samples = generation::run_sampler(&config.tools, &request)?;
                for (sample_index, sdf_path) in samples.into_iter().enumerate() {
                    records.push(MoleculeRecord {
                        complex_id: complex.id.clone(),
                        sample_index,
                        sdf_path,
                        protein_path: complex.protein_path.clone(),
                    });
                }
            }
        }
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);

    let manifest = MoleculeSet::new(stage, &config.checkpoint.name, &config.dataset, records);
    manifest.write_to_path(&bundle.molecules_manifest(stage))?;
    info!(stage = %stage, molecules = manifest.records.len(), "wrote molecule manifest");
    reporter.report(Progress::PhaseFinish);
    Ok(())
}

fn evaluate_stage(
    config: &EvaluationConfig,
    bundle: &Bundle,
    stage: Stage,
    reporter: &ProgressReporter,
) -> Result<ResultSet, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: evaluation_phase(stage),
    });
    let manifest = MoleculeSet::read_from_path(&bundle.molecules_manifest(stage))?;
    reporter.report(Progress::TaskStart {
        total_steps: manifest.records.len() as u64,
    });

    let mut scored = Vec::with_capacity(manifest.records.len());
    for record in manifest.records {
        reporter.report(Progress::StatusUpdate {
            text: format!("{} #{}", record.complex_id, record.sample_index),
        });
        scored.push(evaluate_record(config, record));
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);

    let results = ResultSet::new(
        stage,
        &config.checkpoint.name,
        &config.dataset,
        config.engine.name(),
        scored,
    );
    results.write_to_path(&bundle.results_manifest(stage))?;
    report::write_csv(&results, &bundle.results_csv(stage))?;
    report::write_html(&results, &bundle.results_html(stage))?;
    info!(
        stage = %stage,
        scored = results.scores().len(),
        total = results.records.len(),
        "stage evaluation complete"
    );
    reporter.report(Progress::PhaseFinish);
    Ok(results)
}

/// Scores one molecule, degrading docking or parse failures into a recorded
/// reason so the rest of the stage continues.
fn evaluate_record(config: &EvaluationConfig, record: MoleculeRecord) -> ScoredRecord {
    let molecule = match SdfFile::read_single_from_path(&record.sdf_path) {
        Ok(molecule) => molecule,
        Err(error) => {
            warn!(
                complex = %record.complex_id,
                sample = record.sample_index,
                %error,
                "failed to parse sample"
            );
            return ScoredRecord {
                record,
                docking_score: None,
                connectivity: None,
                failure: Some(error.to_string()),
            };
        }
    };

    let connectivity = ConnectivityReport::of(&molecule);
    match scoring::score_molecule(
        config.engine,
        &record.protein_path,
        &record.sdf_path,
        &molecule,
        &config.scoring,
        &config.tools,
    ) {
        Ok(score) => ScoredRecord {
            record,
            docking_score: Some(score),
            connectivity: Some(connectivity),
            failure: None,
        },
        Err(error) => {
            warn!(
                complex = %record.complex_id,
                sample = record.sample_index,
                %error,
                "docking failed"
            );
            ScoredRecord {
                record,
                docking_score: None,
                connectivity: Some(connectivity),
                failure: Some(error.to_string()),
            }
        }
    }
}

fn generation_phase(stage: Stage) -> &'static str {
    match stage {
        Stage::GroundTruth => "Staging ground truth ligands",
        Stage::LigandGeneration => "Generating ligands",
        Stage::InpaintGeneration => "Generating inpainted ligands",
    }
}

fn evaluation_phase(stage: Stage) -> &'static str {
    match stage {
        Stage::GroundTruth => "Evaluating ground truth",
        Stage::LigandGeneration => "Evaluating ligand generation",
        Stage::InpaintGeneration => "Evaluating inpaint generation",
    }
}

fn device_name() -> String {
    super::doctor::probe_gpu().unwrap_or_else(|| "CPU".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::checkpoints::{Checkpoint, CheckpointKind};
    use crate::engine::config::{DockingEngineKind, EvaluationConfigBuilder, ToolPaths};
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    const ETHANE_SDF: &str = "\
ethane
  diffhopp          3D

  2  1  0  0  0  0  0  0  0  0999 V2000
    0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    1.5000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
  1  2  1  0
M  END
$$$$
";

    #[test]
    fn all_mode_includes_inpainting_only_for_compatible_checkpoints() {
        assert_eq!(
            selected_stages(Mode::All, true),
            vec![
                Stage::GroundTruth,
                Stage::LigandGeneration,
                Stage::InpaintGeneration
            ]
        );
        assert_eq!(
            selected_stages(Mode::All, false),
            vec![Stage::GroundTruth, Stage::LigandGeneration]
        );
    }

    #[test]
    fn inpaint_mode_stages_ground_truth_only_when_compatible() {
        assert_eq!(
            selected_stages(Mode::InpaintGeneration, true),
            vec![Stage::GroundTruth, Stage::InpaintGeneration]
        );
        assert_eq!(
            selected_stages(Mode::InpaintGeneration, false),
            vec![Stage::InpaintGeneration]
        );
    }

    #[test]
    fn single_stage_modes_select_their_own_stage() {
        assert_eq!(selected_stages(Mode::GroundTruth, false), vec![Stage::GroundTruth]);
        assert_eq!(
            selected_stages(Mode::LigandGeneration, true),
            vec![Stage::LigandGeneration]
        );
    }

    fn write_dataset(root: &Path) {
        let complex = root.join("pdbbind_filtered").join("test").join("1abc");
        fs::create_dir_all(&complex).unwrap();
        fs::write(complex.join("protein.pdb"), "ATOM placeholder\n").unwrap();
        fs::write(complex.join("ligand.sdf"), ETHANE_SDF).unwrap();
    }

    fn fake_gnina(dir: &Path) -> String {
        let path = dir.join("fake-gnina");
        fs::write(&path, "#!/bin/sh\necho \"Affinity:  -5.42  (kcal/mol)\"\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn ground_truth_config(dir: &Path, gnina: String) -> crate::engine::config::EvaluationConfig {
        let checkpoint = Checkpoint {
            name: "gvp_conditional".to_string(),
            path: dir.join("gvp_conditional.ckpt"),
            size_bytes: 0,
            kind: CheckpointKind::Conditional,
        };
        EvaluationConfigBuilder::new()
            .checkpoint(checkpoint)
            .dataset("pdbbind_filtered")
            .data_root(dir.join("data"))
            .mode(Mode::GroundTruth)
            .output_dir(dir.join("evaluation_local"))
            .engine(DockingEngineKind::Gnina)
            .tools(ToolPaths {
                gnina,
                ..ToolPaths::default()
            })
            .build()
            .unwrap()
    }

    #[test]
    fn ground_truth_pipeline_writes_the_full_bundle() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(&dir.path().join("data"));
        let config = ground_truth_config(dir.path(), fake_gnina(dir.path()));

        let bundle = run(&config, &ProgressReporter::new()).unwrap();

        let manifest = MoleculeSet::read_from_path(&bundle.molecules_manifest(Stage::GroundTruth))
            .unwrap();
        assert_eq!(manifest.records.len(), 1);
        assert_eq!(manifest.records[0].complex_id, "1abc");
        assert!(manifest.records[0].sdf_path.is_file());

        let results = ResultSet::read_from_path(&bundle.results_manifest(Stage::GroundTruth))
            .unwrap();
        assert_eq!(results.records.len(), 1);
        assert_eq!(results.records[0].docking_score, Some(-5.42));
        assert!(results.records[0].failure.is_none());

        assert!(bundle.results_csv(Stage::GroundTruth).is_file());
        assert!(bundle.results_html(Stage::GroundTruth).is_file());
        let summary = fs::read_to_string(bundle.summary_path()).unwrap();
        assert!(summary.starts_with("Output path: "));
        assert!(summary.contains("Ground truth results:"));
    }

    #[test]
    fn docking_failures_degrade_to_recorded_reasons() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(&dir.path().join("data"));
        let failing = dir.path().join("failing-gnina");
        fs::write(&failing, "#!/bin/sh\necho boom >&2\nexit 3\n").unwrap();
        fs::set_permissions(&failing, fs::Permissions::from_mode(0o755)).unwrap();
        let config = ground_truth_config(dir.path(), failing.to_string_lossy().into_owned());

        let bundle = run(&config, &ProgressReporter::new()).unwrap();

        let results = ResultSet::read_from_path(&bundle.results_manifest(Stage::GroundTruth))
            .unwrap();
        assert_eq!(results.records[0].docking_score, None);
        assert!(results.records[0].connectivity.is_some());
        let failure = results.records[0].failure.as_deref().unwrap();
        assert!(failure.contains("exited with status 3"), "failure was: {failure}");
    }

    #[test]
    fn evaluation_half_requires_the_molecule_manifest() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(&dir.path().join("data"));
        let checkpoint = Checkpoint {
            name: "gvp_conditional".to_string(),
            path: dir.path().join("gvp_conditional.ckpt"),
            size_bytes: 0,
            kind: CheckpointKind::Conditional,
        };
        let config = EvaluationConfigBuilder::new()
            .checkpoint(checkpoint)
            .data_root(dir.path().join("data"))
            .mode(Mode::GroundTruth)
            .output_dir(dir.path().join("evaluation_local"))
            .only_evaluation(true)
            .build()
            .unwrap();

        let error = run(&config, &ProgressReporter::new()).unwrap_err();
        assert!(error.to_string().contains("not found"), "error was: {error}");
    }
}
