use crate::core::checkpoints::Checkpoint;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Which molecule populations an evaluation run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    GroundTruth,
    LigandGeneration,
    InpaintGeneration,
    All,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::GroundTruth => "ground_truth",
            Mode::LigandGeneration => "ligand_generation",
            Mode::InpaintGeneration => "inpaint_generation",
            Mode::All => "all",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model architecture selector forwarded to the external trainer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    Gvp,
    Egnn,
}

impl Architecture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::Gvp => "gvp",
            Architecture::Egnn => "egnn",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The docking engine used to score generated molecules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockingEngineKind {
    Gnina,
    QVina,
    AutoDockGpu,
}

impl DockingEngineKind {
    /// Engine name as used in bundle paths and reports.
    pub fn name(&self) -> &'static str {
        match self {
            DockingEngineKind::Gnina => "gnina",
            DockingEngineKind::QVina => "qvina",
            DockingEngineKind::AutoDockGpu => "autodock-gpu",
        }
    }

    /// The exhaustiveness each engine is tuned to when the user does not
    /// override it.
    pub fn default_exhaustiveness(&self) -> u32 {
        match self {
            DockingEngineKind::Gnina => 8,
            DockingEngineKind::QVina => 16,
            DockingEngineKind::AutoDockGpu => 8,
        }
    }
}

impl fmt::Display for DockingEngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Program names (or explicit paths) of every external tool the pipeline may
/// invoke. Each defaults to the canonical binary name and can be overridden
/// through the configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub sampler: String,
    pub trainer: String,
    pub gnina: String,
    pub qvina: String,
    pub autodock_gpu: String,
    pub autogrid: String,
    pub obabel: String,
    pub prepare_receptor: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            sampler: "diffhopp-sample".to_string(),
            trainer: "diffhopp-train".to_string(),
            gnina: "gnina".to_string(),
            qvina: "qvina2.1".to_string(),
            autodock_gpu: "autodock_gpu_64wi".to_string(),
            autogrid: "autogrid4".to_string(),
            obabel: "obabel".to_string(),
            prepare_receptor: "prepare_receptor4.py".to_string(),
        }
    }
}

/// Docking search parameters shared by all engines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringOptions {
    /// Edge length of the cubic search box in Angstroms.
    pub box_size: f64,
    /// Search exhaustiveness passed through to the engine.
    pub exhaustiveness: u32,
}

/// Fully validated parameters of one evaluation run.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationConfig {
    pub checkpoint: Checkpoint,
    pub dataset: String,
    pub data_root: PathBuf,
    pub mode: Mode,
    pub limit_samples: usize,
    pub molecules_per_pocket: usize,
    pub batch_size: usize,
    pub run_generation: bool,
    pub run_evaluation: bool,
    pub resampling_steps: u32,
    pub jump_length: u32,
    pub output_dir: PathBuf,
    pub engine: DockingEngineKind,
    pub scoring: ScoringOptions,
    pub tools: ToolPaths,
}

#[derive(Default)]
pub struct EvaluationConfigBuilder {
    checkpoint: Option<Checkpoint>,
    dataset: Option<String>,
    data_root: Option<PathBuf>,
    mode: Option<Mode>,
    limit_samples: Option<usize>,
    molecules_per_pocket: Option<usize>,
    batch_size: Option<usize>,
    only_generation: bool,
    only_evaluation: bool,
    resampling_steps: Option<u32>,
    jump_length: Option<u32>,
    output_dir: Option<PathBuf>,
    engine: Option<DockingEngineKind>,
    box_size: Option<f64>,
    exhaustiveness: Option<u32>,
    tools: Option<ToolPaths>,
}

impl EvaluationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn checkpoint(mut self, checkpoint: Checkpoint) -> Self {
        self.checkpoint = Some(checkpoint);
        self
    }
    pub fn dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = Some(dataset.into());
        self
    }
    pub fn data_root(mut self, root: PathBuf) -> Self {
        self.data_root = Some(root);
        self
    }
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }
    pub fn limit_samples(mut self, limit: usize) -> Self {
        self.limit_samples = Some(limit);
        self
    }
    pub fn molecules_per_pocket(mut self, count: usize) -> Self {
        self.molecules_per_pocket = Some(count);
        self
    }
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }
    pub fn only_generation(mut self, flag: bool) -> Self {
        self.only_generation = flag;
        self
    }
    pub fn only_evaluation(mut self, flag: bool) -> Self {
        self.only_evaluation = flag;
        self
    }
    pub fn resampling_steps(mut self, r: u32) -> Self {
        self.resampling_steps = Some(r);
        self
    }
    pub fn jump_length(mut self, j: u32) -> Self {
        self.jump_length = Some(j);
        self
    }
    pub fn output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = Some(dir);
        self
    }
    pub fn engine(mut self, engine: DockingEngineKind) -> Self {
        self.engine = Some(engine);
        self
    }
    pub fn box_size(mut self, size: f64) -> Self {
        self.box_size = Some(size);
        self
    }
    pub fn exhaustiveness(mut self, exhaustiveness: u32) -> Self {
        self.exhaustiveness = Some(exhaustiveness);
        self
    }
    pub fn tools(mut self, tools: ToolPaths) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn build(self) -> Result<EvaluationConfig, ConfigError> {
        if self.only_generation && self.only_evaluation {
            return Err(ConfigError::InvalidParameter {
                name: "only_generation",
                reason: "cannot combine with only_evaluation; at least one half must run"
                    .to_string(),
            });
        }

        let engine = self.engine.unwrap_or(DockingEngineKind::Gnina);
        let config = EvaluationConfig {
            checkpoint: self
                .checkpoint
                .ok_or(ConfigError::MissingParameter("checkpoint"))?,
            dataset: self.dataset.unwrap_or_else(|| "pdbbind_filtered".to_string()),
            data_root: self.data_root.unwrap_or_else(|| PathBuf::from("data")),
            mode: self.mode.unwrap_or(Mode::LigandGeneration),
            limit_samples: self.limit_samples.unwrap_or(500),
            molecules_per_pocket: self.molecules_per_pocket.unwrap_or(10),
            batch_size: self.batch_size.unwrap_or(32),
            run_generation: !self.only_evaluation,
            run_evaluation: !self.only_generation,
            resampling_steps: self.resampling_steps.unwrap_or(10),
            jump_length: self.jump_length.unwrap_or(10),
            output_dir: self
                .output_dir
                .unwrap_or_else(|| PathBuf::from("evaluation_local")),
            engine,
            scoring: ScoringOptions {
                box_size: self.box_size.unwrap_or(20.0),
                exhaustiveness: self
                    .exhaustiveness
                    .unwrap_or_else(|| engine.default_exhaustiveness()),
            },
            tools: self.tools.unwrap_or_default(),
        };

        if config.limit_samples == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "limit_samples",
                reason: "must be at least 1".to_string(),
            });
        }
        if config.molecules_per_pocket == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "molecules_per_pocket",
                reason: "must be at least 1".to_string(),
            });
        }
        if config.batch_size == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "batch_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(config.scoring.box_size > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "box_size",
                reason: "must be positive".to_string(),
            });
        }
        if config.scoring.exhaustiveness == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "exhaustiveness",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(config)
    }
}

/// Fully validated parameters of one training passthrough.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub dataset_name: String,
    pub architecture: Architecture,
    pub seed: u64,
    pub batch_size: usize,
    pub num_steps: u64,
    pub learning_rate: f64,
    pub diffusion_steps: u32,
    pub num_layers: u32,
    pub hidden_features: u32,
    pub joint_features: u32,
    pub edge_cutoff: f64,
    pub attention: bool,
    pub condition_on_fg: bool,
    pub tools: ToolPaths,
}

#[derive(Default)]
pub struct TrainingConfigBuilder {
    dataset_name: Option<String>,
    architecture: Option<Architecture>,
    seed: Option<u64>,
    batch_size: Option<usize>,
    num_steps: Option<u64>,
    learning_rate: Option<f64>,
    diffusion_steps: Option<u32>,
    num_layers: Option<u32>,
    hidden_features: Option<u32>,
    joint_features: Option<u32>,
    edge_cutoff: Option<f64>,
    attention: bool,
    condition_on_fg: bool,
    tools: Option<ToolPaths>,
}

impl TrainingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dataset_name(mut self, name: impl Into<String>) -> Self {
        self.dataset_name = Some(name.into());
        self
    }
    pub fn architecture(mut self, architecture: Architecture) -> Self {
        self.architecture = Some(architecture);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }
    pub fn num_steps(mut self, steps: u64) -> Self {
        self.num_steps = Some(steps);
        self
    }
    pub fn learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = Some(lr);
        self
    }
    pub fn diffusion_steps(mut self, t: u32) -> Self {
        self.diffusion_steps = Some(t);
        self
    }
    pub fn num_layers(mut self, layers: u32) -> Self {
        self.num_layers = Some(layers);
        self
    }
    pub fn hidden_features(mut self, features: u32) -> Self {
        self.hidden_features = Some(features);
        self
    }
    pub fn joint_features(mut self, features: u32) -> Self {
        self.joint_features = Some(features);
        self
    }
    pub fn edge_cutoff(mut self, cutoff: f64) -> Self {
        self.edge_cutoff = Some(cutoff);
        self
    }
    pub fn attention(mut self, flag: bool) -> Self {
        self.attention = flag;
        self
    }
    pub fn condition_on_fg(mut self, flag: bool) -> Self {
        self.condition_on_fg = flag;
        self
    }
    pub fn tools(mut self, tools: ToolPaths) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn build(self) -> Result<TrainingConfig, ConfigError> {
        let config = TrainingConfig {
            dataset_name: self
                .dataset_name
                .ok_or(ConfigError::MissingParameter("dataset_name"))?,
            architecture: self.architecture.unwrap_or(Architecture::Gvp),
            seed: self.seed.unwrap_or(0),
            batch_size: self.batch_size.unwrap_or(64),
            num_steps: self.num_steps.unwrap_or(500_000),
            learning_rate: self.learning_rate.unwrap_or(1e-4),
            diffusion_steps: self.diffusion_steps.unwrap_or(500),
            num_layers: self.num_layers.unwrap_or(6),
            hidden_features: self.hidden_features.unwrap_or(256),
            joint_features: self.joint_features.unwrap_or(64),
            edge_cutoff: self.edge_cutoff.unwrap_or(7.0),
            attention: self.attention,
            condition_on_fg: self.condition_on_fg,
            tools: self.tools.unwrap_or_default(),
        };

        if config.batch_size == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "batch_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(config.learning_rate > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "lr",
                reason: "must be positive".to_string(),
            });
        }
        if config.diffusion_steps == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "T",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(config)
    }
}

/// Fully validated parameters of one custom generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub input_molecule: PathBuf,
    pub input_protein: PathBuf,
    pub output_dir: PathBuf,
    pub checkpoint_path: PathBuf,
    pub num_samples: usize,
    pub tools: ToolPaths,
}

#[derive(Default)]
pub struct GenerationConfigBuilder {
    input_molecule: Option<PathBuf>,
    input_protein: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    checkpoint_path: Option<PathBuf>,
    num_samples: Option<usize>,
    tools: Option<ToolPaths>,
}

impl GenerationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_molecule(mut self, path: PathBuf) -> Self {
        self.input_molecule = Some(path);
        self
    }
    pub fn input_protein(mut self, path: PathBuf) -> Self {
        self.input_protein = Some(path);
        self
    }
    pub fn output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = Some(dir);
        self
    }
    pub fn checkpoint_path(mut self, path: PathBuf) -> Self {
        self.checkpoint_path = Some(path);
        self
    }
    pub fn num_samples(mut self, count: usize) -> Self {
        self.num_samples = Some(count);
        self
    }
    pub fn tools(mut self, tools: ToolPaths) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn build(self) -> Result<GenerationConfig, ConfigError> {
        let config = GenerationConfig {
            input_molecule: self
                .input_molecule
                .ok_or(ConfigError::MissingParameter("input_molecule"))?,
            input_protein: self
                .input_protein
                .ok_or(ConfigError::MissingParameter("input_protein"))?,
            output_dir: self
                .output_dir
                .ok_or(ConfigError::MissingParameter("output"))?,
            checkpoint_path: self
                .checkpoint_path
                .ok_or(ConfigError::MissingParameter("checkpoint_path"))?,
            num_samples: self.num_samples.unwrap_or(10),
            tools: self.tools.unwrap_or_default(),
        };

        if config.num_samples == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "num_samples",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::checkpoints::CheckpointKind;

    fn checkpoint() -> Checkpoint {
        Checkpoint {
            name: "gvp_conditional".to_string(),
            path: PathBuf::from("checkpoints/gvp_conditional.ckpt"),
            size_bytes: 1024,
            kind: CheckpointKind::Conditional,
        }
    }

    #[test]
    fn evaluation_defaults_match_the_documented_values() {
        let config = EvaluationConfigBuilder::new()
            .checkpoint(checkpoint())
            .build()
            .unwrap();
        assert_eq!(config.dataset, "pdbbind_filtered");
        assert_eq!(config.mode, Mode::LigandGeneration);
        assert_eq!(config.limit_samples, 500);
        assert_eq!(config.molecules_per_pocket, 10);
        assert_eq!(config.batch_size, 32);
        assert_eq!(config.resampling_steps, 10);
        assert_eq!(config.jump_length, 10);
        assert_eq!(config.output_dir, PathBuf::from("evaluation_local"));
        assert_eq!(config.engine, DockingEngineKind::Gnina);
        assert_eq!(config.scoring.box_size, 20.0);
        assert_eq!(config.scoring.exhaustiveness, 8);
        assert!(config.run_generation);
        assert!(config.run_evaluation);
    }

    #[test]
    fn missing_checkpoint_is_rejected() {
        let err = EvaluationConfigBuilder::new().build().unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("checkpoint"));
    }

    #[test]
    fn exhaustiveness_defaults_follow_the_engine() {
        let config = EvaluationConfigBuilder::new()
            .checkpoint(checkpoint())
            .engine(DockingEngineKind::QVina)
            .build()
            .unwrap();
        assert_eq!(config.scoring.exhaustiveness, 16);

        let config = EvaluationConfigBuilder::new()
            .checkpoint(checkpoint())
            .engine(DockingEngineKind::QVina)
            .exhaustiveness(4)
            .build()
            .unwrap();
        assert_eq!(config.scoring.exhaustiveness, 4);
    }

    #[test]
    fn generation_and_evaluation_halves_cannot_both_be_disabled() {
        let err = EvaluationConfigBuilder::new()
            .checkpoint(checkpoint())
            .only_generation(true)
            .only_evaluation(true)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParameter { .. }));

        let config = EvaluationConfigBuilder::new()
            .checkpoint(checkpoint())
            .only_generation(true)
            .build()
            .unwrap();
        assert!(config.run_generation);
        assert!(!config.run_evaluation);
    }

    #[test]
    fn zero_counts_are_invalid() {
        let err = EvaluationConfigBuilder::new()
            .checkpoint(checkpoint())
            .molecules_per_pocket(0)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter {
                name: "molecules_per_pocket",
                ..
            }
        ));
    }

    #[test]
    fn training_requires_a_dataset_name() {
        let err = TrainingConfigBuilder::new().build().unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("dataset_name"));

        let config = TrainingConfigBuilder::new()
            .dataset_name("pdbbind_filtered")
            .build()
            .unwrap();
        assert_eq!(config.architecture, Architecture::Gvp);
        assert_eq!(config.batch_size, 64);
        assert_eq!(config.diffusion_steps, 500);
        assert!(!config.attention);
    }

    #[test]
    fn generation_requires_all_four_inputs() {
        let err = GenerationConfigBuilder::new()
            .input_molecule(PathBuf::from("frag.sdf"))
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("input_protein"));

        let config = GenerationConfigBuilder::new()
            .input_molecule(PathBuf::from("frag.sdf"))
            .input_protein(PathBuf::from("prot.pdb"))
            .output_dir(PathBuf::from("out"))
            .checkpoint_path(PathBuf::from("ckpt/gvp_conditional.ckpt"))
            .build()
            .unwrap();
        assert_eq!(config.num_samples, 10);
    }

    #[test]
    fn mode_and_engine_names_are_stable() {
        assert_eq!(Mode::InpaintGeneration.as_str(), "inpaint_generation");
        assert_eq!(Mode::All.to_string(), "all");
        assert_eq!(DockingEngineKind::AutoDockGpu.name(), "autodock-gpu");
        assert_eq!(Architecture::Egnn.as_str(), "egnn");
    }
}
