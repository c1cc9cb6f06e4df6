use clap::{Args, Parser, Subcommand, ValueEnum};
use diffhopp::engine::config::{Architecture, DockingEngineKind, Mode};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "DiffHopp Developers",
    version,
    about = "DiffHopp CLI - Evaluation and orchestration toolkit for diffusion-based scaffold hopping: sampling, docking-based scoring, and report generation.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a trained checkpoint: sample molecules over a test set, dock them, and write a report bundle.
    Evaluate(EvaluateArgs),
    /// Hand a training run over to the external trainer with a validated hyperparameter set.
    Train(TrainArgs),
    /// Sample molecules for a single scaffold/pocket pair outside of any dataset.
    Generate(GenerateArgs),
    /// Inspect a local dataset: per-split complex counts and location.
    Dataset(DatasetArgs),
    /// Analyze the connectivity of generated SDF files to diagnose broken sampling runs.
    Diagnose(DiagnoseArgs),
    /// Check that the docking toolchain and GPU are ready to use.
    Doctor(DoctorArgs),
}

/// Molecule populations an evaluation run can cover.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    GroundTruth,
    LigandGeneration,
    InpaintGeneration,
    All,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::GroundTruth => Mode::GroundTruth,
            ModeArg::LigandGeneration => Mode::LigandGeneration,
            ModeArg::InpaintGeneration => Mode::InpaintGeneration,
            ModeArg::All => Mode::All,
        }
    }
}

/// Docking engines available for scoring.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorerArg {
    Gnina,
    Qvina,
    AutodockGpu,
}

impl From<ScorerArg> for DockingEngineKind {
    fn from(arg: ScorerArg) -> Self {
        match arg {
            ScorerArg::Gnina => DockingEngineKind::Gnina,
            ScorerArg::Qvina => DockingEngineKind::QVina,
            ScorerArg::AutodockGpu => DockingEngineKind::AutoDockGpu,
        }
    }
}

/// Model architectures the external trainer accepts.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchitectureArg {
    Gvp,
    Egnn,
}

impl From<ArchitectureArg> for Architecture {
    fn from(arg: ArchitectureArg) -> Self {
        match arg {
            ArchitectureArg::Gvp => Architecture::Gvp,
            ArchitectureArg::Egnn => Architecture::Egnn,
        }
    }
}

/// Arguments for the `evaluate` subcommand.
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Checkpoint to evaluate: an alias (e.g. 'gvp', 'egnn_unconditional'),
    /// a file stem, or a path to a .ckpt file.
    #[arg(value_name = "CHECKPOINT")]
    pub checkpoint: String,

    /// Directory scanned for .ckpt files when the checkpoint is not a path.
    #[arg(long, default_value = "checkpoints", value_name = "DIR")]
    pub checkpoints_dir: PathBuf,

    /// Name of the dataset under the data root.
    #[arg(long, default_value = "pdbbind_filtered", value_name = "NAME")]
    pub dataset: String,

    /// Which molecule populations to generate and score.
    #[arg(long, value_enum, default_value_t = ModeArg::LigandGeneration)]
    pub mode: ModeArg,

    /// Evaluate at most this many complexes from the test split.
    #[arg(long, default_value_t = 500, value_name = "INT")]
    pub limit_samples: usize,

    /// Number of molecules to sample per pocket.
    #[arg(long, default_value_t = 10, value_name = "INT")]
    pub molecules_per_pocket: usize,

    /// Sampler batch size.
    #[arg(long, default_value_t = 32, value_name = "INT")]
    pub batch_size: usize,

    /// Run only the generation half and skip scoring.
    #[arg(long, conflicts_with = "only_evaluation")]
    pub only_generation: bool,

    /// Run only the evaluation half against previously generated molecules.
    #[arg(long)]
    pub only_evaluation: bool,

    /// Repaint resampling steps for inpaint generation.
    #[arg(long = "r", default_value_t = 10, value_name = "INT")]
    pub resampling_steps: u32,

    /// Repaint jump length for inpaint generation.
    #[arg(long = "j", default_value_t = 10, value_name = "INT")]
    pub jump_length: u32,

    /// Directory the report bundle is written under.
    #[arg(long, default_value = "evaluation_local", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Docking engine used to score molecules.
    #[arg(long, value_enum, default_value_t = ScorerArg::Gnina)]
    pub scorer: ScorerArg,

    /// Data root holding the datasets. Falls back to
    /// $DIFFUSION_HOPPING_DATA_ROOT, then './data'.
    #[arg(long, value_name = "DIR")]
    pub data_root: Option<PathBuf>,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Arguments for the `train` subcommand.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Name of the dataset to train on.
    #[arg(long, default_value = "pdbbind_filtered", value_name = "NAME")]
    pub dataset_name: String,

    /// Denoiser architecture.
    #[arg(long, value_enum, default_value_t = ArchitectureArg::Gvp)]
    pub architecture: ArchitectureArg,

    /// Random seed forwarded to the trainer.
    #[arg(long, default_value_t = 0, value_name = "INT")]
    pub seed: u64,

    /// Training batch size.
    #[arg(long, default_value_t = 64, value_name = "INT")]
    pub batch_size: usize,

    /// Number of optimizer steps.
    #[arg(long, default_value_t = 500_000, value_name = "INT")]
    pub num_steps: u64,

    /// Learning rate.
    #[arg(long, default_value_t = 1e-4, value_name = "FLOAT")]
    pub lr: f64,

    /// Number of diffusion timesteps.
    #[arg(long = "t", default_value_t = 500, value_name = "INT")]
    pub diffusion_steps: u32,

    /// Number of message passing layers.
    #[arg(long, default_value_t = 6, value_name = "INT")]
    pub num_layers: u32,

    /// Hidden feature width.
    #[arg(long, default_value_t = 256, value_name = "INT")]
    pub hidden_features: u32,

    /// Joint embedding width.
    #[arg(long, default_value_t = 64, value_name = "INT")]
    pub joint_features: u32,

    /// Graph edge cutoff in Angstroms.
    #[arg(long, default_value_t = 7.0, value_name = "FLOAT")]
    pub edge_cutoff: f64,

    /// Enable attention in the denoiser.
    #[arg(long)]
    pub attention: bool,

    /// Condition the model on the kept functional group.
    #[arg(long)]
    pub condition_on_fg: bool,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// SDF file with the scaffold/fragment to hop from.
    #[arg(long, required = true, value_name = "PATH")]
    pub input_molecule: PathBuf,

    /// PDB file with the target pocket.
    #[arg(long, required = true, value_name = "PATH")]
    pub input_protein: PathBuf,

    /// Directory the sampled SDF files are written to.
    #[arg(long, required = true, value_name = "DIR")]
    pub output: PathBuf,

    /// Path to the model checkpoint to sample from.
    #[arg(long, required = true, value_name = "PATH")]
    pub checkpoint_path: PathBuf,

    /// Number of molecules to sample.
    #[arg(long, default_value_t = 10, value_name = "INT")]
    pub num_samples: usize,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Arguments for the `dataset` subcommand.
#[derive(Args, Debug)]
pub struct DatasetArgs {
    /// Name of the dataset under the data root.
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Data root holding the datasets. Falls back to
    /// $DIFFUSION_HOPPING_DATA_ROOT, then './data'.
    #[arg(long, value_name = "DIR")]
    pub data_root: Option<PathBuf>,
}

/// Arguments for the `diagnose` subcommand.
#[derive(Args, Debug)]
pub struct DiagnoseArgs {
    /// Directory of generated SDF files to analyze.
    #[arg(long, required = true, value_name = "DIR")]
    pub results_dir: PathBuf,

    /// Checkpoint the files came from, for context in the report.
    #[arg(long, value_name = "PATH")]
    pub checkpoint: Option<PathBuf>,
}

/// Arguments for the `doctor` subcommand.
#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Skip the bounded smoke invocation of the docking engine.
    #[arg(long)]
    pub skip_smoke_test: bool,

    /// Wall-clock limit for the smoke invocation, in seconds.
    #[arg(long, default_value_t = 60, value_name = "SECS")]
    pub timeout_secs: u64,
}
