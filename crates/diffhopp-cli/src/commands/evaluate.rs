use crate::cli::EvaluateArgs;
use crate::config::FileConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use diffhopp::core::{checkpoints, dataset};
use diffhopp::engine::config::{EvaluationConfig, EvaluationConfigBuilder};
use diffhopp::engine::progress::ProgressReporter;
use diffhopp::workflows;
use tracing::info;

pub fn run(args: EvaluateArgs) -> Result<()> {
    let file_config = FileConfig::load(args.config.as_deref())?;
    let config = build_config(&args, &file_config)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Evaluating checkpoint '{}' on '{}' with the {} scorer...",
        config.checkpoint.name, config.dataset, config.engine
    );
    let bundle = workflows::evaluate::run(&config, &reporter)?;

    println!("✓ Report bundle written to: {}", bundle.root().display());
    Ok(())
}

/// Builds the validated evaluation config from CLI flags and the optional
/// file config. Flags win over file values, file values over defaults.
fn build_config(args: &EvaluateArgs, file_config: &FileConfig) -> Result<EvaluationConfig> {
    let checkpoint = checkpoints::resolve(&args.checkpoint, &args.checkpoints_dir)?;
    info!(
        name = %checkpoint.name,
        kind = %checkpoint.kind,
        path = %checkpoint.path.display(),
        "resolved checkpoint"
    );

    let data_root = dataset::resolve_data_root(args.data_root.as_deref());

    let mut builder = EvaluationConfigBuilder::new()
        .checkpoint(checkpoint)
        .dataset(&args.dataset)
        .data_root(data_root)
        .mode(args.mode.into())
        .limit_samples(args.limit_samples)
        .molecules_per_pocket(args.molecules_per_pocket)
        .batch_size(args.batch_size)
        .only_generation(args.only_generation)
        .only_evaluation(args.only_evaluation)
        .resampling_steps(args.resampling_steps)
        .jump_length(args.jump_length)
        .output_dir(args.output_dir.clone())
        .engine(args.scorer.into())
        .tools(file_config.tool_paths());

    if let Some(scoring) = &file_config.scoring {
        if let Some(size) = scoring.box_size {
            builder = builder.box_size(size);
        }
        if let Some(exhaustiveness) = scoring.exhaustiveness {
            builder = builder.exhaustiveness(exhaustiveness);
        }
    }

    builder.build().map_err(|e| CliError::Config(e.to_string()))
}
