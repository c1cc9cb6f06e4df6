use crate::cli::TrainArgs;
use crate::config::FileConfig;
use crate::error::{CliError, Result};
use diffhopp::engine::config::{TrainingConfig, TrainingConfigBuilder};
use diffhopp::workflows;

pub fn run(args: TrainArgs) -> Result<()> {
    let file_config = FileConfig::load(args.config.as_deref())?;
    let config = build_config(&args, &file_config)?;

    println!(
        "Handing off to the external trainer ({} on '{}'); its output is streamed below.",
        config.architecture, config.dataset_name
    );
    workflows::train::run(&config)?;

    println!("✓ Training run finished.");
    Ok(())
}

fn build_config(args: &TrainArgs, file_config: &FileConfig) -> Result<TrainingConfig> {
    TrainingConfigBuilder::new()
        .dataset_name(&args.dataset_name)
        .architecture(args.architecture.into())
        .seed(args.seed)
        .batch_size(args.batch_size)
        .num_steps(args.num_steps)
        .learning_rate(args.lr)
        .diffusion_steps(args.diffusion_steps)
        .num_layers(args.num_layers)
        .hidden_features(args.hidden_features)
        .joint_features(args.joint_features)
        .edge_cutoff(args.edge_cutoff)
        .attention(args.attention)
        .condition_on_fg(args.condition_on_fg)
        .tools(file_config.tool_paths())
        .build()
        .map_err(|e| CliError::Config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use diffhopp::engine::config::Architecture;

    fn train_args(argv: &[&str]) -> TrainArgs {
        let mut full = vec!["diffhopp", "train"];
        full.extend_from_slice(argv);
        let cli = Cli::try_parse_from(full).expect("argv should parse");
        match cli.command {
            Commands::Train(args) => args,
            _ => panic!("expected the train subcommand"),
        }
    }

    #[test]
    fn defaults_build_a_valid_config() {
        let config = build_config(&train_args(&[]), &FileConfig::default()).unwrap();
        assert_eq!(config.dataset_name, "pdbbind_filtered");
        assert_eq!(config.architecture, Architecture::Gvp);
        assert_eq!(config.num_steps, 500_000);
        assert_eq!(config.diffusion_steps, 500);
        assert!(!config.attention);
    }

    #[test]
    fn invalid_hyperparameters_are_rejected_before_launch() {
        let err = build_config(
            &train_args(&["--lr", "0"]),
            &FileConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
        assert!(err.to_string().contains("lr"));
    }
}
