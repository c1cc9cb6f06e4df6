//! Training workflow.
//!
//! Training itself happens in the external trainer binary. This workflow
//! renders the trainer's command line from a validated hyperparameter set,
//! streams the trainer's own output to the console, and propagates its exit
//! status.

use crate::engine::config::TrainingConfig;
use crate::engine::error::EngineError;
use crate::engine::exec::{ExecError, ToolCommand};
use tracing::{info, instrument};

/// Trainer flags are forwarded verbatim, in a fixed documented order.
pub(crate) fn trainer_command(config: &TrainingConfig) -> ToolCommand {
    let mut command = ToolCommand::new(&config.tools.trainer)
        .arg("--dataset_name")
        .arg(config.dataset_name.as_str())
        .arg("--architecture")
        .arg(config.architecture.as_str())
        .arg("--seed")
        .arg(config.seed.to_string())
        .arg("--batch_size")
        .arg(config.batch_size.to_string())
        .arg("--num_steps")
        .arg(config.num_steps.to_string())
        .arg("--lr")
        .arg(config.learning_rate.to_string())
        .arg("--T")
        .arg(config.diffusion_steps.to_string())
        .arg("--num_layers")
        .arg(config.num_layers.to_string())
        .arg("--hidden_features")
        .arg(config.hidden_features.to_string())
        .arg("--joint_features")
        .arg(config.joint_features.to_string())
        .arg("--edge_cutoff")
        .arg(config.edge_cutoff.to_string());
    if config.attention {
        command = command.arg("--attention");
    }
    if config.condition_on_fg {
        command = command.arg("--condition_on_fg");
    }
    command
}

/// Runs the trainer to completion with inherited stdio.
#[instrument(skip_all, name = "training_workflow")]
pub fn run(config: &TrainingConfig) -> Result<(), EngineError> {
    let command = trainer_command(config);
    info!(command = %command.rendered(), "launching trainer");
    let code = command.stream()?;
    if code != 0 {
        return Err(EngineError::Tool(ExecError::Failed {
            program: config.tools.trainer.clone(),
            code,
            stderr_excerpt: "(output streamed to console)".to_string(),
        }));
    }
    info!("training run finished");
    Ok(())
}
