use crate::cli::GenerateArgs;
use crate::config::FileConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use diffhopp::engine::config::{GenerationConfig, GenerationConfigBuilder};
use diffhopp::engine::progress::ProgressReporter;
use diffhopp::workflows;

pub fn run(args: GenerateArgs) -> Result<()> {
    let file_config = FileConfig::load(args.config.as_deref())?;
    let config = build_config(&args, &file_config)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Sampling {} molecule(s) for {}...",
        config.num_samples,
        config.input_molecule.display()
    );
    let molecules = workflows::generate::run(&config, &reporter)?;

    let valid = molecules.iter().filter(|m| m.is_valid()).count();
    println!(
        "✓ Sampler wrote {} file(s) ({} parsed) to: {}",
        molecules.len(),
        valid,
        config.output_dir.display()
    );
    for molecule in &molecules {
        if let Some(reason) = &molecule.failure {
            let name = molecule
                .path
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_default();
            println!("  ✗ {name}: {reason}");
        }
    }
    Ok(())
}

fn build_config(args: &GenerateArgs, file_config: &FileConfig) -> Result<GenerationConfig> {
    GenerationConfigBuilder::new()
        .input_molecule(args.input_molecule.clone())
        .input_protein(args.input_protein.clone())
        .output_dir(args.output.clone())
        .checkpoint_path(args.checkpoint_path.clone())
        .num_samples(args.num_samples)
        .tools(file_config.tool_paths())
        .build()
        .map_err(|e| CliError::Config(e.to_string()))
}
