use crate::cli::BuildArgs;
use crate::config::PartialJobConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use quakelt::engine::export::write_realizations_csv;
use quakelt::engine::progress::ProgressReporter;
use quakelt::workflows;
use std::path::Path;
use tracing::{info, warn};

pub fn run(args: BuildArgs) -> Result<()> {
    let partial_config = PartialJobConfig::from_file(&args.config)?;
    info!("Merging configuration from file and CLI arguments...");
    let final_config = partial_config.merge_with_cli(&args, job_dir(&args.config))?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Building logic-tree realizations...");
    info!("Invoking the core build workflow...");
    let result = workflows::build::run(&final_config, &reporter)?;

    let assoc = &result.association;
    for diagnostic in assoc.diagnostics() {
        warn!("{}", diagnostic);
    }

    println!("{}", result.composite);
    println!("{} realization(s):", assoc.realizations().len());
    for rlz in assoc.realizations() {
        println!("  {}", rlz);
    }
    if args.show_assoc {
        println!("{}", assoc);
    }

    if let Some(output) = &args.output {
        info!("Writing realizations to {:?}", output);
        write_realizations_csv(output, assoc)?;
        println!("✓ Realizations written to: {}", output.display());
    }

    Ok(())
}

/// Source-model files are resolved against the directory of the job file.
pub(crate) fn job_dir(config: &Path) -> &Path {
    config
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}
