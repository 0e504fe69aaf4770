use crate::cli::CheckArgs;
use crate::commands::build::job_dir;
use crate::config::PartialJobConfig;
use crate::error::{CliError, Result};
use quakelt::core::io::source_model::{DefaultConverter, parse_source_model_file};
use quakelt::core::models::group::TectonicRegionGroup;
use quakelt::core::sources::split::MeshSplitter;
use tracing::info;

pub fn run(args: CheckArgs) -> Result<()> {
    let base_path = job_dir(&args.config);
    let config = PartialJobConfig::from_file(&args.config)?.into_build_config(base_path)?;
    let smlt = config
        .source_model_lt()
        .map_err(|e| CliError::Config(e.to_string()))?;

    println!(
        "Source-model logic tree: {} branch(es); GSIM logic tree: {} path(s).",
        smlt.branches().len(),
        config.gsim_logic_tree.num_paths()
    );

    for branch in smlt.branches() {
        let path = config.base_path.join(&branch.file);
        info!("Checking source model {:?}", path);
        let mut groups = parse_source_model_file(&path, &DefaultConverter, |_| {}).map_err(|e| {
            CliError::FileParsing {
                path: path.clone(),
                source: e.into(),
            }
        })?;
        for group in &mut groups {
            group.split_and_recount(config.area_source_discretization, &MeshSplitter);
        }

        println!("{} (w={}): {}", branch.branch_id, branch.weight, path.display());
        for group in &groups {
            println!("  {}", summarize(group));
        }
    }
    Ok(())
}

fn summarize(group: &TectonicRegionGroup) -> String {
    let mags = match (group.min_mag, group.max_mag) {
        (Some(min), Some(max)) => format!(", mag {:.2}-{:.2}", min, max),
        _ => String::new(),
    };
    format!(
        "{}: {} source(s), {} rupture(s){}",
        group.trt,
        group.len(),
        group.num_ruptures,
        mags
    )
}
