use crate::cli::BuildArgs;
use crate::error::{CliError, Result};
use quakelt::core::logictree::gsim::{GsimBranch, GsimLogicTree};
use quakelt::core::logictree::source::SourceModelBranch;
use quakelt::engine::config as core_config;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialLogicTreeConfig {
    random_seed: Option<u64>,
    number_of_samples: Option<usize>,
    area_source_discretization: Option<f64>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct PartialSourceModelBranch {
    id: String,
    file: PathBuf,
    weight: f64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct PartialGsimBranch {
    trt: String,
    id: String,
    gsim: String,
    weight: f64,
}

/// A job file as written by the user; every section is optional until merged.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialJobConfig {
    logic_tree: Option<PartialLogicTreeConfig>,
    #[serde(default)]
    source_model: Vec<PartialSourceModelBranch>,
    #[serde(default)]
    gsim: Vec<PartialGsimBranch>,
}

impl PartialJobConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading job configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Merges the job file with the command-line overrides.
    ///
    /// Precedence, highest first: `--set`, dedicated flags, the job file, the core defaults.
    pub fn merge_with_cli(
        mut self,
        args: &BuildArgs,
        base_path: &Path,
    ) -> Result<core_config::BuildConfig> {
        let lt_config = self.logic_tree.take().unwrap_or_default();
        self.logic_tree = Some(PartialLogicTreeConfig {
            random_seed: args.seed.or(lt_config.random_seed),
            number_of_samples: args.num_samples.or(lt_config.number_of_samples),
            area_source_discretization: args
                .area_source_discretization
                .or(lt_config.area_source_discretization),
        });
        self.apply_set_values(&args.set_values)?;
        self.into_build_config(base_path)
    }

    /// Converts the job file alone, without overrides.
    pub fn into_build_config(self, base_path: &Path) -> Result<core_config::BuildConfig> {
        let lt_config = self.logic_tree.unwrap_or_default();
        let gsim_lt = Self::gsim_logic_tree(self.gsim)?;

        let mut builder = core_config::BuildConfigBuilder::new()
            .source_model_branches(
                self.source_model
                    .into_iter()
                    .map(|b| SourceModelBranch::new(&b.id, b.file, b.weight))
                    .collect(),
            )
            .gsim_logic_tree(gsim_lt)
            .base_path(base_path.to_path_buf());
        if let Some(seed) = lt_config.random_seed {
            builder = builder.random_seed(seed);
        }
        if let Some(n) = lt_config.number_of_samples {
            builder = builder.number_of_logic_tree_samples(n);
        }
        if let Some(km) = lt_config.area_source_discretization {
            builder = builder.area_source_discretization(km);
        }
        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    /// Groups the `[[gsim]]` entries into branch sets, in order of first appearance.
    fn gsim_logic_tree(branches: Vec<PartialGsimBranch>) -> Result<GsimLogicTree> {
        let mut branch_sets: Vec<(String, Vec<GsimBranch>)> = Vec::new();
        for b in branches {
            let branch = GsimBranch::new(&b.id, &b.gsim, b.weight);
            match branch_sets.iter_mut().find(|(trt, _)| *trt == b.trt) {
                Some((_, set)) => set.push(branch),
                None => branch_sets.push((b.trt, vec![branch])),
            }
        }
        if branch_sets.is_empty() {
            return Err(CliError::Config(
                "At least one `[[gsim]]` branch is required.".to_string(),
            ));
        }
        GsimLogicTree::from_branch_sets(branch_sets).map_err(|e| CliError::Config(e.to_string()))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let lt_config = self.logic_tree.get_or_insert_with(Default::default);

            match key {
                "logic-tree.random-seed" => {
                    lt_config.random_seed = Some(value_str.parse().map_err(|_| {
                        CliError::Config(format!(
                            "Invalid integer value for {}: {}",
                            key, value_str
                        ))
                    })?);
                }
                "logic-tree.number-of-samples" => {
                    lt_config.number_of_samples = Some(value_str.parse().map_err(|_| {
                        CliError::Config(format!(
                            "Invalid integer value for {}: {}",
                            key, value_str
                        ))
                    })?);
                }
                "logic-tree.area-source-discretization" => {
                    lt_config.area_source_discretization =
                        Some(value_str.parse().map_err(|_| {
                            CliError::Config(format!(
                                "Invalid float value for {}: {}",
                                key, value_str
                            ))
                        })?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}
