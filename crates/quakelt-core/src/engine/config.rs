use crate::core::logictree::error::LogicTreeError;
use crate::core::logictree::gsim::GsimLogicTree;
use crate::core::logictree::source::{SourceModelBranch, SourceModelLogicTree};
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_RANDOM_SEED: u64 = 42;
pub const DEFAULT_AREA_SOURCE_DISCRETIZATION: f64 = 10.0;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Parameters of the logic-tree processing.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicTreeConfig {
    pub random_seed: u64,
    /// `0` means full enumeration.
    pub number_of_logic_tree_samples: usize,
}

/// Everything needed to build the realizations of a calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    pub logic_tree: LogicTreeConfig,
    /// Mesh spacing, in km, used to split area sources.
    pub area_source_discretization: f64,
    pub source_model_branches: Vec<SourceModelBranch>,
    pub gsim_logic_tree: GsimLogicTree,
    /// Directory the source-model files are relative to.
    pub base_path: PathBuf,
}

impl BuildConfig {
    /// The source-model logic tree described by the configuration.
    pub fn source_model_lt(&self) -> Result<SourceModelLogicTree, LogicTreeError> {
        SourceModelLogicTree::new(
            self.source_model_branches.clone(),
            self.logic_tree.random_seed,
            self.logic_tree.number_of_logic_tree_samples,
        )
    }

    pub fn is_sampling(&self) -> bool {
        self.logic_tree.number_of_logic_tree_samples > 0
    }
}

#[derive(Default)]
pub struct BuildConfigBuilder {
    random_seed: Option<u64>,
    number_of_logic_tree_samples: Option<usize>,
    area_source_discretization: Option<f64>,
    source_model_branches: Vec<SourceModelBranch>,
    gsim_logic_tree: Option<GsimLogicTree>,
    base_path: Option<PathBuf>,
}

impl BuildConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }
    pub fn number_of_logic_tree_samples(mut self, n: usize) -> Self {
        self.number_of_logic_tree_samples = Some(n);
        self
    }
    pub fn area_source_discretization(mut self, km: f64) -> Self {
        self.area_source_discretization = Some(km);
        self
    }
    pub fn source_model_branch(mut self, branch: SourceModelBranch) -> Self {
        self.source_model_branches.push(branch);
        self
    }
    pub fn source_model_branches(mut self, branches: Vec<SourceModelBranch>) -> Self {
        self.source_model_branches = branches;
        self
    }
    pub fn gsim_logic_tree(mut self, tree: GsimLogicTree) -> Self {
        self.gsim_logic_tree = Some(tree);
        self
    }
    pub fn base_path(mut self, path: PathBuf) -> Self {
        self.base_path = Some(path);
        self
    }

    pub fn build(self) -> Result<BuildConfig, ConfigError> {
        if self.source_model_branches.is_empty() {
            return Err(ConfigError::MissingParameter("source_model_branches"));
        }
        let area_source_discretization = self
            .area_source_discretization
            .unwrap_or(DEFAULT_AREA_SOURCE_DISCRETIZATION);
        if !(area_source_discretization.is_finite() && area_source_discretization > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "area_source_discretization",
                reason: format!("expected a positive length, got {area_source_discretization}"),
            });
        }
        Ok(BuildConfig {
            logic_tree: LogicTreeConfig {
                random_seed: self.random_seed.unwrap_or(DEFAULT_RANDOM_SEED),
                number_of_logic_tree_samples: self.number_of_logic_tree_samples.unwrap_or(0),
            },
            area_source_discretization,
            source_model_branches: self.source_model_branches,
            gsim_logic_tree: self
                .gsim_logic_tree
                .ok_or(ConfigError::MissingParameter("gsim_logic_tree"))?,
            base_path: self.base_path.unwrap_or_else(|| PathBuf::from(".")),
        })
    }
}
