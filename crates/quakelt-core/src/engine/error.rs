use super::config::ConfigError;
use crate::core::io::source_model::SourceModelError;
use crate::core::logictree::error::LogicTreeError;
use thiserror::Error;

/// Fatal failures of the association build.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum AssociationError {
    #[error("All sources were filtered away")]
    EmptyModel,

    #[error("All realizations have zero weight")]
    AllWeightsZero,

    #[error("Expected {expected} sampled realizations, found {actual}")]
    SampleCountMismatch { expected: usize, actual: usize },

    #[error("Unknown association key: {0}")]
    UnknownAssociationKey(String),

    #[error("There is no tectonic region group associated to the collection {0}")]
    UnknownColumn(usize),

    #[error("Logic tree error: {source}")]
    LogicTree {
        #[from]
        source: LogicTreeError,
    },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid logic tree: {source}")]
    LogicTree {
        #[from]
        source: LogicTreeError,
    },

    #[error("Failed to read source model: {source}")]
    SourceModel {
        #[from]
        source: SourceModelError,
    },

    #[error("Association build failed: {source}")]
    Association {
        #[from]
        source: AssociationError,
    },
}
