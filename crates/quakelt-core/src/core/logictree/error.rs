use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum LogicTreeError {
    #[error("Branch set '{0}' has no branches")]
    EmptyBranchSet(String),

    #[error("Duplicate branch set for tectonic region type '{0}'")]
    DuplicateBranchSet(String),

    #[error("Duplicate branch id '{0}'")]
    DuplicateBranchId(String),

    #[error("Branch '{branch_id}' has an invalid weight {weight}")]
    InvalidWeight { branch_id: String, weight: f64 },

    #[error("Weights of branch set '{set}' sum to {sum}, expected 1")]
    InvalidBranchWeights { set: String, sum: f64 },

    #[error("Failed to build a sampling distribution for branch set '{0}'")]
    Sampling(String),
}
