use super::error::LogicTreeError;
use super::gsim::check_branch_weights;
use rand::SeedableRng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::debug;

/// A branch of the source-model logic tree, pointing to a source-model file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceModelBranch {
    pub branch_id: String,
    pub file: PathBuf,
    pub weight: f64,
}

impl SourceModelBranch {
    pub fn new(branch_id: &str, file: impl Into<PathBuf>, weight: f64) -> Self {
        Self {
            branch_id: branch_id.to_string(),
            file: file.into(),
            weight,
        }
    }
}

/// A source model selected by the logic tree, with the number of times it was drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceModelRealization {
    pub name: String,
    pub weight: f64,
    pub path: Vec<String>,
    pub file: PathBuf,
    pub samples: usize,
}

/// The source-model logic tree: one branch set of alternative source-model files.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceModelLogicTree {
    branches: Vec<SourceModelBranch>,
    /// Master seed of the calculation.
    pub seed: u64,
    /// Number of logic-tree samples; `0` means full enumeration.
    pub num_samples: usize,
}

impl SourceModelLogicTree {
    /// Creates a tree after validating its branches.
    ///
    /// # Errors
    ///
    /// Fails if there are no branches, a branch id is repeated, or the weights are invalid.
    pub fn new(
        branches: Vec<SourceModelBranch>,
        seed: u64,
        num_samples: usize,
    ) -> Result<Self, LogicTreeError> {
        check_branch_weights(
            "sourceModel",
            branches.iter().map(|b| (b.branch_id.as_str(), b.weight)),
        )?;
        let mut seen = HashSet::new();
        for branch in &branches {
            if !seen.insert(branch.branch_id.as_str()) {
                return Err(LogicTreeError::DuplicateBranchId(branch.branch_id.clone()));
            }
        }
        Ok(Self {
            branches,
            seed,
            num_samples,
        })
    }

    pub fn branches(&self) -> &[SourceModelBranch] {
        &self.branches
    }

    /// The distinct source-model files referenced by the tree, sorted.
    pub fn source_model_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.branches.iter().map(|b| b.file.clone()).collect();
        paths.sort();
        paths.dedup();
        paths
    }

    /// The source models taking part in the calculation.
    ///
    /// With full enumeration every branch appears once. With sampling, `num_samples` branches
    /// are drawn from a generator seeded with [`Self::seed`]; a branch drawn `k` times appears
    /// once with `samples == k`, and branches keep their tree order.
    pub fn realizations(&self) -> Result<Vec<SourceModelRealization>, LogicTreeError> {
        let counts = if self.num_samples > 0 {
            let dist = WeightedIndex::new(self.branches.iter().map(|b| b.weight))
                .map_err(|_| LogicTreeError::Sampling("sourceModel".to_string()))?;
            let mut rng = StdRng::seed_from_u64(self.seed);
            let mut counts = vec![0usize; self.branches.len()];
            for _ in 0..self.num_samples {
                counts[dist.sample(&mut rng)] += 1;
            }
            debug!(?counts, "Sampled source-model branches.");
            counts
        } else {
            vec![1; self.branches.len()]
        };

        Ok(self
            .branches
            .iter()
            .zip(counts)
            .filter(|(_, samples)| *samples > 0)
            .map(|(branch, samples)| SourceModelRealization {
                name: branch.file.to_string_lossy().to_string(),
                weight: branch.weight,
                path: vec![branch.branch_id.clone()],
                file: branch.file.clone(),
                samples,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branches() -> Vec<SourceModelBranch> {
        vec![
            SourceModelBranch::new("b1", "sm_b.toml", 0.6),
            SourceModelBranch::new("b2", "sm_a.toml", 0.3),
            SourceModelBranch::new("b3", "sm_b.toml", 0.1),
        ]
    }

    #[test]
    fn new_rejects_duplicate_branch_ids() {
        let result = SourceModelLogicTree::new(
            vec![
                SourceModelBranch::new("b1", "a.toml", 0.5),
                SourceModelBranch::new("b1", "b.toml", 0.5),
            ],
            0,
            0,
        );
        assert_eq!(
            result,
            Err(LogicTreeError::DuplicateBranchId("b1".to_string()))
        );
    }

    #[test]
    fn new_rejects_empty_tree() {
        assert!(matches!(
            SourceModelLogicTree::new(vec![], 0, 0),
            Err(LogicTreeError::EmptyBranchSet(_))
        ));
    }

    #[test]
    fn source_model_paths_are_sorted_and_unique() {
        let tree = SourceModelLogicTree::new(branches(), 0, 0).unwrap();
        assert_eq!(
            tree.source_model_paths(),
            vec![PathBuf::from("sm_a.toml"), PathBuf::from("sm_b.toml")]
        );
    }

    #[test]
    fn full_enumeration_yields_every_branch_once() {
        let tree = SourceModelLogicTree::new(branches(), 0, 0).unwrap();
        let rlzs = tree.realizations().unwrap();

        assert_eq!(rlzs.len(), 3);
        assert!(rlzs.iter().all(|r| r.samples == 1));
        assert_eq!(rlzs[1].path, vec!["b2".to_string()]);
        assert_eq!(rlzs[1].name, "sm_a.toml");
        assert_eq!(rlzs[2].weight, 0.1);
    }

    #[test]
    fn sampling_distributes_exactly_num_samples_draws() {
        let tree = SourceModelLogicTree::new(branches(), 23, 20).unwrap();
        let rlzs = tree.realizations().unwrap();

        let total: usize = rlzs.iter().map(|r| r.samples).sum();
        assert_eq!(total, 20);
        assert!(rlzs.iter().all(|r| r.samples > 0));
        assert_eq!(rlzs, tree.realizations().unwrap());
    }
}
