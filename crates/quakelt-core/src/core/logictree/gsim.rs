use super::error::LogicTreeError;
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use std::collections::{BTreeMap, BTreeSet, HashSet};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// One realization of the ground-motion logic tree: a GSIM for every tectonic region type.
#[derive(Debug, Clone, PartialEq)]
pub struct GsimRealization {
    /// Tectonic region type -> GSIM name.
    pub value: BTreeMap<String, String>,
    pub weight: f64,
    /// Branch identifiers chosen in each branch set.
    pub lt_path: Vec<String>,
    pub ordinal: usize,
}

impl GsimRealization {
    /// Identifier of the realization: its branch path joined with underscores.
    pub fn uid(&self) -> String {
        self.lt_path.join("_")
    }
}

/// The interface the association engine needs from a ground-motion logic tree.
pub trait GroundMotionTree {
    /// The tectonic region types currently modeled by the tree.
    fn tectonic_region_types(&self) -> BTreeSet<String>;

    /// Tectonic region type -> GSIMs of its branches, in branch order.
    fn values(&self) -> BTreeMap<String, Vec<String>>;

    /// Drops the branch sets of every tectonic region type not in `trts`.
    fn reduce(&mut self, trts: &BTreeSet<String>);

    /// Draws `num_samples` realizations using `rng`.
    fn sample<R: Rng + ?Sized>(
        &self,
        num_samples: usize,
        rng: &mut R,
    ) -> Result<Vec<GsimRealization>, LogicTreeError>;

    /// Enumerates the distinct realizations of the tree with their weights.
    fn effective_realizations(&self) -> Vec<GsimRealization>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct GsimBranch {
    pub branch_id: String,
    pub gsim: String,
    pub weight: f64,
}

impl GsimBranch {
    pub fn new(branch_id: &str, gsim: &str, weight: f64) -> Self {
        Self {
            branch_id: branch_id.to_string(),
            gsim: gsim.to_string(),
            weight,
        }
    }
}

/// The alternative GSIMs for one tectonic region type.
#[derive(Debug, Clone, PartialEq)]
pub struct GsimBranchSet {
    pub trt: String,
    pub branches: Vec<GsimBranch>,
}

/// A ground-motion logic tree with one branch set per tectonic region type.
///
/// Branch sets are kept in insertion order, which fixes the order of the realization paths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GsimLogicTree {
    branch_sets: Vec<GsimBranchSet>,
}

impl GsimLogicTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree from `(trt, branches)` pairs, validating each branch set.
    pub fn from_branch_sets<I>(branch_sets: I) -> Result<Self, LogicTreeError>
    where
        I: IntoIterator<Item = (String, Vec<GsimBranch>)>,
    {
        let mut tree = Self::new();
        for (trt, branches) in branch_sets {
            tree.add_branch_set(&trt, branches)?;
        }
        Ok(tree)
    }

    /// Appends the branch set of a tectonic region type.
    ///
    /// # Errors
    ///
    /// Fails if the tectonic region type already has a branch set, if the set is empty, if a
    /// branch id is repeated within the tree, or if the weights are negative or do not sum
    /// to one.
    pub fn add_branch_set(
        &mut self,
        trt: &str,
        branches: Vec<GsimBranch>,
    ) -> Result<(), LogicTreeError> {
        if self.branch_sets.iter().any(|bs| bs.trt == trt) {
            return Err(LogicTreeError::DuplicateBranchSet(trt.to_string()));
        }
        check_branch_weights(
            trt,
            branches.iter().map(|b| (b.branch_id.as_str(), b.weight)),
        )?;

        let mut seen: HashSet<&str> = self
            .branch_sets
            .iter()
            .flat_map(|bs| bs.branches.iter().map(|b| b.branch_id.as_str()))
            .collect();
        for branch in &branches {
            if !seen.insert(branch.branch_id.as_str()) {
                return Err(LogicTreeError::DuplicateBranchId(branch.branch_id.clone()));
            }
        }

        self.branch_sets.push(GsimBranchSet {
            trt: trt.to_string(),
            branches,
        });
        Ok(())
    }

    pub fn branch_sets(&self) -> &[GsimBranchSet] {
        &self.branch_sets
    }

    /// Number of paths through the tree, before deduplication.
    pub fn num_paths(&self) -> usize {
        if self.branch_sets.is_empty() {
            return 0;
        }
        self.branch_sets.iter().map(|bs| bs.branches.len()).product()
    }
}

impl GroundMotionTree for GsimLogicTree {
    fn tectonic_region_types(&self) -> BTreeSet<String> {
        self.branch_sets.iter().map(|bs| bs.trt.clone()).collect()
    }

    fn values(&self) -> BTreeMap<String, Vec<String>> {
        self.branch_sets
            .iter()
            .map(|bs| {
                let gsims = bs.branches.iter().map(|b| b.gsim.clone()).collect();
                (bs.trt.clone(), gsims)
            })
            .collect()
    }

    fn reduce(&mut self, trts: &BTreeSet<String>) {
        self.branch_sets.retain(|bs| trts.contains(&bs.trt));
    }

    fn sample<R: Rng + ?Sized>(
        &self,
        num_samples: usize,
        rng: &mut R,
    ) -> Result<Vec<GsimRealization>, LogicTreeError> {
        if self.branch_sets.is_empty() {
            return Ok(Vec::new());
        }
        let distributions = self
            .branch_sets
            .iter()
            .map(|bs| {
                WeightedIndex::new(bs.branches.iter().map(|b| b.weight))
                    .map_err(|_| LogicTreeError::Sampling(bs.trt.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let weight = 1.0 / num_samples as f64;
        let realizations = (0..num_samples)
            .map(|ordinal| {
                let mut value = BTreeMap::new();
                let mut lt_path = Vec::with_capacity(self.branch_sets.len());
                for (bs, dist) in self.branch_sets.iter().zip(&distributions) {
                    let branch = &bs.branches[dist.sample(rng)];
                    value.insert(bs.trt.clone(), branch.gsim.clone());
                    lt_path.push(branch.branch_id.clone());
                }
                GsimRealization {
                    value,
                    weight,
                    lt_path,
                    ordinal,
                }
            })
            .collect();
        Ok(realizations)
    }

    fn effective_realizations(&self) -> Vec<GsimRealization> {
        if self.branch_sets.is_empty() {
            return Vec::new();
        }

        // Cross product of all branch sets, first set varying slowest.
        let mut paths: Vec<(BTreeMap<String, String>, f64, Vec<String>)> =
            vec![(BTreeMap::new(), 1.0, Vec::new())];
        for bs in &self.branch_sets {
            let mut extended = Vec::with_capacity(paths.len() * bs.branches.len());
            for (value, weight, lt_path) in &paths {
                for branch in &bs.branches {
                    let mut value = value.clone();
                    value.insert(bs.trt.clone(), branch.gsim.clone());
                    let mut lt_path = lt_path.clone();
                    lt_path.push(branch.branch_id.clone());
                    extended.push((value, weight * branch.weight, lt_path));
                }
            }
            paths = extended;
        }

        // Paths selecting the same GSIMs are one effective realization.
        let mut realizations: Vec<GsimRealization> = Vec::new();
        let mut index_by_value: BTreeMap<BTreeMap<String, String>, usize> = BTreeMap::new();
        for (value, weight, lt_path) in paths {
            if let Some(&idx) = index_by_value.get(&value) {
                realizations[idx].weight += weight;
                continue;
            }
            index_by_value.insert(value.clone(), realizations.len());
            realizations.push(GsimRealization {
                value,
                weight,
                lt_path,
                ordinal: realizations.len(),
            });
        }
        realizations
    }
}

/// Checks that a branch set is non-empty, with non-negative weights summing to one.
pub(crate) fn check_branch_weights<'a>(
    set: &str,
    branches: impl Iterator<Item = (&'a str, f64)>,
) -> Result<(), LogicTreeError> {
    let mut sum = 0.0;
    let mut count = 0;
    for (branch_id, weight) in branches {
        if !weight.is_finite() || weight < 0.0 {
            return Err(LogicTreeError::InvalidWeight {
                branch_id: branch_id.to_string(),
                weight,
            });
        }
        sum += weight;
        count += 1;
    }
    if count == 0 {
        return Err(LogicTreeError::EmptyBranchSet(set.to_string()));
    }
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(LogicTreeError::InvalidBranchWeights {
            set: set.to_string(),
            sum,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn two_trt_tree() -> GsimLogicTree {
        GsimLogicTree::from_branch_sets(vec![
            (
                "T1".to_string(),
                vec![
                    GsimBranch::new("b11", "A", 0.5),
                    GsimBranch::new("b12", "B", 0.3),
                    GsimBranch::new("b13", "C", 0.2),
                ],
            ),
            (
                "T2".to_string(),
                vec![
                    GsimBranch::new("b21", "D", 0.6),
                    GsimBranch::new("b22", "E", 0.4),
                ],
            ),
        ])
        .unwrap()
    }

    mod validation_tests {
        use super::*;

        #[test]
        fn rejects_weights_not_summing_to_one() {
            let result = GsimLogicTree::from_branch_sets(vec![(
                "T1".to_string(),
                vec![GsimBranch::new("a", "A", 0.5), GsimBranch::new("b", "B", 0.4)],
            )]);
            assert!(matches!(
                result,
                Err(LogicTreeError::InvalidBranchWeights { .. })
            ));
        }

        #[test]
        fn rejects_empty_and_duplicate_sets() {
            let mut tree = GsimLogicTree::new();
            assert_eq!(
                tree.add_branch_set("T1", vec![]),
                Err(LogicTreeError::EmptyBranchSet("T1".to_string()))
            );
            tree.add_branch_set("T1", vec![GsimBranch::new("a", "A", 1.0)])
                .unwrap();
            assert_eq!(
                tree.add_branch_set("T1", vec![GsimBranch::new("b", "B", 1.0)]),
                Err(LogicTreeError::DuplicateBranchSet("T1".to_string()))
            );
        }

        #[test]
        fn rejects_duplicate_branch_ids_across_sets() {
            let mut tree = GsimLogicTree::new();
            tree.add_branch_set("T1", vec![GsimBranch::new("a", "A", 1.0)])
                .unwrap();
            assert_eq!(
                tree.add_branch_set("T2", vec![GsimBranch::new("a", "B", 1.0)]),
                Err(LogicTreeError::DuplicateBranchId("a".to_string()))
            );
        }

        #[test]
        fn rejects_negative_weights() {
            let result = GsimLogicTree::from_branch_sets(vec![(
                "T1".to_string(),
                vec![GsimBranch::new("a", "A", 1.5), GsimBranch::new("b", "B", -0.5)],
            )]);
            assert!(matches!(result, Err(LogicTreeError::InvalidWeight { .. })));
        }
    }

    mod enumeration_tests {
        use super::*;

        #[test]
        fn effective_realizations_are_the_cross_product() {
            let rlzs = two_trt_tree().effective_realizations();

            let uids: Vec<String> = rlzs.iter().map(GsimRealization::uid).collect();
            assert_eq!(
                uids,
                vec![
                    "b11_b21", "b11_b22", "b12_b21", "b12_b22", "b13_b21", "b13_b22"
                ]
            );
            assert_eq!(rlzs[3].value["T1"], "B");
            assert_eq!(rlzs[3].value["T2"], "E");
            assert!((rlzs[0].weight - 0.3).abs() < 1e-9);
            let total: f64 = rlzs.iter().map(|r| r.weight).sum();
            assert!((total - 1.0).abs() < 1e-9);
            assert!(rlzs.iter().enumerate().all(|(i, r)| r.ordinal == i));
        }

        #[test]
        fn identical_gsim_choices_are_merged() {
            let tree = GsimLogicTree::from_branch_sets(vec![(
                "T1".to_string(),
                vec![GsimBranch::new("a", "A", 0.25), GsimBranch::new("b", "A", 0.75)],
            )])
            .unwrap();

            let rlzs = tree.effective_realizations();

            assert_eq!(rlzs.len(), 1);
            assert_eq!(rlzs[0].lt_path, vec!["a".to_string()]);
            assert!((rlzs[0].weight - 1.0).abs() < 1e-9);
        }

        #[test]
        fn empty_tree_has_no_realizations() {
            assert!(GsimLogicTree::new().effective_realizations().is_empty());
            assert_eq!(GsimLogicTree::new().num_paths(), 0);
            assert_eq!(two_trt_tree().num_paths(), 6);
        }
    }

    mod reduce_tests {
        use super::*;

        #[test]
        fn reduce_drops_irrelevant_branch_sets() {
            let mut tree = two_trt_tree();
            tree.reduce(&BTreeSet::from(["T2".to_string()]));

            assert_eq!(
                tree.tectonic_region_types(),
                BTreeSet::from(["T2".to_string()])
            );
            assert_eq!(tree.effective_realizations().len(), 2);
        }

        #[test]
        fn values_lists_gsims_per_trt() {
            let values = two_trt_tree().values();
            assert_eq!(values["T1"], vec!["A", "B", "C"]);
            assert_eq!(values["T2"], vec!["D", "E"]);
        }
    }

    mod sampling_tests {
        use super::*;

        #[test]
        fn sample_draws_requested_number_with_uniform_weights() {
            let mut rng = StdRng::seed_from_u64(42);
            let rlzs = two_trt_tree().sample(5, &mut rng).unwrap();

            assert_eq!(rlzs.len(), 5);
            assert!(rlzs.iter().all(|r| (r.weight - 0.2).abs() < 1e-12));
            assert!(rlzs.iter().all(|r| r.value.len() == 2 && r.lt_path.len() == 2));
        }

        #[test]
        fn sample_is_reproducible_for_a_given_seed() {
            let tree = two_trt_tree();
            let first = tree.sample(10, &mut StdRng::seed_from_u64(7)).unwrap();
            let second = tree.sample(10, &mut StdRng::seed_from_u64(7)).unwrap();
            assert_eq!(first, second);
        }

        #[test]
        fn sampling_an_empty_tree_yields_nothing() {
            let mut rng = StdRng::seed_from_u64(1);
            assert!(GsimLogicTree::new().sample(3, &mut rng).unwrap().is_empty());
        }
    }
}
