use super::assoc::RealizationAssociation;
use super::composition::CompositionIndex;
use super::diagnostics::Diagnostic;
use super::error::AssociationError;
use crate::core::logictree::gsim::GroundMotionTree;
use crate::core::models::group::TectonicRegionGroup;
use crate::core::models::ids::TrtGroupId;
use crate::core::models::source::Source;
use crate::core::models::source_model::SourceModel;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info, instrument, warn};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// All the source models of a calculation, with the index of their collections.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeSourceModel<L> {
    /// Master seed of the calculation.
    pub seed: u64,
    /// Number of logic-tree samples; `0` means full enumeration.
    pub num_samples: usize,
    source_models: Vec<SourceModel<L>>,
    composition: CompositionIndex,
}

impl<L: GroundMotionTree> CompositeSourceModel<L> {
    /// # Errors
    ///
    /// Returns `AssociationError::EmptyModel` if no group of any source model holds a source.
    pub fn new(
        seed: u64,
        num_samples: usize,
        source_models: Vec<SourceModel<L>>,
    ) -> Result<Self, AssociationError> {
        if source_models.iter().all(|sm| sm.num_sources() == 0) {
            return Err(AssociationError::EmptyModel);
        }
        let composition = CompositionIndex::new(&source_models);
        Ok(Self {
            seed,
            num_samples,
            source_models,
            composition,
        })
    }

    /// Builds the realization association, weighting groups by their rupture count.
    pub fn build_association(&mut self) -> Result<RealizationAssociation, AssociationError> {
        self.build_association_with(|group| group.num_ruptures as f64)
    }

    /// Builds the realization association.
    ///
    /// For every source model, the tectonic region types of the groups with a positive
    /// `weight_fn` are the active ones and the ground-motion logic tree is reduced to them.
    /// The model then contributes either `sm.samples` sampled realizations (when
    /// [`Self::num_samples`] is positive) or the effective realizations of its tree. The
    /// sampling generator of a model is seeded with the master seed plus the number of
    /// realizations produced so far, which makes the build reproducible.
    ///
    /// Weights are normalized at the end: sampled realizations are equiprobable, enumerated
    /// ones are rescaled to sum to one.
    ///
    /// # Errors
    ///
    /// - `SampleCountMismatch` if sampling produced a total other than `num_samples`.
    /// - `AllWeightsZero` if the enumerated weights sum to zero.
    /// - `LogicTree` if a ground-motion logic tree cannot be sampled.
    #[instrument(skip_all, fields(num_models = self.source_models.len(), num_samples = self.num_samples))]
    pub fn build_association_with<F>(
        &mut self,
        weight_fn: F,
    ) -> Result<RealizationAssociation, AssociationError>
    where
        F: Fn(&TectonicRegionGroup) -> f64,
    {
        let mut assoc = RealizationAssociation::new(self.composition.clone());
        let mut idx = 0;
        for sm in &mut self.source_models {
            let trts: BTreeSet<String> = sm
                .groups
                .iter()
                .filter(|group| weight_fn(group) > 0.0)
                .map(|group| group.trt.clone())
                .collect();
            if trts != sm.gsim_lt.tectonic_region_types() {
                debug!(ordinal = sm.ordinal, ?trts, "Reducing the GSIM logic tree.");
                sm.gsim_lt.reduce(&trts);
            }

            let rlzs = if self.num_samples > 0 {
                let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(idx as u64));
                sm.gsim_lt.sample(sm.samples, &mut rng)?
            } else {
                sm.gsim_lt.effective_realizations()
            };

            if rlzs.is_empty() {
                let diagnostic = Diagnostic::NoRealizationsForSourceModel {
                    ordinal: sm.ordinal,
                    path: sm.path_label(),
                    name: sm.name.clone(),
                };
                warn!("{}", diagnostic);
                assoc.report(diagnostic);
                continue;
            }
            idx = assoc.add_realizations(idx, sm, rlzs)?;
        }

        if !assoc.realizations().is_empty() {
            if self.num_samples > 0 {
                let actual = assoc.realizations().len();
                if actual != self.num_samples {
                    return Err(AssociationError::SampleCountMismatch {
                        expected: self.num_samples,
                        actual,
                    });
                }
                let weight = 1.0 / self.num_samples as f64;
                for rlz in assoc.realizations_mut() {
                    rlz.weight = weight;
                }
            } else {
                let total_weight: f64 = assoc.realizations().iter().map(|rlz| rlz.weight).sum();
                if total_weight == 0.0 {
                    return Err(AssociationError::AllWeightsZero);
                }
                if total_weight < 1.0 - WEIGHT_SUM_TOLERANCE {
                    let diagnostic = Diagnostic::PartialWeightLoss { total_weight };
                    warn!("{}", diagnostic);
                    assoc.report(diagnostic);
                }
                for rlz in assoc.realizations_mut() {
                    rlz.weight /= total_weight;
                }
            }
        }

        info!(
            num_realizations = assoc.realizations().len(),
            num_pairings = assoc.len(),
            "Realization association built."
        );
        Ok(assoc)
    }
}

impl<L> CompositeSourceModel<L> {
    pub fn source_models(&self) -> &[SourceModel<L>] {
        &self.source_models
    }

    /// All groups of all source models, in model order.
    pub fn groups(&self) -> impl Iterator<Item = &TectonicRegionGroup> {
        self.source_models.iter().flat_map(|sm| sm.groups.iter())
    }

    /// All sources, each carrying the id of its group.
    pub fn sources(&self) -> impl Iterator<Item = &Source> {
        self.groups().flat_map(|group| group.iter())
    }

    pub fn get(&self, index: usize) -> Option<&SourceModel<L>> {
        self.source_models.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SourceModel<L>> {
        self.source_models.iter()
    }

    pub fn len(&self) -> usize {
        self.source_models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source_models.is_empty()
    }

    pub fn composition(&self) -> &CompositionIndex {
        &self.composition
    }
}

impl<'a, L> IntoIterator for &'a CompositeSourceModel<L> {
    type Item = &'a SourceModel<L>;
    type IntoIter = std::slice::Iter<'a, SourceModel<L>>;

    fn into_iter(self) -> Self::IntoIter {
        self.source_models.iter()
    }
}

impl<L> fmt::Display for CompositeSourceModel<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let models: Vec<String> = self
            .source_models
            .iter()
            .map(|sm| {
                format!(
                    "{}-{}-{},w={} [{} group(s)]",
                    sm.ordinal,
                    sm.name,
                    sm.path_label(),
                    sm.weight,
                    sm.groups.len()
                )
            })
            .collect();
        write!(f, "<CompositeSourceModel\n{}>", models.join("\n"))
    }
}

/// Gives every group a sequential id, across all source models in order.
pub fn assign_group_ids<L>(source_models: &mut [SourceModel<L>]) {
    let groups = source_models.iter_mut().flat_map(|sm| sm.groups.iter_mut());
    for (id, group) in (0u32..).zip(groups) {
        group.set_id(TrtGroupId(id));
    }
}
