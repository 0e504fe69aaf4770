use super::accum::{AccumDict, Aggregate};
use super::composition::CompositionIndex;
use super::diagnostics::Diagnostic;
use super::error::AssociationError;
use super::realization::Realization;
use crate::core::logictree::gsim::{GroundMotionTree, GsimRealization};
use crate::core::models::ids::{AssocKey, TrtGroupId};
use crate::core::models::source_model::SourceModel;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use tracing::debug;

/// The association between `(group, GSIM)` pairings and the realizations using them.
///
/// For instance, a source model with two tectonic region types, T1 with GSIMs A, B, C
/// (group 0) and T2 with GSIMs D, E (group 1), has six realizations and the associations
///
/// ```text
/// 0,A: [0, 1]    0,B: [2, 3]    0,C: [4, 5]
/// 1,D: [0, 2, 4] 1,E: [1, 3, 5]
/// ```
///
/// Realizations are stored in ordinal order and grouped by the source model they come from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RealizationAssociation {
    composition: CompositionIndex,
    rlzs_assoc: BTreeMap<AssocKey, Vec<usize>>,
    realizations: Vec<Realization>,
    rlzs_by_smodel: Vec<(usize, Range<usize>)>,
    diagnostics: Vec<Diagnostic>,
}

impl RealizationAssociation {
    pub fn new(composition: CompositionIndex) -> Self {
        Self {
            composition,
            ..Self::default()
        }
    }

    /// Registers the realizations of one source model.
    ///
    /// The `i`-th GSIM realization becomes the realization with ordinal `start + i` and weight
    /// `sm.weight * gsim_rlz.weight`. Every group of the model is paired with the GSIM the
    /// realization assigns to its tectonic region type; groups of an oversampled model also
    /// contribute their `i`-th column to the realization. Groups whose tectonic region type
    /// has no GSIM assignment (inactive groups dropped from the reduced tree) are skipped.
    ///
    /// `start` is expected to be the ordinal returned by the previous call, or `0`.
    ///
    /// # Return
    ///
    /// The next free ordinal.
    ///
    /// # Errors
    ///
    /// Returns `AssociationError::UnknownAssociationKey` if an oversampled group has no
    /// column in the composition index; the association is left untouched.
    pub fn add_realizations<L: GroundMotionTree>(
        &mut self,
        start: usize,
        sm: &mut SourceModel<L>,
        gsim_rlzs: Vec<GsimRealization>,
    ) -> Result<usize, AssociationError> {
        let gsims_by_trt = sm.gsim_lt.values();
        let mut rlzs = Vec::with_capacity(gsim_rlzs.len());
        let mut pairings: Vec<(AssocKey, usize)> = Vec::new();

        for (i, gsim_rlz) in gsim_rlzs.into_iter().enumerate() {
            let ordinal = start + i;
            let weight = sm.weight * gsim_rlz.weight;
            let mut rlz = Realization::new(ordinal, sm.path.clone(), gsim_rlz, weight);
            for group in &sm.groups {
                let Some(gsim) = rlz.gsim_for(&group.trt) else {
                    debug!(group = %group, "No GSIM assigned, skipping group.");
                    continue;
                };
                pairings.push(((group.id, gsim.to_string()), ordinal));
                if sm.samples > 1 {
                    let col = self.composition.col_idx(group.id, i)?;
                    rlz.col_ids.insert(col);
                }
            }
            rlzs.push(rlz);
        }

        for group in &mut sm.groups {
            if let Some(gsims) = gsims_by_trt.get(&group.trt) {
                group.gsims = gsims.clone();
            }
        }
        for (key, ordinal) in pairings {
            self.rlzs_assoc.entry(key).or_default().push(ordinal);
        }
        let first = self.realizations.len();
        let next = start + rlzs.len();
        self.realizations.extend(rlzs);
        self.rlzs_by_smodel
            .push((sm.ordinal, first..self.realizations.len()));
        Ok(next)
    }

    /// Folds per-pairing results onto realizations with the probability union.
    ///
    /// See [`Self::combine_with`].
    pub fn combine<V: Aggregate>(&self, results: &BTreeMap<AssocKey, V>) -> AccumDict<usize, V> {
        self.combine_with(results, V::agg_prob)
    }

    /// Folds per-pairing results onto realizations with `agg`.
    ///
    /// Each realization starts from `V::default()` and absorbs, with `agg`, the value of every
    /// pairing it uses. Pairings are visited in key order, so the result is reproducible even
    /// when `agg` is only commutative up to rounding. Keys unknown to the association
    /// contribute nothing.
    pub fn combine_with<V, F>(&self, results: &BTreeMap<AssocKey, V>, agg: F) -> AccumDict<usize, V>
    where
        V: Clone + Default,
        F: Fn(&V, &V) -> V,
    {
        let mut acc = AccumDict::new();
        for (key, value) in results {
            let Some(ordinals) = self.rlzs_assoc.get(key) else {
                continue;
            };
            for &ordinal in ordinals {
                acc.accumulate(ordinal, value, &agg);
            }
        }
        acc
    }

    /// Combines every map of `results` and collects the outcomes per realization.
    ///
    /// Every realization is present in the output; its list holds one entry per input map
    /// that touched it, in input order.
    pub fn collect_by_realization<V: Aggregate>(
        &self,
        results: &[BTreeMap<AssocKey, V>],
    ) -> BTreeMap<usize, Vec<V>> {
        let mut by_rlz: BTreeMap<usize, Vec<V>> = self
            .realizations
            .iter()
            .map(|rlz| (rlz.ordinal, Vec::new()))
            .collect();
        for dic in results {
            for (ordinal, value) in self.combine(dic) {
                by_rlz.entry(ordinal).or_default().push(value);
            }
        }
        by_rlz
    }

    pub fn keys(&self) -> impl Iterator<Item = &AssocKey> {
        self.rlzs_assoc.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AssocKey, &[usize])> {
        self.rlzs_assoc
            .iter()
            .map(|(key, ordinals)| (key, ordinals.as_slice()))
    }

    pub fn get(&self, key: &AssocKey) -> Option<&[usize]> {
        self.rlzs_assoc.get(key).map(Vec::as_slice)
    }

    /// Like [`Self::get`], failing on a missing key.
    pub fn rlzs_for(&self, key: &AssocKey) -> Result<&[usize], AssociationError> {
        self.get(key)
            .ok_or_else(|| AssociationError::UnknownAssociationKey(format!("{},{}", key.0, key.1)))
    }

    /// Number of `(group, GSIM)` pairings.
    pub fn len(&self) -> usize {
        self.rlzs_assoc.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rlzs_assoc.is_empty()
    }

    /// All realizations, in ordinal order.
    pub fn realizations(&self) -> &[Realization] {
        &self.realizations
    }

    pub(crate) fn realizations_mut(&mut self) -> &mut [Realization] {
        &mut self.realizations
    }

    pub fn realization(&self, ordinal: usize) -> Option<&Realization> {
        self.realizations
            .binary_search_by_key(&ordinal, |rlz| rlz.ordinal)
            .ok()
            .map(|idx| &self.realizations[idx])
    }

    /// Realizations grouped by source-model ordinal, in insertion order.
    pub fn rlzs_by_source_model(&self) -> impl Iterator<Item = (usize, &[Realization])> {
        self.rlzs_by_smodel
            .iter()
            .map(|(ordinal, range)| (*ordinal, &self.realizations[range.clone()]))
    }

    /// The full tectonic region type -> GSIM assignment of a realization.
    pub fn gsim_by_trt(&self, ordinal: usize) -> Option<&BTreeMap<String, String>> {
        self.realization(ordinal).map(|rlz| &rlz.gsim_rlz.value)
    }

    /// Group -> sorted GSIMs paired with it.
    pub fn gsims_by_trt_id(&self) -> BTreeMap<TrtGroupId, Vec<String>> {
        let mut gsims: BTreeMap<TrtGroupId, Vec<String>> = BTreeMap::new();
        for (group, gsim) in self.rlzs_assoc.keys() {
            gsims.entry(*group).or_default().push(gsim.clone());
        }
        gsims
    }

    pub fn composition(&self) -> &CompositionIndex {
        &self.composition
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

impl fmt::Display for RealizationAssociation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self
            .rlzs_assoc
            .iter()
            .map(|((group, gsim), ordinals)| {
                let rlzs: Vec<String> = ordinals
                    .iter()
                    .map(|&ordinal| match self.realization(ordinal) {
                        Some(rlz) => rlz.to_string(),
                        None => ordinal.to_string(),
                    })
                    .collect();
                format!("{},{}: [{}]", group, gsim, rlzs.join(", "))
            })
            .collect();
        write!(f, "{{{}}}", lines.join("\n"))
    }
}
