use super::error::AssociationError;
use crate::core::models::ids::TrtGroupId;
use crate::core::models::source_model::SourceModel;
use std::collections::BTreeMap;

/// Dense column indices for `(group, sample)` pairs of a composite source model.
///
/// Every group of every source model receives one column per sample of its model, allocated
/// in model order, then group order, then sample order. The index is immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositionIndex {
    col_dict: BTreeMap<(TrtGroupId, usize), usize>,
    num_samples: BTreeMap<TrtGroupId, usize>,
}

impl CompositionIndex {
    pub fn new<L>(source_models: &[SourceModel<L>]) -> Self {
        let mut col_dict = BTreeMap::new();
        let mut num_samples = BTreeMap::new();
        let mut col_idx = 0;
        for sm in source_models {
            for group in &sm.groups {
                if sm.samples > 1 {
                    num_samples.insert(group.id, sm.samples);
                }
                for sample in 0..sm.samples {
                    col_dict.insert((group.id, sample), col_idx);
                    col_idx += 1;
                }
            }
        }
        Self {
            col_dict,
            num_samples,
        }
    }

    /// The column of the `sample`-th sample of a group.
    pub fn col_idx(&self, group: TrtGroupId, sample: usize) -> Result<usize, AssociationError> {
        self.col_dict
            .get(&(group, sample))
            .copied()
            .ok_or_else(|| AssociationError::UnknownAssociationKey(format!("{group},{sample}")))
    }

    /// Reverse lookup of [`Self::col_idx`]: the `(group, sample)` pair owning a column.
    pub fn locate(&self, col: usize) -> Result<(TrtGroupId, usize), AssociationError> {
        self.col_dict
            .iter()
            .find(|(_, cid)| **cid == col)
            .map(|(key, _)| *key)
            .ok_or(AssociationError::UnknownColumn(col))
    }

    /// The group owning a column.
    pub fn trt_id(&self, col: usize) -> Result<TrtGroupId, AssociationError> {
        self.locate(col).map(|(group, _)| group)
    }

    /// How many times the sources of a group are to be sampled.
    pub fn num_samples(&self, group: TrtGroupId) -> usize {
        self.num_samples.get(&group).copied().unwrap_or(1)
    }

    /// The largest sample count among oversampled groups, or 1 if none is oversampled.
    pub fn max_samples(&self) -> usize {
        self.num_samples.values().copied().max().unwrap_or(1)
    }

    /// `(group, sample, column)` triples sorted by group and sample.
    pub fn triples(&self) -> impl Iterator<Item = (TrtGroupId, usize, usize)> + '_ {
        self.col_dict
            .iter()
            .map(|(&(group, sample), &col)| (group, sample, col))
    }

    /// Total number of columns.
    pub fn num_collections(&self) -> usize {
        self.col_dict.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::group::TectonicRegionGroup;
    use crate::core::models::source::{Source, SourceKind};

    fn group(id: u32, trt: &str) -> TectonicRegionGroup {
        let mut group =
            TectonicRegionGroup::with_sources(trt, vec![Source::new("S", trt, SourceKind::Point)])
                .unwrap();
        group.set_id(TrtGroupId(id));
        group
    }

    fn model(ordinal: usize, groups: Vec<TectonicRegionGroup>, samples: usize) -> SourceModel<()> {
        SourceModel::new(
            "sm.toml",
            1.0,
            vec![format!("b{ordinal}")],
            groups,
            (),
            ordinal,
            samples,
        )
    }

    fn oversampled() -> CompositionIndex {
        CompositionIndex::new(&[
            model(0, vec![group(0, "T1"), group(1, "T2")], 1),
            model(1, vec![group(2, "T1")], 3),
            model(2, vec![group(3, "T2")], 2),
        ])
    }

    #[test]
    fn columns_are_allocated_in_model_group_sample_order() {
        let index = oversampled();

        assert_eq!(index.col_idx(TrtGroupId(0), 0), Ok(0));
        assert_eq!(index.col_idx(TrtGroupId(1), 0), Ok(1));
        assert_eq!(index.col_idx(TrtGroupId(2), 0), Ok(2));
        assert_eq!(index.col_idx(TrtGroupId(2), 2), Ok(4));
        assert_eq!(index.col_idx(TrtGroupId(3), 1), Ok(6));
        assert_eq!(index.num_collections(), 7);
    }

    #[test]
    fn sample_counts_are_recorded_only_when_oversampling() {
        let index = oversampled();

        assert_eq!(index.num_samples(TrtGroupId(0)), 1);
        assert_eq!(index.num_samples(TrtGroupId(2)), 3);
        assert_eq!(index.num_samples(TrtGroupId(3)), 2);
        assert_eq!(index.num_samples(TrtGroupId(42)), 1);
        assert_eq!(index.max_samples(), 3);
    }

    #[test]
    fn max_samples_defaults_to_one() {
        let index = CompositionIndex::new(&[model(0, vec![group(0, "T1")], 1)]);
        assert_eq!(index.max_samples(), 1);
        assert_eq!(CompositionIndex::default().max_samples(), 1);
    }

    #[test]
    fn unknown_keys_and_columns_are_errors() {
        let index = oversampled();

        assert_eq!(
            index.col_idx(TrtGroupId(0), 1),
            Err(AssociationError::UnknownAssociationKey("0,1".to_string()))
        );
        assert_eq!(index.trt_id(7), Err(AssociationError::UnknownColumn(7)));
    }

    #[test]
    fn every_assigned_column_round_trips() {
        let index = oversampled();

        for (group, sample, col) in index.triples() {
            assert_eq!(index.col_idx(group, sample), Ok(col));
            assert_eq!(index.trt_id(col), Ok(group));
            assert_eq!(index.locate(col), Ok((group, sample)));
        }
    }

    #[test]
    fn triples_are_sorted_by_group_then_sample() {
        let triples: Vec<_> = oversampled().triples().collect();
        assert_eq!(triples.len(), 7);
        assert!(triples.windows(2).all(|w| (w[0].0, w[0].1) < (w[1].0, w[1].1)));
        assert_eq!(triples[3], (TrtGroupId(2), 1, 3));
    }
}
