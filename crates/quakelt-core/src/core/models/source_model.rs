use super::group::TectonicRegionGroup;
use super::source::Source;

/// One branch of the source-model logic tree, together with its ground-motion logic tree.
///
/// `L` is the ground-motion logic tree collaborator (see
/// [`GroundMotionTree`](crate::core::logictree::gsim::GroundMotionTree)). Every source model
/// owns its own copy because the engine reduces it in place to the tectonic region types
/// actually present in the model.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceModel<L> {
    /// Name of the model, usually the file it was read from.
    pub name: String,
    /// Weight of the source-model branch.
    pub weight: f64,
    /// Branch identifiers leading to this model in the source-model logic tree.
    pub path: Vec<String>,
    /// Tectonic region groups, in the order produced by the parser.
    pub groups: Vec<TectonicRegionGroup>,
    pub gsim_lt: L,
    /// Position of the model among all source models.
    pub ordinal: usize,
    /// How many times the branch was sampled; values above 1 signal oversampling.
    pub samples: usize,
}

impl<L> SourceModel<L> {
    pub fn new(
        name: &str,
        weight: f64,
        path: Vec<String>,
        groups: Vec<TectonicRegionGroup>,
        gsim_lt: L,
        ordinal: usize,
        samples: usize,
    ) -> Self {
        Self {
            name: name.to_string(),
            weight,
            path,
            groups,
            gsim_lt,
            ordinal,
            samples,
        }
    }

    /// The branch path joined with underscores, e.g. `b1_b12`.
    pub fn path_label(&self) -> String {
        self.path.join("_")
    }

    /// Iterates over all sources of all groups.
    pub fn sources(&self) -> impl Iterator<Item = &Source> {
        self.groups.iter().flat_map(|group| group.iter())
    }

    pub fn num_sources(&self) -> usize {
        self.groups.iter().map(TectonicRegionGroup::len).sum()
    }

    pub fn is_oversampled(&self) -> bool {
        self.samples > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::source::SourceKind;

    fn model(samples: usize) -> SourceModel<()> {
        let asc = TectonicRegionGroup::with_sources(
            "Active Shallow Crust",
            vec![
                Source::new("A", "Active Shallow Crust", SourceKind::Point),
                Source::new("B", "Active Shallow Crust", SourceKind::Point),
            ],
        )
        .unwrap();
        let scr = TectonicRegionGroup::with_sources(
            "Stable Continental",
            vec![Source::new("C", "Stable Continental", SourceKind::SimpleFault)],
        )
        .unwrap();
        SourceModel::new(
            "sm1.toml",
            0.7,
            vec!["b1".to_string(), "b12".to_string()],
            vec![scr, asc],
            (),
            0,
            samples,
        )
    }

    #[test]
    fn path_label_joins_branch_ids() {
        assert_eq!(model(1).path_label(), "b1_b12");
    }

    #[test]
    fn sources_iterates_over_all_groups_in_order() {
        let sm = model(1);
        let ids: Vec<&str> = sm.sources().map(|s| s.source_id.as_str()).collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
        assert_eq!(sm.num_sources(), 3);
    }

    #[test]
    fn oversampling_requires_more_than_one_sample() {
        assert!(!model(1).is_oversampled());
        assert!(model(2).is_oversampled());
    }
}
