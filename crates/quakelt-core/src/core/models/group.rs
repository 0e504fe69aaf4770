use super::ids::TrtGroupId;
use super::source::Source;
use crate::core::sources::split::SourceSplitter;
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Discount applied to the rupture count of point sources when computing their weight.
///
/// Point sources are much cheaper to compute per rupture than extended sources.
pub const POINT_SOURCE_WEIGHT: f64 = 1.0 / 40.0;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum GroupError {
    #[error(
        "Source '{source_id}' has tectonic region type '{found}', but the group is '{expected}'"
    )]
    SourceTypeMismatch {
        source_id: String,
        expected: String,
        found: String,
    },
}

/// A group of sources sharing one tectonic region type.
///
/// The group keeps running statistics over its sources (magnitude range and rupture count)
/// which the engine uses to decide which tectonic region types are active in a source model.
#[derive(Debug, Clone, PartialEq)]
pub struct TectonicRegionGroup {
    /// Identifier assigned when the group is finalized.
    pub id: TrtGroupId,
    /// The tectonic region type shared by all sources.
    pub trt: String,
    sources: Vec<Source>,
    /// Total number of ruptures, as accumulated by [`Self::update_num_ruptures`].
    pub num_ruptures: u64,
    pub min_mag: Option<f64>,
    pub max_mag: Option<f64>,
    /// GSIMs associated to the tectonic region type, attached while building the association.
    pub gsims: Vec<String>,
}

impl TectonicRegionGroup {
    pub fn new(trt: &str) -> Self {
        Self {
            id: TrtGroupId::default(),
            trt: trt.to_string(),
            sources: Vec::new(),
            num_ruptures: 0,
            min_mag: None,
            max_mag: None,
            gsims: Vec::new(),
        }
    }

    /// Builds a group from a list of sources, checking each of them.
    pub fn with_sources(
        trt: &str,
        sources: impl IntoIterator<Item = Source>,
    ) -> Result<Self, GroupError> {
        let mut group = Self::new(trt);
        for src in sources {
            group.add(src)?;
        }
        Ok(group)
    }

    /// Appends a source and updates the magnitude range.
    ///
    /// # Errors
    ///
    /// Returns `GroupError::SourceTypeMismatch` if the source belongs to another tectonic
    /// region type; the group is left untouched.
    pub fn add(&mut self, src: Source) -> Result<(), GroupError> {
        if src.tectonic_region_type != self.trt {
            return Err(GroupError::SourceTypeMismatch {
                source_id: src.source_id,
                expected: self.trt.clone(),
                found: src.tectonic_region_type,
            });
        }
        let (min_mag, max_mag) = src.min_max_mag();
        if self.min_mag.is_none_or(|prev| min_mag < prev) {
            self.min_mag = Some(min_mag);
        }
        if self.max_mag.is_none_or(|prev| max_mag > prev) {
            self.max_mag = Some(max_mag);
        }
        self.sources.push(src);
        Ok(())
    }

    /// Adds the rupture count of `src` to the group total.
    ///
    /// # Return
    ///
    /// The load-balancing weight of the source: its rupture count, discounted by
    /// [`POINT_SOURCE_WEIGHT`] for point sources.
    pub fn update_num_ruptures(&mut self, src: &Source) -> f64 {
        let num_ruptures = src.count_ruptures();
        self.num_ruptures += num_ruptures;
        if src.kind.is_point() {
            num_ruptures as f64 * POINT_SOURCE_WEIGHT
        } else {
            num_ruptures as f64
        }
    }

    /// Replaces every source with the pieces produced by `splitter` and recounts ruptures.
    ///
    /// The rupture total is recomputed from scratch, each piece receives its weight, and the
    /// final list is sorted by source identifier so that iteration is deterministic.
    pub fn split_and_recount<S>(&mut self, area_source_discretization: f64, splitter: &S)
    where
        S: SourceSplitter + ?Sized,
    {
        let originals = std::mem::take(&mut self.sources);
        self.num_ruptures = 0;
        let mut sources = Vec::with_capacity(originals.len());
        for src in &originals {
            for mut piece in splitter.split(src, area_source_discretization) {
                piece.weight = self.update_num_ruptures(&piece);
                sources.push(piece);
            }
        }
        sources.sort_by(|a, b| a.source_id.cmp(&b.source_id));
        self.sources = sources;
    }

    /// Recomputes the rupture total and source weights without splitting.
    pub fn recount_ruptures(&mut self) {
        let mut sources = std::mem::take(&mut self.sources);
        self.num_ruptures = 0;
        for src in &mut sources {
            src.weight = self.update_num_ruptures(src);
        }
        self.sources = sources;
    }

    /// Finalizes the group identifier and stamps it on every contained source.
    pub fn set_id(&mut self, id: TrtGroupId) {
        self.id = id;
        for src in &mut self.sources {
            src.set_trt_group_id(id);
        }
    }

    /// Key of the total order on groups: fewer sources first, then by tectonic region type.
    pub fn sort_key(&self) -> (usize, &str) {
        (self.sources.len(), self.trt.as_str())
    }

    /// Compares two groups by [`Self::sort_key`].
    pub fn cmp_by_size(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn get(&self, index: usize) -> Option<&Source> {
        self.sources.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Source> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl<'a> IntoIterator for &'a TectonicRegionGroup {
    type Item = &'a Source;
    type IntoIter = std::slice::Iter<'a, Source>;

    fn into_iter(self) -> Self::IntoIter {
        self.sources.iter()
    }
}

impl fmt::Display for TectonicRegionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<TectonicRegionGroup #{} {}, {} source(s), {} rupture(s)>",
            self.id,
            self.trt,
            self.sources.len(),
            self.num_ruptures
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::source::SourceKind;
    use crate::core::sources::split::MeshSplitter;

    const ASC: &str = "Active Shallow Crust";

    fn fault(id: &str, min_mag: f64, max_mag: f64, ruptures: u64) -> Source {
        Source::new(id, ASC, SourceKind::SimpleFault)
            .with_magnitude_range(min_mag, max_mag)
            .with_num_ruptures(ruptures)
    }

    mod add_tests {
        use super::*;

        #[test]
        fn add_tracks_running_magnitude_extrema() {
            let mut group = TectonicRegionGroup::new(ASC);
            group.add(fault("A", 5.0, 6.5, 10)).unwrap();
            group.add(fault("B", 4.5, 6.0, 10)).unwrap();
            group.add(fault("C", 5.5, 7.2, 10)).unwrap();

            assert_eq!(group.len(), 3);
            assert_eq!(group.min_mag, Some(4.5));
            assert_eq!(group.max_mag, Some(7.2));
        }

        #[test]
        fn add_does_not_touch_rupture_total() {
            let mut group = TectonicRegionGroup::new(ASC);
            group.add(fault("A", 5.0, 6.5, 10)).unwrap();
            assert_eq!(group.num_ruptures, 0);
        }

        #[test]
        fn add_rejects_mismatched_tectonic_region_type() {
            let mut group = TectonicRegionGroup::new(ASC);
            let src = Source::new("X", "Stable Continental", SourceKind::Point);

            let result = group.add(src);

            assert_eq!(
                result,
                Err(GroupError::SourceTypeMismatch {
                    source_id: "X".to_string(),
                    expected: ASC.to_string(),
                    found: "Stable Continental".to_string(),
                })
            );
            assert!(group.is_empty());
            assert_eq!(group.min_mag, None);
        }

        #[test]
        fn with_sources_fails_fast_on_first_mismatch() {
            let sources = vec![
                fault("A", 5.0, 6.0, 1),
                Source::new("B", "Volcanic", SourceKind::Point),
            ];
            assert!(TectonicRegionGroup::with_sources(ASC, sources).is_err());
        }
    }

    mod rupture_count_tests {
        use super::*;

        #[test]
        fn point_sources_are_discounted() {
            let mut group = TectonicRegionGroup::new(ASC);
            let point = Source::new("P", ASC, SourceKind::Point).with_num_ruptures(80);
            let weight = group.update_num_ruptures(&point);

            assert!((weight - 2.0).abs() < 1e-9);
            assert_eq!(group.num_ruptures, 80);
        }

        #[test]
        fn extended_sources_weigh_their_rupture_count() {
            let mut group = TectonicRegionGroup::new(ASC);
            let weight = group.update_num_ruptures(&fault("F", 5.0, 6.0, 25));
            assert_eq!(weight, 25.0);
            assert_eq!(group.num_ruptures, 25);
        }

        #[test]
        fn recount_is_idempotent() {
            let mut group =
                TectonicRegionGroup::with_sources(ASC, vec![fault("A", 5.0, 6.0, 7)]).unwrap();
            group.recount_ruptures();
            group.recount_ruptures();
            assert_eq!(group.num_ruptures, 7);
            assert_eq!(group.sources()[0].weight, 7.0);
        }
    }

    mod split_tests {
        use super::*;

        #[test]
        fn split_replaces_area_sources_and_sorts_by_id() {
            let area = Source::new("Z", ASC, SourceKind::Area { area_km2: 300.0 })
                .with_magnitude_range(5.0, 6.0)
                .with_num_ruptures(30);
            let mut group =
                TectonicRegionGroup::with_sources(ASC, vec![area, fault("A", 5.0, 7.0, 12)])
                    .unwrap();

            group.split_and_recount(10.0, &MeshSplitter);

            let ids: Vec<&str> = group.iter().map(|s| s.source_id.as_str()).collect();
            assert_eq!(ids, vec!["A", "Z-0", "Z-1", "Z-2"]);
            assert_eq!(group.num_ruptures, 42);
            assert_eq!(group.sources()[0].weight, 12.0);
            assert!((group.sources()[1].weight - 10.0 * POINT_SOURCE_WEIGHT).abs() < 1e-9);
        }

        #[test]
        fn split_keeps_stamped_group_id() {
            let area = Source::new("Z", ASC, SourceKind::Area { area_km2: 200.0 })
                .with_num_ruptures(4);
            let mut group = TectonicRegionGroup::with_sources(ASC, vec![area]).unwrap();
            group.set_id(TrtGroupId(3));
            group.split_and_recount(10.0, &MeshSplitter);

            assert!(
                group
                    .iter()
                    .all(|s| s.trt_group_id() == Some(TrtGroupId(3)))
            );
        }
    }

    mod ordering_tests {
        use super::*;

        #[test]
        fn groups_order_by_source_count_then_trt() {
            let big = TectonicRegionGroup::with_sources(
                "Active Shallow Crust",
                vec![fault("A", 5.0, 6.0, 1), fault("B", 5.0, 6.0, 1)],
            )
            .unwrap();
            let small_b = TectonicRegionGroup::with_sources(
                "Volcanic",
                vec![Source::new("V", "Volcanic", SourceKind::Point)],
            )
            .unwrap();
            let small_a = TectonicRegionGroup::with_sources(
                "Stable Continental",
                vec![Source::new("S", "Stable Continental", SourceKind::Point)],
            )
            .unwrap();

            let mut groups = vec![big, small_b, small_a];
            groups.sort_by(TectonicRegionGroup::cmp_by_size);

            let trts: Vec<&str> = groups.iter().map(|g| g.trt.as_str()).collect();
            assert_eq!(
                trts,
                vec!["Stable Continental", "Volcanic", "Active Shallow Crust"]
            );
        }
    }

    #[test]
    fn set_id_stamps_every_source() {
        let mut group = TectonicRegionGroup::with_sources(
            ASC,
            vec![fault("A", 5.0, 6.0, 1), fault("B", 5.0, 6.0, 1)],
        )
        .unwrap();
        group.set_id(TrtGroupId(9));

        assert_eq!(group.id, TrtGroupId(9));
        assert!(group.iter().all(|s| s.trt_group_id() == Some(TrtGroupId(9))));
    }

    #[test]
    fn display_summarizes_group() {
        let mut group =
            TectonicRegionGroup::with_sources(ASC, vec![fault("A", 5.0, 6.0, 5)]).unwrap();
        group.recount_ruptures();
        assert_eq!(
            group.to_string(),
            "<TectonicRegionGroup #0 Active Shallow Crust, 1 source(s), 5 rupture(s)>"
        );
    }
}
