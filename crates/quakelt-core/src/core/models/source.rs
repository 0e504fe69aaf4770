use super::ids::TrtGroupId;
use std::fmt;

/// The typology of a seismic source.
///
/// Only the information the bookkeeping needs is kept: whether the source is point-like
/// (cheaper to compute per rupture) and, for area sources, the extent used by splitting.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceKind {
    Point,
    Area { area_km2: f64 },
    SimpleFault,
    ComplexFault,
    Characteristic,
    NonParametric,
}

impl SourceKind {
    /// Returns the lowercase name used in source-model files.
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Point => "point",
            SourceKind::Area { .. } => "area",
            SourceKind::SimpleFault => "simple-fault",
            SourceKind::ComplexFault => "complex-fault",
            SourceKind::Characteristic => "characteristic",
            SourceKind::NonParametric => "non-parametric",
        }
    }

    pub fn is_point(&self) -> bool {
        matches!(self, SourceKind::Point)
    }
}

/// A seismic source as delivered by the source converter.
///
/// Sources are owned by exactly one [`TectonicRegionGroup`](super::group::TectonicRegionGroup).
/// The group identifier is stamped on the source when its group is finalized and never
/// changes afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    /// Unique identifier of the source within its source model.
    pub source_id: String,
    /// Human readable name; defaults to the identifier.
    pub name: String,
    /// The tectonic region type the source belongs to.
    pub tectonic_region_type: String,
    pub kind: SourceKind,
    pub min_mag: f64,
    pub max_mag: f64,
    /// Number of ruptures the source generates.
    pub num_ruptures: u64,
    /// Load-balancing weight, recomputed when the owning group is recounted.
    pub weight: f64,
    trt_group_id: Option<TrtGroupId>,
}

impl Source {
    pub fn new(source_id: &str, tectonic_region_type: &str, kind: SourceKind) -> Self {
        Self {
            source_id: source_id.to_string(),
            name: source_id.to_string(),
            tectonic_region_type: tectonic_region_type.to_string(),
            kind,
            min_mag: 0.0,
            max_mag: 0.0,
            num_ruptures: 0,
            weight: 0.0,
            trt_group_id: None,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_magnitude_range(mut self, min_mag: f64, max_mag: f64) -> Self {
        self.min_mag = min_mag;
        self.max_mag = max_mag;
        self
    }

    pub fn with_num_ruptures(mut self, num_ruptures: u64) -> Self {
        self.num_ruptures = num_ruptures;
        self.weight = num_ruptures as f64;
        self
    }

    pub fn min_max_mag(&self) -> (f64, f64) {
        (self.min_mag, self.max_mag)
    }

    pub fn count_ruptures(&self) -> u64 {
        self.num_ruptures
    }

    /// The identifier of the owning group, once that group has been finalized.
    pub fn trt_group_id(&self) -> Option<TrtGroupId> {
        self.trt_group_id
    }

    pub(crate) fn set_trt_group_id(&mut self, id: TrtGroupId) {
        self.trt_group_id = Some(id);
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{} {} [{}], {} rupture(s)>",
            self.kind.label(),
            self.source_id,
            self.tectonic_region_type,
            self.num_ruptures
        )
    }
}
