use crate::core::models::source::{Source, SourceKind};
use tracing::warn;

/// Largest number of points a single area source may be split into.
pub const MAX_MESH_POINTS: u64 = 100_000;

/// Splits a source into smaller sources.
///
/// This is the seam towards the seismic-source library: the real rupture geometry lives
/// there. Implementors must return at least one piece per source and keep the tectonic
/// region type of the original.
pub trait SourceSplitter {
    /// Returns the pieces of `source` for the given area discretization (km).
    fn split(&self, source: &Source, area_source_discretization: f64) -> Vec<Source>;
}

/// Splits area sources into point sources on a regular mesh; other sources are kept whole.
///
/// An area of `A` km² discretized at `d` km yields `ceil(A / d²)` points (at least one). The
/// ruptures of the area are spread over the points, the first points taking the remainder.
/// Point identifiers are `<parent id>-<index>`. An area needing more than [`MAX_MESH_POINTS`]
/// points, or a non-finite mesh, leaves the source whole.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshSplitter;

impl SourceSplitter for MeshSplitter {
    fn split(&self, source: &Source, area_source_discretization: f64) -> Vec<Source> {
        let SourceKind::Area { area_km2 } = source.kind else {
            return vec![source.clone()];
        };
        if !(area_source_discretization > 0.0 && area_source_discretization.is_finite()) {
            return vec![source.clone()];
        }

        let cell_km2 = area_source_discretization * area_source_discretization;
        let cells = (area_km2 / cell_km2).ceil();
        if !cells.is_finite() || cells > MAX_MESH_POINTS as f64 {
            warn!(
                source_id = %source.source_id,
                area_km2,
                area_source_discretization,
                "Area source would need more than {} mesh points; keeping it whole.",
                MAX_MESH_POINTS
            );
            return vec![source.clone()];
        }
        let num_points = (cells as u64).max(1);
        let per_point = source.num_ruptures / num_points;
        let remainder = source.num_ruptures % num_points;

        (0..num_points)
            .map(|i| {
                let mut point = source.clone();
                point.source_id = format!("{}-{}", source.source_id, i);
                point.kind = SourceKind::Point;
                point.num_ruptures = per_point + u64::from(i < remainder);
                point
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASC: &str = "Active Shallow Crust";

    #[test]
    fn non_area_sources_are_returned_whole() {
        let fault = Source::new("F", ASC, SourceKind::ComplexFault).with_num_ruptures(9);
        let pieces = MeshSplitter.split(&fault, 5.0);
        assert_eq!(pieces, vec![fault]);
    }

    #[test]
    fn area_source_becomes_points_covering_its_extent() {
        let area = Source::new("A", ASC, SourceKind::Area { area_km2: 250.0 })
            .with_magnitude_range(5.0, 6.5)
            .with_num_ruptures(10);

        let pieces = MeshSplitter.split(&area, 10.0);

        assert_eq!(pieces.len(), 3);
        assert!(pieces.iter().all(|p| p.kind == SourceKind::Point));
        assert!(pieces.iter().all(|p| p.tectonic_region_type == ASC));
        assert!(pieces.iter().all(|p| p.min_max_mag() == (5.0, 6.5)));
        let ruptures: Vec<u64> = pieces.iter().map(|p| p.num_ruptures).collect();
        assert_eq!(ruptures, vec![4, 3, 3]);
        assert_eq!(pieces[2].source_id, "A-2");
    }

    #[test]
    fn tiny_area_still_yields_one_point() {
        let area = Source::new("A", ASC, SourceKind::Area { area_km2: 0.5 }).with_num_ruptures(2);
        let pieces = MeshSplitter.split(&area, 10.0);
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].source_id, "A-0");
        assert_eq!(pieces[0].num_ruptures, 2);
    }

    #[test]
    fn oversized_area_is_kept_whole() {
        for area_km2 in [f64::INFINITY, 1e15] {
            let area = Source::new("A", ASC, SourceKind::Area { area_km2 }).with_num_ruptures(7);
            let pieces = MeshSplitter.split(&area, 10.0);
            assert_eq!(pieces, vec![area]);
        }
    }

    #[test]
    fn mesh_at_the_limit_is_split() {
        let area_km2 = MAX_MESH_POINTS as f64 * 4.0;
        let area = Source::new("A", ASC, SourceKind::Area { area_km2 }).with_num_ruptures(1);
        let pieces = MeshSplitter.split(&area, 2.0);
        assert_eq!(pieces.len() as u64, MAX_MESH_POINTS);
    }

    #[test]
    fn non_finite_discretization_disables_splitting() {
        let area = Source::new("A", ASC, SourceKind::Area { area_km2: 500.0 });
        assert_eq!(MeshSplitter.split(&area, f64::NAN), vec![area.clone()]);
        assert_eq!(MeshSplitter.split(&area, f64::INFINITY), vec![area]);
    }

    #[test]
    fn non_positive_discretization_disables_splitting() {
        let area = Source::new("A", ASC, SourceKind::Area { area_km2: 500.0 });
        let pieces = MeshSplitter.split(&area, 0.0);
        assert_eq!(pieces, vec![area]);
    }
}
