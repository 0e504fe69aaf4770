use super::assoc::RealizationAssociation;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV writing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

#[derive(Debug, Serialize)]
struct RealizationRecord {
    ordinal: usize,
    uid: String,
    source_model_path: String,
    gsim_path: String,
    weight: f64,
    collections: String,
}

/// Writes one CSV row per realization, in ordinal order.
pub fn write_realizations<W: Write>(
    writer: W,
    assoc: &RealizationAssociation,
    origin: &str,
) -> Result<(), ExportError> {
    let to_csv_error = |source| ExportError::Csv {
        path: origin.to_string(),
        source,
    };
    let mut writer = csv::Writer::from_writer(writer);
    for rlz in assoc.realizations() {
        let collections: Vec<String> = rlz.col_ids.iter().map(usize::to_string).collect();
        writer
            .serialize(RealizationRecord {
                ordinal: rlz.ordinal,
                uid: rlz.uid(),
                source_model_path: rlz.sm_lt_path.join("_"),
                gsim_path: rlz.gsim_rlz.uid(),
                weight: rlz.weight,
                collections: collections.join(" "),
            })
            .map_err(to_csv_error)?;
    }
    writer.flush().map_err(|e| ExportError::Io {
        path: origin.to_string(),
        source: e,
    })
}

pub fn write_realizations_csv(
    path: &Path,
    assoc: &RealizationAssociation,
) -> Result<(), ExportError> {
    let origin = path.to_string_lossy().to_string();
    let file = std::fs::File::create(path).map_err(|e| ExportError::Io {
        path: origin.clone(),
        source: e,
    })?;
    write_realizations(file, assoc, &origin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::logictree::gsim::{GsimBranch, GsimLogicTree};
    use crate::core::models::group::TectonicRegionGroup;
    use crate::core::models::source::{Source, SourceKind};
    use crate::core::models::source_model::SourceModel;
    use crate::engine::composite::{CompositeSourceModel, assign_group_ids};
    use tempfile::tempdir;

    fn assoc() -> RealizationAssociation {
        let tree = GsimLogicTree::from_branch_sets(vec![(
            "T1".to_string(),
            vec![GsimBranch::new("g1", "A", 0.25), GsimBranch::new("g2", "B", 0.75)],
        )])
        .unwrap();
        assert_eq!(tree.num_paths(), 2);
        let src = Source::new("S1", "T1", SourceKind::SimpleFault).with_num_ruptures(2);
        let mut group = TectonicRegionGroup::with_sources("T1", vec![src]).unwrap();
        group.recount_ruptures();
        let mut models = vec![SourceModel::new(
            "sm.toml",
            1.0,
            vec!["b1".to_string()],
            vec![group],
            tree,
            0,
            1,
        )];
        assign_group_ids(&mut models);
        let mut csm = CompositeSourceModel::new(0, 0, models).unwrap();
        csm.build_association().unwrap()
    }

    #[test]
    fn writes_header_and_one_row_per_realization() {
        let mut buffer = Vec::new();
        write_realizations(&mut buffer, &assoc(), "memory").unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "ordinal,uid,source_model_path,gsim_path,weight,collections",
                "0,\"b1,g1\",b1,g1,0.25,",
                "1,\"b1,g2\",b1,g2,0.75,",
            ]
        );
    }

    #[test]
    fn writes_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("realizations.csv");

        write_realizations_csv(&path, &assoc()).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.records().count(), 2);
    }

    #[test]
    fn reports_unwritable_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("realizations.csv");
        assert!(matches!(
            write_realizations_csv(&path, &assoc()),
            Err(ExportError::Io { .. })
        ));
    }
}
