use crate::core::models::group::{GroupError, TectonicRegionGroup};
use crate::core::models::source::{Source, SourceKind};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

const PROGRESS_INTERVAL: usize = 10_000;

/// A raw source node as found in a source-model file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SourceNode {
    pub id: String,
    pub name: Option<String>,
    pub tectonic_region: String,
    pub kind: String,
    pub min_mag: f64,
    pub max_mag: f64,
    pub num_ruptures: u64,
    pub area_km2: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SourceModelDocument {
    #[serde(default, rename = "source")]
    sources: Vec<SourceNode>,
}

/// Errors raised while converting a single source node.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConversionError {
    #[error("Unknown source kind '{kind}' for source '{source_id}'")]
    UnknownKind { source_id: String, kind: String },

    #[error("Area source '{0}' requires a positive, finite 'area-km2'")]
    InvalidArea(String),

    #[error("Source '{source_id}' has a non-finite magnitude range [{min_mag}, {max_mag}]")]
    NonFiniteMagnitude {
        source_id: String,
        min_mag: f64,
        max_mag: f64,
    },

    #[error("Source '{source_id}' has min-mag {min_mag} greater than max-mag {max_mag}")]
    InvertedMagnitudes {
        source_id: String,
        min_mag: f64,
        max_mag: f64,
    },

    #[error("Source '{0}' has an empty tectonic region type")]
    EmptyTectonicRegion(String),
}

/// Errors raised while parsing a whole source-model file.
#[derive(Debug, Error)]
pub enum SourceModelError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },

    #[error("Invalid source in '{path}': {source}")]
    Conversion {
        path: String,
        source: ConversionError,
    },

    #[error("The source ID {source_id} is duplicated in '{path}'")]
    DuplicatedIdentifier { path: String, source_id: String },

    #[error(transparent)]
    Group(#[from] GroupError),
}

/// Turns one raw source node into a [`Source`].
///
/// This is the seam towards the seismic-source library, which knows how to build real
/// source objects (and count their ruptures) from a node.
pub trait SourceConverter {
    fn convert_node(&self, node: &SourceNode) -> Result<Source, ConversionError>;
}

/// Converter taking the node fields at face value after basic validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConverter;

impl SourceConverter for DefaultConverter {
    fn convert_node(&self, node: &SourceNode) -> Result<Source, ConversionError> {
        if node.tectonic_region.trim().is_empty() {
            return Err(ConversionError::EmptyTectonicRegion(node.id.clone()));
        }
        if !node.min_mag.is_finite() || !node.max_mag.is_finite() {
            return Err(ConversionError::NonFiniteMagnitude {
                source_id: node.id.clone(),
                min_mag: node.min_mag,
                max_mag: node.max_mag,
            });
        }
        if node.min_mag > node.max_mag {
            return Err(ConversionError::InvertedMagnitudes {
                source_id: node.id.clone(),
                min_mag: node.min_mag,
                max_mag: node.max_mag,
            });
        }
        let kind = match node.kind.to_ascii_lowercase().as_str() {
            "point" => SourceKind::Point,
            "area" => match node.area_km2 {
                Some(area_km2) if area_km2 > 0.0 && area_km2.is_finite() => {
                    SourceKind::Area { area_km2 }
                }
                _ => return Err(ConversionError::InvalidArea(node.id.clone())),
            },
            "simple-fault" | "simple_fault" => SourceKind::SimpleFault,
            "complex-fault" | "complex_fault" => SourceKind::ComplexFault,
            "characteristic" => SourceKind::Characteristic,
            "non-parametric" | "non_parametric" => SourceKind::NonParametric,
            other => {
                return Err(ConversionError::UnknownKind {
                    source_id: node.id.clone(),
                    kind: other.to_string(),
                });
            }
        };

        let source = Source::new(&node.id, &node.tectonic_region, kind)
            .with_name(node.name.as_deref().unwrap_or(&node.id))
            .with_magnitude_range(node.min_mag, node.max_mag)
            .with_num_ruptures(node.num_ruptures);
        Ok(source)
    }
}

/// Parses the content of a source-model file into ordered tectonic region groups.
///
/// Sources are converted in document order; `apply_uncertainties` may modify each source
/// before it is grouped. The returned groups are sorted by
/// [`TectonicRegionGroup::cmp_by_size`].
///
/// # Arguments
///
/// * `content` - The TOML text of the source model (`[[source]]` tables).
/// * `origin` - A label for the content (usually the file path), used in errors and logs.
/// * `converter` - Converts each raw node into a source.
/// * `apply_uncertainties` - Hook modifying every source after conversion.
///
/// # Errors
///
/// Returns `SourceModelError::DuplicatedIdentifier` if two sources share an id, and the
/// conversion or TOML error otherwise. On error no group is returned.
pub fn parse_source_model<C, F>(
    content: &str,
    origin: &str,
    converter: &C,
    mut apply_uncertainties: F,
) -> Result<Vec<TectonicRegionGroup>, SourceModelError>
where
    C: SourceConverter + ?Sized,
    F: FnMut(&mut Source),
{
    let document: SourceModelDocument =
        toml::from_str(content).map_err(|e| SourceModelError::Toml {
            path: origin.to_string(),
            source: e,
        })?;

    let mut groups: BTreeMap<String, TectonicRegionGroup> = BTreeMap::new();
    let mut source_ids = HashSet::new();

    for (no, node) in document.sources.iter().enumerate() {
        let mut src = converter
            .convert_node(node)
            .map_err(|e| SourceModelError::Conversion {
                path: origin.to_string(),
                source: e,
            })?;
        if !source_ids.insert(src.source_id.clone()) {
            return Err(SourceModelError::DuplicatedIdentifier {
                path: origin.to_string(),
                source_id: src.source_id,
            });
        }
        apply_uncertainties(&mut src);

        groups
            .entry(src.tectonic_region_type.clone())
            .or_insert_with_key(|trt| TectonicRegionGroup::new(trt))
            .add(src)?;

        if (no + 1) % PROGRESS_INTERVAL == 0 {
            info!("Parsed {} sources from {}", no + 1, origin);
        }
    }

    let mut groups: Vec<TectonicRegionGroup> = groups.into_values().collect();
    groups.sort_by(TectonicRegionGroup::cmp_by_size);
    debug!(
        num_sources = source_ids.len(),
        num_groups = groups.len(),
        "Parsed source model {}",
        origin
    );
    Ok(groups)
}

/// Reads and parses a source-model file. See [`parse_source_model`].
pub fn parse_source_model_file<C, F>(
    path: &Path,
    converter: &C,
    apply_uncertainties: F,
) -> Result<Vec<TectonicRegionGroup>, SourceModelError>
where
    C: SourceConverter + ?Sized,
    F: FnMut(&mut Source),
{
    let content = std::fs::read_to_string(path).map_err(|e| SourceModelError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    parse_source_model(&content, &path.to_string_lossy(), converter, apply_uncertainties)
}
