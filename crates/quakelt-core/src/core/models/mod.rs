//! # Core Models Module
//!
//! Data structures describing the sources of a hazard model and how they are organized.
//!
//! ## Key Components
//!
//! - [`source`] - A single seismic source as delivered by the source converter
//! - [`group`] - Sources sharing one tectonic region type, with aggregate statistics
//! - [`source_model`] - One branch of the source-model logic tree
//! - [`ids`] - Identifier types shared by the engine
//!
//! ## Usage
//!
//! ```ignore
//! use quakelt::core::models::{group::TectonicRegionGroup, source::{Source, SourceKind}};
//!
//! let mut group = TectonicRegionGroup::new("Active Shallow Crust");
//! group.add(Source::new("SRC1", "Active Shallow Crust", SourceKind::Point))?;
//! ```

pub mod group;
pub mod ids;
pub mod source;
pub mod source_model;
