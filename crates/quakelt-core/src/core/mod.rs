//! # Core Module
//!
//! The building blocks the association engine works on.
//!
//! ## Overview
//!
//! A hazard calculation starts from one or more source models, each a collection of seismic
//! sources grouped by tectonic region type, and from a ground-motion logic tree assigning
//! candidate GSIMs to every tectonic region type. This module holds the data structures for
//! those inputs and the collaborators that produce them.
//!
//! ## Architecture
//!
//! - **Data Models** ([`models`]) - Sources, tectonic region groups and source models
//! - **Source Splitting** ([`sources`]) - Discretization of extended sources into smaller units
//! - **File I/O** ([`io`]) - Reading source-model files into ordered tectonic region groups
//! - **Logic Trees** ([`logictree`]) - Source-model and ground-motion logic trees

pub mod io;
pub mod logictree;
pub mod models;
pub mod sources;
