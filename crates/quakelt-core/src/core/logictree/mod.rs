//! # Logic Trees Module
//!
//! The two logic trees of a hazard model. The source-model tree selects which source model
//! file(s) take part in the calculation; the ground-motion tree assigns a GSIM to every
//! tectonic region type. The engine only consumes them through narrow interfaces.
//!
//! - [`source`] - Source-model logic tree: enumeration and sampling of model branches
//! - [`gsim`] - The [`gsim::GroundMotionTree`] collaborator and its reference implementation
//! - [`error`] - Validation errors shared by both trees

pub mod error;
pub mod gsim;
pub mod source;
