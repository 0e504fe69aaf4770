//! # quakelt Core Library
//!
//! Logic-tree bookkeeping for probabilistic seismic hazard analysis: the library builds the
//! realizations of a calculation, i.e. the combinations of one source-model branch and one
//! ground-motion (GSIM) branch, and folds per-branch results back onto them.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Plain data models (`Source`, `TectonicRegionGroup`,
//!   `SourceModel`), the logic-tree collaborators, source splitting and source-model file I/O.
//!
//! - **[`engine`]: The Logic Core.** The realization association machinery:
//!   `CompositionIndex`, `RealizationAssociation`, `CompositeSourceModel` and the
//!   probability-union accumulator used to compose branch results.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures tying `core` and `engine` together,
//!   from a source-model logic tree on disk to a normalized realization association.

pub mod core;
pub mod engine;
pub mod workflows;
