//! # Engine Module
//!
//! The realization association engine.
//!
//! ## Overview
//!
//! Given the source models of a calculation and their ground-motion logic trees, the engine
//! enumerates (or samples) the ground-motion realizations of each source model, assigns
//! every resulting realization a global ordinal and a weight, and records which
//! (tectonic region group, GSIM) pairings each realization uses. Downstream, results
//! computed per pairing are folded onto realizations with a probability-union operator.
//!
//! ## Architecture
//!
//! - **Composite Model** ([`composite`]) - Owner of all source models; drives enumeration,
//!   sampling and weight normalization
//! - **Association** ([`assoc`]) - The many-to-many pairing -> realization mapping and the
//!   combination operators
//! - **Composition Index** ([`composition`]) - Dense column indices for oversampled groups
//! - **Accumulation** ([`accum`]) - The aggregation monoid used by the combination operators
//! - **Configuration** ([`config`]) - Sampling and discretization parameters
//! - **Diagnostics and Errors** ([`diagnostics`], [`error`]) - Non-fatal reports and fatal
//!   failures of the association build
//! - **Progress Monitoring** ([`progress`]) - Progress reporting for long-running workflows
//! - **Export** ([`export`]) - CSV output of the realizations

pub mod accum;
pub mod assoc;
pub mod composite;
pub mod composition;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod progress;
pub mod realization;
