//! Provides input functionality for source-model files.
//!
//! The source-model format proper belongs to an external parser; this module defines the
//! contract the engine relies on (ordered tectonic region groups, unique source ids) and a
//! TOML-backed implementation of it.

pub mod source_model;
