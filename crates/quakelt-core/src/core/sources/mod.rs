//! # Source Splitting Module
//!
//! Extended sources are expensive and hard to balance across workers, so before the
//! calculation they are split into smaller, independently computable pieces.
//!
//! - [`split`] - The [`split::SourceSplitter`] seam and the mesh-based default splitter

pub mod split;
