//! # Aspect Density
//!
//! Measures how densely an ASPECTS knowledge base is interconnected. Entries
//! become nodes of an implicit relationship graph, and degree statistics over
//! the whole collection and over each section yield the Aspect-Density Index
//! (ADI) used to flag sections that are flooding or starving.
//!
//! ## Core Components
//!
//! - **knowledge_base**: Tag reconciliation and graph construction
//! - **density**: Degree and density statistics per scope
//! - **report**: Scope aggregation, threshold flags and rendering
//! - **config**: Analysis options and their TOML file form
//!
//! ## Design Philosophy
//!
//! - **Snapshot-Driven**: Every run rebuilds the graph from the full document
//! - **Deterministic**: Sorted containers throughout, so identical input gives
//!   identical weights, warnings and output
//! - **Per-Run State**: Caches live in explicit objects scoped to one analysis

pub mod config;
pub mod density;
pub mod error;
pub mod knowledge_base;
pub mod report;

pub use config::*;
pub use density::*;
pub use error::*;
pub use knowledge_base::*;
pub use report::*;
