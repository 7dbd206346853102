//! Knowledge Base module - the implicit relationship graph between entries.
//!
//! The graph consists of:
//! - **Nodes**: one per entry slug
//! - **Edges**: shared tags, shared provenance sources and explicit mentions
//! - **Weights**: inverse-frequency tag weights, accumulated across relations

mod builder;
mod graph;
mod reconciler;

pub use builder::*;
pub use graph::*;
pub use reconciler::*;
