//! # Aspect Model
//!
//! The typed boundary of an ASPECTS knowledge base. Raw JSON documents and tag
//! catalogs are parsed and validated here, so downstream analysis only ever
//! sees normalized [`Entry`] records.

pub mod catalog;
pub mod document;
pub mod entries;
pub mod error;

pub use catalog::*;
pub use document::*;
pub use entries::*;
pub use error::*;
