//! Word records and rooted dependency graphs.
//!
//! A `DependencyGraph` is an explicit set of tables: token nodes keyed by
//! their identifier, labeled head-dependent edges, and side annotations
//! for the multiword tokens and empty nodes of the sentence.

mod error;
pub use crate::error::GraphError;

pub mod graph;

mod graph_algo;

pub mod token;
