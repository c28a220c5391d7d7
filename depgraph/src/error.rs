use thiserror::Error;

/// Graph shape error.
#[derive(Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum GraphError {
    #[error("edge refers to node {node:?}, which is not in the graph")]
    MissingNode { node: String },

    #[error("node {node:?} does not have a head")]
    NoHead { node: String },

    #[error("node {node:?} has {count} heads")]
    MultipleHeads { node: String, count: usize },

    #[error("the root has a head")]
    RootHasHead,

    #[error("node {node:?} is part of a cycle")]
    Cycle { node: String },
}
