//! Reading and writing of CoNLL-U treebanks.
//!
//! Sentences are read as sequences of `WordRecord`s or as
//! `DependencyGraph`s, and can be written back in either form.

mod error;
pub use crate::error::{ConfigError, Error, ParseError};

pub mod config;

pub mod convert;

pub mod dataset;
pub use crate::dataset::Dataset;

pub mod display;

pub mod io;

pub mod parse;
