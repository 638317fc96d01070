//! cprotogen Header Engine
//!
//! Reconciles the prototypes of a C source file with those already declared
//! in its header and writes the result back.
//!
//! - `merge` - ordering policy between old and new prototypes
//! - `writer` - header synthesis and in-place splicing
//! - `generator` - the end-to-end driver

pub mod generator;
pub mod merge;
pub mod writer;

pub use generator::{generate_prototypes, GenerateOptions};
pub use merge::merge_prototypes;
pub use writer::{include_guard, splice_prototypes, synthesize_header, SpliceRegion};
