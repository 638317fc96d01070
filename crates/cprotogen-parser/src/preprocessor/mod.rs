//! C Preprocessor Integration
//!
//! Runs the system C preprocessor and maps the lines of its output back to
//! the file that was preprocessed.

pub mod cplusplus;
pub mod cpp;
pub mod line_map;

pub use cplusplus::blank_cplusplus_blocks;
pub use cpp::{PreprocessOptions, PreprocessResult, Preprocessor};
pub use line_map::LineMap;
