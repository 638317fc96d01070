//! cprotogen Core
//!
//! Core types shared by the prototype extractor and the header writer.

pub mod config;
pub mod error;
pub mod location;
pub mod types;

pub use config::{Config, HeaderConfig, ParserConfig};
pub use error::{Error, Result};
pub use location::LineBounds;
pub use types::*;
