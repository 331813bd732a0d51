//! Plugin implementations for the supported input languages
//!
//! Each language provides a detector and a parser implementing the core
//! traits. The orchestrator picks one for a given input.

pub mod dot;
pub mod gdl;
pub mod native;
pub mod orchestrator;

pub use dot::{DotDetector, DotParser};
pub use gdl::{GdlDetector, GdlParser};
pub use native::{NativeDetector, NativeParser};
pub use orchestrator::*;
