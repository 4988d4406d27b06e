//! Describe data model
//!
//! Types shared by the dispatch engine, the store backend and the renderer:
//! declared column types, plot kinds, missing-value sentinels, the run
//! configuration and the figure/style pair handed to a renderer.

mod error;
mod figure;
mod run;
mod sentinel;
mod types;

pub use error::ConfigError;
pub use figure::{Figure, PlotArtifact, PlotStyle};
pub use run::{RunRequest, RunSpec, Source, Task};
pub use sentinel::{SentinelValue, Sentinels};
pub use types::*;
