use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{AxisLimits, ImageFormat};

/// A renderable figure: a Vega-Lite specification without presentation
/// details (titles, axis labels, size), which are carried by [`PlotStyle`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub spec: serde_json::Value,
}

impl Figure {
    pub fn new(spec: serde_json::Value) -> Self {
        Self { spec }
    }
}

/// Presentation and export settings for one figure.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotStyle {
    /// Title; `\n` separates lines.
    pub title: String,
    pub subtitle: Option<String>,
    pub x_title: String,
    pub y_title: String,
    pub legend: bool,
    pub width: u32,
    pub height: u32,
    pub file_stem: String,
    pub out_dir: Option<PathBuf>,
    pub formats: Vec<ImageFormat>,
    pub show: bool,
    pub xlim: Option<AxisLimits>,
    pub ylim: Option<AxisLimits>,
    pub log_y: bool,
}

/// A figure together with the style it is rendered with.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotArtifact {
    pub figure: Figure,
    pub style: PlotStyle,
}
