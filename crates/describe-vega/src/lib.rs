//! Vega-Lite figures and rendering
//!
//! Builds the Vega-Lite specifications the statistics engine returns as
//! figures, applies a [`PlotStyle`](describe_model::PlotStyle) to them and
//! exports the result: HTML pages directly, other formats through an
//! external converter, and interactive display through a browser command.

mod figure;
mod html;
mod render;

pub use figure::{field_ref, histogram_figure, quantile_figure, xy_figure, SCHEMA_URL};
pub use html::html_page;
pub use render::{styled_spec, RenderConfig, RenderError, VegaRenderer};
