//! Per-field plot orchestration.

use std::path::PathBuf;

use describe_model::{Figure, PlotArtifact, PlotKind, PlotStyle};
use tracing::{debug, warn};

use crate::{thousands, BoxError, Describer, EngineError, Predicate};

/// A histogram isn't made if there are more than this many levels.
pub const SKIP_LEVEL: usize = 1000;

/// Inputs for one plot.
#[derive(Debug, Clone, Copy)]
pub struct FieldPlot<'a> {
    /// Query whose results are described.
    pub query: &'a str,
    /// Field of the results to plot (the x field for XY plots).
    pub field: &'a str,
    /// Name shown in a synthesized title.
    pub label: &'a str,
    pub predicate: &'a Predicate,
    pub kind: PlotKind,
    pub file_stem: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldOutcome {
    Rendered { field: String, files: Vec<PathBuf> },
    /// Not an error: the histogram would have had too many levels.
    Skipped { field: String, levels: usize },
}

struct Composed {
    figure: Figure,
    title: String,
    x_title: String,
    y_title: String,
    legend: bool,
}

impl Describer<'_> {
    /// Build, style and render the plot for one field or field group.
    pub fn field_plot(&self, plot: &FieldPlot<'_>) -> Result<FieldOutcome, EngineError> {
        let run = self.run();
        let field_err = |source: BoxError| EngineError::FieldData {
            field: plot.field.to_string(),
            source,
        };

        let composed = match plot.kind {
            PlotKind::Histogram => {
                let data = self
                    .stats()
                    .histogram(plot.query, plot.field, plot.predicate)
                    .map_err(field_err)?;

                if data.levels.len() > SKIP_LEVEL {
                    warn!(
                        field = plot.field,
                        levels = data.levels.len(),
                        "skipped {}: > {} levels",
                        plot.field,
                        SKIP_LEVEL
                    );
                    return Ok(FieldOutcome::Skipped {
                        field: plot.field.to_string(),
                        levels: data.levels.len(),
                    });
                }

                Composed {
                    figure: data.figure,
                    title: synthesized_title(plot, data.total),
                    x_title: "Level".to_string(),
                    y_title: "Proportion".to_string(),
                    legend: false,
                }
            }
            PlotKind::Quantile => {
                let data = self
                    .stats()
                    .quantile(plot.query, plot.field, plot.predicate)
                    .map_err(field_err)?;

                Composed {
                    figure: data.figure,
                    title: synthesized_title(plot, data.total),
                    x_title: "u".to_string(),
                    y_title: plot.field.to_string(),
                    legend: false,
                }
            }
            PlotKind::Xy => {
                let fields = &run.xy;
                let data = self
                    .stats()
                    .xy_data(
                        plot.query,
                        plot.predicate,
                        fields,
                        run.color_by.as_deref(),
                        run.line_style,
                    )
                    .map_err(field_err)?;

                let x = fields.first().map(String::as_str).unwrap_or(plot.field);
                let ys = fields.get(1..).unwrap_or_default().join(", ");
                Composed {
                    figure: data.figure,
                    title: format!("{} {} vs {}", PlotKind::Xy.label(), x, ys),
                    x_title: x.to_string(),
                    y_title: ys,
                    legend: fields.len() > 2,
                }
            }
        };

        let style = PlotStyle {
            title: run.title.clone().unwrap_or(composed.title),
            subtitle: self.subtitle(plot),
            x_title: run.xlab.clone().unwrap_or(composed.x_title),
            y_title: run.ylab.clone().unwrap_or(composed.y_title),
            legend: composed.legend,
            width: run.width,
            height: run.height,
            file_stem: plot.file_stem.to_string(),
            out_dir: run.out_dir.clone(),
            formats: run.image_formats.clone(),
            show: run.show,
            xlim: run.xlim,
            ylim: run.ylim,
            log_y: run.log_y,
        };
        debug!(field = plot.field, title = %style.title, "rendering");

        let artifact = PlotArtifact {
            figure: composed.figure,
            style,
        };
        let files = self
            .renderer()
            .render(&artifact)
            .map_err(|source| EngineError::Render {
                field: plot.field.to_string(),
                source,
            })?;

        Ok(FieldOutcome::Rendered {
            field: plot.field.to_string(),
            files,
        })
    }

    /// Configured subtitle, else the query and its filter.
    fn subtitle(&self, plot: &FieldPlot<'_>) -> Option<String> {
        if let Some(subtitle) = &self.run().subtitle {
            return Some(subtitle.clone());
        }
        // single quotes break the embedding page's script
        plot.predicate
            .sql()
            .map(|w| format!("{} WHERE {}", plot.query, w).replace('\'', "`"))
    }
}

fn synthesized_title(plot: &FieldPlot<'_>, total: u64) -> String {
    format!("{} {}\nn: {}", plot.kind.label(), plot.label, thousands(total))
}
