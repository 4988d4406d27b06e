//! Styling and export of figures.

use std::cell::OnceCell;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use describe_engine::{BoxError, Renderer};
use describe_model::{AxisLimits, ImageFormat, PlotArtifact, PlotStyle};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::{html_page, SCHEMA_URL};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize figure: {0}")]
    Json(#[from] serde_json::Error),

    #[error("converter command is empty")]
    EmptyConverter,

    #[error("cannot export {format}: converter `{program}` is not available")]
    ConverterUnavailable { program: String, format: ImageFormat },

    #[error("converter `{command}` failed ({status}): {stderr}")]
    Converter {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("failed to launch browser `{command}`: {source}")]
    Browser {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Where and how figures leave the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Command used to open HTML pages for display.
    pub browser: String,

    /// Template for non-HTML exports; `{format}`, `{input}` (a Vega-Lite
    /// JSON file) and `{output}` are substituted per argument.
    pub converter: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            browser: "xdg-open".to_string(),
            converter: "vl-convert vl2{format} --input {input} --output {output}".to_string(),
        }
    }
}

/// Renderer for Vega-Lite figures.
pub struct VegaRenderer {
    config: RenderConfig,
    /// Created on the first `show`; outlives the process.
    pages: OnceCell<PathBuf>,
}

impl VegaRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            pages: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Export and/or display one artifact; returns the files written.
    pub fn render_artifact(&self, artifact: &PlotArtifact) -> Result<Vec<PathBuf>, RenderError> {
        let style = &artifact.style;
        let spec = styled_spec(artifact);
        let mut files = Vec::new();

        if !style.formats.is_empty() {
            let dir = style.out_dir.clone().unwrap_or_else(|| PathBuf::from("."));
            fs::create_dir_all(&dir)?;

            for format in &style.formats {
                let path = dir.join(format!("{}.{}", style.file_stem, format.extension()));
                match format {
                    ImageFormat::Html => fs::write(&path, html_page(&page_title(style), &spec))?,
                    other => self.convert(&spec, *other, &path)?,
                }
                info!(file = %path.display(), "wrote plot");
                files.push(path);
            }
        }

        if style.show {
            self.show(&spec, style)?;
        }

        Ok(files)
    }

    fn convert(&self, spec: &Value, format: ImageFormat, output: &Path) -> Result<(), RenderError> {
        let mut input = tempfile::Builder::new()
            .prefix("describe-")
            .suffix(".vl.json")
            .tempfile()?;
        serde_json::to_writer(&mut input, spec)?;
        input.flush()?;

        let input_path = input.path().display().to_string();
        let output_path = output.display().to_string();
        let args: Vec<String> = self
            .config
            .converter
            .split_whitespace()
            .map(|token| {
                token
                    .replace("{format}", format.extension())
                    .replace("{input}", &input_path)
                    .replace("{output}", &output_path)
            })
            .collect();
        let (program, rest) = args.split_first().ok_or(RenderError::EmptyConverter)?;
        debug!(command = %args.join(" "), "converting");

        let result = Command::new(program).args(rest).output();
        let out = match result {
            Ok(out) => out,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RenderError::ConverterUnavailable {
                    program: program.clone(),
                    format,
                })
            }
            Err(e) => return Err(e.into()),
        };

        if !out.status.success() {
            return Err(RenderError::Converter {
                command: args.join(" "),
                status: out.status.to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    /// Directory holding the pages this renderer has shown.
    pub fn page_dir(&self) -> Result<&Path, RenderError> {
        if let Some(dir) = self.pages.get() {
            return Ok(dir);
        }
        let dir = tempfile::Builder::new().prefix("describe-").tempdir()?.keep();
        info!(dir = %dir.display(), "writing browser pages");
        Ok(self.pages.get_or_init(|| dir))
    }

    /// Write the page into the page directory and hand it to the browser.
    /// The browser is not waited on.
    fn show(&self, spec: &Value, style: &PlotStyle) -> Result<PathBuf, RenderError> {
        let path = self.page_dir()?.join(format!("{}.html", style.file_stem));
        fs::write(&path, html_page(&page_title(style), spec))?;
        debug!(page = %path.display(), browser = %self.config.browser, "opening");

        Command::new(&self.config.browser)
            .arg(&path)
            .spawn()
            .map_err(|source| RenderError::Browser {
                command: self.config.browser.clone(),
                source,
            })?;
        Ok(path)
    }
}

impl Default for VegaRenderer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

impl Renderer for VegaRenderer {
    fn render(&self, artifact: &PlotArtifact) -> Result<Vec<PathBuf>, BoxError> {
        self.render_artifact(artifact).map_err(Into::into)
    }
}

fn page_title(style: &PlotStyle) -> String {
    style.title.replace('\n', " ")
}

fn channel<'a>(spec: &'a mut Map<String, Value>, name: &str) -> Option<&'a mut Map<String, Value>> {
    spec.get_mut("encoding")?.get_mut(name)?.as_object_mut()
}

fn set_domain(channel: &mut Map<String, Value>, limits: AxisLimits) {
    let scale = channel.entry("scale").or_insert_with(|| json!({}));
    scale["domain"] = json!([limits.min, limits.max]);
}

/// The figure's specification with the style applied.
pub fn styled_spec(artifact: &PlotArtifact) -> Value {
    let style = &artifact.style;
    let mut spec = artifact.figure.spec.clone();
    let Some(obj) = spec.as_object_mut() else {
        return spec;
    };

    obj.entry("$schema").or_insert_with(|| json!(SCHEMA_URL));

    let lines: Vec<&str> = style.title.split('\n').collect();
    let text = match lines.as_slice() {
        [single] => json!(single),
        _ => json!(lines),
    };
    let mut title = json!({ "text": text });
    if let Some(subtitle) = &style.subtitle {
        title["subtitle"] = json!(subtitle);
    }
    obj.insert("title".to_string(), title);
    obj.insert("width".to_string(), json!(style.width));
    obj.insert("height".to_string(), json!(style.height));

    if let Some(x) = channel(obj, "x") {
        x.insert("title".to_string(), json!(style.x_title));
        if let Some(limits) = style.xlim {
            set_domain(x, limits);
        }
    }
    if let Some(y) = channel(obj, "y") {
        y.insert("title".to_string(), json!(style.y_title));
        if let Some(limits) = style.ylim {
            set_domain(y, limits);
        }
        if style.log_y {
            let scale = y.entry("scale").or_insert_with(|| json!({}));
            scale["type"] = json!("log");
        }
    }
    if !style.legend {
        for name in ["color", "shape"] {
            if let Some(enc) = channel(obj, name) {
                enc.insert("legend".to_string(), Value::Null);
            }
        }
    }

    spec
}
