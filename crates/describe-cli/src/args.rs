use clap::Parser;
use std::path::PathBuf;

use describe_model::{ConfigError, RunRequest, Sentinels};

use crate::config::Config;

/// Sentinel value meaning "no missing-value marker for this kind".
pub const NO_SENTINEL: &str = "NA";

#[derive(Debug, Parser)]
#[command(name = "describe")]
#[command(
    about = "Plot every field of a DuckDB table or query: histograms, quantiles and XY plots",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Query whose result fields are plotted
    #[arg(short, long)]
    pub query: Option<String>,

    /// Table whose columns are plotted
    #[arg(short, long)]
    pub table: Option<String>,

    /// Comma-separated fields of the query: x first, then one or more y fields
    #[arg(long)]
    pub xy: Option<String>,

    /// Field used to color XY points
    #[arg(long)]
    pub color_by: Option<String>,

    /// XY line style: m (markers), l (lines) or lm (both)
    #[arg(long)]
    pub line_type: Option<String>,

    /// Comma-separated output formats: png, jpeg, html, pdf, webp, svg, eps, emf
    #[arg(short, long)]
    pub image_types: Option<String>,

    /// Output directory (default "." when formats are given)
    #[arg(short = 'd', long)]
    pub out_dir: Option<PathBuf>,

    /// File name (without extension) for the XY plot
    #[arg(short, long)]
    pub file_name: Option<String>,

    /// Write a markdown index of the output directory instead of plotting
    #[arg(long)]
    pub markdown: Option<PathBuf>,

    /// Open each plot in the browser
    #[arg(long)]
    pub show: bool,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub subtitle: Option<String>,

    /// x-axis label
    #[arg(long)]
    pub xlab: Option<String>,

    /// y-axis label
    #[arg(long)]
    pub ylab: Option<String>,

    /// x-axis limits as "min,max"
    #[arg(long, allow_hyphen_values = true)]
    pub xlim: Option<String>,

    /// y-axis limits as "min,max"
    #[arg(long, allow_hyphen_values = true)]
    pub ylim: Option<String>,

    /// Log scale on the y axis
    #[arg(long = "log")]
    pub log_y: bool,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    /// Missing value for integer fields ("NA" for none)
    #[arg(long, default_value = "-1", allow_hyphen_values = true)]
    pub miss_int: String,

    /// Floating-point fields keep only values above this ("NA" for none)
    #[arg(long, default_value = "-1", allow_hyphen_values = true)]
    pub miss_float: String,

    /// Missing value for string fields ("NA" for none)
    #[arg(long, default_value = "!", allow_hyphen_values = true)]
    pub miss_str: String,

    /// Missing value for date fields, YYYYMMDD ("NA" for none)
    #[arg(long, default_value = "19700101")]
    pub miss_date: String,

    /// Do not exclude any missing values
    #[arg(long)]
    pub no_missing: bool,

    /// DuckDB database file (in-memory when unset)
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// DuckDB memory limit, e.g. 4GB
    #[arg(long)]
    pub memory_limit: Option<String>,

    /// DuckDB worker threads
    #[arg(long)]
    pub threads: Option<u32>,

    /// Command that opens HTML pages for --show
    #[arg(long)]
    pub browser: Option<String>,

    /// Configuration file (default: describe.yaml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn sentinel(value: &str) -> Option<&str> {
    Some(value).filter(|v| v.trim() != NO_SENTINEL)
}

impl Cli {
    pub fn sentinels(&self) -> Result<Sentinels, ConfigError> {
        if self.no_missing {
            return Ok(Sentinels::default());
        }
        Sentinels::parse(
            sentinel(&self.miss_int),
            sentinel(&self.miss_float),
            sentinel(&self.miss_str),
            sentinel(&self.miss_date),
        )
    }

    /// Flags take precedence over the file and the environment.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(database) = &self.database {
            config.store.database = Some(database.clone());
        }
        if let Some(limit) = &self.memory_limit {
            config.store.memory_limit = Some(limit.clone());
        }
        if let Some(threads) = self.threads {
            config.store.threads = Some(threads);
        }
        if let Some(browser) = &self.browser {
            config.render.browser = browser.clone();
        }
        if self.width.is_some() {
            config.render.width = self.width;
        }
        if self.height.is_some() {
            config.render.height = self.height;
        }
    }

    pub fn request(&self, config: &Config) -> Result<RunRequest, ConfigError> {
        Ok(RunRequest {
            query: self.query.clone(),
            table: self.table.clone(),
            xy: self.xy.clone(),
            color_by: self.color_by.clone(),
            line_type: self.line_type.clone(),
            image_types: self.image_types.clone(),
            out_dir: self.out_dir.clone(),
            file_name: self.file_name.clone(),
            show: self.show,
            sentinels: self.sentinels()?,
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            xlab: self.xlab.clone(),
            ylab: self.ylab.clone(),
            xlim: self.xlim.clone(),
            ylim: self.ylim.clone(),
            log_y: self.log_y,
            width: config.render.width,
            height: config.render.height,
            markdown: self.markdown.clone(),
        })
    }
}
