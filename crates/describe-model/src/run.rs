//! Run configuration: what to describe and how to emit it.

use std::path::PathBuf;

use crate::{AxisLimits, ConfigError, ImageFormat, LineStyle, Sentinels};

pub const DEFAULT_WIDTH: u32 = 1000;
pub const DEFAULT_HEIGHT: u32 = 800;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Query(String),
    Table(String),
}

impl Source {
    pub fn text(&self) -> &str {
        match self {
            Source::Query(q) => q,
            Source::Table(t) => t,
        }
    }
}

/// The single task one invocation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Only build the markdown index of an output directory.
    Index,
    Table,
    Query,
    Xy,
}

/// Raw, unvalidated inputs as gathered from flags and configuration.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub query: Option<String>,
    pub table: Option<String>,
    pub xy: Option<String>,
    pub color_by: Option<String>,
    pub line_type: Option<String>,
    pub image_types: Option<String>,
    pub out_dir: Option<PathBuf>,
    pub file_name: Option<String>,
    pub show: bool,
    pub sentinels: Sentinels,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub xlab: Option<String>,
    pub ylab: Option<String>,
    pub xlim: Option<String>,
    pub ylim: Option<String>,
    pub log_y: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub markdown: Option<PathBuf>,
}

/// Validated configuration for one invocation. Built once, then only read.
#[derive(Debug, Clone)]
pub struct RunSpec {
    pub task: Task,
    pub source: Option<Source>,
    pub xy: Vec<String>,
    pub color_by: Option<String>,
    pub line_style: LineStyle,
    pub image_formats: Vec<ImageFormat>,
    pub out_dir: Option<PathBuf>,
    pub file_name: Option<String>,
    pub show: bool,
    pub sentinels: Sentinels,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub xlab: Option<String>,
    pub ylab: Option<String>,
    pub xlim: Option<AxisLimits>,
    pub ylim: Option<AxisLimits>,
    pub log_y: bool,
    pub width: u32,
    pub height: u32,
    pub markdown: Option<PathBuf>,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}

impl RunSpec {
    /// Validate a request and decide the task.
    pub fn from_request(req: RunRequest) -> Result<Self, ConfigError> {
        let query = non_empty(req.query);
        let table = non_empty(req.table);
        let xy_list = non_empty(req.xy);
        let markdown = match req.markdown {
            Some(path) if path.to_string_lossy().trim().is_empty() => {
                return Err(ConfigError::EmptyIndexPath);
            }
            markdown => markdown,
        };

        let (task, source) = match (query, table) {
            (Some(_), Some(_)) => return Err(ConfigError::BothSources),
            (None, None) if markdown.is_some() => (Task::Index, None),
            (None, None) => return Err(ConfigError::MissingSource),
            (None, Some(t)) => {
                if xy_list.is_some() {
                    return Err(ConfigError::XyRequiresQuery);
                }
                (Task::Table, Some(Source::Table(t)))
            }
            (Some(q), None) if xy_list.is_some() => (Task::Xy, Some(Source::Query(q))),
            (Some(q), None) => (Task::Query, Some(Source::Query(q))),
        };

        if task != Task::Index && markdown.is_some() {
            return Err(ConfigError::IndexWithTask);
        }

        let xy = match &xy_list {
            Some(list) => {
                let fields: Vec<String> = list
                    .split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(str::to_string)
                    .collect();
                if fields.len() < 2 {
                    return Err(ConfigError::XyTooFewFields(list.clone()));
                }
                fields
            }
            None => Vec::new(),
        };

        let line_style = match non_empty(req.line_type) {
            Some(lt) => lt.parse()?,
            None => LineStyle::default(),
        };

        let width = req.width.unwrap_or(DEFAULT_WIDTH);
        let height = req.height.unwrap_or(DEFAULT_HEIGHT);
        if width == 0 {
            return Err(ConfigError::ZeroSize("width"));
        }
        if height == 0 {
            return Err(ConfigError::ZeroSize("height"));
        }

        let xlim = non_empty(req.xlim).map(|s| s.parse()).transpose()?;
        let ylim = non_empty(req.ylim).map(|s| s.parse()).transpose()?;

        let mut image_formats = match &req.image_types {
            Some(list) => ImageFormat::parse_list(list)?,
            None => Vec::new(),
        };
        let mut out_dir = req.out_dir;
        let mut show = req.show;

        if task == Task::Index {
            // indexing reads the directory, it writes no images
            image_formats.clear();
            show = false;
            out_dir = Some(out_dir.unwrap_or_else(|| PathBuf::from(".")));
        } else if image_formats.is_empty() {
            if out_dir.is_some() {
                return Err(ConfigError::OutDirWithoutFormats);
            }
            show = true;
        } else if out_dir.is_none() {
            out_dir = Some(PathBuf::from("."));
        }

        Ok(RunSpec {
            task,
            source,
            xy,
            color_by: non_empty(req.color_by),
            line_style,
            image_formats,
            out_dir,
            file_name: non_empty(req.file_name),
            show,
            sentinels: req.sentinels,
            title: non_empty(req.title),
            subtitle: non_empty(req.subtitle),
            xlab: non_empty(req.xlab),
            ylab: non_empty(req.ylab),
            xlim,
            ylim,
            log_y: req.log_y,
            width,
            height,
            markdown,
        })
    }

    pub fn source_text(&self) -> &str {
        self.source.as_ref().map(Source::text).unwrap_or_default()
    }
}
