//! In-memory collaborators that record what the engine asks of them.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

use describe_engine::{
    BoxError, HistogramData, Level, Predicate, QuantileData, QueryRows, QueryStore, Renderer,
    StatsEngine, XyData,
};
use describe_model::{ColumnDef, Figure, LineStyle, PlotArtifact};

#[derive(Default)]
pub struct FakeStore {
    pub tables: HashMap<String, Vec<ColumnDef>>,
    pub comments: HashMap<(String, String), String>,
    pub query_columns: Vec<ColumnDef>,
}

impl FakeStore {
    pub fn with_table(mut self, table: &str, columns: &[(&str, &str)]) -> Self {
        self.tables.insert(
            table.to_string(),
            columns.iter().map(|(n, t)| ColumnDef::new(*n, *t)).collect(),
        );
        self
    }

    pub fn with_comment(mut self, table: &str, field: &str, comment: &str) -> Self {
        self.comments
            .insert((table.to_string(), field.to_string()), comment.to_string());
        self
    }

    pub fn with_query_columns(mut self, columns: &[(&str, &str)]) -> Self {
        self.query_columns = columns.iter().map(|(n, t)| ColumnDef::new(*n, *t)).collect();
        self
    }
}

impl QueryStore for FakeStore {
    fn schema(&self, table: &str) -> Result<Vec<ColumnDef>, BoxError> {
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| format!("Table '{table}' not found").into())
    }

    fn comment(&self, table: &str, field: &str) -> Result<Option<String>, BoxError> {
        Ok(self
            .comments
            .get(&(table.to_string(), field.to_string()))
            .cloned())
    }

    fn execute(&self, _query: &str) -> Result<QueryRows, BoxError> {
        Ok(QueryRows::default())
    }

    fn resolve_schema(&self, _query: &str) -> Result<Vec<ColumnDef>, BoxError> {
        Ok(self.query_columns.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatsCall {
    Histogram {
        query: String,
        field: String,
        predicate: Option<String>,
    },
    Quantile {
        query: String,
        field: String,
        predicate: Option<String>,
    },
    Xy {
        query: String,
        predicate: Option<String>,
        fields: Vec<String>,
        color: Option<String>,
        line: LineStyle,
    },
}

pub struct FakeStats {
    pub total: u64,
    /// Level counts per field; fields not listed get 3 levels.
    pub levels: HashMap<String, usize>,
    pub fail_on: Option<String>,
    pub calls: RefCell<Vec<StatsCall>>,
}

impl Default for FakeStats {
    fn default() -> Self {
        Self {
            total: 1234,
            levels: HashMap::new(),
            fail_on: None,
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl FakeStats {
    pub fn with_levels(mut self, field: &str, levels: usize) -> Self {
        self.levels.insert(field.to_string(), levels);
        self
    }

    pub fn failing_on(mut self, field: &str) -> Self {
        self.fail_on = Some(field.to_string());
        self
    }

    fn check(&self, field: &str) -> Result<(), BoxError> {
        match &self.fail_on {
            Some(f) if f == field => Err(format!("no data for {field}").into()),
            _ => Ok(()),
        }
    }

    fn figure(kind: &str, field: &str) -> Figure {
        Figure::new(serde_json::json!({ "mark": kind, "field": field }))
    }
}

impl StatsEngine for FakeStats {
    fn histogram(
        &self,
        query: &str,
        field: &str,
        predicate: &Predicate,
    ) -> Result<HistogramData, BoxError> {
        self.calls.borrow_mut().push(StatsCall::Histogram {
            query: query.to_string(),
            field: field.to_string(),
            predicate: predicate.sql().map(str::to_string),
        });
        self.check(field)?;

        let n = self.levels.get(field).copied().unwrap_or(3);
        let levels = (0..n)
            .map(|i| Level {
                value: serde_json::json!(i),
                count: 1,
                proportion: 1.0 / n as f64,
            })
            .collect();
        Ok(HistogramData {
            levels,
            total: self.total,
            figure: Self::figure("bar", field),
        })
    }

    fn quantile(
        &self,
        query: &str,
        field: &str,
        predicate: &Predicate,
    ) -> Result<QuantileData, BoxError> {
        self.calls.borrow_mut().push(StatsCall::Quantile {
            query: query.to_string(),
            field: field.to_string(),
            predicate: predicate.sql().map(str::to_string),
        });
        self.check(field)?;

        Ok(QuantileData {
            total: self.total,
            figure: Self::figure("line", field),
        })
    }

    fn xy_data(
        &self,
        query: &str,
        predicate: &Predicate,
        fields: &[String],
        color: Option<&str>,
        line: LineStyle,
    ) -> Result<XyData, BoxError> {
        self.calls.borrow_mut().push(StatsCall::Xy {
            query: query.to_string(),
            predicate: predicate.sql().map(str::to_string),
            fields: fields.to_vec(),
            color: color.map(str::to_string),
            line,
        });
        self.check(&fields[0])?;

        Ok(XyData {
            rows: 10,
            figure: Self::figure("point", &fields.join(",")),
        })
    }
}

#[derive(Default)]
pub struct FakeRenderer {
    pub artifacts: RefCell<Vec<PlotArtifact>>,
    pub fail: bool,
}

impl Renderer for FakeRenderer {
    fn render(&self, artifact: &PlotArtifact) -> Result<Vec<PathBuf>, BoxError> {
        if self.fail {
            return Err("renderer unavailable".into());
        }
        self.artifacts.borrow_mut().push(artifact.clone());

        let style = &artifact.style;
        let dir = style.out_dir.clone().unwrap_or_default();
        Ok(style
            .formats
            .iter()
            .map(|f| dir.join(format!("{}.{}", style.file_stem, f.extension())))
            .collect())
    }
}
