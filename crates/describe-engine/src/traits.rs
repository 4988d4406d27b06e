//! Collaborators the engine drives: the store, the statistics engine and
//! the renderer.

use std::path::PathBuf;

use describe_model::{ColumnDef, Figure, LineStyle, PlotArtifact};

use crate::Predicate;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

/// Schema introspection and query execution against an analytical store.
pub trait QueryStore {
    /// Columns of a table in the store's natural order.
    fn schema(&self, table: &str) -> Result<Vec<ColumnDef>, BoxError>;

    /// Human comment attached to a column, if any.
    fn comment(&self, table: &str, field: &str) -> Result<Option<String>, BoxError>;

    fn execute(&self, query: &str) -> Result<QueryRows, BoxError>;

    /// Columns a query would return, in result order.
    fn resolve_schema(&self, query: &str) -> Result<Vec<ColumnDef>, BoxError>;
}

/// One histogram level.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub value: serde_json::Value,
    pub count: u64,
    pub proportion: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramData {
    /// Distinct values in order. A backend may stop after `SKIP_LEVEL + 1`
    /// levels, since such a field is skipped anyway.
    pub levels: Vec<Level>,
    pub total: u64,
    pub figure: Figure,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuantileData {
    pub total: u64,
    pub figure: Figure,
}

#[derive(Debug, Clone, PartialEq)]
pub struct XyData {
    pub rows: usize,
    pub figure: Figure,
}

/// Aggregation of one field (or field group) of a query's results.
pub trait StatsEngine {
    fn histogram(
        &self,
        query: &str,
        field: &str,
        predicate: &Predicate,
    ) -> Result<HistogramData, BoxError>;

    fn quantile(
        &self,
        query: &str,
        field: &str,
        predicate: &Predicate,
    ) -> Result<QuantileData, BoxError>;

    /// `fields[0]` is the x field, the rest are plotted against it.
    fn xy_data(
        &self,
        query: &str,
        predicate: &Predicate,
        fields: &[String],
        color: Option<&str>,
        line: LineStyle,
    ) -> Result<XyData, BoxError>;
}

/// Exports and/or displays a styled figure; returns the files written.
pub trait Renderer {
    fn render(&self, artifact: &PlotArtifact) -> Result<Vec<PathBuf>, BoxError>;
}
