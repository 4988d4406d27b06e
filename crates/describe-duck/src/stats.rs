//! Histogram, quantile and XY aggregation in DuckDB.

use describe_engine::{
    sql_ident, BoxError, HistogramData, Level, Predicate, QuantileData, StatsEngine, XyData,
    SKIP_LEVEL,
};
use describe_model::LineStyle;
use describe_vega::{histogram_figure, quantile_figure, xy_figure};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{DuckError, DuckStore};

/// Quantiles are evaluated at u = 0, 0.01, ..., 1.
pub const QUANTILE_POINTS: usize = 101;

fn quantile_grid() -> Vec<f64> {
    (0..QUANTILE_POINTS)
        .map(|i| i as f64 / (QUANTILE_POINTS - 1) as f64)
        .collect()
}

fn unexpected(query: &str, detail: impl Into<String>) -> DuckError {
    DuckError::UnexpectedResult {
        query: query.to_string(),
        detail: detail.into(),
    }
}

fn as_count(query: &str, value: &Value) -> Result<u64, DuckError> {
    value
        .as_u64()
        .ok_or_else(|| unexpected(query, format!("expected a count, got {value}")))
}

/// Statistics engine running its aggregations in the store's connection.
pub struct DuckStats<'a> {
    store: &'a DuckStore,
}

impl<'a> DuckStats<'a> {
    pub fn new(store: &'a DuckStore) -> Self {
        Self { store }
    }

    /// Levels of `field` in order, with their proportions of all rows.
    ///
    /// At most `SKIP_LEVEL + 1` levels are fetched; past the ceiling no
    /// figure is built.
    pub fn levels(
        &self,
        query: &str,
        field: &str,
        predicate: &Predicate,
    ) -> Result<HistogramData, DuckError> {
        let filtered = format!("({query}) AS src{}", predicate.where_clause());
        let sql = format!(
            "SELECT {} AS level, count(*) AS n FROM {filtered} \
             GROUP BY 1 ORDER BY 1 NULLS LAST LIMIT {}",
            sql_ident(field),
            SKIP_LEVEL + 1
        );
        debug!(%sql, "histogram");

        let rows = self.store.rows(&sql)?.rows;
        let mut counted = Vec::with_capacity(rows.len());
        for mut row in rows {
            if row.len() != 2 {
                return Err(unexpected(&sql, "expected level and count columns"));
            }
            let count = as_count(&sql, &row[1])?;
            counted.push((row.swap_remove(0), count));
        }

        let total = self.count(&format!("SELECT count(*) FROM {filtered}"))?;
        let levels: Vec<Level> = counted
            .into_iter()
            .map(|(value, count)| Level {
                value,
                count,
                proportion: if total == 0 {
                    0.0
                } else {
                    count as f64 / total as f64
                },
            })
            .collect();

        let figure = if levels.len() > SKIP_LEVEL {
            debug!(field, "too many levels, no figure");
            histogram_figure(&[])
        } else {
            histogram_figure(&levels)
        };

        Ok(HistogramData {
            figure,
            levels,
            total,
        })
    }

    fn count(&self, sql: &str) -> Result<u64, DuckError> {
        match self.store.rows(sql)?.rows.first() {
            Some(row) => as_count(sql, row.first().unwrap_or(&Value::Null)),
            None => Ok(0),
        }
    }

    pub fn quantiles(
        &self,
        query: &str,
        field: &str,
        predicate: &Predicate,
    ) -> Result<QuantileData, DuckError> {
        let filtered = format!("({query}) AS src{}", predicate.where_clause());

        let field = sql_ident(field);
        let total = self.count(&format!("SELECT count({field}) FROM {filtered}"))?;

        let grid = quantile_grid();
        let mut points = Vec::with_capacity(grid.len());
        if total > 0 {
            let list = grid
                .iter()
                .map(|u| format!("{u:.2}"))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "SELECT unnest(q) FROM \
                 (SELECT quantile_cont(CAST({field} AS DOUBLE), [{list}]::DOUBLE[]) AS q FROM {filtered})"
            );
            debug!(%sql, "quantile");

            let rows = self.store.rows(&sql)?.rows;
            if rows.len() != grid.len() {
                return Err(unexpected(
                    &sql,
                    format!("expected {} quantiles, got {}", grid.len(), rows.len()),
                ));
            }
            for (u, row) in grid.iter().zip(rows) {
                if let Some(v) = row.first().and_then(Value::as_f64) {
                    points.push((*u, v));
                }
            }
        }

        Ok(QuantileData {
            total,
            figure: quantile_figure(&points),
        })
    }

    pub fn pairs(
        &self,
        query: &str,
        predicate: &Predicate,
        fields: &[String],
        color: Option<&str>,
        line: LineStyle,
    ) -> Result<XyData, DuckError> {
        let mut columns: Vec<&str> = fields.iter().map(String::as_str).collect();
        if let Some(c) = color {
            if !columns.contains(&c) {
                columns.push(c);
            }
        }

        let projection = columns
            .iter()
            .map(|c| sql_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {projection} FROM ({query}) AS src{}",
            predicate.where_clause()
        );
        debug!(%sql, "xy");

        let result = self.store.rows(&sql)?;
        let rows: Vec<Map<String, Value>> = result
            .rows
            .into_iter()
            .map(|row| result.columns.iter().cloned().zip(row).collect())
            .collect();

        Ok(XyData {
            rows: rows.len(),
            figure: xy_figure(rows, fields, color, line),
        })
    }
}

impl StatsEngine for DuckStats<'_> {
    fn histogram(
        &self,
        query: &str,
        field: &str,
        predicate: &Predicate,
    ) -> Result<HistogramData, BoxError> {
        Ok(self.levels(query, field, predicate)?)
    }

    fn quantile(
        &self,
        query: &str,
        field: &str,
        predicate: &Predicate,
    ) -> Result<QuantileData, BoxError> {
        Ok(self.quantiles(query, field, predicate)?)
    }

    fn xy_data(
        &self,
        query: &str,
        predicate: &Predicate,
        fields: &[String],
        color: Option<&str>,
        line: LineStyle,
    ) -> Result<XyData, BoxError> {
        Ok(self.pairs(query, predicate, fields, color, line)?)
    }
}
