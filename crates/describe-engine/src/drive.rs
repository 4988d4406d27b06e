//! Task drivers: resolve the fields of a run and plot them one at a time.
//!
//! The first failing field stops the run; the error names that field.

use describe_model::{ColumnDef, ConfigError, PlotKind, RunSpec, Source, Task};
use tracing::{debug, info};

use crate::{
    classify, extraction_query, missing_predicate, query_field, table_field, EngineError,
    FieldOutcome, FieldPlot, Predicate, QueryStore, Renderer, StatsEngine,
};

/// What a run produced, in field order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub outcomes: Vec<FieldOutcome>,
}

impl RunReport {
    pub fn rendered(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FieldOutcome::Rendered { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FieldOutcome::Skipped { .. }))
            .count()
    }
}

/// Drives one run against a store, a statistics engine and a renderer.
pub struct Describer<'a> {
    run: &'a RunSpec,
    store: &'a dyn QueryStore,
    stats: &'a dyn StatsEngine,
    renderer: &'a dyn Renderer,
}

impl<'a> Describer<'a> {
    pub fn new(
        run: &'a RunSpec,
        store: &'a dyn QueryStore,
        stats: &'a dyn StatsEngine,
        renderer: &'a dyn Renderer,
    ) -> Self {
        Self {
            run,
            store,
            stats,
            renderer,
        }
    }

    pub fn run(&self) -> &RunSpec {
        self.run
    }

    pub(crate) fn stats(&self) -> &dyn StatsEngine {
        self.stats
    }

    pub(crate) fn renderer(&self) -> &dyn Renderer {
        self.renderer
    }

    /// Run the task selected for this run.
    pub fn drive(&self) -> Result<RunReport, EngineError> {
        match (self.run.task, &self.run.source) {
            (Task::Index, _) => Ok(RunReport::default()),
            (Task::Table, Some(Source::Table(table))) => self.table(table),
            (Task::Query, Some(Source::Query(query))) => {
                let columns = self.resolve(query)?;
                self.multiple(query, &columns)
            }
            (Task::Xy, Some(Source::Query(query))) => {
                let columns = self.resolve(query)?;
                self.xy(query, &columns)
            }
            _ => Err(ConfigError::MissingSource.into()),
        }
    }

    fn resolve(&self, query: &str) -> Result<Vec<ColumnDef>, EngineError> {
        let columns = self
            .store
            .resolve_schema(query)
            .map_err(EngineError::Schema)?;
        debug!(columns = columns.len(), "resolved query schema");
        Ok(columns)
    }

    /// Plot every column of a table, in the store's column order.
    pub fn table(&self, table: &str) -> Result<RunReport, EngineError> {
        let columns = self.store.schema(table).map_err(EngineError::Schema)?;
        let source = Source::Table(table.to_string());
        let mut report = RunReport::default();

        for column in &columns {
            let comment = self
                .store
                .comment(table, &column.name)
                .unwrap_or_else(|e| {
                    debug!(field = %column.name, error = %e, "no column comment");
                    None
                });
            let field = table_field(column, comment)?;
            let predicate =
                missing_predicate(&self.run.sentinels, &field.output_name, &field.declared);
            let query = extraction_query(&source, &field);
            let label = match &field.comment {
                Some(comment) => format!("{}: {}", field.name, comment),
                None => field.name.clone(),
            };

            info!(field = %field.name, kind = %field.plot_kind(), "describing");
            debug!(%query, %predicate, "extraction");

            let outcome = self.field_plot(&FieldPlot {
                query: &query,
                field: &field.output_name,
                label: &label,
                predicate: &predicate,
                kind: field.plot_kind(),
                file_stem: &field.output_name,
            })?;
            report.outcomes.push(outcome);
        }

        Ok(report)
    }

    /// Plot every column of a query's results.
    pub fn multiple(&self, query: &str, columns: &[ColumnDef]) -> Result<RunReport, EngineError> {
        let mut report = RunReport::default();

        for column in columns {
            let field = query_field(column);
            let predicate = missing_predicate(&self.run.sentinels, &field.name, &field.declared);

            info!(field = %field.name, kind = %field.plot_kind(), "describing");
            debug!(%predicate, "extraction");

            let outcome = self.field_plot(&FieldPlot {
                query,
                field: &field.name,
                label: &field.name,
                predicate: &predicate,
                kind: field.plot_kind(),
                file_stem: &field.name,
            })?;
            report.outcomes.push(outcome);
        }

        Ok(report)
    }

    /// One XY plot of the configured field group.
    pub fn xy(&self, query: &str, columns: &[ColumnDef]) -> Result<RunReport, EngineError> {
        let fields = &self.run.xy;
        let Some(x) = fields.first() else {
            return Err(EngineError::NoFields);
        };

        let mut predicate = Predicate::none();
        for name in fields {
            let column = columns
                .iter()
                .find(|c| c.name == *name)
                .ok_or_else(|| EngineError::UnknownField {
                    field: name.clone(),
                })?;
            let declared = classify(&column.declared_type);
            predicate = predicate.and(missing_predicate(&self.run.sentinels, name, &declared));
        }

        let stem = self
            .run
            .file_name
            .clone()
            .unwrap_or_else(|| format!("{}Vs{}", x, fields[1..].join("_")));

        info!(fields = %fields.join(","), "describing xy");
        debug!(%predicate, "extraction");

        let outcome = self.field_plot(&FieldPlot {
            query,
            field: x,
            label: x,
            predicate: &predicate,
            kind: PlotKind::Xy,
            file_stem: &stem,
        })?;

        Ok(RunReport {
            outcomes: vec![outcome],
        })
    }
}
