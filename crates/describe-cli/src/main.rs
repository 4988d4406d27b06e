//! describe: one plot per field of a DuckDB table or query
//!
//! Histograms for discrete fields, quantile plots for floating-point fields
//! and XY plots for a chosen field group, exported as Vega-Lite pages or
//! images, plus a markdown index of an output directory.

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

use describe_duck::{DuckStats, DuckStore};
use describe_engine::{markdown, Describer, RunReport};
use describe_model::{RunSpec, Task};
use describe_vega::VegaRenderer;

mod args;
mod config;
mod logging;

use args::Cli;
use config::Config;

fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::discover(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    config.apply_logging_env();
    logging::init();

    let run = RunSpec::from_request(cli.request(&config)?)?;
    debug!(task = ?run.task, source = run.source_text(), "validated run");

    if run.task != Task::Index {
        let report = describe(&run, &config)?;
        info!(
            rendered = report.rendered(),
            skipped = report.skipped(),
            "done"
        );
    }

    if let Some(entries) = markdown(&run)? {
        info!(entries, "wrote markdown index");
    }

    Ok(())
}

fn describe(run: &RunSpec, config: &Config) -> anyhow::Result<RunReport> {
    let settings = config.store.settings();
    let store = match &config.store.database {
        Some(path) => DuckStore::open(path, &settings)
            .with_context(|| format!("failed to open {}", path.display()))?,
        None => DuckStore::open_in_memory(&settings)?,
    };
    let stats = DuckStats::new(&store);
    let renderer = VegaRenderer::new(config.render.render_config());

    Ok(Describer::new(run, &store, &stats, &renderer).drive()?)
}
