#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the helpline dashboard engine.
//!
//! Loads the call table, city shapes and populations, applies a filter
//! built from `dashboard.toml` and command-line flags, and prints the
//! resulting chart or map state as JSON on stdout.

mod config;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use helpline_analytics::{aggregate, filter, present};
use helpline_analytics_models::{Filter, Window};
use helpline_category::{color::CategoryColors, registry};
use helpline_category_models::CategoryTaxonomy;
use helpline_dataset::LoadedData;
use serde::Serialize;

use crate::config::DashboardConfig;

#[derive(Parser)]
#[command(name = "helpline_dashboard", about = "Helpline call dashboard engine")]
struct Cli {
    /// Config file (defaults to `dashboard.toml` when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Wide call table (CSV)
    #[arg(long, global = true)]
    table: Option<PathBuf>,
    /// City polygons (`GeoJSON`)
    #[arg(long, global = true)]
    shapes: Option<PathBuf>,
    /// City populations (JSON object of name to count)
    #[arg(long, global = true)]
    populations: Option<PathBuf>,
    /// Category taxonomy (TOML); the built-in taxonomy is used otherwise
    #[arg(long, global = true)]
    taxonomy: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dates a range selection resolves to
    Window {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Print the stacked chart state and legend
    Chart {
        #[command(flatten)]
        filter: FilterArgs,
        /// Moving-average window in days (overrides `[chart]` config)
        #[arg(long)]
        smooth: Option<usize>,
        /// Plot raw daily counts
        #[arg(long, conflicts_with = "smooth")]
        raw: bool,
        /// Include minor categories in the legend
        #[arg(long)]
        show_minor: bool,
    },
    /// Print the map's per-city values, colors and summary table
    Map {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Report join failures and `All Areas` consistency issues
    Check,
}

/// Filter overrides shared by the data subcommands.
#[derive(Args)]
struct FilterArgs {
    /// City to chart (e.g., "Providence")
    #[arg(long)]
    city: Option<String>,
    /// Category label, or "All Categories"
    #[arg(long)]
    category: Option<String>,
    /// Range selection (e.g., "Week", "3 Months", "All Dates")
    #[arg(long)]
    range: Option<String>,
    /// Explicit start date, YYYY-MM-DD
    #[arg(long)]
    start: Option<String>,
    /// Explicit end date, YYYY-MM-DD
    #[arg(long)]
    end: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WindowOutput<'a> {
    filter: &'a Filter,
    window: Window,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChartOutput<'a> {
    filter: &'a Filter,
    chart: Option<helpline_analytics_models::ChartState>,
    legend: Vec<helpline_analytics_models::LegendEntry>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MapOutput<'a> {
    filter: &'a Filter,
    map: Option<helpline_analytics_models::MapAggregate>,
    choropleth: Option<helpline_analytics_models::ChoroplethState>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckOutput<'a> {
    rows: usize,
    dates: usize,
    date_range: Option<helpline_dataset_models::DateRange>,
    join_report: &'a helpline_dataset_models::region::JoinReport,
    consistency_issues: &'a [helpline_dataset_models::ConsistencyIssue],
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let mut config = config::load(cli.config.as_deref())?;
    apply_path_overrides(&mut config, &cli);

    let taxonomy = match &config.data.taxonomy {
        Some(path) => registry::load_file(path)?,
        None => registry::default_taxonomy(),
    };

    let loaded = helpline_dataset::load_all(&config.data.paths()).await?;
    if !loaded.join_report.is_clean() {
        log::warn!(
            "Join problems: {} cities without shapes, {} without populations, {} unmatched shapes",
            loaded.join_report.missing_shape.len(),
            loaded.join_report.missing_population.len(),
            loaded.join_report.unmatched_shapes.len(),
        );
    }

    let json = match &cli.command {
        Commands::Window { filter: args } => {
            let filter = build_filter(&loaded, &config, args)?;
            let window = filter.window();
            serde_json::to_string_pretty(&WindowOutput {
                filter: &filter,
                window,
            })?
        }
        Commands::Chart {
            filter: args,
            smooth,
            raw,
            show_minor,
        } => {
            let filter = build_filter(&loaded, &config, args)?;
            let smoothing = if *raw {
                None
            } else {
                Some(smooth.unwrap_or(config.chart.smoothing_window)).filter(|days| *days > 0)
            };
            run_chart(&loaded, &taxonomy, &filter, smoothing, *show_minor)?
        }
        Commands::Map { filter: args } => {
            let filter = build_filter(&loaded, &config, args)?;
            let map = aggregate::aggregate_for_map(&loaded.dataset, &filter);
            if map.is_none() {
                log::warn!("Filter has no valid date window; nothing to show");
            }
            let choropleth = map
                .as_ref()
                .map(|m| present::choropleth(m, &filter, &loaded.populations));
            serde_json::to_string_pretty(&MapOutput {
                filter: &filter,
                map,
                choropleth,
            })?
        }
        Commands::Check => serde_json::to_string_pretty(&CheckOutput {
            rows: loaded.dataset.rows().len(),
            dates: loaded.dataset.axis().len(),
            date_range: loaded.dataset.date_range(),
            join_report: &loaded.join_report,
            consistency_issues: &loaded.consistency_issues,
        })?,
    };

    println!("{json}");
    Ok(())
}

fn apply_path_overrides(config: &mut DashboardConfig, cli: &Cli) {
    if let Some(table) = &cli.table {
        config.data.table.clone_from(table);
    }
    if let Some(shapes) = &cli.shapes {
        config.data.shapes.clone_from(shapes);
    }
    if let Some(populations) = &cli.populations {
        config.data.populations.clone_from(populations);
    }
    if cli.taxonomy.is_some() {
        config.data.taxonomy.clone_from(&cli.taxonomy);
    }
}

/// Builds the filter from the dataset's dates, then `[filter]` config, then
/// command-line flags.
fn build_filter(
    loaded: &LoadedData,
    config: &DashboardConfig,
    args: &FilterArgs,
) -> Result<Filter, Box<dyn std::error::Error>> {
    let date_range = loaded
        .dataset
        .date_range()
        .ok_or("Call table has no date columns")?;

    let mut current = filter::initial_filter(date_range);
    current = filter::with_range(&current, config.filter.range);
    current = filter::with_city(&current, config.filter.city.clone());
    current = filter::with_category(&current, config.filter.category.clone());

    if let Some(range) = &args.range {
        current = filter::with_range(&current, filter::parse_range(range)?);
    }
    if let Some(start) = &args.start {
        current = filter::with_start_date(&current, filter::parse_date_input(start)?);
    }
    if let Some(end) = &args.end {
        current = filter::with_end_date(&current, filter::parse_date_input(end)?);
    }
    if let Some(city) = &args.city {
        current = filter::with_city(&current, city.as_str());
    }
    if let Some(category) = &args.category {
        current = filter::with_category(&current, category.as_str());
    }

    if !current.is_all_areas() && loaded.shapes.find(&current.city).is_none() {
        log::warn!("'{}' has no map tile", current.city);
    }
    log::debug!("Filter: {current:?}");

    Ok(current)
}

fn run_chart(
    loaded: &LoadedData,
    taxonomy: &CategoryTaxonomy,
    filter: &Filter,
    smoothing: Option<usize>,
    show_minor: bool,
) -> Result<String, serde_json::Error> {
    let colors = CategoryColors::new(taxonomy);

    let aggregate =
        aggregate::aggregate_for_chart_with_window(&loaded.dataset, taxonomy, filter, smoothing);
    if aggregate.is_none() {
        log::warn!("Filter has no valid date window; nothing to show");
    }
    let chart = aggregate
        .as_ref()
        .and_then(|a| present::chart_state(a, filter, smoothing, &colors));

    serde_json::to_string_pretty(&ChartOutput {
        filter,
        chart,
        legend: present::legend(taxonomy, &colors, show_minor),
    })
}
