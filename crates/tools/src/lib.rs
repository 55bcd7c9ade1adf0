//! `globe-cluster`: run the clustering engine over a station catalog file.
//!
//! Output is JSON on stdout; logs go to stderr (`RUST_LOG` controls them).

use std::io::Write;
use std::path::{Path, PathBuf};

use catalog::Catalog;
use clap::{Args, Parser, Subcommand};
use clustering::{ClusterSet, ClusteringConfig, GridPolicy, Strategy, ZoomTier, cluster_with_policy};
use scene::{SelectionController, SelectionEvent, SelectionState, SideEffect, TransitionContext};
use serde::Serialize;
use tracing::info;

/// Camera altitude assumed when neither `--altitude` nor `--grid` is given.
pub const DEFAULT_ALTITUDE_M: f64 = 20_000_000.0;

#[derive(Debug, Parser)]
#[command(name = "globe-cluster", about = "Zoom-adaptive clustering of geolocated stations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Cluster a catalog and print the resulting set.
    Cluster(ClusterArgs),
    /// Select one cluster and print its drill-down plan and side effects.
    Drill {
        #[command(flatten)]
        args: ClusterArgs,
        /// Index into the cluster list of the computed set.
        #[arg(long)]
        cluster: usize,
    },
    /// Print the zoom tier table in effect.
    Tiers {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct ClusterArgs {
    /// Station catalog (JSON list or `{"stations": [...]}`).
    pub catalog: PathBuf,
    /// Camera altitude in metres; picks the grid size from the zoom tiers.
    #[arg(long, conflicts_with = "grid")]
    pub altitude: Option<f64>,
    /// Explicit grid size in degrees; 0 disables grouping.
    #[arg(long)]
    pub grid: Option<f64>,
    /// Overrides the strategy from the config file.
    #[arg(long)]
    pub strategy: Option<Strategy>,
    /// Clustering config (JSON); defaults apply for absent fields.
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Debug, Serialize)]
struct ClusterOutput<'a> {
    stations: usize,
    skipped: usize,
    set: &'a ClusterSet,
}

#[derive(Debug, Serialize)]
struct DrillOutput<'a> {
    label: &'a str,
    selection: &'a SelectionState,
    effects: &'a [SideEffect],
}

pub fn run(cli: Cli, out: &mut impl Write) -> Result<(), String> {
    match cli.command {
        Command::Cluster(args) => cmd_cluster(&args, out),
        Command::Drill { args, cluster } => cmd_drill(&args, cluster, out),
        Command::Tiers { config } => cmd_tiers(config.as_deref(), out),
    }
}

pub fn load_config(path: Option<&Path>) -> Result<ClusteringConfig, String> {
    match path {
        Some(p) => ClusteringConfig::from_path(p).map_err(|e| format!("config {p:?}: {e}")),
        None => Ok(ClusteringConfig::default()),
    }
}

/// `--grid` wins over `--altitude`; neither means [`DEFAULT_ALTITUDE_M`].
pub fn resolve_policy(config: &ClusteringConfig, altitude: Option<f64>, grid: Option<f64>) -> GridPolicy {
    match grid {
        Some(g) if g.is_finite() && g > 0.0 => GridPolicy::Cells { grid_size_deg: g },
        Some(_) => GridPolicy::PerStation,
        None => config
            .tiers
            .policy_for_altitude(altitude.unwrap_or(DEFAULT_ALTITUDE_M)),
    }
}

fn compute(args: &ClusterArgs) -> Result<(ClusterSet, usize), String> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(strategy) = args.strategy {
        config.strategy = strategy;
    }
    let (catalog, report) =
        Catalog::from_path(&args.catalog).map_err(|e| format!("catalog {:?}: {e}", args.catalog))?;
    info!("loaded {} stations ({} skipped)", report.loaded, report.skipped());

    let policy = resolve_policy(&config, args.altitude, args.grid);
    Ok((cluster_with_policy(catalog.stations(), &config, policy), report.skipped()))
}

fn cmd_cluster(args: &ClusterArgs, out: &mut impl Write) -> Result<(), String> {
    let (set, skipped) = compute(args)?;
    let output = ClusterOutput {
        stations: set.placed_count(),
        skipped,
        set: &set,
    };
    write_json(out, &output, args.pretty)
}

fn cmd_drill(args: &ClusterArgs, index: usize, out: &mut impl Write) -> Result<(), String> {
    let (set, _) = compute(args)?;
    let cluster = set.clusters.get(index).ok_or_else(|| {
        format!("cluster index {index} out of range ({} clusters)", set.clusters.len())
    })?;

    let mut controller = SelectionController::new();
    let effects = controller.apply(
        SelectionEvent::PickCluster {
            cluster: cluster.clone(),
        },
        TransitionContext::default(),
    );
    let output = DrillOutput {
        label: cluster.display_label(),
        selection: controller.state(),
        effects: &effects,
    };
    write_json(out, &output, args.pretty)
}

fn cmd_tiers(config: Option<&Path>, out: &mut impl Write) -> Result<(), String> {
    let config = load_config(config)?;
    let tiers: &[ZoomTier] = config.tiers.tiers();
    write_json(out, &tiers, true)
}

fn write_json(out: &mut impl Write, value: &impl Serialize, pretty: bool) -> Result<(), String> {
    let encoded = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| format!("encode output: {e}"))?;
    writeln!(out, "{encoded}").map_err(|e| format!("write output: {e}"))
}
