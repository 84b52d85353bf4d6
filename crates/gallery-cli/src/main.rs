//! Command line interface for the gallery wall.
//!
//! Runs the HTTP server and offers offline inspection of the diagram and the
//! stored placements.

mod commands;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gallery")]
#[command(about = "Gallery wall server and tools", long_about = None)]
#[command(version)]
enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),

    /// List the tiles classified from a diagram
    Tiles {
        /// SVG diagram of the wall
        #[arg(long, default_value = "static/grid_full.svg")]
        diagram: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Count tiles per size class and how many are occupied
    Count {
        /// SVG diagram of the wall
        #[arg(long, default_value = "static/grid_full.svg")]
        diagram: PathBuf,

        /// Directory holding the stored placements
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },

    /// Report placements on tiles the diagram no longer has
    Reconcile {
        /// SVG diagram of the wall
        #[arg(long, default_value = "static/grid_full.svg")]
        diagram: PathBuf,

        /// Directory holding the stored placements
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Drop stale placements and stamp the store with the current layout
        #[arg(long)]
        apply: bool,
    },
}

/// Overrides applied on top of the config file.
#[derive(clap::Args)]
pub struct ServeArgs {
    /// JSON config file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    bind: Option<SocketAddr>,

    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[arg(long)]
    diagram: Option<PathBuf>,

    #[arg(long)]
    upload_dir: Option<PathBuf>,

    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Pin required by admin routes
    #[arg(long)]
    admin_pin: Option<String>,

    /// Snapshots kept per undo stack
    #[arg(long)]
    undo_depth: Option<usize>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    match Commands::parse() {
        Commands::Serve(args) => commands::serve(args),
        Commands::Tiles { diagram, json } => commands::tiles(&diagram, json),
        Commands::Count { diagram, data_dir } => commands::count(&diagram, &data_dir),
        Commands::Reconcile {
            diagram,
            data_dir,
            apply,
        } => commands::reconcile(&diagram, &data_dir, apply),
    }
}
