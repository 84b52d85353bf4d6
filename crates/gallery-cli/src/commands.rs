//! Command implementations for the gallery CLI.

use std::path::Path;

use anyhow::{Context, Result};
use gallery_layout::{LayoutCache, TileLayout};
use gallery_server::ServerConfig;
use gallery_store::{JsonFileBackend, OccupancyStore};
use gallery_wall::Wall;

use crate::ServeArgs;

fn load_layout(diagram: &Path) -> Result<TileLayout> {
    let svg = std::fs::read_to_string(diagram)
        .with_context(|| format!("Failed to read diagram {}", diagram.display()))?;
    Ok(TileLayout::new(gallery_layout::classify(&svg)))
}

fn open_wall(diagram: &Path, data_dir: &Path) -> Result<Wall> {
    let layout = load_layout(diagram)?;
    let store = OccupancyStore::new(Box::new(JsonFileBackend::in_dir(data_dir)));
    Ok(Wall::new(store, LayoutCache::preloaded(layout)))
}

/// Serve command: run the HTTP server until interrupted.
pub fn serve(args: ServeArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::from_path(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(diagram) = args.diagram {
        config.diagram = diagram;
    }
    if let Some(upload_dir) = args.upload_dir {
        config.upload_dir = upload_dir;
    }
    if let Some(static_dir) = args.static_dir {
        config.static_dir = static_dir;
    }
    if args.admin_pin.is_some() {
        config.admin_pin = args.admin_pin;
    }
    if let Some(depth) = args.undo_depth {
        config.undo_depth = depth;
    }

    tracing::debug!(
        bind = %config.bind,
        data_dir = %config.data_dir.display(),
        undo_depth = config.undo_depth,
        "starting server"
    );
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(gallery_server::serve(config))
}

/// Tiles command: print every classified tile in diagram order.
pub fn tiles(diagram: &Path, json: bool) -> Result<()> {
    let layout = load_layout(diagram)?;

    if json {
        println!("{}", serde_json::to_string_pretty(layout.tiles())?);
        return Ok(());
    }

    println!("Tiles in {}: {}", diagram.display(), layout.len());
    println!("Fingerprint: {}", layout.fingerprint());
    println!();
    for tile in layout.tiles() {
        println!(
            "  {:<6} {:<4} left={:<8.1} top={:<8.1} {}x{}",
            tile.id.as_str(),
            tile.size.name(),
            tile.left,
            tile.top,
            tile.width,
            tile.height
        );
    }
    Ok(())
}

/// Count command: size breakdown of the layout plus occupancy totals.
pub fn count(diagram: &Path, data_dir: &Path) -> Result<()> {
    let mut wall = open_wall(diagram, data_dir)?;
    let layout = wall.layout();
    let occupancy = wall.occupancy().context("Failed to load placements")?;

    println!("Tile size breakdown");
    println!();
    for (size, total) in layout.count_by_size() {
        let occupied = layout
            .of_size(size)
            .filter(|tile| occupancy.is_occupied(&tile.id))
            .count();
        println!(
            "  {:<4} ({:<2}) {:>5} tiles, {:>5} occupied",
            size.name(),
            size.prefix(),
            total,
            occupied
        );
    }
    println!();
    println!("Total tiles:     {}", layout.len());
    println!("Placed artworks: {}", occupancy.len());

    let stale = wall.stale_tiles()?;
    if !stale.is_empty() {
        println!("Stale placements: {} (run `gallery reconcile`)", stale.len());
    }
    Ok(())
}

/// Reconcile command: show or drop placements on unknown tiles.
pub fn reconcile(diagram: &Path, data_dir: &Path, apply: bool) -> Result<()> {
    let mut wall = open_wall(diagram, data_dir)?;
    let stale = wall.stale_tiles().context("Failed to load placements")?;
    let current = wall.is_layout_current()?;

    println!("Layout fingerprint: {}", wall.layout().fingerprint());
    println!(
        "Stored placements match this layout: {}",
        if current { "yes" } else { "no" }
    );
    println!("Stale placements: {}", stale.len());
    for tile in &stale {
        println!("  {}", tile);
    }

    if !apply {
        if !stale.is_empty() || !current {
            println!();
            println!("Run again with --apply to drop them and stamp the store.");
        }
        return Ok(());
    }

    let report = wall.reconcile()?;
    println!();
    println!(
        "Dropped {} placement(s); store stamped with {}",
        report.dropped.len(),
        report.fingerprint
    );
    Ok(())
}
