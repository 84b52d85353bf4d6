//! Lazily computed, explicitly invalidated layout.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::classify::classify;
use crate::layout::TileLayout;

/// Where the wall diagram comes from.
#[derive(Debug, Clone)]
pub enum DiagramSource {
    /// An SVG file read on every recomputation.
    File(PathBuf),
    /// SVG text held in memory.
    Inline(String),
}

impl DiagramSource {
    /// Load the diagram text. A missing or unreadable file reads as `None`.
    fn read(&self) -> Option<String> {
        match self {
            DiagramSource::File(path) => match fs::read_to_string(path) {
                Ok(svg) => Some(svg),
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "diagram unavailable, layout is empty"
                    );
                    None
                }
            },
            DiagramSource::Inline(svg) => Some(svg.clone()),
        }
    }
}

/// Holds the classified layout for the lifetime of its owner.
///
/// Classification runs on first access and again only after `invalidate`.
#[derive(Debug)]
pub struct LayoutCache {
    source: DiagramSource,
    cached: Option<Arc<TileLayout>>,
}

impl LayoutCache {
    pub fn new(source: DiagramSource) -> Self {
        Self {
            source,
            cached: None,
        }
    }

    /// A cache that is already populated with `layout`.
    pub fn preloaded(layout: TileLayout) -> Self {
        Self {
            source: DiagramSource::Inline(String::new()),
            cached: Some(Arc::new(layout)),
        }
    }

    /// The current layout, classifying the diagram if needed.
    pub fn get(&mut self) -> Arc<TileLayout> {
        if let Some(layout) = &self.cached {
            return Arc::clone(layout);
        }

        let tiles = self.source.read().map(|svg| classify(&svg)).unwrap_or_default();
        let layout = Arc::new(TileLayout::new(tiles));
        tracing::info!(
            tiles = layout.len(),
            fingerprint = layout.fingerprint(),
            "tile layout computed"
        );
        self.cached = Some(Arc::clone(&layout));
        layout
    }

    /// Drop the cached layout so the next `get` re-reads the diagram.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Replace the source and drop the cached layout.
    pub fn set_source(&mut self, source: DiagramSource) {
        self.source = source;
        self.invalidate();
    }

    pub fn is_cached(&self) -> bool {
        self.cached.is_some()
    }
}
