//! In-memory backend for development and testing.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use gallery_core::{unix_millis, Error, Occupancy, Result};

use crate::backend::{PlacementBackend, StoredOccupancy};

/// Backend that keeps placements in process memory.
///
/// Clones share the same storage, so a test can keep a handle to inspect or
/// sabotage a backend it has handed to a store.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<StoredOccupancy>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing placements.
    pub fn with_placements(placements: Occupancy, layout: Option<&str>) -> Self {
        let backend = Self::new();
        if let Ok(mut state) = backend.state.lock() {
            state.placements = placements;
            state.layout = layout.map(str::to_string);
        }
        backend
    }

    /// Make every subsequent `replace_all` fail without touching the state.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn poisoned() -> Error {
        Error::Other("Memory backend lock poisoned".into())
    }
}

impl PlacementBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn load(&self) -> Result<StoredOccupancy> {
        let state = self.state.lock().map_err(|_| Self::poisoned())?;
        Ok(state.clone())
    }

    fn replace_all(&mut self, placements: &Occupancy, layout: Option<&str>) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Io(io::Error::other("simulated write failure")));
        }
        let mut state = self.state.lock().map_err(|_| Self::poisoned())?;
        *state = StoredOccupancy {
            layout: layout.map(str::to_string),
            placements: placements.clone(),
            updated_at: unix_millis(),
        };
        Ok(())
    }
}
