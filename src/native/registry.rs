//! Process-wide cache of opened native libraries.
//!
//! Keyed by library path, append-only: a library is opened at most once per
//! process and never closed. Failed loads are not cached, so a corrected path
//! can be retried by the next job.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use libloading::Library;
use once_cell::sync::Lazy;

use crate::error::PhonexError;

static LIBRARIES: Lazy<Mutex<HashMap<PathBuf, Arc<Library>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn cache_key(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Returns the cached handle for `path`, opening the library on first use.
pub fn load_library(path: &Path) -> Result<Arc<Library>, PhonexError> {
    let key = cache_key(path);
    let mut libraries = LIBRARIES
        .lock()
        .map_err(|_| PhonexError::InternalError("native library registry is poisoned".to_string()))?;

    if let Some(library) = libraries.get(&key) {
        return Ok(Arc::clone(library));
    }

    // SAFETY: opening runs the library's initialisers; the configured libraries
    // are plain C encoders without global side effects.
    let library = unsafe { Library::new(&key) }.map_err(|err| PhonexError::LibraryLoad {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;
    let library = Arc::new(library);
    libraries.insert(key, Arc::clone(&library));
    log::info!("Loaded native library '{}'", path.display());
    Ok(library)
}

pub fn is_loaded(path: &Path) -> bool {
    LIBRARIES
        .lock()
        .map(|libraries| libraries.contains_key(&cache_key(path)))
        .unwrap_or(false)
}
