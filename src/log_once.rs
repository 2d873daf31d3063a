//! Report each unimplemented feature once per process.
//!
//! Content using a feature the renderer does not support still renders
//! with a fallback, and a movie can hit the same feature thousands of
//! times per frame. Only the first hit is logged.

use std::collections::HashSet;
use std::sync::Mutex;

use once_cell::sync::Lazy;

static SEEN: Lazy<Mutex<HashSet<&'static str>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Returns true the first time `key` is passed in this process.
pub fn first_time(key: &'static str) -> bool {
    match SEEN.lock() {
        Ok(mut seen) => seen.insert(key),
        // A panic while holding the lock only loses deduplication.
        Err(poisoned) => poisoned.into_inner().insert(key),
    }
}

/// Warn that `feature` is not implemented, once.
pub fn unimplemented(feature: &'static str) {
    if first_time(feature) {
        log::warn!("unimplemented feature: {}", feature);
    }
}
