//! Bounded parallel probing.
//!
//! Probes are independent per file, so they fan out over a small rayon
//! pool. The results are cached by path and replayed to the sequential
//! timeline fold.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use super::duration::DurationResolver;

/// Durations resolved ahead of the timeline fold.
#[derive(Debug, Clone, Default)]
pub struct ProbeCache {
    durations: HashMap<PathBuf, Option<f64>>,
}

impl ProbeCache {
    /// Resolve every distinct path with at most `max_concurrency` probes in flight.
    pub fn resolve_all(
        paths: &[PathBuf],
        resolver: &dyn DurationResolver,
        max_concurrency: usize,
    ) -> Self {
        let mut seen = HashSet::new();
        let unique: Vec<&PathBuf> = paths.iter().filter(|p| seen.insert(*p)).collect();

        if unique.is_empty() {
            return Self::default();
        }

        let probe = |path: &&PathBuf| ((*path).clone(), resolver.resolve(path));

        let durations: HashMap<PathBuf, Option<f64>> = match ThreadPoolBuilder::new()
            .num_threads(max_concurrency.max(1))
            .thread_name(|i| format!("abm-probe-{i}"))
            .build()
        {
            Ok(pool) => pool.install(|| unique.par_iter().map(probe).collect()),
            Err(e) => {
                tracing::warn!("Probe pool unavailable ({}), probing sequentially", e);
                unique.iter().map(probe).collect()
            }
        };

        Self { durations }
    }

    /// Number of probed files.
    pub fn len(&self) -> usize {
        self.durations.len()
    }

    /// Check if nothing was probed.
    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    /// Number of probes that returned no duration.
    pub fn unresolved_count(&self) -> usize {
        self.durations.values().filter(|d| d.is_none()).count()
    }
}

impl DurationResolver for ProbeCache {
    fn resolve(&self, path: &Path) -> Option<f64> {
        self.durations.get(path).copied().flatten()
    }
}
