//! Persisted run history.
//!
//! Finished runs are stored most-recent-first in a capped list behind a
//! [`KeyValueStore`]. The newest record's trait list seeds the next run.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use skirmish_common::{StoreError, StoreResult};

use crate::growth::GrowthResult;
use crate::telemetry::{RunResult, TelemetryRecord};
use crate::traits::{parse_trait_ids, TraitId};

/// Store key holding the run list.
pub const RUN_HISTORY_KEY: &str = "skirmish_run_history";
/// Default number of runs kept.
pub const DEFAULT_MAX_RUNS: usize = 20;

/// One finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Milliseconds since the Unix epoch when the run was saved
    pub timestamp: u64,
    /// Frozen telemetry
    pub telemetry: TelemetryRecord,
    /// Profile label
    pub profile_name: String,
    /// Granted trait identifiers
    pub traits: Vec<String>,
}

impl RunRecord {
    /// Builds a record from a resolved run.
    #[must_use]
    pub fn new(timestamp: u64, telemetry: TelemetryRecord, growth: &GrowthResult) -> Self {
        Self {
            timestamp,
            telemetry,
            profile_name: growth.profile.name.as_str().to_string(),
            traits: growth
                .granted_traits
                .iter()
                .map(|t| t.as_str().to_string())
                .collect(),
        }
    }

    /// Granted traits that still parse. Unknown identifiers are skipped.
    #[must_use]
    pub fn trait_ids(&self) -> Vec<TraitId> {
        parse_trait_ids(&self.traits)
    }
}

/// Aggregates over the stored history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CumulativeStats {
    /// Stored runs
    pub total_runs: usize,
    /// Runs survived
    pub victories: usize,
    /// Runs lost
    pub defeats: usize,
    /// Mean run length in seconds
    pub average_duration_secs: f32,
    /// Kills across every stored run
    pub total_kills: u32,
    /// Runs per profile name
    pub profile_counts: BTreeMap<String, usize>,
}

// ============================================================================
// Key/value stores
// ============================================================================

/// String key/value persistence.
pub trait KeyValueStore {
    /// Reads a value. `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Writes a value, replacing any previous one.
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;

    /// Deletes a key. Absent keys are not an error.
    fn remove(&mut self, key: &str) -> StoreResult<()>;
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no keys are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.values.remove(key);
        Ok(())
    }
}

// ============================================================================
// Recorder
// ============================================================================

/// Capped, most-recent-first run history on top of a store.
#[derive(Debug)]
pub struct RunRecorder<S: KeyValueStore> {
    store: S,
    max_runs: usize,
}

impl<S: KeyValueStore> RunRecorder<S> {
    /// Recorder keeping [`DEFAULT_MAX_RUNS`] runs.
    pub fn new(store: S) -> Self {
        Self::with_capacity(store, DEFAULT_MAX_RUNS)
    }

    /// Recorder keeping at most `max_runs` runs (at least one).
    pub fn with_capacity(store: S, max_runs: usize) -> Self {
        Self {
            store,
            max_runs: max_runs.max(1),
        }
    }

    /// Run cap.
    #[must_use]
    pub const fn max_runs(&self) -> usize {
        self.max_runs
    }

    /// Backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the recorder, returning the store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Prepends a record and drops the oldest beyond the cap.
    ///
    /// A failed read aborts the save so the stored history is never replaced.
    pub fn save_run(&mut self, record: RunRecord) -> StoreResult<()> {
        let mut runs = self.load_runs()?;
        runs.insert(0, record);
        runs.truncate(self.max_runs);

        let json = serde_json::to_string(&runs).map_err(|source| StoreError::Serialization {
            key: RUN_HISTORY_KEY.to_string(),
            source,
        })?;
        self.store.set(RUN_HISTORY_KEY, &json)?;
        info!("Saved run record ({} stored)", runs.len());
        Ok(())
    }

    /// Stored runs. Absent or corrupt history is empty; store errors propagate.
    fn load_runs(&self) -> StoreResult<Vec<RunRecord>> {
        let Some(raw) = self.store.get(RUN_HISTORY_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<RunRecord>>(&raw) {
            Ok(runs) => Ok(runs),
            Err(e) => {
                warn!("Discarding corrupt run history: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Every stored run, newest first.
    ///
    /// Unreadable or corrupt history is logged and treated as empty.
    #[must_use]
    pub fn all_runs(&self) -> Vec<RunRecord> {
        self.load_runs().unwrap_or_else(|e| {
            warn!("Failed to read run history: {}", e);
            Vec::new()
        })
    }

    /// Up to `n` newest runs.
    #[must_use]
    pub fn recent_runs(&self, n: usize) -> Vec<RunRecord> {
        let mut runs = self.all_runs();
        runs.truncate(n);
        runs
    }

    /// Newest run, if any.
    #[must_use]
    pub fn latest(&self) -> Option<RunRecord> {
        self.recent_runs(1).into_iter().next()
    }

    /// Traits to seed the next run with.
    #[must_use]
    pub fn carried_traits(&self) -> Vec<TraitId> {
        self.latest().map(|r| r.trait_ids()).unwrap_or_default()
    }

    /// Aggregates over every stored run.
    #[must_use]
    pub fn cumulative_stats(&self) -> CumulativeStats {
        let runs = self.all_runs();
        let mut stats = CumulativeStats {
            total_runs: runs.len(),
            ..Default::default()
        };
        if runs.is_empty() {
            return stats;
        }

        let mut total_duration = 0.0;
        for run in &runs {
            match run.telemetry.run_result {
                RunResult::Victory => stats.victories += 1,
                RunResult::Defeat => stats.defeats += 1,
            }
            total_duration += run.telemetry.run_duration_secs;
            stats.total_kills += run.telemetry.kills.total();
            *stats
                .profile_counts
                .entry(run.profile_name.clone())
                .or_insert(0) += 1;
        }
        stats.average_duration_secs = total_duration / runs.len() as f32;
        stats
    }

    /// Deletes the whole history.
    pub fn clear(&mut self) -> StoreResult<()> {
        self.store.remove(RUN_HISTORY_KEY)?;
        debug!("Cleared run history");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::KillCounts;
    use std::cell::Cell;
    use std::io;

    /// Memory store whose reads can be made to fail.
    #[derive(Debug, Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_reads: Cell<bool>,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> StoreResult<Option<String>> {
            if self.fail_reads.get() {
                return Err(StoreError::Io {
                    key: key.to_string(),
                    source: io::Error::new(io::ErrorKind::PermissionDenied, "read denied"),
                });
            }
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> StoreResult<()> {
            self.inner.remove(key)
        }
    }

    fn record(timestamp: u64, profile: &str, traits: &[&str]) -> RunRecord {
        RunRecord {
            timestamp,
            telemetry: TelemetryRecord {
                run_duration_secs: 60.0,
                kills: KillCounts {
                    rusher: 2,
                    ..Default::default()
                },
                ..Default::default()
            },
            profile_name: profile.to_string(),
            traits: traits.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    #[test]
    fn test_round_trip_latest() {
        let mut recorder = RunRecorder::new(MemoryStore::new());
        for i in 0..5 {
            recorder
                .save_run(record(i, "Balanced", &[]))
                .expect("save");
        }
        let newest = record(99, "Dodge-Counter", &["T1_PHANTOM_TRACE", "T2_REFLEX_BURST"]);
        recorder.save_run(newest.clone()).expect("save");

        let recent = recorder.recent_runs(1);
        assert_eq!(recent, vec![newest]);
    }

    #[test]
    fn test_cap_drops_oldest() {
        let mut recorder = RunRecorder::with_capacity(MemoryStore::new(), 3);
        for i in 0..5 {
            recorder.save_run(record(i, "Balanced", &[])).expect("save");
        }
        let runs = recorder.all_runs();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].timestamp, 4);
        assert_eq!(runs[2].timestamp, 2);
    }

    #[test]
    fn test_carried_traits_skip_unknown() {
        let mut recorder = RunRecorder::new(MemoryStore::new());
        recorder
            .save_run(record(1, "Shield-Control", &["T5_ADAPTIVE_SHIELD", "T9_BOGUS"]))
            .expect("save");
        assert_eq!(recorder.carried_traits(), vec![TraitId::AdaptiveShield]);
    }

    #[test]
    fn test_corrupt_history_is_empty() {
        let mut store = MemoryStore::new();
        store.set(RUN_HISTORY_KEY, "{not json").expect("set");
        let mut recorder = RunRecorder::new(store);
        assert!(recorder.all_runs().is_empty());
        assert!(recorder.carried_traits().is_empty());

        recorder.save_run(record(7, "Balanced", &[])).expect("save");
        assert_eq!(recorder.all_runs().len(), 1);
    }

    #[test]
    fn test_read_failure_keeps_history() {
        let mut recorder = RunRecorder::new(FlakyStore::default());
        for i in 0..5 {
            recorder.save_run(record(i, "Balanced", &[])).expect("save");
        }

        recorder.store().fail_reads.set(true);
        let result = recorder.save_run(record(99, "Balanced", &[]));
        assert!(matches!(result, Err(StoreError::Io { .. })));
        assert!(recorder.all_runs().is_empty());

        recorder.store().fail_reads.set(false);
        let runs = recorder.all_runs();
        assert_eq!(runs.len(), 5);
        assert_eq!(runs[0].timestamp, 4);

        recorder.save_run(record(99, "Balanced", &[])).expect("save");
        assert_eq!(recorder.all_runs().len(), 6);
    }

    #[test]
    fn test_cumulative_stats() {
        let mut recorder = RunRecorder::new(MemoryStore::new());
        recorder.save_run(record(1, "Balanced", &[])).expect("save");
        let mut lost = record(2, "Brawler", &[]);
        lost.telemetry.run_result = RunResult::Defeat;
        lost.telemetry.run_duration_secs = 30.0;
        recorder.save_run(lost).expect("save");

        let stats = recorder.cumulative_stats();
        assert_eq!(stats.total_runs, 2);
        assert_eq!(stats.victories, 1);
        assert_eq!(stats.defeats, 1);
        assert_eq!(stats.average_duration_secs, 45.0);
        assert_eq!(stats.total_kills, 4);
        assert_eq!(stats.profile_counts.get("Brawler"), Some(&1));
    }

    #[test]
    fn test_clear() {
        let mut recorder = RunRecorder::new(MemoryStore::new());
        recorder.save_run(record(1, "Balanced", &[])).expect("save");
        recorder.clear().expect("clear");
        assert!(recorder.all_runs().is_empty());
        assert_eq!(recorder.cumulative_stats(), CumulativeStats::default());
    }
}
