use std::collections::{BTreeMap, HashSet};

use tracing::{debug, warn};

use crate::model::{EnvMap, MergeReport};

/// Destination for parsed environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEnv {
    kind: TargetEnvKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TargetEnvKind {
    /// Apply entries to the current process environment.
    ///
    /// This writes through [`std::env::set_var`], which mutates global process
    /// state and is not thread-safe for concurrent environment access.
    Process,
    /// Apply entries to an in-memory map.
    Memory(BTreeMap<String, String>),
}

impl Default for TargetEnv {
    fn default() -> Self {
        Self::memory()
    }
}

impl TargetEnv {
    /// Create a process-environment target.
    ///
    /// # Safety
    ///
    /// The caller must ensure no other threads concurrently read or write the
    /// process environment for the duration of operations that may mutate this
    /// target.
    pub unsafe fn process() -> Self {
        Self {
            kind: TargetEnvKind::Process,
        }
    }

    /// Create an in-memory environment target.
    pub fn memory() -> Self {
        Self::from_memory(BTreeMap::new())
    }

    /// Create an in-memory environment target from an existing map.
    pub fn from_memory(map: BTreeMap<String, String>) -> Self {
        Self {
            kind: TargetEnvKind::Memory(map),
        }
    }

    pub fn is_process(&self) -> bool {
        matches!(self.kind, TargetEnvKind::Process)
    }

    pub fn as_memory(&self) -> Option<&BTreeMap<String, String>> {
        match &self.kind {
            TargetEnvKind::Memory(map) => Some(map),
            TargetEnvKind::Process => None,
        }
    }

    pub fn into_memory(self) -> Option<BTreeMap<String, String>> {
        match self.kind {
            TargetEnvKind::Memory(map) => Some(map),
            TargetEnvKind::Process => None,
        }
    }

    /// Apply `map` to this target.
    ///
    /// The set of existing names is captured once, before any write. An entry
    /// is written when `overwrite` is set or its key was absent from that
    /// snapshot. Entries the environment cannot hold are skipped.
    pub fn merge(&mut self, map: &EnvMap, overwrite: bool) -> MergeReport {
        let existing = self.snapshot_keys();
        let mut report = MergeReport::default();

        for (key, value) in map.iter() {
            if !is_representable(key, value) {
                warn!(key, "skipping entry the environment cannot hold");
                report.skipped_invalid += 1;
                continue;
            }

            if !overwrite && existing.contains(key) {
                debug!(key, "skipping existing key");
                report.skipped_existing += 1;
                continue;
            }

            self.set_var(key, value);
            report.loaded += 1;
        }

        report
    }

    fn snapshot_keys(&self) -> HashSet<String> {
        match &self.kind {
            TargetEnvKind::Process => std::env::vars_os()
                .map(|(key, _)| key.to_string_lossy().into_owned())
                .collect(),
            TargetEnvKind::Memory(map) => map.keys().cloned().collect(),
        }
    }

    fn set_var(&mut self, key: &str, value: &str) {
        match &mut self.kind {
            // SAFETY: only reachable through `TargetEnv::process`, whose caller
            // guarantees exclusive access to the process environment.
            TargetEnvKind::Process => unsafe { std::env::set_var(key, value) },
            TargetEnvKind::Memory(map) => {
                map.insert(key.to_owned(), value.to_owned());
            }
        }
    }
}

/// Apply `map` to the live process environment.
///
/// With `overwrite` unset, variables that already exist keep their value.
///
/// # Safety
///
/// The caller must ensure no other threads concurrently read or write the
/// process environment while this runs.
pub unsafe fn merge(map: &EnvMap, overwrite: bool) -> MergeReport {
    // SAFETY: forwarded to the caller.
    let mut target = unsafe { TargetEnv::process() };
    target.merge(map, overwrite)
}

/// Whether `key` and `value` can be stored in a process environment.
///
/// Keys must be non-empty and free of `=` and NUL; values must be free of NUL.
pub fn is_representable(key: &str, value: &str) -> bool {
    !key.is_empty() && !key.contains(['=', '\0']) && !value.contains('\0')
}
