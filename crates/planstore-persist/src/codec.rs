//! Save/restore contract and the JSON file implementation

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Version written into every snapshot; other versions are not restored
pub const SNAPSHOT_VERSION: u32 = 1;

/// Persists and restores a state value
///
/// Failures are reported through the return value only.
pub trait StateCodec<S>: Send + Sync {
    /// Returns `false` when the state could not be saved
    fn save(&self, state: &S) -> bool;

    /// Returns `None` when there is nothing to restore or it can't be decoded
    fn restore(&self) -> Option<S>;
}

/// Codec made of a save function and a restore function
pub struct FnCodec<Sv, Rs> {
    save: Sv,
    restore: Rs,
}

pub fn codec_fn<S, Sv, Rs>(save: Sv, restore: Rs) -> FnCodec<Sv, Rs>
where
    Sv: Fn(&S) -> bool + Send + Sync,
    Rs: Fn() -> Option<S> + Send + Sync,
{
    FnCodec { save, restore }
}

impl<S, Sv, Rs> StateCodec<S> for FnCodec<Sv, Rs>
where
    Sv: Fn(&S) -> bool + Send + Sync,
    Rs: Fn() -> Option<S> + Send + Sync,
{
    fn save(&self, state: &S) -> bool {
        (self.save)(state)
    }

    fn restore(&self) -> Option<S> {
        (self.restore)()
    }
}

/// Snapshot metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotMeta {
    saved_at: DateTime<Utc>,
    version: u32,
}

#[derive(Serialize)]
struct SnapshotRef<'a, S> {
    meta: SnapshotMeta,
    state: &'a S,
}

#[derive(Deserialize)]
struct Snapshot<S> {
    meta: SnapshotMeta,
    state: S,
}

/// JSON snapshot file
///
/// ```json
/// { "meta": { "saved_at": "…", "version": 1 }, "state": { … } }
/// ```
pub struct JsonFileCodec<S> {
    path: PathBuf,
    _state: PhantomData<fn() -> S>,
}

impl<S> JsonFileCodec<S>
where
    S: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _state: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the snapshot, replacing the previous one atomically
    pub fn write(&self, state: &S) -> Result<()> {
        let snapshot = SnapshotRef {
            meta: SnapshotMeta {
                saved_at: Utc::now(),
                version: SNAPSHOT_VERSION,
            },
            state,
        };
        let content =
            serde_json::to_string_pretty(&snapshot).context("Failed to serialize state")?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).with_context(|| format!("Failed to write {:?}", tmp))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to move snapshot into {:?}", self.path))?;

        log::debug!("Saved state snapshot to {:?}", self.path);
        Ok(())
    }

    /// Read the snapshot, `Ok(None)` when the file doesn't exist
    pub fn read(&self) -> Result<Option<S>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read snapshot {:?}", self.path))?;
        let snapshot: Snapshot<S> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse snapshot {:?}", self.path))?;

        if snapshot.meta.version != SNAPSHOT_VERSION {
            bail!(
                "Snapshot version {} is not supported (expected {})",
                snapshot.meta.version,
                SNAPSHOT_VERSION
            );
        }

        log::info!(
            "Loaded state snapshot from {:?} (saved {})",
            self.path,
            snapshot.meta.saved_at
        );
        Ok(Some(snapshot.state))
    }
}

impl<S> StateCodec<S> for JsonFileCodec<S>
where
    S: Serialize + DeserializeOwned,
{
    fn save(&self, state: &S) -> bool {
        match self.write(state) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to save state: {:#}", e);
                false
            }
        }
    }

    fn restore(&self) -> Option<S> {
        match self.read() {
            Ok(state) => state,
            Err(e) => {
                log::warn!("Failed to restore state: {:#}", e);
                None
            }
        }
    }
}
