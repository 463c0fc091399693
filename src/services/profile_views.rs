use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

/// Per-username view counter persisted as a JSON object of
/// lowercased username -> count.
///
/// All access goes through one async mutex and every mutation is written to
/// disk before the lock is released, so concurrent increments are never lost.
/// The file is replaced by rename and never observed half-written.
pub struct ProfileViewStore {
    path: PathBuf,
    counts: Mutex<HashMap<String, u64>>,
}

impl ProfileViewStore {
    /// Load the store from `path`. A missing or unreadable file starts empty.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let counts = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<HashMap<String, u64>>(&bytes) {
                Ok(counts) => {
                    log::info!(
                        "👀 Loaded {} profile view counters from {}",
                        counts.len(),
                        path.display()
                    );
                    counts
                }
                Err(e) => {
                    log::warn!("Ignoring corrupt profile views file {}: {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                log::warn!("Could not read profile views file {}: {}", path.display(), e);
                HashMap::new()
            }
        };

        Self {
            path,
            counts: Mutex::new(counts),
        }
    }

    /// Add one view and return the new count
    pub async fn increment(&self, username: &str) -> u64 {
        let mut counts = self.counts.lock().await;
        let count = counts.entry(username.to_lowercase()).or_insert(0);
        *count = count.saturating_add(1);
        let value = *count;
        self.flush(&counts).await;
        value
    }

    pub async fn get(&self, username: &str) -> u64 {
        let counts = self.counts.lock().await;
        counts.get(&username.to_lowercase()).copied().unwrap_or(0)
    }

    /// Overwrite the counter with `base`. Not additive.
    pub async fn set_base(&self, username: &str, base: u64) -> u64 {
        let mut counts = self.counts.lock().await;
        counts.insert(username.to_lowercase(), base);
        self.flush(&counts).await;
        base
    }

    /// Write-through; a failed write is logged and the in-memory value kept
    async fn flush(&self, counts: &HashMap<String, u64>) {
        if let Err(e) = write_atomically(&self.path, counts).await {
            log::error!("Failed to save profile views to {}: {}", self.path.display(), e);
        }
    }
}

async fn write_atomically(path: &Path, counts: &HashMap<String, u64>) -> io::Result<()> {
    let bytes = serde_json::to_vec_pretty(counts)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await
}
