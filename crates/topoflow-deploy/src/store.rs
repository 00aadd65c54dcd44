//! Deployment persistence
//!
//! Deployments are stored as JSON under `.topoflow/` in the project
//! root, one file per deployment. Writes keep the previous file as a
//! `.backup`, and a lock file guards against concurrent workflows.

use crate::deployment::Deployment;
use crate::error::{DeployError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

const STORE_VERSION: u32 = 1;
const STORE_DIR: &str = ".topoflow";
const LOCK_FILE: &str = "lock.json";

/// On-disk envelope around a deployment
#[derive(Debug, Serialize, Deserialize)]
struct StoredDeployment {
    version: u32,
    deployment: Deployment,
}

/// Store for reading/writing deployment files
pub struct DeploymentStore {
    /// Project root directory
    project_root: PathBuf,
}

impl DeploymentStore {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
        }
    }

    fn store_dir(&self) -> PathBuf {
        self.project_root.join(STORE_DIR)
    }

    fn deployment_path(&self, name: &str) -> PathBuf {
        self.store_dir().join(format!("{}.json", name))
    }

    fn backup_path(&self, name: &str) -> PathBuf {
        self.store_dir().join(format!("{}.json.backup", name))
    }

    fn lock_path(&self) -> PathBuf {
        self.store_dir().join(LOCK_FILE)
    }

    async fn ensure_store_dir(&self) -> Result<()> {
        let dir = self.store_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
            tracing::debug!("Created deployment store: {}", dir.display());
        }
        Ok(())
    }

    /// Load a deployment by name
    pub async fn load(&self, name: &str) -> Result<Deployment> {
        let path = self.deployment_path(name);
        if !path.exists() {
            return Err(DeployError::DeploymentNotFound(name.to_string()));
        }

        let content = fs::read_to_string(&path).await?;
        let stored: StoredDeployment = serde_json::from_str(&content)?;

        if stored.version > STORE_VERSION {
            return Err(DeployError::StateError(format!(
                "Deployment file version {} is newer than supported version {}",
                stored.version, STORE_VERSION
            )));
        }

        tracing::debug!(
            "Loaded deployment '{}' with {} instances",
            name,
            stored.deployment.instances.len()
        );
        Ok(stored.deployment)
    }

    /// Save a deployment, keeping the previous file as backup
    pub async fn save(&self, deployment: &Deployment) -> Result<()> {
        self.ensure_store_dir().await?;

        let path = self.deployment_path(&deployment.name);
        let backup = self.backup_path(&deployment.name);

        if path.exists() {
            if backup.exists() {
                fs::remove_file(&backup).await?;
            }
            fs::rename(&path, &backup).await?;
        }

        let stored = StoredDeployment {
            version: STORE_VERSION,
            deployment: deployment.clone(),
        };
        let content = serde_json::to_string_pretty(&stored)?;
        fs::write(&path, content).await?;

        tracing::debug!(
            "Saved deployment '{}' with {} instances",
            deployment.name,
            deployment.instances.len()
        );
        Ok(())
    }

    /// Delete a deployment file (and its backup)
    pub async fn remove(&self, name: &str) -> Result<()> {
        let path = self.deployment_path(name);
        if path.exists() {
            fs::remove_file(&path).await?;
        }
        let backup = self.backup_path(name);
        if backup.exists() {
            fs::remove_file(&backup).await?;
        }
        Ok(())
    }

    /// Names of all stored deployments, sorted
    pub async fn list(&self) -> Result<Vec<String>> {
        let dir = self.store_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "json")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && stem != "lock"
            {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Acquire the workflow lock
    pub async fn acquire_lock(&self) -> Result<StoreLock> {
        self.ensure_store_dir().await?;

        let lock_path = self.lock_path();

        if lock_path.exists() {
            let content = fs::read_to_string(&lock_path).await?;
            let lock_info: LockInfo = serde_json::from_str(&content)?;

            // Locks older than an hour are considered stale
            let age = Utc::now().signed_duration_since(lock_info.acquired_at);
            if age.num_hours() < 1 {
                return Err(DeployError::LockError(format!(
                    "Store is locked by {} since {}",
                    lock_info.holder, lock_info.acquired_at
                )));
            }

            tracing::warn!("Removing stale lock from {}", lock_info.holder);
        }

        let lock_info = LockInfo {
            holder: std::env::var("HOSTNAME")
                .or_else(|_| std::env::var("HOST"))
                .unwrap_or_else(|_| "unknown".to_string()),
            acquired_at: Utc::now(),
        };

        let content = serde_json::to_string_pretty(&lock_info)?;
        fs::write(&lock_path, content).await?;

        tracing::debug!("Acquired store lock");
        Ok(StoreLock {
            lock_path,
            released: false,
        })
    }
}

/// Lock information
#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    holder: String,
    acquired_at: DateTime<Utc>,
}

/// RAII guard for the workflow lock
pub struct StoreLock {
    lock_path: PathBuf,
    released: bool,
}

impl StoreLock {
    /// Release the lock
    pub async fn release(mut self) -> Result<()> {
        if !self.released {
            if self.lock_path.exists() {
                fs::remove_file(&self.lock_path).await?;
                tracing::debug!("Released store lock");
            }
            self.released = true;
        }
        Ok(())
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if !self.released && self.lock_path.exists() {
            // Synchronous cleanup in drop - not ideal but necessary
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}
