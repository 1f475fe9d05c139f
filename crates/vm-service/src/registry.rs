//! JSON file storage for the VM registry

use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{debug, info};
use vm_common::{Error, Result, VmRecord, VmRegistry};

/// Registry of known VMs, persisted as a single JSON document.
///
/// Every mutation rewrites the whole file. `insert` and `remove` hold the
/// writer lock across load, modify and save so that mutations made through
/// one `Registry` never overwrite each other.
pub struct Registry {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl Registry {
    /// Create a registry backed by `path`. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole registry. A missing file is an empty registry.
    pub async fn load(&self) -> Result<VmRegistry> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(VmRegistry::new()),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&data).map_err(|e| {
            Error::Registry(format!(
                "Failed to parse {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Overwrite the file with `registry`
    pub async fn save(&self, registry: &VmRegistry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // Replace via rename so readers never see a half-written file.
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let json = serde_json::to_vec_pretty(registry)?;
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(
            "Saved {} VM records to {}",
            registry.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Look up a single VM
    pub async fn get(&self, vm_id: &str) -> Result<Option<VmRecord>> {
        Ok(self.load().await?.remove(vm_id))
    }

    /// Add or replace a VM record
    pub async fn insert(&self, vm_id: &str, record: VmRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut registry = self.load().await?;
        registry.insert(vm_id.to_string(), record);
        self.save(&registry).await?;

        info!("Registered VM: {}", vm_id);
        Ok(())
    }

    /// Remove a VM record, returning it if it was present
    pub async fn remove(&self, vm_id: &str) -> Result<Option<VmRecord>> {
        let _guard = self.write_lock.lock().await;

        let mut registry = self.load().await?;
        let removed = registry.remove(vm_id);
        self.save(&registry).await?;

        match &removed {
            Some(_) => info!("Unregistered VM: {}", vm_id),
            None => debug!("VM {} was not registered", vm_id),
        }

        Ok(removed)
    }
}
