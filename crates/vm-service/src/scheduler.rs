//! One-shot deletion timers
//!
//! Each registration is a tokio task that sleeps until its deadline and then
//! runs its callback once. Nothing is persisted: pending jobs are lost when
//! the process exits.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use vm_common::{Error, Result};

struct ScheduledJob {
    run_at: DateTime<Utc>,
    handle: JoinHandle<()>,
}

/// Runs callbacks once at an absolute time, keyed by VM id
pub struct DeletionScheduler {
    jobs: Arc<Mutex<HashMap<String, ScheduledJob>>>,
    running: AtomicBool,
}

impl DeletionScheduler {
    /// Create a stopped scheduler; call `start` before scheduling
    pub fn new() -> Self {
        Self {
            jobs: Arc::new(Mutex::new(HashMap::new())),
            running: AtomicBool::new(false),
        }
    }

    /// Accept new registrations
    pub fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
        info!("Deletion scheduler started");
    }

    /// Whether the scheduler accepts registrations
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Run `callback` once at `run_at`. A time in the past fires immediately.
    ///
    /// Scheduling an id that already has a pending job replaces that job.
    /// A failing callback is logged and not retried.
    pub async fn schedule_once<F, Fut>(
        &self,
        vm_id: &str,
        run_at: DateTime<Utc>,
        callback: F,
    ) -> Result<()>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        if !self.is_running() {
            return Err(Error::SchedulerStopped);
        }

        let delay = (run_at - Utc::now()).to_std().unwrap_or_default();

        // Hold the lock while spawning so the task cannot look itself up
        // before its handle is stored.
        let mut jobs = self.jobs.lock().await;

        let task_jobs = Arc::clone(&self.jobs);
        let task_id = vm_id.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            task_jobs.lock().await.remove(&task_id);

            info!("Running scheduled deletion for VM: {}", task_id);
            if let Err(e) = callback().await {
                error!("Scheduled deletion failed for VM {}: {}", task_id, e);
            }
        });

        if let Some(previous) = jobs.insert(vm_id.to_string(), ScheduledJob { run_at, handle }) {
            previous.handle.abort();
            debug!("Replaced pending deletion for VM: {}", vm_id);
        }

        info!("Scheduled deletion of VM {} at {}", vm_id, run_at);
        Ok(())
    }

    /// Drop the pending job for `vm_id`. Returns whether one existed.
    pub async fn cancel(&self, vm_id: &str) -> bool {
        match self.jobs.lock().await.remove(vm_id) {
            Some(job) => {
                job.handle.abort();
                info!("Cancelled scheduled deletion for VM: {}", vm_id);
                true
            }
            None => false,
        }
    }

    /// Pending jobs and their deadlines, earliest first
    pub async fn pending(&self) -> Vec<(String, DateTime<Utc>)> {
        let mut pending: Vec<_> = self
            .jobs
            .lock()
            .await
            .iter()
            .map(|(id, job)| (id.clone(), job.run_at))
            .collect();
        pending.sort_by(|a, b| a.1.cmp(&b.1));
        pending
    }

    /// Stop accepting registrations and abort every pending job
    pub async fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);

        let mut jobs = self.jobs.lock().await;
        for (_, job) in jobs.drain() {
            job.handle.abort();
        }

        info!("Deletion scheduler stopped");
    }
}

impl Default for DeletionScheduler {
    fn default() -> Self {
        Self::new()
    }
}
