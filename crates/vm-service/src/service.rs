//! VM lifecycle operations shared by the HTTP handlers and the scheduler

use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};
use vm_common::{auto_delete_at, extract_ip, generate_vm_id, Error, Result, VmRecord, VmRegistry};

use crate::{
    handlers::AppState,
    models::{CreateVmResponse, DeleteVmResponse, VmStatus},
};

/// Provision the stack and register a new VM.
///
/// When `auto_delete_minutes` is positive a deletion of the new VM is
/// scheduled that many minutes after creation.
pub async fn create_vm(state: &Arc<AppState>, auto_delete_minutes: i64) -> Result<CreateVmResponse> {
    let vm_id = generate_vm_id();
    info!("Creating VM: {}", vm_id);

    // Reject requests that cannot be completed before anything is provisioned.
    let wants_auto_delete = auto_delete_at(Utc::now(), auto_delete_minutes)?.is_some();
    if wants_auto_delete && !state.scheduler.is_running() {
        return Err(Error::SchedulerStopped);
    }

    let stdout = state.provisioner.up().await.inspect_err(|e| {
        error!("Provisioning failed for VM {}: {}", vm_id, e);
    })?;

    let public_ip = match extract_ip(&stdout) {
        Some(ip) => ip.to_string(),
        None => {
            warn!("Stack is up but no public IP was reported for VM {}", vm_id);
            return Err(Error::AddressNotFound);
        }
    };

    let record = VmRecord::new(public_ip.clone(), Utc::now()).with_auto_delete(auto_delete_minutes)?;

    if let Some(delete_at) = record.scheduled_deletion_at {
        let task_state = Arc::clone(state);
        let task_id = vm_id.clone();
        state
            .scheduler
            .schedule_once(&vm_id, delete_at, move || async move {
                delete_vm(&task_state, &task_id).await.map(|_| ())
            })
            .await?;
    }

    state.registry.insert(&vm_id, record).await?;

    info!("VM {} created with public IP {}", vm_id, public_ip);

    Ok(CreateVmResponse {
        vm_id,
        status: VmStatus::Created,
        public_ip,
    })
}

/// Tear the stack down and unregister `vm_id`.
///
/// The destroy runs whether or not `vm_id` is registered, and removes every
/// resource in the stack, not only this VM's.
pub async fn delete_vm(state: &Arc<AppState>, vm_id: &str) -> Result<DeleteVmResponse> {
    info!("Deleting VM: {}", vm_id);

    state.provisioner.destroy().await.inspect_err(|e| {
        error!("Teardown failed for VM {}: {}", vm_id, e);
    })?;

    state.scheduler.cancel(vm_id).await;
    state.registry.remove(vm_id).await?;

    info!("VM {} deleted", vm_id);

    Ok(DeleteVmResponse {
        vm_id: vm_id.to_string(),
        status: VmStatus::Deleted,
    })
}

/// Every registered VM
pub async fn list_vms(state: &Arc<AppState>) -> Result<VmRegistry> {
    state.registry.load().await
}

/// A single registered VM
pub async fn get_vm(state: &Arc<AppState>, vm_id: &str) -> Result<VmRecord> {
    state
        .registry
        .get(vm_id)
        .await?
        .ok_or_else(|| Error::UnknownVm(vm_id.to_string()))
}
