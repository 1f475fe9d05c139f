//! Request and response bodies for the VM service API

use serde::{Deserialize, Serialize};

/// Outcome marker returned by the create and delete endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VmStatus {
    /// The provisioner brought the stack up and the VM was registered
    Created,
    /// The provisioner tore the stack down and the VM was unregistered
    Deleted,
}

/// Request to provision a VM
#[derive(Debug, Default, Deserialize)]
pub struct CreateVmRequest {
    /// Minutes until the VM is torn down automatically; 0 disables it
    #[serde(default)]
    pub auto_delete_minutes: i64,
}

/// Response from provisioning a VM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateVmResponse {
    pub vm_id: String,
    pub status: VmStatus,
    pub public_ip: String,
}

/// Response from tearing down a VM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteVmResponse {
    pub vm_id: String,
    pub status: VmStatus,
}
