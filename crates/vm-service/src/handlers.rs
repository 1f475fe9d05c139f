//! API handlers for the VM service

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::info;
use vm_common::{VmRecord, VmRegistry};

use crate::{
    models::{CreateVmRequest, CreateVmResponse, DeleteVmResponse},
    provisioner::Provisioner,
    registry::Registry,
    scheduler::DeletionScheduler,
    service,
};

/// Shared application state
pub struct AppState {
    pub provisioner: Arc<dyn Provisioner>,
    pub registry: Registry,
    pub scheduler: DeletionScheduler,
}

impl AppState {
    /// Assemble state from its parts
    pub fn new(
        provisioner: Arc<dyn Provisioner>,
        registry: Registry,
        scheduler: DeletionScheduler,
    ) -> Self {
        Self {
            provisioner,
            registry,
            scheduler,
        }
    }
}

/// API Error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message
        });

        (self.status, Json(body)).into_response()
    }
}

impl From<vm_common::Error> for ApiError {
    fn from(err: vm_common::Error) -> Self {
        let status = match err {
            vm_common::Error::UnknownVm(_) => StatusCode::NOT_FOUND,
            vm_common::Error::InvalidAutoDelete(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        ApiError {
            status,
            message: err.to_string(),
        }
    }
}

/// Health check
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "vm-service"
    }))
}

/// Provision a VM
pub async fn create_vm_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateVmRequest>,
) -> Result<Json<CreateVmResponse>, ApiError> {
    info!(
        "Create VM requested (auto_delete_minutes: {})",
        payload.auto_delete_minutes
    );

    let response = service::create_vm(&state, payload.auto_delete_minutes).await?;

    Ok(Json(response))
}

/// Tear down the stack and unregister a VM
pub async fn delete_vm_handler(
    State(state): State<Arc<AppState>>,
    Path(vm_id): Path<String>,
) -> Result<Json<DeleteVmResponse>, ApiError> {
    info!("Delete VM requested: {}", vm_id);

    let response = service::delete_vm(&state, &vm_id).await?;

    Ok(Json(response))
}

/// List all registered VMs
pub async fn list_vms_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<VmRegistry>, ApiError> {
    let vms = service::list_vms(&state).await?;

    Ok(Json(vms))
}

/// Get one registered VM
pub async fn get_vm_handler(
    State(state): State<Arc<AppState>>,
    Path(vm_id): Path<String>,
) -> Result<Json<VmRecord>, ApiError> {
    info!("Getting VM: {}", vm_id);

    let vm = service::get_vm(&state, &vm_id).await?;

    Ok(Json(vm))
}
