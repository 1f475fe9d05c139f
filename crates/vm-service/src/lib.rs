//! VM Service
//!
//! Provisions and tears down a cloud VM by shelling out to Pulumi, keeps
//! VM metadata in a JSON file and can delete a VM automatically after a
//! given number of minutes.
//!
//! ## Endpoints
//!
//! - `POST /create-vm` - Run `pulumi up` and register the new VM
//! - `DELETE /delete-vm/{vm_id}` - Run `pulumi destroy` and unregister the VM
//! - `GET /vms` - List registered VMs
//! - `GET /vms/{vm_id}` - Get one registered VM
//! - `GET /health` - Health check

pub mod config;
pub mod handlers;
pub mod models;
pub mod provisioner;
pub mod registry;
pub mod scheduler;
pub mod service;

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use handlers::AppState;
pub use models::{CreateVmRequest, CreateVmResponse, DeleteVmResponse, VmStatus};
pub use provisioner::{Provisioner, PulumiCli};
pub use registry::Registry;
pub use scheduler::DeletionScheduler;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/create-vm", post(handlers::create_vm_handler))
        .route("/delete-vm/{vm_id}", delete(handlers::delete_vm_handler))
        .route("/vms", get(handlers::list_vms_handler))
        .route("/vms/{vm_id}", get(handlers::get_vm_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
