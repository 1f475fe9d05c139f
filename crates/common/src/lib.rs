pub mod error;
pub mod output;
pub mod record;

pub use error::{Error, Result};
pub use output::extract_ip;
pub use record::{auto_delete_at, generate_vm_id, VmRecord, VmRegistry};
