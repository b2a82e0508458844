//! Cancel Command
//!
//! Request that the backend stop a running job.

use crate::cli::ui::Output;
use crate::cli::util::build_backend;
use crate::client::JobBackend;
use crate::config::ConfigLoader;
use crate::types::{JobId, Result};

pub async fn run(job_id: &str) -> Result<()> {
    let out = Output::new();
    let config = ConfigLoader::load()?;
    let backend = build_backend(&config)?;

    backend.stop(&JobId::new(job_id)).await?;
    out.success(&format!("Requested cancellation of job {}", job_id));
    Ok(())
}
