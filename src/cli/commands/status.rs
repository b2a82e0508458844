//! Status Command
//!
//! One-shot status fetch for a job, without opening a subscription.

use crate::cli::ui::Output;
use crate::cli::util::build_backend;
use crate::client::JobBackend;
use crate::config::ConfigLoader;
use crate::types::{JobId, Result};

pub async fn run(job_id: &str, format: &str) -> Result<()> {
    let out = Output::new();
    let config = ConfigLoader::load()?;
    let backend = build_backend(&config)?;

    let snapshot = backend.fetch_status(&JobId::new(job_id)).await?;
    out.snapshot_detail(&snapshot, format == "json")
}
