//! Health Command
//!
//! Check backend reachability and report circuit breaker state.

use crate::cli::ui::Output;
use crate::client::{HttpBackend, JobBackend};
use crate::config::ConfigLoader;
use crate::types::Result;

pub async fn run() -> Result<()> {
    let out = Output::new();
    let config = ConfigLoader::load()?;
    let backend = HttpBackend::new(&config.backend, config.breaker.clone())?;

    if backend.health_check().await? {
        out.success(&format!("Backend reachable: {}", backend.name()));
    } else {
        out.error(&format!("Backend not reachable: {}", backend.name()));
    }

    out.info(&format!("Breaker: {}", backend.breaker_stats().summary()));
    Ok(())
}
