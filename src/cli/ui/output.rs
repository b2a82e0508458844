//! Terminal Output
//!
//! Styled console output for job tracking commands, including the two
//! snapshot renderings: a one-line status transition and the full detail
//! view used by `status`.

use console::style;

use crate::types::{JobSnapshot, Result};

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    /// Render one snapshot as a status line
    pub fn snapshot(&self, snapshot: &JobSnapshot) {
        self.info(&Self::snapshot_line(snapshot));
    }

    fn snapshot_line(snapshot: &JobSnapshot) -> String {
        let kind = snapshot
            .kind
            .map(|k| format!(" [{}]", k))
            .unwrap_or_default();
        format!("{}{} → {}", snapshot.id, kind, snapshot.status)
    }

    /// Render a snapshot in full, text or JSON
    pub fn snapshot_detail(&self, snapshot: &JobSnapshot, as_json: bool) -> Result<()> {
        if as_json {
            println!("{}", serde_json::to_string_pretty(snapshot)?);
            return Ok(());
        }

        self.section(&format!("Job {}", snapshot.id));
        if let Some(kind) = snapshot.kind {
            println!("Kind:      {}", kind);
        }
        println!("Status:    {}", snapshot.status);
        if let Some(created) = snapshot.created_at {
            println!("Created:   {}", created.to_rfc3339());
        }
        if let Some(completed) = snapshot.completed_at {
            println!("Completed: {}", completed.to_rfc3339());
        }
        if let Some(error) = &snapshot.error {
            self.error(&format!("Error: {}", error));
        }
        if let Some(result) = &snapshot.result {
            println!("Result:");
            println!("{}", serde_json::to_string_pretty(result)?);
        }
        Ok(())
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{JobKind, JobStatus};

    #[test]
    fn test_snapshot_line_without_kind() {
        let snap = JobSnapshot::new("wf-1", JobStatus::Running);
        assert_eq!(Output::snapshot_line(&snap), "wf-1 → running");
    }

    #[test]
    fn test_snapshot_line_with_kind() {
        let snap =
            JobSnapshot::new("eb-3", JobStatus::Pending).with_kind(JobKind::EvaluationBatch);
        assert_eq!(
            Output::snapshot_line(&snap),
            "eb-3 [evaluation_batch] → pending"
        );
    }
}
