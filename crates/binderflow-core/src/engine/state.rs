use crate::core::models::job::JobStatus;
use std::fmt;

/// Where a job is in its lifecycle, from the orchestrator's point of view.
///
/// The first three stages happen in-process; the rest mirror what the scheduler
/// last reported for the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStage {
    Loaded,
    SpecBuilt,
    Submitted,
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
    /// The last status query gave no usable answer; polling again may resolve it.
    Unknown,
}

impl JobStage {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStage::Completed | JobStage::Failed | JobStage::Cancelled
        )
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    pub fn can_advance_to(self, next: JobStage) -> bool {
        use JobStage::*;
        match (self, next) {
            (Loaded, SpecBuilt) | (SpecBuilt, Submitted) => true,
            (Submitted | Pending | Running | Unknown, next) => next.is_observed(),
            _ => false,
        }
    }

    /// Applies a status observation. Terminal stages never change.
    pub fn observe(self, status: JobStatus) -> JobStage {
        let next = JobStage::from(status);
        if self.can_advance_to(next) { next } else { self }
    }

    fn is_observed(self) -> bool {
        !matches!(self, JobStage::Loaded | JobStage::SpecBuilt | JobStage::Submitted)
    }
}

impl From<JobStatus> for JobStage {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Pending => JobStage::Pending,
            JobStatus::Running => JobStage::Running,
            JobStatus::Completed => JobStage::Completed,
            JobStatus::Failed => JobStage::Failed,
            JobStatus::Cancelled => JobStage::Cancelled,
            JobStatus::Unknown => JobStage::Unknown,
        }
    }
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JobStage::Loaded => "loaded",
            JobStage::SpecBuilt => "spec built",
            JobStage::Submitted => "submitted",
            JobStage::Pending => "pending",
            JobStage::Running => "running",
            JobStage::Completed => "completed",
            JobStage::Failed => "failed",
            JobStage::Cancelled => "cancelled",
            JobStage::Unknown => "unknown",
        })
    }
}
