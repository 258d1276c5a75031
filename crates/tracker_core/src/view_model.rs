use crate::{Phase, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Complete,
    Active,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRowView {
    pub stage: Stage,
    pub label: &'static str,
    pub status: StageStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackerViewModel {
    pub phase: Phase,
    pub job_id: Option<String>,
    pub stage: Stage,
    pub stages: Vec<StageRowView>,
    pub report: Option<String>,
    pub result_url: Option<String>,
    pub result_found: bool,
    /// Most recent error; cleared by the next successful poll.
    pub error: Option<String>,
    pub warning: Option<String>,
    pub status_line: String,
    pub dirty: bool,
}
