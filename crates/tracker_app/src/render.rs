use tracker_core::{Phase, StageStatus, TrackerViewModel};

pub fn render(view: &TrackerViewModel) -> Vec<String> {
    let phase_label = match view.phase {
        Phase::Idle => "Idle",
        Phase::Submitting => "Submitting",
        Phase::Tracking => "Tracking",
        Phase::Terminal => "Complete",
        Phase::TimedOut => "Timed out",
        Phase::InputError => "Input error",
        Phase::SubmissionFailed => "Upload failed",
        Phase::Stopped => "Stopped",
    };

    let mut lines = Vec::new();
    lines.push(match &view.job_id {
        Some(job_id) => format!("Job {} | {}", job_id, phase_label),
        None => format!("Job - | {}", phase_label),
    });

    let stages = view
        .stages
        .iter()
        .map(|row| format!("{} {}", stage_marker(row.status), row.label))
        .collect::<Vec<_>>()
        .join("  ");
    lines.push(stages);

    lines.push(view.status_line.clone());

    if let Some(warning) = &view.warning {
        lines.push(format!("Warning: {}", warning));
    }
    if let Some(url) = &view.result_url {
        lines.push(format!("Processed video: {}", url));
    }
    if view.phase == Phase::Terminal {
        if let Some(report) = &view.report {
            lines.push(String::new());
            lines.extend(report.lines().map(str::to_string));
        }
    }

    lines
}

fn stage_marker(status: StageStatus) -> &'static str {
    match status {
        StageStatus::Complete => "[x]",
        StageStatus::Active => "[~]",
        StageStatus::Pending => "[ ]",
    }
}
