use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracker_core::{Phase, TrackerViewModel};
use tracker_engine::{ReqwestBackend, TrackerConfig, TrackerHandle};
use tracker_logging::{tracker_info, tracker_warn};

use crate::config::load_config;
use crate::render::render;
use crate::{Cli, Command};

/// Runs one tracking session to completion and returns the phase it ended in.
pub async fn run(cli: Cli) -> anyhow::Result<Phase> {
    let config = load_config(cli.config.as_deref())?;
    let backend = ReqwestBackend::new(config.api_settings(cli.base_url.as_deref())?)
        .context("failed to build HTTP client")?;
    let settings = config.tracker_settings()?;
    tracker_info!(
        "Tracker starting: status {:?}/{:?}, result {:?}/{:?}, deadline {:?}",
        settings.status.delay,
        settings.status.interval,
        settings.result.delay,
        settings.result.interval,
        settings.deadline
    );

    let handle = TrackerHandle::spawn(Arc::new(backend), TrackerConfig::new(settings));

    match cli.command {
        Command::Track {
            job_id,
            submitted_at,
        } => handle.start(Some(job_id), submitted_at),
        Command::Upload { user_id, file } => {
            let payload = tokio::fs::read(&file)
                .await
                .with_context(|| format!("failed to read {:?}", file))?;
            handle.submit(user_id, file_name(&file), payload);
        }
    }

    let final_view = watch_until_finished(&handle).await;
    handle.shutdown().await;
    tracker_info!("Tracker finished in phase {:?}", final_view.phase);
    Ok(final_view.phase)
}

async fn watch_until_finished(handle: &TrackerHandle) -> TrackerViewModel {
    let mut views = handle.subscribe();
    let mut last_lines = Vec::new();
    loop {
        let view = views.borrow_and_update().clone();
        let lines = render(&view);
        if lines != last_lines {
            for line in &lines {
                println!("{}", line);
            }
            println!();
            last_lines = lines;
        }
        if view.phase.is_finished() {
            return view;
        }

        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    return handle.view();
                }
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(err) = signal {
                    tracker_warn!("Ctrl-C handler failed: {}", err);
                }
                tracker_info!("Interrupted; stopping tracker");
                handle.stop();
            }
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
