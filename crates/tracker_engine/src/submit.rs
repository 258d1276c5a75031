use bytes::Bytes;
use tracker_core::{SubmittedUpload, TrackerError};
use tracker_logging::{tracker_info, tracker_warn};

use crate::UploadApi;

/// Create an upload, PUT the payload to its destinations and report the job.
///
/// The primary destination must accept the payload; a failing secondary
/// destination only produces a warning on the returned upload.
pub async fn submit_upload<A: UploadApi + ?Sized>(
    api: &A,
    user_id: &str,
    file_name: &str,
    payload: Bytes,
    submitted_utc: &(dyn Fn() -> String + Send + Sync),
) -> Result<SubmittedUpload, TrackerError> {
    let ticket = api
        .create_upload(user_id, file_name)
        .await
        .map_err(|err| TrackerError::Submission(format!("create upload: {err}")))?;
    tracker_info!(
        "Created upload job_id={} bytes={} secondary={}",
        ticket.job_id,
        payload.len(),
        ticket.secondary_url.is_some()
    );

    api.put_object(&ticket.primary_url, &ticket.content_type, payload.clone())
        .await
        .map_err(|err| TrackerError::Submission(format!("primary upload: {err}")))?;

    let mut warning = None;
    if let Some(secondary) = ticket.secondary_url.as_deref() {
        if let Err(err) = api
            .put_object(secondary, &ticket.content_type, payload)
            .await
        {
            tracker_warn!("Secondary upload for job {} failed: {}", ticket.job_id, err);
            warning = Some(format!("secondary upload failed: {err}"));
        }
    }

    Ok(SubmittedUpload {
        job_id: ticket.job_id,
        submitted_at: submitted_utc(),
        warning,
    })
}
