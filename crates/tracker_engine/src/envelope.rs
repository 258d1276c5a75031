use serde::Deserialize;
use serde_json::Value;
use tracker_core::{Stage, StatusUpdate};

use crate::{ApiError, Artifact, FailureKind, ResultLookup, UploadTicket};

const DEFAULT_CONTENT_TYPE: &str = "video/mp4";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("malformed envelope: {0}")]
    Malformed(String),
    #[error("malformed inner payload: {0}")]
    InnerPayload(String),
    #[error("unexpected payload shape: {0}")]
    Schema(String),
    #[error("invalid {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
    #[error("{0}")]
    Remote(String),
}

impl From<EnvelopeError> for ApiError {
    fn from(err: EnvelopeError) -> Self {
        match err {
            EnvelopeError::Remote(message) => ApiError::new(FailureKind::Remote, message),
            other => ApiError::new(FailureKind::Parse, other.to_string()),
        }
    }
}

/// Unwrap a transport envelope into its payload.
///
/// The payload is the `body` field when it is a JSON object or a string holding
/// serialized JSON, otherwise the outer document itself. Error envelopes
/// (`statusCode >= 400` or an `error` field in the payload) become
/// [`EnvelopeError::Remote`]; an error status wins over an unparsable body.
pub fn unwrap_envelope(raw: &str) -> Result<Value, EnvelopeError> {
    let outer: Value =
        serde_json::from_str(raw).map_err(|err| EnvelopeError::Malformed(err.to_string()))?;
    let error_status = outer
        .get("statusCode")
        .and_then(Value::as_u64)
        .filter(|code| *code >= 400);

    let inner = match outer.get("body") {
        Some(Value::String(text)) => match (serde_json::from_str::<Value>(text), error_status) {
            (Ok(value), _) => Some(value),
            // Gateways answer failures with plain-text bodies.
            (Err(_), Some(code)) => {
                return Err(EnvelopeError::Remote(status_message(code, Some(text.trim()))));
            }
            (Err(err), None) => return Err(EnvelopeError::InnerPayload(err.to_string())),
        },
        Some(body @ Value::Object(_)) => Some(body.clone()),
        _ => None,
    };
    let payload = inner.unwrap_or(outer);

    let detail = payload.get("message").and_then(Value::as_str);
    let remote_error = payload
        .get("error")
        .and_then(Value::as_str)
        .map(|error| match detail {
            Some(detail) => format!("{error}: {detail}"),
            None => error.to_string(),
        });
    if let Some(code) = error_status {
        return Err(EnvelopeError::Remote(
            remote_error.unwrap_or_else(|| status_message(code, detail)),
        ));
    }
    match remote_error {
        Some(message) => Err(EnvelopeError::Remote(message)),
        None => Ok(payload),
    }
}

fn status_message(code: u64, detail: Option<&str>) -> String {
    match detail.filter(|detail| !detail.is_empty()) {
        Some(detail) => format!("backend returned status {code}: {detail}"),
        None => format!("backend returned status {code}"),
    }
}

/// Decode a status endpoint response.
pub fn decode_status(raw: &str) -> Result<StatusUpdate, EnvelopeError> {
    let payload = unwrap_envelope(raw)?;
    let data = payload.get("data");
    let field = |name: &str| {
        data.and_then(|data| data.get(name))
            .or_else(|| payload.get(name))
            .filter(|value| !value.is_null())
    };

    let stage = field("progress_level").map(parse_stage).transpose()?;
    let report = field("report_content")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned);

    Ok(StatusUpdate { stage, report })
}

fn parse_stage(value: &Value) -> Result<Stage, EnvelopeError> {
    let level = value
        .as_i64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|level| level.fract() == 0.0)
                .map(|level| level as i64)
        })
        .ok_or_else(|| EnvelopeError::InvalidField {
            field: "progress_level",
            message: format!("expected an integer, got {value}"),
        })?;
    Stage::from_level(level).ok_or_else(|| EnvelopeError::InvalidField {
        field: "progress_level",
        message: format!("level {level} is outside 1..=4"),
    })
}

#[derive(Debug, Deserialize)]
struct ResultPayload {
    #[serde(default)]
    found: bool,
    #[serde(default)]
    video: Option<VideoPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoPayload {
    url: Option<String>,
    key: Option<String>,
    last_modified: Option<String>,
    folder: Option<String>,
    size: Option<u64>,
}

/// Decode a result-lookup response. `found` without a URL counts as not found.
pub fn decode_result(raw: &str) -> Result<ResultLookup, EnvelopeError> {
    let payload: ResultPayload = serde_json::from_value(unwrap_envelope(raw)?)
        .map_err(|err| EnvelopeError::Schema(err.to_string()))?;

    let artifact = match (payload.found, payload.video) {
        (true, Some(video)) => video.url.map(|url| Artifact {
            url,
            key: video.key,
            last_modified: video.last_modified,
            folder: video.folder,
            size: video.size,
        }),
        _ => None,
    };

    Ok(ResultLookup {
        found: payload.found,
        artifact,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TicketPayload {
    video_id: String,
    presigned_url: Option<String>,
    presigned_url1: Option<String>,
    presigned_url2: Option<String>,
    expires_in: Option<u64>,
    content_type: Option<String>,
}

/// Decode a create-upload response.
///
/// `presignedUrl2` (falling back to `presignedUrl`) is the primary upload
/// destination; `presignedUrl1` is the secondary one.
pub fn decode_upload_ticket(raw: &str) -> Result<UploadTicket, EnvelopeError> {
    let payload: TicketPayload = serde_json::from_value(unwrap_envelope(raw)?)
        .map_err(|err| EnvelopeError::Schema(err.to_string()))?;

    if payload.video_id.trim().is_empty() {
        return Err(EnvelopeError::InvalidField {
            field: "videoId",
            message: "empty identifier".into(),
        });
    }
    let primary_url = payload
        .presigned_url2
        .or(payload.presigned_url)
        .ok_or_else(|| EnvelopeError::Schema("no presigned upload URL".into()))?;
    let secondary_url = payload
        .presigned_url1
        .filter(|url| *url != primary_url);

    Ok(UploadTicket {
        job_id: payload.video_id,
        primary_url,
        secondary_url,
        expires_in: payload.expires_in,
        content_type: payload
            .content_type
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
    })
}
