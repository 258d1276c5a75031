use pretty_assertions::assert_eq;
use serde_json::json;
use tracker_core::{Stage, StatusUpdate};
use tracker_engine::{
    decode_result, decode_status, decode_upload_ticket, unwrap_envelope, EnvelopeError,
};

fn gateway(status_code: u16, body: serde_json::Value) -> String {
    json!({ "statusCode": status_code, "body": body.to_string() }).to_string()
}

#[test]
fn double_encoded_status_is_unwrapped() {
    let raw = gateway(
        200,
        json!({
            "message": "Successfully fetched CloudWatch logs",
            "data": { "found": true, "progress_level": 2, "progress_percentage": 37.5 }
        }),
    );

    assert_eq!(
        decode_status(&raw).unwrap(),
        StatusUpdate {
            stage: Some(Stage::ProcessingFrames),
            report: None,
        }
    );
}

#[test]
fn plain_status_with_report() {
    let raw = json!({
        "data": { "progress_level": 4, "report_content": "# Collision report" }
    })
    .to_string();

    let status = decode_status(&raw).unwrap();
    assert_eq!(status.stage, Some(Stage::ReportReady));
    assert_eq!(status.report.as_deref(), Some("# Collision report"));
}

#[test]
fn top_level_progress_level_is_accepted() {
    let raw = json!({ "progress_level": 3 }).to_string();
    assert_eq!(decode_status(&raw).unwrap().stage, Some(Stage::Analyzing));
}

#[test]
fn missing_level_means_no_change() {
    let raw = gateway(200, json!({ "data": { "found": false } }));
    assert_eq!(decode_status(&raw).unwrap(), StatusUpdate::default());
}

#[test]
fn out_of_range_level_is_rejected() {
    let raw = json!({ "data": { "progress_level": 7 } }).to_string();
    assert!(matches!(
        decode_status(&raw),
        Err(EnvelopeError::InvalidField {
            field: "progress_level",
            ..
        })
    ));

    let raw = json!({ "data": { "progress_level": "two" } }).to_string();
    assert!(decode_status(&raw).is_err());
}

#[test]
fn malformed_outer_and_inner_payloads() {
    assert!(matches!(
        unwrap_envelope("not json"),
        Err(EnvelopeError::Malformed(_))
    ));

    let raw = json!({ "statusCode": 200, "body": "{oops" }).to_string();
    assert!(matches!(
        unwrap_envelope(&raw),
        Err(EnvelopeError::InnerPayload(_))
    ));
}

#[test]
fn object_body_is_used_directly() {
    let raw = json!({ "body": { "found": false } }).to_string();
    assert_eq!(unwrap_envelope(&raw).unwrap(), json!({ "found": false }));
}

#[test]
fn error_envelopes_become_remote_errors() {
    let raw = gateway(500, json!({ "error": "AccessDenied: not allowed" }));
    assert_eq!(
        unwrap_envelope(&raw),
        Err(EnvelopeError::Remote("AccessDenied: not allowed".to_string()))
    );

    let raw = json!({ "statusCode": 502 }).to_string();
    assert_eq!(
        unwrap_envelope(&raw),
        Err(EnvelopeError::Remote("backend returned status 502".to_string()))
    );

    let raw = gateway(
        400,
        json!({ "error": "missing userId", "message": "userId is required" }),
    );
    assert_eq!(
        unwrap_envelope(&raw),
        Err(EnvelopeError::Remote(
            "missing userId: userId is required".to_string()
        ))
    );
}

#[test]
fn error_status_wins_over_unparsable_body() {
    let raw = r#"{"statusCode": 500, "body": "Internal Server Error"}"#;
    assert_eq!(
        unwrap_envelope(raw),
        Err(EnvelopeError::Remote(
            "backend returned status 500: Internal Server Error".to_string()
        ))
    );
    assert!(matches!(decode_status(raw), Err(EnvelopeError::Remote(_))));

    let raw = json!({ "statusCode": 503, "body": "" }).to_string();
    assert_eq!(
        unwrap_envelope(&raw),
        Err(EnvelopeError::Remote("backend returned status 503".to_string()))
    );
}

#[test]
fn error_status_keeps_message_without_error_field() {
    let raw = gateway(500, json!({ "message": "Throttled" }));
    assert_eq!(
        unwrap_envelope(&raw),
        Err(EnvelopeError::Remote(
            "backend returned status 500: Throttled".to_string()
        ))
    );
}

#[test]
fn found_result_yields_artifact() {
    let raw = gateway(
        200,
        json!({
            "found": true,
            "video": {
                "key": "processed/run-1/video.mp4",
                "url": "https://bucket.example.com/processed/run-1/video.mp4",
                "lastModified": "2024-10-26T10:35:00+00:00",
                "folder": "processed/run-1",
                "size": 1024
            }
        }),
    );

    let lookup = decode_result(&raw).unwrap();
    assert!(lookup.found);
    let artifact = lookup.artifact.unwrap();
    assert_eq!(
        artifact.url,
        "https://bucket.example.com/processed/run-1/video.mp4"
    );
    assert_eq!(artifact.folder.as_deref(), Some("processed/run-1"));
    assert_eq!(artifact.size, Some(1024));
}

#[test]
fn result_without_url_is_not_an_artifact() {
    let raw = json!({ "found": true, "video": { "key": "processed/x/video.mp4" } }).to_string();
    let lookup = decode_result(&raw).unwrap();
    assert!(lookup.found);
    assert_eq!(lookup.artifact, None);

    let raw = gateway(
        200,
        json!({ "found": false, "message": "No processed video found yet" }),
    );
    assert_eq!(decode_result(&raw).unwrap().artifact, None);
}

#[test]
fn result_with_wrong_types_is_a_schema_error() {
    let raw = json!({ "found": "yes" }).to_string();
    assert!(matches!(decode_result(&raw), Err(EnvelopeError::Schema(_))));
}

#[test]
fn upload_ticket_prefers_second_destination() {
    let raw = gateway(
        200,
        json!({
            "videoId": "vid-1",
            "presignedUrl1": "https://main.example.com/put",
            "presignedUrl2": "https://own.example.com/put",
            "expiresIn": 600,
            "contentType": "video/mp4"
        }),
    );

    let ticket = decode_upload_ticket(&raw).unwrap();
    assert_eq!(ticket.job_id, "vid-1");
    assert_eq!(ticket.primary_url, "https://own.example.com/put");
    assert_eq!(
        ticket.secondary_url.as_deref(),
        Some("https://main.example.com/put")
    );
    assert_eq!(ticket.expires_in, Some(600));
}

#[test]
fn upload_ticket_falls_back_to_single_url() {
    let raw = json!({ "videoId": "vid-2", "presignedUrl": "https://only.example.com/put" })
        .to_string();
    let ticket = decode_upload_ticket(&raw).unwrap();
    assert_eq!(ticket.primary_url, "https://only.example.com/put");
    assert_eq!(ticket.secondary_url, None);
    assert_eq!(ticket.content_type, "video/mp4");

    let raw = json!({ "videoId": "vid-3" }).to_string();
    assert!(matches!(
        decode_upload_ticket(&raw),
        Err(EnvelopeError::Schema(_))
    ));
}
