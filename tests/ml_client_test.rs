use anyhow::Result;
use httpmock::prelude::*;
use serde_json::json;
use smartfit::domain::model::{ImageFormat, ImagePayload, Measurements, MlOperation, TryOnRequest};
use smartfit::domain::ports::MlService;
use smartfit::{HttpMlClient, SmartFitError};
use std::time::Duration;

const JPEG: &[u8] = b"\xff\xd8\xff\xe0body-photo\xff\xd9";

fn photo() -> ImagePayload {
    ImagePayload::new(JPEG.to_vec(), ImageFormat::Jpeg)
}

fn client(server: &MockServer) -> HttpMlClient {
    HttpMlClient::new(server.base_url(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_pose_estimation_sends_base64_image() -> Result<()> {
    let server = MockServer::start_async().await;
    let encoded = photo().to_base64();

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/pose-estimation")
                .json_body(json!({ "image_data": encoded }));
            then.status(200).json_body(json!({
                "success": true,
                "pose_data": { "landmarks": [[0.1, 0.2], [0.3, 0.4], [0.5, 0.6]] },
                "confidence": 0.91,
                "model": "test"
            }));
        })
        .await;

    let pose = client(&server).estimate_pose(&photo()).await?;

    mock.assert_async().await;
    assert_eq!(pose.landmark_count(), 3);
    assert_eq!(pose.confidence, Some(0.91));
    assert_eq!(pose.extra.get("model"), Some(&json!("test")));
    Ok(())
}

#[tokio::test]
async fn test_pose_estimation_reported_failure() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/pose-estimation");
            then.status(200)
                .json_body(json!({ "success": false, "pose_data": {} }));
        })
        .await;

    let err = client(&server).estimate_pose(&photo()).await.unwrap_err();
    assert!(matches!(
        err,
        SmartFitError::InvalidUpstreamResponse {
            operation: MlOperation::PoseEstimation,
            ..
        }
    ));
    assert_eq!(err.user_friendly_message(), "Pose estimation failed.");
    Ok(())
}

#[tokio::test]
async fn test_body_measurement_round_trip() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/body-measurement")
                .body_contains("\"pose_data\":{\"landmarks\":[]}");
            then.status(200).json_body(json!({
                "measurements": { "height": 172.0, "chest": 96.5, "waist": 81.0 }
            }));
        })
        .await;

    let measurements = client(&server)
        .measure_body(&photo(), &json!({ "landmarks": [] }))
        .await?;

    mock.assert_async().await;
    assert_eq!(measurements.get("chest"), Some(96.5));
    assert_eq!(measurements.0.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_body_measurement_without_measurements() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/body-measurement");
            then.status(200).json_body(json!({ "status": "ok" }));
        })
        .await;

    let err = client(&server)
        .measure_body(&photo(), &json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.user_friendly_message(), "Failed to get measurements from ML.");
    Ok(())
}

#[tokio::test]
async fn test_virtual_try_on_decodes_jpeg_result() -> Result<()> {
    let server = MockServer::start_async().await;
    let result = ImagePayload::new(b"\xff\xd8\xff\xdbresult\xff\xd9".to_vec(), ImageFormat::Jpeg);
    let result_b64 = result.to_base64();

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/virtual-tryon")
                .body_contains("\"body_image\"")
                .body_contains("\"garment_image\"")
                .body_contains("\"measurements\":{\"chest\":96.5}");
            then.status(200)
                .json_body(json!({ "result_image": result_b64, "confidence": 0.8 }));
        })
        .await;

    let mut measurements = Measurements::default();
    measurements.0.insert("chest".to_string(), 96.5);
    let request = TryOnRequest::new(&photo(), &photo(), json!({ "landmarks": [] }), measurements);

    let outcome = client(&server).virtual_try_on(&request).await?;

    mock.assert_async().await;
    assert_eq!(outcome.image, result);
    assert_eq!(outcome.image.format(), ImageFormat::Jpeg);
    assert_eq!(outcome.confidence, Some(0.8));
    Ok(())
}

#[tokio::test]
async fn test_virtual_try_on_missing_image() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/virtual-tryon");
            then.status(200).json_body(json!({ "result_image": "" }));
        })
        .await;

    let request = TryOnRequest::new(&photo(), &photo(), json!({}), Measurements::default());
    let err = client(&server).virtual_try_on(&request).await.unwrap_err();
    assert_eq!(err.user_friendly_message(), "No result image returned.");
    Ok(())
}

#[tokio::test]
async fn test_non_success_status_maps_to_generic_message() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/virtual-tryon");
            then.status(500).body("stack trace with internals");
        })
        .await;

    let request = TryOnRequest::new(&photo(), &photo(), json!({}), Measurements::default());
    let err = client(&server).virtual_try_on(&request).await.unwrap_err();

    assert_eq!(mock.hits_async().await, 1);
    assert!(matches!(err, SmartFitError::UpstreamStatus { status: 500, .. }));
    assert_eq!(err.user_friendly_message(), "Virtual try-on failed.");
    assert!(!err.user_friendly_message().contains("stack trace"));
    Ok(())
}

#[tokio::test]
async fn test_unreachable_service_is_upstream_error() -> Result<()> {
    let client = HttpMlClient::new("http://127.0.0.1:1", Duration::from_secs(2))?;
    let err = client.estimate_pose(&photo()).await.unwrap_err();

    assert!(matches!(err, SmartFitError::Upstream { .. }));
    assert_eq!(err.user_friendly_message(), "Pose estimation failed.");
    Ok(())
}

#[tokio::test]
async fn test_health() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/health");
            then.status(200).json_body(json!({ "status": "healthy" }));
        })
        .await;

    let status = client(&server).health().await?;
    assert_eq!(status["status"], "healthy");
    Ok(())
}
