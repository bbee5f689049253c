use anyhow::Result;
use httpmock::prelude::*;
use serde_json::json;
use smartfit::core::measurement::{MeasurementFlow, POSE_REQUIRED};
use smartfit::core::pose_capture::PoseCaptureFlow;
use smartfit::core::try_on::{
    CatalogTryOn, FormTryOn, TryOnDialog, CATALOG_TRY_ON_REQUIRED, TRY_ON_REQUIRED,
};
use smartfit::domain::model::{ImageFormat, ImagePayload, MeasurementForm, Product};
use smartfit::{CaptureSession, HttpCatalogClient, HttpMlClient, LocalStorage, SessionStore, SmartFitError};
use std::time::Duration;
use tempfile::TempDir;

const JPEG: &[u8] = b"\xff\xd8\xff\xe0body-photo\xff\xd9";
const PNG: &[u8] = b"\x89PNG\r\n\x1a\ngarment";

fn photo() -> ImagePayload {
    ImagePayload::new(JPEG.to_vec(), ImageFormat::Jpeg)
}

fn garment() -> ImagePayload {
    ImagePayload::new(PNG.to_vec(), ImageFormat::Png)
}

fn ml(server: &MockServer) -> HttpMlClient {
    HttpMlClient::new(server.base_url(), Duration::from_secs(5)).unwrap()
}

fn session_with_pose() -> CaptureSession {
    let mut session = CaptureSession::new();
    let pose = serde_json::from_value(json!({
        "success": true,
        "pose_data": { "landmarks": [[0.5, 0.5]] }
    }))
    .unwrap();
    session.record_pose(pose, photo());
    session
}

fn ready_session() -> CaptureSession {
    let mut session = session_with_pose();
    let mut form = MeasurementForm::default();
    form.set("height", 172.0).unwrap();
    form.set("chest", 96.5).unwrap();
    session.save_measurements(form.to_measurements()).unwrap();
    session
}

#[tokio::test]
async fn test_pose_capture_records_session() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/pose-estimation");
            then.status(200)
                .json_body(json!({ "pose_data": { "landmarks": [[0.1, 0.2]] } }));
        })
        .await;

    let mut session = ready_session();
    let flow = PoseCaptureFlow::new(ml(&server));
    flow.estimate(photo(), &mut session).await?;

    mock.assert_async().await;
    let captured = session.pose().unwrap();
    assert_eq!(captured.image, photo());
    assert_eq!(captured.result.landmark_count(), 1);
    assert!(session.measurements().is_none());
    Ok(())
}

#[tokio::test]
async fn test_pose_failure_leaves_session_untouched() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/pose-estimation");
            then.status(503);
        })
        .await;

    let mut session = ready_session();
    let before = session.clone();
    let err = PoseCaptureFlow::new(ml(&server))
        .estimate(photo(), &mut session)
        .await
        .unwrap_err();

    assert_eq!(err.user_friendly_message(), "Pose estimation failed.");
    assert_eq!(session, before);
    Ok(())
}

#[tokio::test]
async fn test_measurement_requires_pose_without_calling_service() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/body-measurement");
            then.status(200).json_body(json!({ "measurements": {} }));
        })
        .await;

    let flow = MeasurementFlow::new(ml(&server));
    let mut form = MeasurementForm::default();
    let err = flow
        .fetch(&CaptureSession::new(), &mut form)
        .await
        .unwrap_err();

    match &err {
        SmartFitError::PreconditionMissing { instruction, .. } => {
            assert_eq!(instruction, POSE_REQUIRED)
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(mock.hits_async().await, 0);
    Ok(())
}

#[tokio::test]
async fn test_measurement_fetch_edit_save() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/body-measurement");
            then.status(200).json_body(json!({
                "measurements": { "height": 170.0, "chest": 94.0, "waist": 80.0, "hips": 98.0, "inseam": 78.0 }
            }));
        })
        .await;

    let flow = MeasurementFlow::new(ml(&server));
    let mut session = session_with_pose();
    let mut form = MeasurementForm::default();

    flow.fetch(&session, &mut form).await?;
    assert_eq!(form.get("chest"), Some(94.0));

    form.set("chest", 96.0)?;
    let saved = flow.save(&form, &mut session)?;
    assert_eq!(saved.get("chest"), Some(96.0));
    assert_eq!(session.measurements(), Some(&saved));

    let dir = TempDir::new()?;
    let store = SessionStore::new(LocalStorage::new(dir.path()));
    store.save(&session).await?;
    assert_eq!(store.load().await?, session);
    Ok(())
}

#[tokio::test]
async fn test_form_try_on_lists_missing_inputs() -> Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/virtual-tryon");
            then.status(200).json_body(json!({ "result_image": "" }));
        })
        .await;

    let flow = FormTryOn::new(ml(&server));
    let err = flow
        .run(Some(&photo()), None, &session_with_pose())
        .await
        .unwrap_err();

    match &err {
        SmartFitError::PreconditionMissing {
            instruction,
            missing,
        } => {
            assert_eq!(instruction, TRY_ON_REQUIRED);
            assert_eq!(missing, &vec!["garment image".to_string(), "measurements".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(mock.hits_async().await, 0);
    Ok(())
}

#[tokio::test]
async fn test_form_try_on_single_call_and_in_flight_rejection() -> Result<()> {
    let server = MockServer::start_async().await;
    let result_b64 = photo().to_base64();
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/virtual-tryon");
            then.status(200)
                .delay(Duration::from_millis(500))
                .json_body(json!({ "result_image": result_b64 }));
        })
        .await;

    let flow = FormTryOn::new(ml(&server));
    let session = ready_session();
    let user = photo();
    let garment = garment();

    let (first, second) = tokio::join!(flow.run(Some(&user), Some(&garment), &session), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(flow.is_running());
        flow.run(Some(&user), Some(&garment), &session).await
    });

    let result = first?;
    assert_eq!(result.image, photo());
    assert!(matches!(second, Err(SmartFitError::ActionInFlight { .. })));
    assert_eq!(mock.hits_async().await, 1);
    assert!(!flow.is_running());
    Ok(())
}

#[tokio::test]
async fn test_catalog_try_on_sends_fetched_garment() -> Result<()> {
    let server = MockServer::start_async().await;
    let garment_b64 = garment().to_base64();

    let image_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/images/tee.png");
            then.status(200)
                .header("content-type", "image/png")
                .body(PNG);
        })
        .await;
    let tryon_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/virtual-tryon")
                .body_contains(format!("\"garment_image\":\"{garment_b64}\""))
                .body_contains("\"pose_data\":{}")
                .body_contains("\"measurements\":{}");
            then.status(200)
                .json_body(json!({ "result_image": photo().to_data_url(), "confidence": 0.7 }));
        })
        .await;

    let product = Product {
        id: 1,
        name: "Classic T-Shirt".to_string(),
        price: 29.99,
        image: server.url("/images/tee.png"),
        description: "Comfortable cotton t-shirt".to_string(),
    };
    let catalog = HttpCatalogClient::new(server.base_url(), Duration::from_secs(5))?;
    let flow = CatalogTryOn::new(ml(&server), catalog);

    let mut dialog = TryOnDialog::new();
    let err = flow.submit(&mut dialog).await.unwrap_err();
    assert!(matches!(
        err,
        SmartFitError::PreconditionMissing { ref instruction, .. } if instruction == CATALOG_TRY_ON_REQUIRED
    ));

    dialog.select(product);
    dialog.use_photo(photo());
    let result = flow.submit(&mut dialog).await?;

    image_mock.assert_async().await;
    tryon_mock.assert_async().await;
    assert_eq!(result.confidence, Some(0.7));
    assert_eq!(dialog.result(), Some(&result));
    Ok(())
}

#[tokio::test]
async fn test_catalog_try_on_unusable_garment_shows_generic_failure() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/images/missing.jpg");
            then.status(404);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/images/notes.txt");
            then.status(200)
                .header("content-type", "text/plain")
                .body("not an image");
        })
        .await;
    let tryon_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/virtual-tryon");
            then.status(200)
                .json_body(json!({ "result_image": photo().to_base64() }));
        })
        .await;

    let catalog = HttpCatalogClient::new(server.base_url(), Duration::from_secs(5))?;
    let flow = CatalogTryOn::new(ml(&server), catalog);

    for path in ["/images/missing.jpg", "/images/notes.txt"] {
        let mut dialog = TryOnDialog::new();
        dialog.select(Product {
            id: 4,
            name: "Green T-Shirt".to_string(),
            price: 19.99,
            image: server.url(path),
            description: "Soft green t-shirt, great for casual wear.".to_string(),
        });
        dialog.use_photo(photo());

        let err = flow.submit(&mut dialog).await.unwrap_err();
        assert!(matches!(err, SmartFitError::UpstreamFailed { .. }), "{path}");
        assert_eq!(err.user_friendly_message(), "Virtual try-on failed.", "{path}");
        assert!(dialog.result().is_none());
    }

    assert_eq!(tryon_mock.hits_async().await, 0);
    Ok(())
}
