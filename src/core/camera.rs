use crate::domain::model::ImagePayload;
use crate::domain::ports::{CameraDevice, VideoStream};
use crate::utils::error::{Result, SmartFitError};
use std::time::Duration;

/// An open camera stream. Every track is stopped when a still frame has
/// been taken, when the capture is closed, and when it is dropped.
pub struct CameraCapture {
    stream: Option<Box<dyn VideoStream>>,
    frame_timeout: Duration,
}

impl CameraCapture {
    pub async fn open(device: &dyn CameraDevice, frame_timeout: Duration) -> Result<Self> {
        let stream = device.open().await?;
        tracing::debug!("Camera opened with {} active tracks", stream.active_tracks());
        Ok(Self {
            stream: Some(stream),
            frame_timeout,
        })
    }

    /// Takes one still frame and releases the camera whatever the outcome.
    pub async fn capture_still(mut self) -> Result<ImagePayload> {
        let timeout = self.frame_timeout;
        let stream = self.stream.as_mut().ok_or_else(|| SmartFitError::Camera {
            message: "camera stream already released".to_string(),
        })?;

        let frame = match tokio::time::timeout(timeout, stream.read_frame()).await {
            Ok(frame) => frame,
            Err(_) => Err(SmartFitError::Camera {
                message: format!("no frame within {:?}", timeout),
            }),
        };

        self.release();
        frame
    }

    pub fn close(mut self) {
        self.release();
    }

    pub fn active_tracks(&self) -> usize {
        self.stream.as_ref().map_or(0, |s| s.active_tracks())
    }

    fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop_all_tracks();
            tracing::debug!("Camera released");
        }
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        self.release();
    }
}

/// At most one open capture, as in a capture dialog: reopening replaces
/// (and releases) the previous stream.
#[derive(Default)]
pub struct CameraSlot {
    active: Option<CameraCapture>,
}

impl CameraSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn open(&mut self, device: &dyn CameraDevice, frame_timeout: Duration) -> Result<()> {
        self.close();
        self.active = Some(CameraCapture::open(device, frame_timeout).await?);
        Ok(())
    }

    pub async fn capture(&mut self) -> Result<ImagePayload> {
        let capture = self.active.take().ok_or_else(|| SmartFitError::Camera {
            message: "camera is not open".to_string(),
        })?;
        capture.capture_still().await
    }

    pub fn close(&mut self) {
        if let Some(capture) = self.active.take() {
            capture.close();
        }
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_tracks(&self) -> usize {
        self.active.as_ref().map_or(0, CameraCapture::active_tracks)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::model::ImageFormat;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts live tracks across every stream it has handed out.
    #[derive(Clone)]
    pub(crate) struct FakeCamera {
        pub live_tracks: Arc<AtomicUsize>,
        pub tracks_per_stream: usize,
        pub frame: Option<ImagePayload>,
    }

    impl FakeCamera {
        pub(crate) fn new(frame: Option<ImagePayload>) -> Self {
            Self {
                live_tracks: Arc::new(AtomicUsize::new(0)),
                tracks_per_stream: 2,
                frame,
            }
        }

        pub(crate) fn live(&self) -> usize {
            self.live_tracks.load(Ordering::SeqCst)
        }
    }

    struct FakeStream {
        live_tracks: Arc<AtomicUsize>,
        mine: usize,
        frame: Option<ImagePayload>,
    }

    #[async_trait]
    impl CameraDevice for FakeCamera {
        async fn open(&self) -> Result<Box<dyn VideoStream>> {
            self.live_tracks
                .fetch_add(self.tracks_per_stream, Ordering::SeqCst);
            Ok(Box::new(FakeStream {
                live_tracks: Arc::clone(&self.live_tracks),
                mine: self.tracks_per_stream,
                frame: self.frame.clone(),
            }))
        }
    }

    #[async_trait]
    impl VideoStream for FakeStream {
        async fn read_frame(&mut self) -> Result<ImagePayload> {
            self.frame.clone().ok_or_else(|| SmartFitError::Camera {
                message: "sensor error".to_string(),
            })
        }

        fn stop_all_tracks(&mut self) {
            self.live_tracks.fetch_sub(self.mine, Ordering::SeqCst);
            self.mine = 0;
        }

        fn active_tracks(&self) -> usize {
            self.mine
        }
    }

    pub(crate) fn jpeg_frame() -> ImagePayload {
        ImagePayload::new(vec![0xFF, 0xD8, 0xFF, 0xE0, 0xFF, 0xD9], ImageFormat::Jpeg)
    }

    const TIMEOUT: Duration = Duration::from_secs(1);

    #[tokio::test]
    async fn test_capture_releases_tracks() {
        let camera = FakeCamera::new(Some(jpeg_frame()));
        let capture = CameraCapture::open(&camera, TIMEOUT).await.unwrap();
        assert_eq!(camera.live(), 2);
        assert_eq!(capture.active_tracks(), 2);

        let frame = capture.capture_still().await.unwrap();
        assert_eq!(frame.format(), ImageFormat::Jpeg);
        assert_eq!(camera.live(), 0);
    }

    #[tokio::test]
    async fn test_failed_capture_still_releases_tracks() {
        let camera = FakeCamera::new(None);
        let capture = CameraCapture::open(&camera, TIMEOUT).await.unwrap();
        assert!(capture.capture_still().await.is_err());
        assert_eq!(camera.live(), 0);
    }

    #[tokio::test]
    async fn test_close_and_drop_release_tracks() {
        let camera = FakeCamera::new(Some(jpeg_frame()));

        let capture = CameraCapture::open(&camera, TIMEOUT).await.unwrap();
        capture.close();
        assert_eq!(camera.live(), 0);

        {
            let _capture = CameraCapture::open(&camera, TIMEOUT).await.unwrap();
            assert_eq!(camera.live(), 2);
        }
        assert_eq!(camera.live(), 0);
    }

    #[tokio::test]
    async fn test_slot_recapture_releases_previous_stream() {
        let camera = FakeCamera::new(Some(jpeg_frame()));
        let mut slot = CameraSlot::new();

        slot.open(&camera, TIMEOUT).await.unwrap();
        slot.open(&camera, TIMEOUT).await.unwrap();
        assert_eq!(camera.live(), 2);
        assert_eq!(slot.active_tracks(), 2);

        slot.capture().await.unwrap();
        assert_eq!(camera.live(), 0);
        assert!(!slot.is_open());
        assert!(slot.capture().await.is_err());

        slot.open(&camera, TIMEOUT).await.unwrap();
        slot.close();
        assert_eq!(camera.live(), 0);
    }
}
