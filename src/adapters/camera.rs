use crate::config::toml_config::CameraConfig;
use crate::domain::model::{ImageFormat, ImagePayload};
use crate::domain::ports::{CameraDevice, VideoStream};
use crate::utils::error::{Result, SmartFitError};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command};

/// Camera backed by a capture command that writes an MJPEG stream to stdout.
/// The running process is the stream's single track.
#[derive(Debug, Clone)]
pub struct ProcessCamera {
    program: String,
    args: Vec<String>,
}

impl ProcessCamera {
    pub fn new(command: &[String]) -> Result<Self> {
        let (program, args) = command.split_first().ok_or_else(|| SmartFitError::MissingConfigError {
            field: "camera.command".to_string(),
        })?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    pub fn from_config(config: &CameraConfig) -> Result<Self> {
        let command = crate::utils::validation::validate_required_field(
            "camera.command",
            &config.command,
        )?;
        Self::new(command)
    }
}

#[async_trait]
impl CameraDevice for ProcessCamera {
    async fn open(&self) -> Result<Box<dyn VideoStream>> {
        tracing::debug!("Starting capture command {} {:?}", self.program, self.args);

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SmartFitError::Camera {
                message: format!("failed to start {}: {}", self.program, e),
            })?;

        let stdout = child.stdout.take().ok_or_else(|| SmartFitError::Camera {
            message: "capture command has no stdout".to_string(),
        })?;

        Ok(Box::new(ProcessStream {
            child: Some(child),
            stdout: Some(stdout),
            buffer: Vec::new(),
        }))
    }
}

struct ProcessStream {
    child: Option<Child>,
    stdout: Option<ChildStdout>,
    buffer: Vec<u8>,
}

#[async_trait]
impl VideoStream for ProcessStream {
    async fn read_frame(&mut self) -> Result<ImagePayload> {
        let stdout = self.stdout.as_mut().ok_or_else(|| SmartFitError::Camera {
            message: "stream already stopped".to_string(),
        })?;

        let mut chunk = [0u8; 8192];
        loop {
            if let Some(frame) = take_jpeg_frame(&mut self.buffer) {
                return Ok(ImagePayload::new(frame, ImageFormat::Jpeg));
            }

            let n = stdout.read(&mut chunk).await.map_err(|e| SmartFitError::Camera {
                message: format!("reading capture stream failed: {}", e),
            })?;
            if n == 0 {
                return Err(SmartFitError::Camera {
                    message: "capture stream ended before a complete frame".to_string(),
                });
            }
            self.buffer.extend_from_slice(&chunk[..n]);
        }
    }

    fn stop_all_tracks(&mut self) {
        self.stdout = None;
        self.buffer.clear();
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.start_kill() {
                tracing::debug!("Capture process already gone: {}", e);
            }
        }
    }

    fn active_tracks(&self) -> usize {
        usize::from(self.child.is_some())
    }
}

impl Drop for ProcessStream {
    fn drop(&mut self) {
        self.stop_all_tracks();
    }
}

/// Removes and returns the first complete SOI..EOI JPEG from `buffer`.
/// Bytes before the SOI marker are discarded.
fn take_jpeg_frame(buffer: &mut Vec<u8>) -> Option<Vec<u8>> {
    let start = buffer.windows(2).position(|w| w == [0xFF, 0xD8])?;
    let end = match frame_end(&buffer[start..]) {
        FrameEnd::Complete(len) => start + len,
        FrameEnd::Incomplete => return None,
        // Not laid out as marker segments: the first EOI ends the frame.
        FrameEnd::Unstructured(from) => {
            let from = start + from;
            buffer[from..]
                .windows(2)
                .position(|w| w == [0xFF, 0xD9])
                .map(|offset| from + offset + 2)?
        }
    };

    let frame = buffer[start..end].to_vec();
    buffer.drain(..end);
    Some(frame)
}

enum FrameEnd {
    Complete(usize),
    Incomplete,
    Unstructured(usize),
}

/// Walks the marker segments of a JPEG that starts with SOI. Segments are
/// skipped by their declared length, so an EOI inside an embedded EXIF
/// thumbnail does not end the frame.
fn frame_end(data: &[u8]) -> FrameEnd {
    let mut pos = 2;
    loop {
        let Some(&byte) = data.get(pos) else {
            return FrameEnd::Incomplete;
        };
        if byte != 0xFF {
            return FrameEnd::Unstructured(pos);
        }
        let Some(&marker) = data.get(pos + 1) else {
            return FrameEnd::Incomplete;
        };

        match marker {
            0xFF => pos += 1,
            0xD9 => return FrameEnd::Complete(pos + 2),
            0x01 | 0xD0..=0xD7 => pos += 2,
            0x00 | 0xD8 => return FrameEnd::Unstructured(pos),
            _ => {
                let Some(length) = data.get(pos + 2..pos + 4) else {
                    return FrameEnd::Incomplete;
                };
                let length = usize::from(u16::from_be_bytes([length[0], length[1]]));
                if length < 2 {
                    return FrameEnd::Unstructured(pos);
                }

                let segment_end = pos + 2 + length;
                if marker != 0xDA {
                    pos = segment_end;
                    continue;
                }
                match entropy_end(data, segment_end) {
                    Some(next) => pos = next,
                    None => return FrameEnd::Incomplete,
                }
            }
        }
    }
}

/// Entropy-coded scan data runs until the next marker that is not a
/// stuffed zero, a restart marker or fill.
fn entropy_end(data: &[u8], from: usize) -> Option<usize> {
    let mut pos = from;
    while pos + 1 < data.len() {
        if data[pos] == 0xFF && !matches!(data[pos + 1], 0x00 | 0xD0..=0xD7 | 0xFF) {
            return Some(pos);
        }
        pos += 1;
    }
    None
}
