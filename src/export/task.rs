use chrono::Utc;
use image::RgbaImage;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use super::{compose_snapshot, encode_png, snapshot_file_name, ExportError};
use crate::detection::CameraFrame;

/// Shared cancel flag, checked between export stages.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), ExportError> {
        if self.is_cancelled() {
            Err(ExportError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Inputs captured from the mounted camera surface at request time.
#[derive(Clone, Debug)]
pub struct SnapshotJob {
    pub frame: CameraFrame,
    /// Overlay rasterised at display resolution.
    pub overlay: RgbaImage,
    pub export_dir: PathBuf,
}

#[derive(Debug)]
pub struct ExportHandle {
    token: CancellationToken,
    join: Option<JoinHandle<Result<PathBuf, ExportError>>>,
}

impl ExportHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join
            .as_ref()
            .map(|join| join.is_finished())
            .unwrap_or(true)
    }

    /// Block until the export completes and return the written path.
    pub fn wait(mut self) -> Result<PathBuf, ExportError> {
        match self.join.take() {
            Some(join) => join.join().map_err(|_| ExportError::Panicked)?,
            None => Err(ExportError::Panicked),
        }
    }
}

pub struct ExportTask;

impl ExportTask {
    /// Run the export on its own thread. Each call is independent; two
    /// requests in flight produce two files.
    pub fn spawn(job: SnapshotJob, token: CancellationToken) -> Result<ExportHandle, ExportError> {
        let worker_token = token.clone();
        let join = std::thread::Builder::new()
            .name("snapshot-export".to_string())
            .spawn(move || Self::run(job, &worker_token))?;
        Ok(ExportHandle {
            token,
            join: Some(join),
        })
    }

    /// Run the export on the calling thread.
    pub fn run(job: SnapshotJob, token: &CancellationToken) -> Result<PathBuf, ExportError> {
        token.check()?;
        let overlay = job.overlay;
        if overlay.width() == 0 || overlay.height() == 0 {
            return Err(ExportError::Decode {
                what: "overlay",
                message: "overlay surface is empty".to_string(),
            });
        }
        token.check()?;

        let original = job.frame.decode().map_err(|e| ExportError::Decode {
            what: "camera frame",
            message: format!("{:#}", e),
        })?;
        token.check()?;

        let composed = compose_snapshot(&original, &overlay);
        let bytes = encode_png(&composed)?;
        token.check()?;

        std::fs::create_dir_all(&job.export_dir)?;
        let path = job.export_dir.join(snapshot_file_name(Utc::now()));
        std::fs::write(&path, bytes)?;
        log::info!(
            "snapshot written to {} ({}x{})",
            path.display(),
            composed.width(),
            composed.height()
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
    use image::Rgba;

    fn frame(width: u32, height: u32) -> CameraFrame {
        let image = RgbaImage::from_pixel(width, height, Rgba([10, 10, 10, 255]));
        let bytes = encode_png(&image).unwrap();
        CameraFrame {
            data: BASE64.encode(bytes),
            width,
            height,
        }
    }

    #[test]
    fn cancelled_token_stops_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let job = SnapshotJob {
            frame: frame(4, 4),
            overlay: RgbaImage::new(2, 2),
            export_dir: dir.path().to_path_buf(),
        };
        assert!(matches!(
            ExportTask::run(job, &token),
            Err(ExportError::Cancelled)
        ));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn bad_frame_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let job = SnapshotJob {
            frame: CameraFrame {
                data: "%%%".to_string(),
                width: 4,
                height: 4,
            },
            overlay: RgbaImage::new(2, 2),
            export_dir: dir.path().to_path_buf(),
        };
        let err = ExportTask::run(job, &CancellationToken::new()).unwrap_err();
        assert!(matches!(err, ExportError::Decode { what: "camera frame", .. }));
    }

    #[test]
    fn spawned_export_writes_full_resolution_png() {
        let dir = tempfile::tempdir().unwrap();
        let job = SnapshotJob {
            frame: frame(8, 6),
            overlay: RgbaImage::new(4, 3),
            export_dir: dir.path().join("snaps"),
        };
        let handle = ExportTask::spawn(job, CancellationToken::new()).unwrap();
        let path = handle.wait().unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("VEX_AI_") && name.ends_with("Z.png"));
        let written = image::open(&path).unwrap();
        assert_eq!((written.width(), written.height()), (8, 6));
    }
}
