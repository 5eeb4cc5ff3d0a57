//! Camera panel: latest frame plus depth-ordered detection overlay.
//!
//! The panel owns copies of the most recent frame and detection batch. Both
//! are replaced wholesale by the caller on every polling tick; the panel never
//! reaches back into shared state.

pub mod geometry;
pub mod raster;

use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::path::PathBuf;

use crate::config::SourceSettings;
use crate::detection::{CameraFrame, Detection};
use crate::export::{CancellationToken, ExportError, ExportHandle, ExportTask, SnapshotJob};
use crate::text::LabelFont;

pub use geometry::{BoxGeometry, Dimensions, Normalization, OverlayLayer, RectF};
pub use raster::{rasterize_overlay, render_placeholder};

/// Vertical space reserved below the image for panel controls.
const CONTROL_STRIP_PX: f64 = 50.0;
/// Displayed width may not exceed this multiple of the window height.
const MAX_WIDTH_PER_HEIGHT: f64 = 1.35;

/// Size the camera image is drawn at, in screen pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplaySize {
    pub width: u32,
    pub height: u32,
}

impl DisplaySize {
    /// Fit a frame into the panel for a window of `window_height` pixels,
    /// keeping the frame's aspect ratio.
    pub fn fit(frame_width: u32, frame_height: u32, window_height: u32) -> Self {
        let frame_width = frame_width.max(1) as f64;
        let frame_height = frame_height.max(1) as f64;
        let max_height = (window_height as f64 - CONTROL_STRIP_PX).max(1.0);
        let max_width = (window_height as f64 * MAX_WIDTH_PER_HEIGHT).max(1.0);
        let scale = (max_width / frame_width).min(max_height / frame_height);
        Self {
            width: ((frame_width * scale).round() as u32).max(1),
            height: ((frame_height * scale).round() as u32).max(1),
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::from_pixels(self.width, self.height)
    }
}

/// Painter's order: farthest first, so nearer detections draw on top.
pub fn order_by_depth(detections: &[Detection]) -> Vec<Detection> {
    let mut sorted = detections.to_vec();
    sorted.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    sorted
}

/// Builds overlay layers for a detection batch.
#[derive(Clone, Copy, Debug)]
pub struct CameraOverlay {
    normalization: Normalization,
}

impl CameraOverlay {
    pub fn new(source: SourceSettings) -> Self {
        Self {
            normalization: source.into(),
        }
    }

    pub fn with_normalization(normalization: Normalization) -> Self {
        Self { normalization }
    }

    /// One layer per drawable detection, in the order given.
    ///
    /// Detections with zero or unknown depth are hidden rather than drawn
    /// with a misleading distance. Detections without a map location are
    /// skipped.
    pub fn layers(
        &self,
        original: Dimensions,
        displayed: Dimensions,
        detections: &[Detection],
    ) -> Vec<OverlayLayer> {
        detections
            .iter()
            .filter(|detection| detection.is_drawable_on_camera())
            .filter_map(|detection| {
                let Some(map_xy) = detection.map_location.first() else {
                    log::warn!(
                        "skipping {:?} detection with empty map location",
                        detection.class
                    );
                    return None;
                };
                let geometry = BoxGeometry::compute(
                    &detection.screen_location,
                    original,
                    displayed,
                    self.normalization,
                );
                Some(OverlayLayer::build(detection, geometry, map_xy))
            })
            .collect()
    }
}

/// What the panel shows right now.
#[derive(Debug)]
pub enum CameraView<'a> {
    Connecting,
    Live {
        frame: &'a CameraFrame,
        displayed: DisplaySize,
        layers: Vec<OverlayLayer>,
    },
}

/// Rendered state of the panel: the displayed size and the rasterised overlay.
#[derive(Clone, Debug)]
pub struct MountedSurface {
    pub frame: CameraFrame,
    pub displayed: DisplaySize,
    pub overlay: RgbaImage,
}

impl MountedSurface {
    /// The frame scaled to display size with the overlay on top.
    pub fn compose_display(&self) -> Result<RgbaImage> {
        let frame = self.frame.decode().context("decode camera frame for display")?;
        let mut display = imageops::resize(
            &frame,
            self.displayed.width,
            self.displayed.height,
            FilterType::Triangle,
        );
        imageops::overlay(&mut display, &self.overlay, 0, 0);
        Ok(display)
    }
}

pub struct CameraPanel {
    overlay: CameraOverlay,
    frame: Option<CameraFrame>,
    detections: Vec<Detection>,
    mounted: Option<MountedSurface>,
}

impl CameraPanel {
    pub fn new(source: SourceSettings) -> Self {
        Self {
            overlay: CameraOverlay::new(source),
            frame: None,
            detections: Vec::new(),
            mounted: None,
        }
    }

    pub fn set_frame(&mut self, frame: Option<CameraFrame>) {
        if frame.is_none() {
            self.mounted = None;
        }
        self.frame = frame;
    }

    /// Replace the detection batch, stored in painter's order.
    pub fn set_detections(&mut self, detections: &[Detection]) {
        self.detections = order_by_depth(detections);
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    pub fn view(&self, window_height: u32) -> CameraView<'_> {
        let Some(frame) = self.frame.as_ref() else {
            return CameraView::Connecting;
        };
        let displayed = DisplaySize::fit(frame.width, frame.height, window_height);
        let layers = self.overlay.layers(
            Dimensions::from_pixels(frame.width, frame.height),
            displayed.dimensions(),
            &self.detections,
        );
        CameraView::Live {
            frame,
            displayed,
            layers,
        }
    }

    /// Rasterise the current view and keep it as the mounted surface.
    /// Returns `None` while no frame has arrived.
    pub fn mount(&mut self, window_height: u32, font: Option<&LabelFont>) -> Option<&MountedSurface> {
        let surface = match self.view(window_height) {
            CameraView::Connecting => None,
            CameraView::Live {
                frame,
                displayed,
                layers,
            } => {
                log::debug!(
                    "mounting camera overlay {}x{} with {} layers",
                    displayed.width,
                    displayed.height,
                    layers.len()
                );
                Some(MountedSurface {
                    frame: frame.clone(),
                    displayed,
                    overlay: rasterize_overlay(&layers, displayed, font),
                })
            }
        };
        self.mounted = surface;
        self.mounted.as_ref()
    }

    pub fn mounted(&self) -> Option<&MountedSurface> {
        self.mounted.as_ref()
    }

    /// Start a snapshot export of the mounted surface.
    ///
    /// A no-op returning `Ok(None)` when nothing is mounted.
    pub fn save_snapshot(
        &self,
        export_dir: PathBuf,
        token: CancellationToken,
    ) -> std::result::Result<Option<ExportHandle>, ExportError> {
        let Some(surface) = self.mounted.as_ref() else {
            log::debug!("snapshot requested before the camera surface was mounted");
            return Ok(None);
        };
        let job = SnapshotJob {
            frame: surface.frame.clone(),
            overlay: surface.overlay.clone(),
            export_dir,
        };
        ExportTask::spawn(job, token).map(Some)
    }
}
