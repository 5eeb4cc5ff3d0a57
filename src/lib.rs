//! VEX AI Dashboard renderer
//!
//! Renders what the robot's vision system sees: the live camera frame with
//! detection boxes drawn over it, and a top-down field map with a sprite per
//! detected element. Snapshots of the annotated camera view can be exported
//! as PNG files.
//!
//! # Module Structure
//!
//! - `config`: dashboard configuration (file + environment)
//! - `element`, `palette`, `assets`: static element table, colors, textures
//! - `detection`: upstream data shapes
//! - `camera`: depth-ordered overlay layout and rasterisation
//! - `field`: field map sprite placement and rendering
//! - `export`: snapshot composition and the background export task
//!
//! Renderers never hold on to upstream state. Each polling tick the caller
//! hands the latest `DataResponse` to `Dashboard::apply`, and every render
//! call works from that snapshot.

use anyhow::Result;
use image::RgbaImage;

pub mod assets;
pub mod camera;
pub mod config;
pub mod detection;
pub mod element;
pub mod export;
pub mod field;
pub mod palette;
pub mod text;

pub use assets::{AssetRegistry, TextureId};
pub use camera::{
    order_by_depth, BoxGeometry, CameraOverlay, CameraPanel, CameraView, Dimensions, DisplaySize,
    MountedSurface, Normalization, OverlayLayer,
};
pub use config::DashboardConfig;
pub use detection::{
    CameraFrame, DataResponse, Detection, MapLocation, RobotPosition, ScreenLocation,
    UNKNOWN_DEPTH,
};
pub use element::{Direction, ElementClass, ElementSize, ElementStyle, UnknownElementClass};
pub use export::{
    compose_snapshot, snapshot_file_name, CancellationToken, ExportError, ExportHandle,
    ExportTask, SnapshotJob,
};
pub use field::{FieldLayer, FieldMap, RobotSprite, Sprite};
pub use palette::{Color, Palette, Theme};
pub use text::LabelFont;

/// Dashboard state for one display: config, loaded resources, and the
/// latest upstream snapshot.
pub struct Dashboard {
    config: DashboardConfig,
    assets: AssetRegistry,
    font: Option<LabelFont>,
    camera: CameraPanel,
    response: DataResponse,
}

impl Dashboard {
    pub fn new(config: DashboardConfig, assets: AssetRegistry, font: Option<LabelFont>) -> Self {
        let camera = CameraPanel::new(config.source);
        Self {
            config,
            assets,
            font,
            camera,
            response: DataResponse::default(),
        }
    }

    /// Load textures and the optional label font named by `config`.
    pub fn open(config: DashboardConfig) -> Result<Self> {
        let assets = AssetRegistry::load(&config.asset_dir)?;
        let font = match config.font_path.as_deref() {
            Some(path) => Some(LabelFont::load(path)?),
            None => {
                log::warn!("no label font configured; overlay text will not be drawn");
                None
            }
        };
        Ok(Self::new(config, assets, font))
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn camera(&self) -> &CameraPanel {
        &self.camera
    }

    /// Replace the current snapshot with a new polling response.
    pub fn apply(&mut self, response: DataResponse) {
        if self.config.log_data_response {
            log::debug!("data response: {:?}", response);
        }
        if let Some(detections) = response.detections.as_deref() {
            self.camera.set_detections(detections);
        }
        self.camera.set_frame(response.image.clone());
        self.response = response;
    }

    /// Render the camera panel for a window of `window_height` pixels. While
    /// no frame has arrived this is the themed "connecting" placeholder.
    pub fn render_camera(&mut self, window_height: u32) -> Result<RgbaImage> {
        let font = self.font.as_ref();
        match self.camera.mount(window_height, font) {
            Some(surface) => surface.compose_display(),
            None => {
                let width = (window_height as f64 * 4.0 / 3.0).round() as u32;
                let displayed = DisplaySize {
                    width: width.max(1),
                    height: window_height.max(1),
                };
                Ok(camera::render_placeholder(
                    &self.config.theme(),
                    displayed,
                    font,
                ))
            }
        }
    }

    /// Export the mounted camera surface. `Ok(None)` when nothing is mounted.
    pub fn save_snapshot(
        &self,
        token: CancellationToken,
    ) -> std::result::Result<Option<ExportHandle>, ExportError> {
        self.camera
            .save_snapshot(self.config.export_dir.clone(), token)
    }

    /// Render the field map at `scale` pixels per meter onto a
    /// `width` x `height` canvas.
    pub fn render_field(&self, width: u32, height: u32, scale: f64) -> RgbaImage {
        let map = FieldMap::new(width, height, &self.config.field);
        let sprites = FieldLayer::sprites(self.response.detections(), scale);
        if self.config.detect_out_of_bounds_elements {
            for sprite in sprites.iter().filter(|sprite| map.is_out_of_bounds(sprite)) {
                log::warn!(
                    "{:?} detected out of bounds at ({:.2}, {:.2})",
                    sprite.class,
                    sprite.x,
                    sprite.y
                );
            }
        }
        let robot = self
            .response
            .position
            .as_ref()
            .map(|position| RobotSprite::place(position, &self.config.field.robot, scale));
        map.render(&self.assets, robot, &sprites)
    }
}
