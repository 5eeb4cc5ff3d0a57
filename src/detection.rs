//! Upstream data shapes.
//!
//! These mirror the JSON the data service publishes once per polling tick.
//! A response replaces the previous one wholesale; nothing here is mutated
//! after decoding.

use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::RgbaImage;
use serde::{Deserialize, Deserializer, Serialize};

use crate::element::ElementClass;

/// Depth value meaning "distance unknown".
pub const UNKNOWN_DEPTH: f64 = -1.0;

/// One camera frame as published upstream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraFrame {
    /// Base64 encoded PNG or JPEG.
    pub data: String,
    pub width: u32,
    pub height: u32,
}

impl CameraFrame {
    /// Decode the pixel payload. A `data:<mime>;base64,` prefix is accepted.
    pub fn decode(&self) -> Result<RgbaImage> {
        let payload = match self.data.split_once(";base64,") {
            Some((prefix, rest)) if prefix.starts_with("data:") => rest,
            _ => self.data.as_str(),
        };
        let bytes = BASE64
            .decode(payload.trim())
            .context("camera frame is not valid base64")?;
        let image = image::load_from_memory(&bytes)
            .context("camera frame payload is not a decodable image")?
            .to_rgba8();
        if image.width() != self.width || image.height() != self.height {
            log::debug!(
                "camera frame declares {}x{} but decodes to {}x{}",
                self.width,
                self.height,
                image.width(),
                image.height()
            );
        }
        Ok(image)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Pixel rectangle in the source camera frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenLocation {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Position on the field plane, in meters. Only the first entry is used.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MapLocation {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl MapLocation {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x: vec![x],
            y: vec![y],
        }
    }

    pub fn first(&self) -> Option<(f64, f64)> {
        Some((*self.x.first()?, *self.y.first()?))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub class: ElementClass,
    #[serde(rename = "prob", default)]
    pub probability: f64,
    #[serde(default = "unknown_depth", deserialize_with = "depth_or_unknown")]
    pub depth: f64,
    pub screen_location: ScreenLocation,
    pub map_location: MapLocation,
}

impl Detection {
    pub fn new(
        class: ElementClass,
        depth: f64,
        screen_location: ScreenLocation,
        map_location: MapLocation,
    ) -> Self {
        Self {
            class,
            probability: 0.0,
            depth: normalize_depth(depth),
            screen_location,
            map_location,
        }
    }

    pub fn has_unknown_depth(&self) -> bool {
        self.depth.is_nan() || self.depth == UNKNOWN_DEPTH
    }

    /// Camera boxes are drawn only for a real, non-zero depth.
    pub fn is_drawable_on_camera(&self) -> bool {
        self.depth != 0.0 && !self.has_unknown_depth()
    }
}

fn normalize_depth(depth: f64) -> f64 {
    if depth.is_nan() {
        UNKNOWN_DEPTH
    } else {
        depth
    }
}

fn unknown_depth() -> f64 {
    UNKNOWN_DEPTH
}

fn depth_or_unknown<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let depth = Option::<f64>::deserialize(deserializer)?;
    Ok(depth.map(normalize_depth).unwrap_or(UNKNOWN_DEPTH))
}

/// Robot pose reported alongside detections (meters, degrees).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RobotPosition {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default)]
    pub azimuth: f64,
}

/// One polling tick's worth of upstream data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DataResponse {
    #[serde(default)]
    pub image: Option<CameraFrame>,
    #[serde(default)]
    pub detections: Option<Vec<Detection>>,
    #[serde(default)]
    pub position: Option<RobotPosition>,
}

impl DataResponse {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| anyhow!("invalid data response: {}", e))
    }

    pub fn detections(&self) -> &[Detection] {
        self.detections.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    fn detection_json(depth: &str) -> String {
        format!(
            r#"{{
                "class": 1,
                "prob": 0.9,
                "depth": {depth},
                "screenLocation": {{"x": 10, "y": 20, "width": 30, "height": 40}},
                "mapLocation": {{"x": [0.5], "y": [-0.25]}}
            }}"#
        )
    }

    #[test]
    fn decodes_upstream_detection() {
        let detection: Detection = serde_json::from_str(&detection_json("1.25")).unwrap();
        assert_eq!(detection.class, ElementClass::BallRed);
        assert_eq!(detection.depth, 1.25);
        assert_eq!(detection.screen_location.height, 40.0);
        assert_eq!(detection.map_location.first(), Some((0.5, -0.25)));
        assert!(detection.is_drawable_on_camera());
    }

    #[test]
    fn null_depth_becomes_unknown_sentinel() {
        let detection: Detection = serde_json::from_str(&detection_json("null")).unwrap();
        assert_eq!(detection.depth, UNKNOWN_DEPTH);
        assert!(detection.has_unknown_depth());
        assert!(!detection.is_drawable_on_camera());
    }

    #[test]
    fn nan_depth_is_normalized() {
        let detection = Detection::new(
            ElementClass::BallBlue,
            f64::NAN,
            ScreenLocation::default(),
            MapLocation::at(0.0, 0.0),
        );
        assert_eq!(detection.depth, UNKNOWN_DEPTH);
    }

    #[test]
    fn zero_depth_is_not_drawable() {
        let detection = Detection::new(
            ElementClass::BallBlue,
            0.0,
            ScreenLocation::default(),
            MapLocation::at(0.0, 0.0),
        );
        assert!(!detection.has_unknown_depth());
        assert!(!detection.is_drawable_on_camera());
    }

    #[test]
    fn empty_map_location_has_no_first_point() {
        let location = MapLocation {
            x: vec![],
            y: vec![1.0],
        };
        assert_eq!(location.first(), None);
    }

    #[test]
    fn camera_frame_decodes_with_and_without_data_uri_prefix() {
        let mut png = Vec::new();
        RgbaImage::from_pixel(4, 3, Rgba([1, 2, 3, 255]))
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        let encoded = BASE64.encode(&png);

        let frame = CameraFrame {
            data: encoded.clone(),
            width: 4,
            height: 3,
        };
        assert_eq!(frame.decode().unwrap().dimensions(), (4, 3));

        let frame = CameraFrame {
            data: format!("data:image/png;base64,{encoded}"),
            width: 4,
            height: 3,
        };
        assert_eq!(frame.decode().unwrap().get_pixel(0, 0), &Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn camera_frame_rejects_garbage() {
        let frame = CameraFrame {
            data: "not base64!".to_string(),
            width: 1,
            height: 1,
        };
        assert!(frame.decode().is_err());
    }

    #[test]
    fn response_without_image_or_detections_parses() {
        let response = DataResponse::from_json("{}").unwrap();
        assert!(response.image.is_none());
        assert!(response.detections().is_empty());
    }
}
