use crate::assets::TextureId;
use crate::detection::Detection;
use crate::element::ElementClass;

/// A detected element placed on the field canvas, relative to the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
    pub class: ElementClass,
    pub texture: TextureId,
    pub depth: f64,
    /// Anchor position; the sprite is centred on it via the offsets.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Sprite {
    pub fn top_left(&self) -> (f64, f64) {
        (self.x - self.offset_x, self.y - self.offset_y)
    }
}

pub struct FieldLayer;

impl FieldLayer {
    /// Place one sprite per detection with a known depth.
    ///
    /// Field "up" is screen "down", so Y is negated.
    pub fn sprites(detections: &[Detection], scale: f64) -> Vec<Sprite> {
        detections
            .iter()
            .filter(|detection| !detection.has_unknown_depth())
            .filter_map(|detection| {
                let (map_x, map_y) = detection.map_location.first()?;
                Some(Self::place(detection, map_x, map_y, scale))
            })
            .collect()
    }

    fn place(detection: &Detection, map_x: f64, map_y: f64, scale: f64) -> Sprite {
        let size = detection.class.size();
        let width = scale * size.width * size.scale;
        let height = scale * size.height * size.scale;
        Sprite {
            class: detection.class,
            texture: TextureId::for_element(detection.class),
            depth: detection.depth,
            x: map_x * scale * size.scale,
            y: map_y * scale * -1.0 * size.scale,
            width,
            height,
            offset_x: width / 2.0,
            offset_y: height / 2.0,
        }
    }
}
