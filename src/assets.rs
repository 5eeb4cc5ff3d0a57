//! Texture registry.
//!
//! Maps logical texture names to decoded RGBA images loaded from the asset
//! directory at startup. Field and element textures are required; the robot
//! and map furniture (compass, ruler) are loaded when present.

use anyhow::{anyhow, Context, Result};
use image::RgbaImage;
use std::collections::HashMap;
use std::path::Path;

use crate::element::ElementClass;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureId {
    Field,
    Robot,
    Compass,
    Ruler,
    BallRed,
    BallBlue,
}

impl TextureId {
    pub const ALL: [TextureId; 6] = [
        TextureId::Field,
        TextureId::Robot,
        TextureId::Compass,
        TextureId::Ruler,
        TextureId::BallRed,
        TextureId::BallBlue,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            TextureId::Field => "FieldTopDown-Cleared.png",
            TextureId::Robot => "HeroBot-Top.png",
            TextureId::Compass => "compass.png",
            TextureId::Ruler => "ruler.png",
            TextureId::BallRed => "RedBall-Top.png",
            TextureId::BallBlue => "BlueBall-Top.png",
        }
    }

    pub fn for_element(class: ElementClass) -> Self {
        match class {
            ElementClass::BallRed => TextureId::BallRed,
            ElementClass::BallBlue => TextureId::BallBlue,
        }
    }

    pub fn is_required(self) -> bool {
        self == TextureId::Field
            || ElementClass::ALL
                .iter()
                .any(|class| TextureId::for_element(*class) == self)
    }
}

#[derive(Default)]
pub struct AssetRegistry {
    textures: HashMap<TextureId, RgbaImage>,
}

impl AssetRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load textures from `dir`. Fails if a required texture is missing or
    /// any present file does not decode.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut registry = Self::empty();
        for id in TextureId::ALL {
            let path = dir.join(id.file_name());
            if !path.exists() {
                if id.is_required() {
                    return Err(anyhow!(
                        "required texture {:?} missing at {}",
                        id,
                        path.display()
                    ));
                }
                log::debug!("optional texture {:?} not found at {}", id, path.display());
                continue;
            }
            let image = image::open(&path)
                .with_context(|| format!("decode texture {}", path.display()))?
                .to_rgba8();
            log::debug!(
                "loaded texture {:?} ({}x{})",
                id,
                image.width(),
                image.height()
            );
            registry.insert(id, image);
        }
        log::info!(
            "loaded {} textures from {}",
            registry.len(),
            dir.display()
        );
        Ok(registry)
    }

    pub fn insert(&mut self, id: TextureId, image: RgbaImage) {
        self.textures.insert(id, image);
    }

    pub fn texture(&self, id: TextureId) -> Option<&RgbaImage> {
        self.textures.get(&id)
    }

    pub fn element_texture(&self, class: ElementClass) -> Option<&RgbaImage> {
        self.texture(TextureId::for_element(class))
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}
