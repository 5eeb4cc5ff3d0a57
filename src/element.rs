//! Element classes and their static visual configuration.
//!
//! Every lookup here is an exhaustive `match` over `ElementClass`, so adding
//! a class without its geometry, colors and label fails to compile. Class ids
//! arriving over the wire are checked by `TryFrom<u8>`; an id outside the
//! table is rejected at decode time instead of rendering as nothing.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::palette::Color;

/// Category of a detected field element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ElementClass {
    BallBlue = 0,
    BallRed = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown element class id {0}")]
pub struct UnknownElementClass(pub u8);

impl TryFrom<u8> for ElementClass {
    type Error = UnknownElementClass;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(ElementClass::BallBlue),
            1 => Ok(ElementClass::BallRed),
            other => Err(UnknownElementClass(other)),
        }
    }
}

impl From<ElementClass> for u8 {
    fn from(class: ElementClass) -> Self {
        class as u8
    }
}

/// Planar axis on the field. The map's ruler sidebars run along one each.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    X = 0,
    Y = 1,
}

/// Physical footprint of an element, in meters, plus its display scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementSize {
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementStyle {
    pub size: ElementSize,
    pub border: Color,
    pub fill: Color,
    pub label: &'static str,
}

/// Label text color shared by every class.
pub const LABEL_TEXT_COLOR: Color = Color::rgba(255, 255, 255, 255);

const BALL_DIAMETER_M: f64 = 0.08255;

impl ElementClass {
    pub const ALL: [ElementClass; 2] = [ElementClass::BallBlue, ElementClass::BallRed];

    pub fn size(self) -> ElementSize {
        match self {
            ElementClass::BallBlue | ElementClass::BallRed => ElementSize {
                width: BALL_DIAMETER_M,
                height: BALL_DIAMETER_M,
                scale: 2.0,
            },
        }
    }

    pub fn border_color(self) -> Color {
        match self {
            ElementClass::BallRed => Color::with_alpha(255, 0, 0, 0.8),
            ElementClass::BallBlue => Color::with_alpha(0, 0, 255, 0.8),
        }
    }

    pub fn fill_color(self) -> Color {
        match self {
            ElementClass::BallRed => Color::with_alpha(255, 0, 0, 0.3),
            ElementClass::BallBlue => Color::with_alpha(0, 0, 255, 0.3),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ElementClass::BallRed => "Red Ball",
            ElementClass::BallBlue => "Blue Ball",
        }
    }

    pub fn style(self) -> ElementStyle {
        ElementStyle {
            size: self.size(),
            border: self.border_color(),
            fill: self.fill_color(),
            label: self.label(),
        }
    }
}

/// Startup check that every class has a usable table entry.
pub fn validate_element_table() -> Result<()> {
    for class in ElementClass::ALL {
        let style = class.style();
        let size = style.size;
        if !(size.width > 0.0 && size.height > 0.0 && size.scale > 0.0) {
            return Err(anyhow!(
                "element {:?} has a non-positive size entry {:?}",
                class,
                size
            ));
        }
        if style.label.trim().is_empty() {
            return Err(anyhow!("element {:?} has an empty label", class));
        }
    }
    Ok(())
}
