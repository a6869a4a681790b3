//! Render styles for guide lines, polygons and vertex handles.

use peniko::Color;
use serde::{Deserialize, Serialize};

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn blue() -> Self {
        Self::new(0, 0, 255, 255)
    }

    /// CSS `green`, which is not full-intensity.
    pub const fn green() -> Self {
        Self::new(0, 128, 0, 255)
    }

    /// Same color with alpha given as a 0.0..=1.0 fraction.
    pub fn with_alpha(self, alpha: f64) -> Self {
        Self {
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Fill and stroke of a polygon or guide line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolygonStyle {
    /// Fill color (None = no fill).
    pub fill: Option<SerializableColor>,
    /// Stroke color.
    pub stroke: SerializableColor,
    /// Stroke width in scene units.
    pub stroke_width: f64,
}

impl PolygonStyle {
    /// Guide segments drawn between recorded points while tracing.
    pub fn guide() -> Self {
        Self {
            fill: None,
            stroke: SerializableColor::blue(),
            stroke_width: 2.0,
        }
    }

    /// Live preview polygon following the pointer.
    pub fn preview() -> Self {
        Self {
            fill: Some(SerializableColor::new(0, 255, 0, 0).with_alpha(0.2)),
            stroke: SerializableColor::green(),
            stroke_width: 1.0,
        }
    }

    /// Committed label polygon.
    pub fn label() -> Self {
        Self {
            fill: Some(SerializableColor::new(0, 255, 0, 0).with_alpha(0.3)),
            stroke: SerializableColor::green(),
            stroke_width: 2.0,
        }
    }

    /// Get the stroke color as a peniko Color.
    pub fn stroke_color(&self) -> Color {
        self.stroke.into()
    }

    /// Get the fill color as a peniko Color.
    pub fn fill_color(&self) -> Option<Color> {
        self.fill.map(Into::into)
    }
}

impl Default for PolygonStyle {
    fn default() -> Self {
        Self::label()
    }
}

/// Appearance and hit area of per-vertex edit handles.
///
/// Sizes are in display pixels, so handles keep their size at any zoom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandleStyle {
    /// Handle diameter.
    pub size: f64,
    /// Pointer distance from a handle center that still grabs it.
    pub hit_radius: f64,
    pub fill: SerializableColor,
    pub stroke: SerializableColor,
}

impl HandleStyle {
    pub fn radius(&self) -> f64 {
        self.size / 2.0
    }
}

impl Default for HandleStyle {
    fn default() -> Self {
        Self {
            size: 6.0,
            hit_radius: 6.0,
            fill: SerializableColor::blue().with_alpha(0.5),
            stroke: SerializableColor::blue(),
        }
    }
}
