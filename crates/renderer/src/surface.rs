//! 2D drawing surface abstraction and a recording implementation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Opaque color with 0-255 channels. Channels stay `f32` so blended colors
/// keep their fractional part until the host rasterises them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// From a `0xRRGGBB` literal.
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32,
            g: ((hex >> 8) & 0xff) as f32,
            b: (hex & 0xff) as f32,
        }
    }

    /// Linear interpolation in RGB space; `t` is clamped to [0, 1].
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        Rgb {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    pub fn with_alpha(self, a: f32) -> Rgba {
        Rgba {
            rgb: self,
            a: a.clamp(0.0, 1.0),
        }
    }

    pub fn opaque(self) -> Rgba {
        self.with_alpha(1.0)
    }
}

/// Color plus alpha in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub rgb: Rgb,
    pub a: f32,
}

impl Rgba {
    /// CSS `rgba(..)` form, as consumed by canvas-backed hosts.
    pub fn to_css(&self) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            self.rgb.r.round() as u8,
            self.rgb.g.round() as u8,
            self.rgb.b.round() as u8,
            self.a
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size_px: f32,
    pub color: Rgba,
    pub align: TextAlign,
}

impl TextStyle {
    pub fn new(size_px: f32, color: Rgba, align: TextAlign) -> Self {
        Self {
            size_px,
            color,
            align,
        }
    }
}

/// Immediate-mode 2D drawing target. Angles are radians, clockwise from +X
/// in screen space (canvas convention). Coordinates are pixels.
pub trait DrawSurface {
    fn size(&self) -> Vec2;
    fn clear(&mut self);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Rgba, line_width: f32);
    fn fill_wedge(&mut self, center: Vec2, radius: f32, start_angle: f32, end_angle: f32, color: Rgba);
    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Rgba);
    fn draw_text(&mut self, at: Vec2, text: &str, style: TextStyle);
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    FillCircle { center: Vec2, radius: f32, color: Rgba },
    StrokeCircle { center: Vec2, radius: f32, color: Rgba, line_width: f32 },
    FillWedge { center: Vec2, radius: f32, start_angle: f32, end_angle: f32, color: Rgba },
    FillRect { origin: Vec2, size: Vec2, color: Rgba },
    Text { at: Vec2, text: String, style: TextStyle },
}

/// Surface that records commands instead of rasterising them. Hosts replay
/// the list onto their real canvas; tests inspect it directly.
#[derive(Debug, Clone)]
pub struct DrawList {
    size: Vec2,
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            commands: Vec::new(),
        }
    }

    pub fn filled_circles(&self) -> impl Iterator<Item = (Vec2, f32, Rgba)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::FillCircle { center, radius, color } => Some((*center, *radius, *color)),
            _ => None,
        })
    }

    pub fn stroked_circles(&self) -> impl Iterator<Item = (Vec2, f32, Rgba)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::StrokeCircle { center, radius, color, .. } => {
                Some((*center, *radius, *color))
            }
            _ => None,
        })
    }

    /// (start, end, color) of every wedge, in draw order.
    pub fn wedges(&self) -> Vec<(f32, f32, Rgba)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillWedge { start_angle, end_angle, color, .. } => {
                    Some((*start_angle, *end_angle, *color))
                }
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn rects(&self) -> Vec<(Vec2, Vec2, Rgba)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillRect { origin, size, color } => Some((*origin, *size, *color)),
                _ => None,
            })
            .collect()
    }
}

impl DrawSurface for DrawList {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.commands.push(DrawCommand::FillCircle { center, radius, color });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Rgba, line_width: f32) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            color,
            line_width,
        });
    }

    fn fill_wedge(&mut self, center: Vec2, radius: f32, start_angle: f32, end_angle: f32, color: Rgba) {
        self.commands.push(DrawCommand::FillWedge {
            center,
            radius,
            start_angle,
            end_angle,
            color,
        });
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Rgba) {
        self.commands.push(DrawCommand::FillRect { origin, size, color });
    }

    fn draw_text(&mut self, at: Vec2, text: &str, style: TextStyle) {
        self.commands.push(DrawCommand::Text {
            at,
            text: text.to_string(),
            style,
        });
    }
}
