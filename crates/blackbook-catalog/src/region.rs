use crate::error::GeometryError;

/// A rectangle in [0, 1] coordinates relative to a photograph's pixel
/// dimensions, marking where a piece of art sits within the frame.
///
/// The model does no clamping of its own; callers drawing or committing
/// regions are responsible for keeping them inside the photograph. What
/// it does guarantee is lossless conversion to and from absolute pixel
/// rectangles at any positive display size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Maps the region onto a concrete pixel target, rounding each
    /// component to the nearest pixel.
    pub fn to_pixels(&self, target: (u32, u32)) -> (i32, i32, i32, i32) {
        let (width, height) = (target.0 as f64, target.1 as f64);
        (
            (self.x * width).round() as i32,
            (self.y * height).round() as i32,
            (self.width * width).round() as i32,
            (self.height * height).round() as i32,
        )
    }

    /// The exact inverse of [`Region::to_pixels`] against the same
    /// reference size.
    pub fn from_pixels(
        rect: (i32, i32, i32, i32),
        reference: (u32, u32),
    ) -> Result<Self, GeometryError> {
        if reference.0 == 0 || reference.1 == 0 {
            return Err(GeometryError::EmptyReference {
                width: reference.0,
                height: reference.1,
            });
        }

        let (width, height) = (reference.0 as f64, reference.1 as f64);
        Ok(Self {
            x: rect.0 as f64 / width,
            y: rect.1 as f64 / height,
            width: rect.2 as f64 / width,
            height: rect.3 as f64 / height,
        })
    }
}
