use crate::error::{Error, Result};
use conv::{ConvUtil, RoundToZero};
use std::fmt;

/// An ordered sequence of real-valued attributes.
///
/// Every point stored in one index must report the same `dimension`. Axis
/// `i` of a point is read through `coord(i)` for `i < dimension()`.
pub trait Point {
    fn dimension(&self) -> usize;
    fn coord(&self, axis: usize) -> f64;
}

impl<const D: usize> Point for [f64; D] {
    fn dimension(&self) -> usize {
        D
    }

    fn coord(&self, axis: usize) -> f64 {
        self[axis]
    }
}

impl Point for [f64] {
    fn dimension(&self) -> usize {
        self.len()
    }

    fn coord(&self, axis: usize) -> f64 {
        self[axis]
    }
}

impl Point for Vec<f64> {
    fn dimension(&self) -> usize {
        self.len()
    }

    fn coord(&self, axis: usize) -> f64 {
        self[axis]
    }
}

/// A colored point cloud sample: position, RGB and where it came from.
///
/// Attributes are ordered `x, y, z, r, g, b`. Channels that were never set
/// hold `-1`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub r: i32,
    pub g: i32,
    pub b: i32,
    pub source: Option<String>,
}

impl ColorPoint {
    pub const DIMENSION: usize = 6;

    #[must_use]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        ColorPoint {
            x,
            y,
            z,
            r: -1,
            g: -1,
            b: -1,
            source: None,
        }
    }

    #[must_use]
    pub fn with_color(mut self, r: i32, g: i32, b: i32) -> Self {
        self.r = r;
        self.g = g;
        self.b = b;
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Point for ColorPoint {
    fn dimension(&self) -> usize {
        Self::DIMENSION
    }

    fn coord(&self, axis: usize) -> f64 {
        match axis {
            0 => f64::from(self.x),
            1 => f64::from(self.y),
            2 => f64::from(self.z),
            3 => f64::from(self.r),
            4 => f64::from(self.g),
            5 => f64::from(self.b),
            _ => panic!("axis {axis} out of range for a 6-attribute point"),
        }
    }
}

// Rows may carry extra columns between position and color (intensity,
// normals, ...). Only the first three and the last three are kept.
impl TryFrom<&[f64]> for ColorPoint {
    type Error = Error;

    fn try_from(row: &[f64]) -> Result<Self> {
        if row.len() < Self::DIMENSION {
            return Err(Error::InvalidPoint(format!(
                "expected at least {} attributes (x, y, z, r, g, b), found {}",
                Self::DIMENSION,
                row.len()
            )));
        }
        let position = |v: f64| {
            v.approx_as::<f32>()
                .map_err(|_| Error::InvalidPoint(format!("coordinate {v} does not fit in f32")))
        };
        let channel = |v: f64| {
            v.approx_as_by::<i32, RoundToZero>()
                .map_err(|_| Error::InvalidPoint(format!("color channel {v} does not fit in i32")))
        };
        let n = row.len();
        Ok(ColorPoint::new(position(row[0])?, position(row[1])?, position(row[2])?).with_color(
            channel(row[n - 3])?,
            channel(row[n - 2])?,
            channel(row[n - 1])?,
        ))
    }
}

impl fmt::Display for ColorPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}, {}, {}",
            self.x, self.y, self.z, self.r, self.g, self.b
        )
    }
}
