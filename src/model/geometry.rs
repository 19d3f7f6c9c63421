//! Page-to-device geometry: affine matrices, viewports, bounding boxes.

use serde::{Deserialize, Serialize};

/// A 2D affine transform `[a, b, c, d, e, f]` mapping `(x, y)` to
/// `(a*x + c*y + e, b*x + d*y + f)`.
pub type Matrix = [f64; 6];

/// The identity transform.
pub const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Concatenate two transforms; the result applies `m2` first, then `m1`.
pub fn transform(m1: &Matrix, m2: &Matrix) -> Matrix {
    [
        m1[0] * m2[0] + m1[2] * m2[1],
        m1[1] * m2[0] + m1[3] * m2[1],
        m1[0] * m2[2] + m1[2] * m2[3],
        m1[1] * m2[2] + m1[3] * m2[3],
        m1[0] * m2[4] + m1[2] * m2[5] + m1[4],
        m1[1] * m2[4] + m1[3] * m2[5] + m1[5],
    ]
}

/// Apply a transform to a point.
pub fn apply_point(m: &Matrix, x: f64, y: f64) -> (f64, f64) {
    (m[0] * x + m[2] * y + m[4], m[1] * x + m[3] * y + m[5])
}

/// Axis-aligned bounds `[x0, y0, x1, y1]` of rectangle `r` after transform `m`.
pub fn axial_aligned_bounding_box(r: [f64; 4], m: &Matrix) -> [f64; 4] {
    let corners = [
        apply_point(m, r[0], r[1]),
        apply_point(m, r[2], r[3]),
        apply_point(m, r[0], r[3]),
        apply_point(m, r[2], r[1]),
    ];
    let mut out = [f64::MAX, f64::MAX, f64::MIN, f64::MIN];
    for (x, y) in corners {
        out[0] = out[0].min(x);
        out[1] = out[1].min(y);
        out[2] = out[2].max(x);
        out[3] = out[3].max(y);
    }
    out
}

/// Round to two decimal places, the precision used for persisted dimensions.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The page-to-device mapping used for one render pass.
///
/// Width and height are kept at full precision; rounding happens only when
/// dimensions are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Device width
    pub width: f64,
    /// Device height
    pub height: f64,
    /// Page units to device units multiplier
    pub scale: f64,
    /// Page rotation in degrees (0, 90, 180, 270)
    pub rotation: i32,
    /// Page space to device space transform (y axis flipped)
    pub transform: Matrix,
}

impl Viewport {
    /// Build a viewport for a page's view box `[x0, y0, x1, y1]`.
    pub fn new(view_box: [f64; 4], scale: f64, rotation: i32) -> Self {
        let center_x = (view_box[2] + view_box[0]) / 2.0;
        let center_y = (view_box[3] + view_box[1]) / 2.0;

        let rotation = rotation.rem_euclid(360);
        let (rotate_a, rotate_b, rotate_c, rotate_d) = match rotation {
            90 => (0.0, 1.0, 1.0, 0.0),
            180 => (-1.0, 0.0, 0.0, 1.0),
            270 => (0.0, -1.0, -1.0, 0.0),
            _ => (1.0, 0.0, 0.0, -1.0),
        };

        let (offset_x, offset_y, width, height) = if rotate_a == 0.0 {
            (
                (center_y - view_box[1]).abs() * scale,
                (center_x - view_box[0]).abs() * scale,
                (view_box[3] - view_box[1]) * scale,
                (view_box[2] - view_box[0]) * scale,
            )
        } else {
            (
                (center_x - view_box[0]).abs() * scale,
                (center_y - view_box[1]).abs() * scale,
                (view_box[2] - view_box[0]) * scale,
                (view_box[3] - view_box[1]) * scale,
            )
        };

        let transform = [
            rotate_a * scale,
            rotate_b * scale,
            rotate_c * scale,
            rotate_d * scale,
            offset_x - rotate_a * scale * center_x - rotate_c * scale * center_y,
            offset_y - rotate_b * scale * center_x - rotate_d * scale * center_y,
        ];

        Self {
            width,
            height,
            scale,
            rotation: if matches!(rotation, 90 | 180 | 270) { rotation } else { 0 },
            transform,
        }
    }

    /// Map a page-space point to device space.
    pub fn to_device(&self, x: f64, y: f64) -> (f64, f64) {
        apply_point(&self.transform, x, y)
    }

    /// Pixel dimensions of a surface large enough to hold this viewport.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.width.ceil().max(1.0) as u32,
            self.height.ceil().max(1.0) as u32,
        )
    }
}

/// An axis-aligned box in device space (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub left: f64,
    /// Top edge
    pub top: f64,
    /// Right edge
    pub right: f64,
    /// Bottom edge
    pub bottom: f64,
}

impl BoundingBox {
    /// Create a box from its edges.
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Box width.
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Box height.
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Height of the vertical band shared with `other`, floored at zero.
    pub fn vertical_overlap(&self, other: &BoundingBox) -> f64 {
        let top = self.top.max(other.top);
        let bottom = self.bottom.min(other.bottom);
        if bottom <= top {
            0.0
        } else {
            bottom - top
        }
    }
}
