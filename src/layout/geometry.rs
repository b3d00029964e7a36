use serde::{Deserialize, Serialize};

/// Axis-aligned box in a node's coordinate space.
///
/// The anchor fields mark the points used when lining boxes up: `ax`/`ax2`
/// are the left and right connection points, `ay` the vertical axis. They are
/// optional so that measured boxes can leave them to [`normalize_bbox`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ax: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ax2: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ay: Option<f32>,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ax: None,
            ax2: None,
            ay: None,
        }
    }

    pub fn sized(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn x2(&self) -> f32 {
        self.x + self.width
    }

    pub fn y2(&self) -> f32 {
        self.y + self.height
    }

    pub fn cx(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn cy(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Left anchor, falling back to the left edge.
    pub fn anchor_x(&self) -> f32 {
        self.ax.unwrap_or(self.x)
    }

    /// Right anchor, falling back to the right edge.
    pub fn anchor_x2(&self) -> f32 {
        self.ax2.unwrap_or_else(|| self.x2())
    }

    /// Vertical anchor, falling back to the vertical center.
    pub fn anchor_y(&self) -> f32 {
        self.ay.unwrap_or_else(|| self.cy())
    }

    pub fn with_anchors(mut self, ax: Option<f32>, ax2: Option<f32>, ay: Option<f32>) -> Self {
        self.ax = ax;
        self.ax2 = ax2;
        self.ay = ay;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 && self.height <= 0.0
    }
}

/// Fill in the anchor points of a box that does not define them yet.
///
/// Fields that are already present are kept as-is, so applying this twice is
/// the same as applying it once.
pub fn normalize_bbox(bbox: &BoundingBox) -> BoundingBox {
    BoundingBox {
        ax: Some(bbox.anchor_x()),
        ax2: Some(bbox.anchor_x2()),
        ay: Some(bbox.anchor_y()),
        ..*bbox
    }
}

/// Smallest box containing every box in `boxes`. Anchors are not carried.
///
/// An empty input yields a zero-sized box at the origin.
pub fn union_bbox<'a>(boxes: impl IntoIterator<Item = &'a BoundingBox>) -> BoundingBox {
    let mut iter = boxes.into_iter();
    let Some(first) = iter.next() else {
        return BoundingBox::default();
    };
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x2(), first.y2());
    for bbox in iter {
        min_x = min_x.min(bbox.x);
        min_y = min_y.min(bbox.y);
        max_x = max_x.max(bbox.x2());
        max_y = max_y.max(bbox.y2());
    }
    BoundingBox::new(min_x, min_y, max_x - min_x, max_y - min_y)
}

/// 2D affine transform in SVG order: `[a c e; b d f; 0 0 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    pub const fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    pub const fn translate(tx: f32, ty: f32) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::identity()
        }
    }

    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::identity()
        }
    }

    /// `self × other`: `other` is applied to a point first.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    pub fn is_translation(&self) -> bool {
        self.a == 1.0 && self.b == 0.0 && self.c == 0.0 && self.d == 1.0
    }

    /// Box covering `bbox` after transformation. Anchors move with the box.
    pub fn transform_bbox(&self, bbox: &BoundingBox) -> BoundingBox {
        let corners = [
            self.apply(bbox.x, bbox.y),
            self.apply(bbox.x2(), bbox.y),
            self.apply(bbox.x, bbox.y2()),
            self.apply(bbox.x2(), bbox.y2()),
        ];
        let mut min_x = corners[0].0;
        let mut min_y = corners[0].1;
        let mut max_x = corners[0].0;
        let mut max_y = corners[0].1;
        for (x, y) in &corners[1..] {
            min_x = min_x.min(*x);
            min_y = min_y.min(*y);
            max_x = max_x.max(*x);
            max_y = max_y.max(*y);
        }
        let ax = bbox.ax.map(|ax| self.apply(ax, bbox.anchor_y()).0);
        let ax2 = bbox.ax2.map(|ax2| self.apply(ax2, bbox.anchor_y()).0);
        let ay = bbox.ay.map(|ay| self.apply(bbox.anchor_x(), ay).1);
        BoundingBox::new(min_x, min_y, max_x - min_x, max_y - min_y).with_anchors(ax, ax2, ay)
    }

    pub fn to_svg(&self) -> String {
        if self.is_translation() {
            format!("translate({} {})", fmt_num(self.e), fmt_num(self.f))
        } else {
            format!(
                "matrix({} {} {} {} {} {})",
                fmt_num(self.a),
                fmt_num(self.b),
                fmt_num(self.c),
                fmt_num(self.d),
                fmt_num(self.e),
                fmt_num(self.f)
            )
        }
    }
}

/// Format a coordinate with at most two decimals and no trailing zeros.
pub fn fmt_num(value: f32) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    // Avoid "-0" in output.
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let mut out = format!("{rounded:.2}");
    while out.contains('.') && (out.ends_with('0') || out.ends_with('.')) {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_adds_missing_anchors() {
        let bbox = BoundingBox::new(2.0, 4.0, 10.0, 6.0);
        let normalized = normalize_bbox(&bbox);
        assert_eq!(normalized.ax, Some(2.0));
        assert_eq!(normalized.ax2, Some(12.0));
        assert_eq!(normalized.ay, Some(7.0));
        assert_eq!(normalized.width, 10.0);
    }

    #[test]
    fn normalize_keeps_existing_anchors() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 20.0).with_anchors(None, None, Some(15.0));
        let normalized = normalize_bbox(&bbox);
        assert_eq!(normalized.ay, Some(15.0));
        assert_eq!(normalized.ax, Some(0.0));
    }

    #[test]
    fn normalize_is_idempotent() {
        let bbox = BoundingBox::new(-3.5, 1.25, 7.0, 9.5).with_anchors(Some(-1.0), None, None);
        let once = normalize_bbox(&bbox);
        assert_eq!(normalize_bbox(&once), once);
    }

    #[test]
    fn union_of_nothing_is_empty() {
        let bbox = union_bbox(std::iter::empty());
        assert_eq!(bbox, BoundingBox::default());
        assert!(bbox.is_empty());
    }

    #[test]
    fn union_covers_all_boxes() {
        let boxes = [
            BoundingBox::new(0.0, 5.0, 10.0, 10.0),
            BoundingBox::new(20.0, 0.0, 5.0, 30.0),
        ];
        assert_eq!(union_bbox(&boxes), BoundingBox::new(0.0, 0.0, 25.0, 30.0));
    }

    #[test]
    fn multiply_applies_right_operand_first() {
        let m = Matrix::scale(2.0, 2.0).multiply(&Matrix::translate(1.0, 0.0));
        assert_eq!(m.apply(0.0, 0.0), (2.0, 0.0));
        let n = Matrix::translate(1.0, 0.0).multiply(&Matrix::scale(2.0, 2.0));
        assert_eq!(n.apply(0.0, 0.0), (1.0, 0.0));
    }

    #[test]
    fn transform_bbox_moves_anchors() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 4.0).with_anchors(Some(1.0), None, Some(3.0));
        let moved = Matrix::translate(5.0, 2.0).transform_bbox(&bbox);
        assert_eq!(moved.x, 5.0);
        assert_eq!(moved.y, 2.0);
        assert_eq!(moved.ax, Some(6.0));
        assert_eq!(moved.ay, Some(5.0));
        assert_eq!(moved.ax2, None);
    }

    #[test]
    fn svg_transform_strings() {
        assert_eq!(Matrix::translate(3.0, -4.5).to_svg(), "translate(3 -4.5)");
        assert_eq!(Matrix::scale(2.0, 1.0).to_svg(), "matrix(2 0 0 1 0 0)");
        assert_eq!(fmt_num(-0.001), "0");
        assert_eq!(fmt_num(12.3456), "12.35");
    }
}
