use super::geometry::{BoundingBox, Matrix, normalize_bbox};

/// Something a spacing pass can move around: it has a box in its own
/// coordinates and a transform placing it in its parent.
pub trait Spaceable {
    fn local_bbox(&self) -> BoundingBox;
    fn transform(&self) -> Matrix;
    fn set_transform(&mut self, transform: Matrix);

    /// Box in parent coordinates.
    fn bbox(&self) -> BoundingBox {
        self.transform().transform_bbox(&self.local_bbox())
    }
}

/// A positioned child inside a layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutItem {
    pub bbox: BoundingBox,
    pub transform: Matrix,
}

impl LayoutItem {
    pub fn new(bbox: BoundingBox) -> Self {
        Self {
            bbox,
            transform: Matrix::identity(),
        }
    }
}

impl Spaceable for LayoutItem {
    fn local_bbox(&self) -> BoundingBox {
        self.bbox
    }

    fn transform(&self) -> Matrix {
        self.transform
    }

    fn set_transform(&mut self, transform: Matrix) {
        self.transform = transform;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpacingOptions {
    /// Gap between neighbouring items, in pixels.
    pub padding: f32,
}

impl SpacingOptions {
    pub fn padding(padding: f32) -> Self {
        Self { padding }
    }
}

/// Lay items out left to right with their vertical anchors on one line.
///
/// Returns the y coordinate of that shared line.
pub fn space_horizontally<T: Spaceable>(items: &mut [T], options: SpacingOptions) -> f32 {
    let mut vertical_center = 0.0f32;
    let mut offset = 0.0f32;

    for item in items.iter_mut() {
        item.set_transform(Matrix::translate(offset, 0.0));
        let bbox = normalize_bbox(&item.bbox());
        vertical_center = vertical_center.max(bbox.anchor_y());
        offset += options.padding + bbox.width;
    }

    for item in items.iter_mut() {
        let bbox = normalize_bbox(&item.bbox());
        let shift = Matrix::translate(0.0, vertical_center - bbox.anchor_y());
        item.set_transform(item.transform().multiply(&shift));
    }

    vertical_center
}

/// Stack items top to bottom, centering them horizontally.
///
/// Centering uses the geometric center of each box, not its anchor.
/// Returns the x coordinate of the shared center line.
pub fn space_vertically<T: Spaceable>(items: &mut [T], options: SpacingOptions) -> f32 {
    let mut horizontal_center = 0.0f32;
    let mut offset = 0.0f32;

    for item in items.iter_mut() {
        item.set_transform(Matrix::translate(0.0, offset));
        let bbox = item.bbox();
        horizontal_center = horizontal_center.max(bbox.cx());
        offset += options.padding + bbox.height;
    }

    for item in items.iter_mut() {
        let shift = Matrix::translate(horizontal_center - item.bbox().cx(), 0.0);
        item.set_transform(item.transform().multiply(&shift));
    }

    horizontal_center
}
