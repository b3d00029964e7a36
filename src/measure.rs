//! Geometry of drawn primitives.
//!
//! Nodes never measure themselves directly; they ask a [`Measurer`], which
//! lets a host plug in real rendering metrics while tests use fixed ones.

use crate::layout::text::measure_inline;
use crate::layout::{BoundingBox, Matrix, union_bbox};
use crate::primitive::{Element, Primitive};
use crate::theme::Theme;

pub trait Measurer {
    /// Box of `primitive` in its own coordinate space. The primitive's own
    /// `transform` attribute is not applied; transforms of descendants are.
    ///
    /// `None` means the primitive has no measurable geometry yet.
    fn measure(&self, primitive: &Primitive) -> Option<BoundingBox>;
}

/// Measures primitives from their attributes and font metrics, without a
/// rendering backend.
#[derive(Debug, Clone)]
pub struct HeadlessMeasurer {
    font_family: String,
    font_size: f32,
    fast_metrics: bool,
}

#[derive(Debug, Clone)]
struct Font<'a> {
    family: &'a str,
    size: f32,
}

#[derive(Debug, Default)]
struct InlineRun {
    width: f32,
    ascent: f32,
    descent: f32,
    chars: usize,
}

impl HeadlessMeasurer {
    pub fn new(theme: &Theme, fast_metrics: bool) -> Self {
        Self {
            font_family: theme.font_family.clone(),
            font_size: theme.font_size,
            fast_metrics,
        }
    }

    fn default_font(&self) -> Font<'_> {
        Font {
            family: &self.font_family,
            size: self.font_size,
        }
    }

    fn measure_element(&self, element: &Element, font: &Font<'_>) -> Option<BoundingBox> {
        let num = |name: &str| element.get_f32(name).unwrap_or(0.0);
        match element.tag.as_str() {
            "text" | "tspan" => self.measure_text(element, font),
            "circle" => {
                let r = num("r");
                (r > 0.0).then(|| BoundingBox::new(num("cx") - r, num("cy") - r, r * 2.0, r * 2.0))
            }
            "ellipse" => {
                let (rx, ry) = (num("rx"), num("ry"));
                (rx > 0.0 && ry > 0.0)
                    .then(|| BoundingBox::new(num("cx") - rx, num("cy") - ry, rx * 2.0, ry * 2.0))
            }
            "rect" | "image" | "use" | "foreignObject" | "svg" => {
                let (width, height) = (num("width"), num("height"));
                (width > 0.0 || height > 0.0)
                    .then(|| BoundingBox::new(num("x"), num("y"), width, height))
            }
            "line" => {
                let (x1, y1, x2, y2) = (num("x1"), num("y1"), num("x2"), num("y2"));
                Some(BoundingBox::new(
                    x1.min(x2),
                    y1.min(y2),
                    (x2 - x1).abs(),
                    (y2 - y1).abs(),
                ))
            }
            "polygon" | "polyline" => measure_points(element.get("points")?),
            _ => {
                let font = self.font_for(element, font);
                let boxes: Vec<BoundingBox> = element
                    .children
                    .iter()
                    .filter_map(|child| self.measure_placed(child, &font))
                    .collect();
                if boxes.is_empty() {
                    None
                } else {
                    Some(union_bbox(&boxes))
                }
            }
        }
    }

    /// Box of a descendant in its parent's coordinates.
    fn measure_placed(&self, primitive: &Primitive, font: &Font<'_>) -> Option<BoundingBox> {
        match primitive {
            Primitive::Element(element) => {
                let bbox = self.measure_element(element, font)?;
                Some(match element.get("transform").and_then(parse_transform) {
                    Some(matrix) => matrix.transform_bbox(&bbox),
                    None => bbox,
                })
            }
            Primitive::Text(text) => self.measure_run_box(text, font),
            Primitive::Child(_) => None,
        }
    }

    fn measure_text(&self, element: &Element, font: &Font<'_>) -> Option<BoundingBox> {
        let font = self.font_for(element, font);
        let mut run = InlineRun::default();
        self.collect_inline(&element.children, &font, &mut run);
        if run.chars == 0 {
            return None;
        }
        let x = element.get_f32("x").unwrap_or(0.0);
        let baseline = element.get_f32("y").unwrap_or(0.0);
        Some(BoundingBox::new(
            x,
            baseline - run.ascent,
            run.width,
            run.ascent + run.descent,
        ))
    }

    fn collect_inline(&self, children: &[Primitive], font: &Font<'_>, run: &mut InlineRun) {
        for child in children {
            match child {
                Primitive::Text(text) => {
                    let metrics = measure_inline(text, font.size, font.family, self.fast_metrics);
                    run.width += metrics.width;
                    run.ascent = run.ascent.max(metrics.ascent);
                    run.descent = run.descent.max(metrics.descent);
                    run.chars += text.chars().count();
                }
                Primitive::Element(element) => {
                    let nested = self.font_for(element, font);
                    self.collect_inline(&element.children, &nested, run);
                }
                Primitive::Child(_) => {}
            }
        }
    }

    fn measure_run_box(&self, text: &str, font: &Font<'_>) -> Option<BoundingBox> {
        if text.is_empty() {
            return None;
        }
        let metrics = measure_inline(text, font.size, font.family, self.fast_metrics);
        Some(BoundingBox::new(
            0.0,
            -metrics.ascent,
            metrics.width,
            metrics.ascent + metrics.descent,
        ))
    }

    fn font_for<'a>(&self, element: &'a Element, inherited: &Font<'a>) -> Font<'a> {
        Font {
            family: element.get("font-family").unwrap_or(inherited.family),
            size: element.get_f32("font-size").unwrap_or(inherited.size),
        }
    }
}

impl Measurer for HeadlessMeasurer {
    fn measure(&self, primitive: &Primitive) -> Option<BoundingBox> {
        let font = self.default_font();
        match primitive {
            Primitive::Element(element) => self.measure_element(element, &font),
            Primitive::Text(text) => self.measure_run_box(text, &font),
            Primitive::Child(_) => None,
        }
    }
}

fn measure_points(points: &str) -> Option<BoundingBox> {
    let values: Vec<f32> = points
        .split(|ch: char| ch == ',' || ch.is_whitespace())
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.parse().ok())
        .collect();
    let boxes: Vec<BoundingBox> = values
        .chunks_exact(2)
        .map(|pair| BoundingBox::new(pair[0], pair[1], 0.0, 0.0))
        .collect();
    if boxes.is_empty() {
        return None;
    }
    Some(union_bbox(&boxes))
}

/// Parse the `translate(...)` and `matrix(...)` forms this crate writes.
pub(crate) fn parse_transform(value: &str) -> Option<Matrix> {
    let value = value.trim();
    let (name, rest) = value.split_once('(')?;
    let args: Vec<f32> = rest
        .trim_end_matches(')')
        .split(|ch: char| ch == ',' || ch.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| part.parse().ok())
        .collect::<Option<Vec<f32>>>()?;
    match (name.trim(), args.as_slice()) {
        ("translate", [tx]) => Some(Matrix::translate(*tx, 0.0)),
        ("translate", [tx, ty]) => Some(Matrix::translate(*tx, *ty)),
        ("scale", [s]) => Some(Matrix::scale(*s, *s)),
        ("scale", [sx, sy]) => Some(Matrix::scale(*sx, *sy)),
        ("matrix", [a, b, c, d, e, f]) => Some(Matrix {
            a: *a,
            b: *b,
            c: *c,
            d: *d,
            e: *e,
            f: *f,
        }),
        _ => None,
    }
}
