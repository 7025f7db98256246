use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Component-wise maximum, used to clamp a requested size to a minimum.
    pub fn max(self, other: Size) -> Size {
        Size {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }

    pub fn exceeds(self, other: Size) -> bool {
        self.width > other.width || self.height > other.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

/// Axis-aligned rectangle stored by its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn from_center(center: Point, size: Size) -> Self {
        Self {
            x: center.x - size.width / 2.0,
            y: center.y - size.height / 2.0,
            width: size.width,
            height: size.height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn pad(&self, padding: f32) -> Rect {
        Rect {
            x: self.x - padding,
            y: self.y - padding,
            width: self.width + 2.0 * padding,
            height: self.height + 2.0 * padding,
        }
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        const EPS: f32 = 1e-3;
        other.x >= self.x - EPS
            && other.y >= self.y - EPS
            && other.right() <= self.right() + EPS
            && other.bottom() <= self.bottom() + EPS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Margin {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margin {
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    /// Interior region of a box centred on the origin.
    pub fn interior_rect(&self, outer: Size) -> Rect {
        Rect {
            x: -outer.width / 2.0 + self.left,
            y: -outer.height / 2.0 + self.top,
            width: outer.width - self.horizontal(),
            height: outer.height - self.vertical(),
        }
    }
}

/// Flow direction of the overall graph. Horizontal graphs keep logical depth on
/// the x axis, so viewport math swaps axes for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

impl Orientation {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "TD" | "TB" | "vertical" => Some(Self::Vertical),
            "LR" | "horizontal" => Some(Self::Horizontal),
            _ => None,
        }
    }

    pub fn orient(self, point: Point) -> Point {
        match self {
            Self::Vertical => point,
            Self::Horizontal => Point::new(point.y, point.x),
        }
    }
}

/// Union of centre-anchored boxes. Horizontal orientation reads each centre in
/// (y, x) order while keeping width on the first axis.
pub fn bounding_box<I>(items: I, orientation: Orientation) -> Option<Rect>
where
    I: IntoIterator<Item = (Point, Size)>,
{
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    let mut seen = false;

    for (center, size) in items {
        let center = orientation.orient(center);
        min_x = min_x.min(center.x - size.width / 2.0);
        min_y = min_y.min(center.y - size.height / 2.0);
        max_x = max_x.max(center.x + size.width / 2.0);
        max_y = max_y.max(center.y + size.height / 2.0);
        seen = true;
    }

    if !seen {
        return None;
    }
    Some(Rect {
        x: min_x,
        y: min_y,
        width: max_x - min_x,
        height: max_y - min_y,
    })
}

/// Uniform scale plus translation mapping graph space into screen space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub translate_x: f32,
    pub translate_y: f32,
    pub scale: f32,
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        translate_x: 0.0,
        translate_y: 0.0,
        scale: 1.0,
    };

    pub fn translate(x: f32, y: f32) -> Self {
        Self {
            translate_x: x,
            translate_y: y,
            scale: 1.0,
        }
    }

    pub fn apply(&self, point: Point) -> Point {
        Point::new(
            point.x * self.scale + self.translate_x,
            point.y * self.scale + self.translate_y,
        )
    }

    pub fn invert(&self, point: Point) -> Point {
        Point::new(
            (point.x - self.translate_x) / self.scale,
            (point.y - self.translate_y) / self.scale,
        )
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Fit `bounds` into a viewport of `viewport` size. The translate components are
/// swapped for horizontal graphs.
pub fn fit_transform(bounds: &Rect, viewport: Size, orientation: Orientation) -> ViewTransform {
    let box_width = bounds.width.max(f32::EPSILON);
    let box_height = bounds.height.max(f32::EPSILON);
    let scale = (viewport.width / box_width).min(viewport.height / box_height);

    let translate_x = viewport.width / 2.0 - scale * (bounds.x + bounds.width / 2.0);
    let translate_y = viewport.height / 2.0 - scale * (bounds.y + bounds.height / 2.0);

    match orientation {
        Orientation::Vertical => ViewTransform {
            translate_x,
            translate_y,
            scale,
        },
        Orientation::Horizontal => ViewTransform {
            translate_x: translate_y,
            translate_y: translate_x,
            scale,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_box_of_two_boxes() {
        let items = vec![
            (Point::new(0.0, 0.0), Size::new(10.0, 10.0)),
            (Point::new(20.0, 0.0), Size::new(10.0, 10.0)),
        ];
        let bbox = bounding_box(items, Orientation::Vertical).unwrap();
        assert_eq!(bbox.x, -5.0);
        assert_eq!(bbox.y, -5.0);
        assert_eq!(bbox.width, 30.0);
        assert_eq!(bbox.height, 10.0);
    }

    #[test]
    fn bounding_box_swaps_centres_when_horizontal() {
        let items = vec![(Point::new(40.0, 10.0), Size::new(6.0, 4.0))];
        let bbox = bounding_box(items, Orientation::Horizontal).unwrap();
        assert_eq!(bbox.x, 7.0);
        assert_eq!(bbox.y, 38.0);
        assert_eq!(bbox.width, 6.0);
        assert_eq!(bbox.height, 4.0);
    }

    #[test]
    fn bounding_box_of_nothing_is_none() {
        assert!(bounding_box(Vec::new(), Orientation::Vertical).is_none());
    }

    #[test]
    fn fit_transform_uses_uniform_scale() {
        let bounds = Rect {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 50.0,
        };
        let t = fit_transform(&bounds, Size::new(400.0, 400.0), Orientation::Vertical);
        assert_eq!(t.scale, 4.0);
        assert_eq!(t.translate_x, 200.0 - 4.0 * 50.0);
        assert_eq!(t.translate_y, 200.0 - 4.0 * 25.0);
    }

    #[test]
    fn fit_transform_swaps_translation_when_horizontal() {
        let bounds = Rect {
            x: 10.0,
            y: 0.0,
            width: 20.0,
            height: 20.0,
        };
        let vertical = fit_transform(&bounds, Size::new(200.0, 100.0), Orientation::Vertical);
        let horizontal = fit_transform(&bounds, Size::new(200.0, 100.0), Orientation::Horizontal);
        assert_eq!(vertical.scale, horizontal.scale);
        assert_eq!(vertical.translate_x, horizontal.translate_y);
        assert_eq!(vertical.translate_y, horizontal.translate_x);
    }

    #[test]
    fn fit_transform_survives_degenerate_box() {
        let bounds = Rect::default();
        let t = fit_transform(&bounds, Size::new(100.0, 100.0), Orientation::Vertical);
        assert!(t.scale.is_finite());
    }

    #[test]
    fn margin_interior_is_centred_on_origin() {
        let margin = Margin::new(18.0, 8.0, 8.0, 8.0);
        let rect = margin.interior_rect(Size::new(100.0, 60.0));
        assert_eq!(rect.x, -42.0);
        assert_eq!(rect.y, -12.0);
        assert_eq!(rect.width, 84.0);
        assert_eq!(rect.height, 34.0);
    }
}
