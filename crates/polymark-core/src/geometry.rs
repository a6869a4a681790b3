//! Coordinate utilities shared by the drawing and edit sessions.
//!
//! Three spaces are involved:
//! - *local*: the points stored in a polygon,
//! - *scene*: the surface's untransformed coordinate space,
//! - *display*: surface pixels, after the viewport transform.

use kurbo::{Affine, Point, Rect, Vec2};

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    a.distance(b)
}

/// The transform chain between a polygon's local points and display space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexTransform {
    /// Surface viewport (scene → display).
    pub viewport: Affine,
    /// Polygon's own matrix (offset-corrected local → scene).
    pub object: Affine,
    /// Origin correction subtracted from local points before `object`.
    pub path_offset: Vec2,
}

impl VertexTransform {
    pub fn new(viewport: Affine, object: Affine, path_offset: Vec2) -> Self {
        Self {
            viewport,
            object,
            path_offset,
        }
    }

    /// Map a local point to display space.
    pub fn to_display_space(&self, local: Point) -> Point {
        self.viewport * self.object * (local - self.path_offset)
    }

    /// Map a display-space point back to local space.
    pub fn to_local_space(&self, display: Point) -> Point {
        let chain = self.viewport * self.object;
        assert_invertible(chain);
        chain.inverse() * display + self.path_offset
    }

    /// Map a scene-space point (viewport already removed) to local space.
    pub fn scene_to_local(&self, scene: Point) -> Point {
        assert_invertible(self.object);
        self.object.inverse() * scene + self.path_offset
    }

    /// Map a local point to scene space.
    pub fn local_to_scene(&self, local: Point) -> Point {
        self.object * (local - self.path_offset)
    }
}

/// A singular matrix here is a host bug (zero scale), not user input.
fn assert_invertible(affine: Affine) {
    let det = affine.determinant();
    debug_assert!(
        det.is_finite() && det != 0.0,
        "non-invertible transform {affine:?}"
    );
}

/// Axis-aligned bounding box of a point set. Empty input yields `Rect::ZERO`.
pub fn bounding_box(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::ZERO;
    };

    points
        .iter()
        .skip(1)
        .fold(Rect::from_points(*first, *first), |rect, p| {
            rect.union_pt(*p)
        })
}

/// Whether `point` lies inside the closed polygon (ray casting).
pub fn polygon_contains(points: &[Point], point: Point) -> bool {
    if points.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (pi, pj) = (points[i], points[j]);
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Unsigned area of the closed polygon (shoelace formula).
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let twice: f64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum();
    twice.abs() / 2.0
}
