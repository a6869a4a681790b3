//! Polygon drawable: the geometry behind a label.

use crate::geometry::{self, VertexTransform};
use crate::style::PolygonStyle;
use kurbo::{Affine, BezPath, Point, Rect, Vec2};
use thiserror::Error;

/// Geometry errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("Vertex {index} out of range for polygon with {len} points")]
    VertexOutOfRange { index: usize, len: usize },
}

/// Result type for geometry operations.
pub type GeometryResult<T> = Result<T, GeometryError>;

/// A closed polygon as placed on the drawing surface.
///
/// Points are stored in local space. The path offset is the center of the
/// points' bounding box at construction; the object transform places that
/// center in the scene. A freshly built polygon therefore renders its points
/// exactly where they were recorded. The shape is implicitly closed: the last
/// point connects back to the first when rendered.
#[derive(Debug, Clone)]
pub struct Polygon {
    points: Vec<Point>,
    path_offset: Vec2,
    /// Scene position of the path offset.
    position: Point,
    /// Rotation in radians around `position`.
    angle: f64,
    scale: Vec2,
    /// Render style.
    pub style: PolygonStyle,
    /// Whether the polygon can become the active selection.
    pub selectable: bool,
    /// Whether the polygon receives pointer hit-tests.
    pub evented: bool,
    /// Whether the whole-shape bounding box outline is shown when selected.
    pub has_borders: bool,
    /// Whether manipulation controls are shown when selected.
    pub has_controls: bool,
    dirty: bool,
    /// Cached scene-space bounds, refreshed by [`Polygon::set_coords`].
    coords: Rect,
}

impl Polygon {
    /// Create a polygon from points in scene space.
    pub fn new(points: Vec<Point>, style: PolygonStyle) -> Self {
        let center = geometry::bounding_box(&points).center();
        let mut polygon = Self {
            points,
            path_offset: center.to_vec2(),
            position: center,
            angle: 0.0,
            scale: Vec2::new(1.0, 1.0),
            style,
            selectable: true,
            evented: true,
            has_borders: true,
            has_controls: true,
            dirty: true,
            coords: Rect::ZERO,
        };
        polygon.set_coords();
        polygon
    }

    /// Builder: an inert polygon. Neither selectable nor hit-testable, with
    /// no borders or controls.
    pub fn non_interactive(mut self) -> Self {
        self.set_interactive(false);
        self.has_borders = false;
        self.has_controls = false;
        self
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if there are no vertices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Local-space vertices.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Local-space vertex `index`.
    pub fn point(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied()
    }

    /// Overwrite a single local-space vertex. Vertices are never added or
    /// removed after construction.
    pub fn set_point(&mut self, index: usize, point: Point) -> GeometryResult<()> {
        let len = self.points.len();
        let slot = self
            .points
            .get_mut(index)
            .ok_or(GeometryError::VertexOutOfRange { index, len })?;
        *slot = point;
        self.dirty = true;
        Ok(())
    }

    /// Origin correction between local points and the object transform.
    pub fn path_offset(&self) -> Vec2 {
        self.path_offset
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Move the polygon so that its path offset lands on `position`.
    pub fn set_position(&mut self, position: Point) {
        self.position = position;
        self.dirty = true;
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn set_angle(&mut self, angle: f64) {
        self.angle = angle;
        self.dirty = true;
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
        self.dirty = true;
    }

    /// Object matrix mapping offset-corrected local points to the scene.
    pub fn calc_transform_matrix(&self) -> Affine {
        Affine::translate(self.position.to_vec2())
            * Affine::rotate(self.angle)
            * Affine::scale_non_uniform(self.scale.x, self.scale.y)
    }

    /// Full transform chain under the given surface viewport.
    pub fn vertex_transform(&self, viewport: Affine) -> VertexTransform {
        VertexTransform::new(viewport, self.calc_transform_matrix(), self.path_offset)
    }

    /// Vertices mapped into scene space.
    pub fn scene_points(&self) -> Vec<Point> {
        let transform = self.vertex_transform(Affine::IDENTITY);
        self.points
            .iter()
            .map(|p| transform.local_to_scene(*p))
            .collect()
    }

    pub fn is_interactive(&self) -> bool {
        self.selectable && self.evented
    }

    /// Toggle both selectability and hit-testing.
    pub fn set_interactive(&mut self, interactive: bool) {
        self.selectable = interactive;
        self.evented = interactive;
    }

    /// Flag the cached rendering as stale.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Called by the renderer once it has redrawn the polygon.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Recompute the cached scene-space bounds from the current geometry.
    pub fn set_coords(&mut self) {
        self.coords = geometry::bounding_box(&self.scene_points());
    }

    /// Cached scene-space bounds.
    pub fn bounds(&self) -> Rect {
        self.coords
    }

    /// Check if a scene-space point lies inside the polygon.
    pub fn contains(&self, point: Point) -> bool {
        self.coords.contains(point) && geometry::polygon_contains(&self.scene_points(), point)
    }

    /// Area in scene units.
    pub fn area(&self) -> f64 {
        geometry::polygon_area(&self.scene_points())
    }

    /// Closed scene-space path for rendering.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let points = self.scene_points();
        let Some((first, rest)) = points.split_first() else {
            return path;
        };

        path.move_to(*first);
        for point in rest {
            path.line_to(*point);
        }
        path.close_path();
        path
    }
}
