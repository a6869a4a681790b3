//! Vertex re-editing of committed polygons.
//!
//! An edit session exposes one [`VertexHandle`] per polygon point. Handles are
//! plain values; their position and drag behavior are pure functions of the
//! handle and the polygon's current transform, so they can be tested without a
//! surface.

use crate::input::PointerEvent;
use crate::polygon::Polygon;
use crate::registry::LabelId;
use crate::style::{HandleStyle, SerializableColor};
use crate::surface::{ObjectId, Surface};
use kurbo::{Affine, Circle, Point};
use peniko::Color;

/// A drag handle bound to one vertex of a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexHandle {
    /// Surface object the handle belongs to.
    pub owner: ObjectId,
    /// Vertex index within the owner's points.
    pub index: usize,
}

impl VertexHandle {
    pub fn new(owner: ObjectId, index: usize) -> Self {
        Self { owner, index }
    }

    /// One handle per vertex of a polygon with `count` points.
    pub fn for_polygon(owner: ObjectId, count: usize) -> Vec<Self> {
        (0..count).map(|index| Self::new(owner, index)).collect()
    }

    /// Visual for this handle centered on its display-space position.
    pub fn glyph(&self, position: Point, style: &HandleStyle) -> HandleGlyph {
        HandleGlyph {
            index: self.index,
            circle: Circle::new(position, style.radius()),
            fill: style.fill,
            stroke: style.stroke,
        }
    }
}

/// A rendered vertex handle: a filled, stroked circle in display pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct HandleGlyph {
    pub index: usize,
    pub circle: Circle,
    pub fill: SerializableColor,
    pub stroke: SerializableColor,
}

impl HandleGlyph {
    pub fn fill_color(&self) -> Color {
        self.fill.into()
    }

    pub fn stroke_color(&self) -> Color {
        self.stroke.into()
    }
}

/// Display-space position of a handle: local point, minus the path offset,
/// through the object matrix and then the viewport.
pub fn handle_position(handle: &VertexHandle, polygon: &Polygon, viewport: Affine) -> Option<Point> {
    let local = polygon.point(handle.index)?;
    Some(polygon.vertex_transform(viewport).to_display_space(local))
}

/// Move a handle's vertex to a scene-space point.
///
/// The point is mapped back through the inverse object matrix and the path
/// offset is added back. Returns false if the handle's vertex does not exist.
pub fn drag_vertex(handle: &VertexHandle, polygon: &mut Polygon, scene: Point) -> bool {
    let local = polygon
        .vertex_transform(Affine::IDENTITY)
        .scene_to_local(scene);
    if polygon.set_point(handle.index, local).is_err() {
        return false;
    }
    polygon.mark_dirty();
    polygon.set_coords();
    true
}

/// The handle nearest to a display-space point, within `radius`.
pub fn hit_test_handle(
    handles: &[VertexHandle],
    polygon: &Polygon,
    viewport: Affine,
    display: Point,
    radius: f64,
) -> Option<VertexHandle> {
    handles
        .iter()
        .filter_map(|handle| {
            let position = handle_position(handle, polygon, viewport)?;
            let dist_sq = (position - display).hypot2();
            (dist_sq <= radius * radius).then_some((*handle, dist_sq))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(handle, _)| handle)
}

/// Per-vertex editing of one label's polygon.
#[derive(Debug, Clone)]
pub struct EditSession {
    label: LabelId,
    polygon: ObjectId,
    dragging: Option<VertexHandle>,
}

impl EditSession {
    /// Enable vertex editing on a polygon.
    ///
    /// Returns `None` (and changes nothing) if the polygon is not on the
    /// surface.
    pub fn begin<S: Surface>(label: LabelId, polygon_id: ObjectId, surface: &mut S) -> Option<Self> {
        let polygon = surface.polygon_mut(polygon_id)?;
        polygon.set_interactive(true);
        polygon.has_borders = false;
        polygon.has_controls = true;
        let count = polygon.len();

        surface.set_controls(polygon_id, VertexHandle::for_polygon(polygon_id, count));
        surface.set_active_object(Some(polygon_id));
        surface.request_render();
        log::debug!("Editing label {} with {} vertex handles", label, count);

        Some(Self {
            label,
            polygon: polygon_id,
            dragging: None,
        })
    }

    /// Remove the handles and make the polygon inert again.
    pub fn end<S: Surface>(self, surface: &mut S) {
        if let Some(polygon) = surface.polygon_mut(self.polygon) {
            polygon.set_interactive(false);
            polygon.has_borders = false;
            polygon.has_controls = false;
        }
        surface.clear_controls(self.polygon);
        if surface.active_object() == Some(self.polygon) {
            surface.set_active_object(None);
        }
        surface.request_render();
    }

    pub fn label(&self) -> LabelId {
        self.label
    }

    pub fn polygon(&self) -> ObjectId {
        self.polygon
    }

    /// Index of the vertex being dragged.
    pub fn dragging(&self) -> Option<usize> {
        self.dragging.map(|h| h.index)
    }

    /// Grab the handle under the pointer, if any. Returns true if grabbed.
    pub fn pointer_down<S: Surface>(&mut self, surface: &S, event: &PointerEvent, hit_radius: f64) -> bool {
        let Some(polygon) = surface.polygon(self.polygon) else {
            return false;
        };
        if !polygon.evented {
            return false;
        }

        let viewport = surface.viewport_transform();
        let display = viewport * surface.pointer(event);
        self.dragging = hit_test_handle(
            surface.controls(self.polygon),
            polygon,
            viewport,
            display,
            hit_radius,
        );
        self.dragging.is_some()
    }

    /// Continue a drag. Every move rewrites the vertex.
    pub fn pointer_move<S: Surface>(&mut self, surface: &mut S, event: &PointerEvent) -> bool {
        let Some(handle) = self.dragging else {
            return false;
        };
        let scene = surface.pointer(event);
        let Some(polygon) = surface.polygon_mut(handle.owner) else {
            self.dragging = None;
            return false;
        };
        let moved = drag_vertex(&handle, polygon, scene);
        if moved {
            surface.request_render();
        }
        moved
    }

    /// Release the dragged handle. Returns true if a drag was in progress.
    pub fn pointer_up(&mut self) -> bool {
        self.dragging.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::PolygonStyle;
    use crate::surface::{MemorySurface, SurfaceObject};
    use kurbo::{Size, Vec2};

    fn triangle() -> Polygon {
        Polygon::new(
            vec![
                Point::new(100.0, 100.0),
                Point::new(200.0, 100.0),
                Point::new(200.0, 200.0),
            ],
            PolygonStyle::label(),
        )
        .non_interactive()
    }

    fn approx(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn test_handle_position_identity() {
        let polygon = triangle();
        let handle = VertexHandle::new(ObjectId::nil(), 1);
        let position = handle_position(&handle, &polygon, Affine::IDENTITY).unwrap();
        assert!(approx(position, Point::new(200.0, 100.0)));
    }

    #[test]
    fn test_handle_position_applies_viewport_and_object() {
        let mut polygon = triangle();
        polygon.set_position(Point::new(160.0, 150.0));
        let handle = VertexHandle::new(ObjectId::nil(), 0);
        let position = handle_position(&handle, &polygon, Affine::scale(2.0)).unwrap();
        assert!(approx(position, Point::new(220.0, 200.0)));
    }

    #[test]
    fn test_handle_position_out_of_range() {
        let handle = VertexHandle::new(ObjectId::nil(), 7);
        assert!(handle_position(&handle, &triangle(), Affine::IDENTITY).is_none());
    }

    #[test]
    fn test_drag_changes_only_target_vertex() {
        let mut polygon = triangle();
        let before = polygon.points().to_vec();
        polygon.clear_dirty();

        let handle = VertexHandle::new(ObjectId::nil(), 2);
        assert!(drag_vertex(&handle, &mut polygon, Point::new(180.0, 260.0)));

        assert!(approx(polygon.points()[2], Point::new(180.0, 260.0)));
        assert_eq!(polygon.points()[0], before[0]);
        assert_eq!(polygon.points()[1], before[1]);
        assert!(polygon.is_dirty());
        assert!((polygon.bounds().y1 - 260.0).abs() < 1e-9);
    }

    #[test]
    fn test_drag_on_moved_polygon_lands_under_pointer() {
        let mut polygon = triangle();
        polygon.set_position(Point::new(150.0, 150.0) + Vec2::new(30.0, 0.0));
        polygon.set_angle(0.5);
        let handle = VertexHandle::new(ObjectId::nil(), 0);
        let target = Point::new(90.0, 140.0);

        assert!(drag_vertex(&handle, &mut polygon, target));
        let shown = handle_position(&handle, &polygon, Affine::IDENTITY).unwrap();
        assert!(approx(shown, target));
    }

    #[test]
    fn test_drag_out_of_range_is_rejected() {
        let mut polygon = triangle();
        let handle = VertexHandle::new(ObjectId::nil(), 3);
        assert!(!drag_vertex(&handle, &mut polygon, Point::ZERO));
    }

    #[test]
    fn test_glyph_has_constant_pixel_radius() {
        let style = HandleStyle::default();
        let handle = VertexHandle::new(ObjectId::nil(), 0);
        let glyph = handle.glyph(Point::new(10.0, 10.0), &style);
        assert!((glyph.circle.radius - 3.0).abs() < f64::EPSILON);
        assert_eq!(glyph.fill, style.fill);
        assert_ne!(glyph.fill, PolygonStyle::label().fill.unwrap());
    }

    #[test]
    fn test_hit_test_handle_picks_nearest() {
        let polygon = triangle();
        let handles = VertexHandle::for_polygon(ObjectId::nil(), 3);
        let hit = hit_test_handle(&handles, &polygon, Affine::IDENTITY, Point::new(198.0, 103.0), 6.0);
        assert_eq!(hit.map(|h| h.index), Some(1));
        let miss = hit_test_handle(&handles, &polygon, Affine::IDENTITY, Point::new(150.0, 150.0), 6.0);
        assert!(miss.is_none());
    }

    #[test]
    fn test_session_begin_and_end() {
        let mut surface = MemorySurface::new(Size::new(512.0, 512.0));
        let id = surface.add_object(SurfaceObject::Polygon(triangle()));

        let session = EditSession::begin(LabelId::new(1), id, &mut surface).unwrap();
        let polygon = surface.polygon(id).unwrap();
        assert!(polygon.is_interactive());
        assert!(!polygon.has_borders);
        assert_eq!(surface.controls(id).len(), 3);
        assert_eq!(surface.active_object(), Some(id));

        session.end(&mut surface);
        assert!(!surface.polygon(id).unwrap().is_interactive());
        assert!(surface.controls(id).is_empty());
        assert_eq!(surface.active_object(), None);
    }

    #[test]
    fn test_flags_after_edit_match_committed() {
        let mut surface = MemorySurface::new(Size::new(512.0, 512.0));
        let id = surface.add_object(SurfaceObject::Polygon(triangle()));
        let committed = surface.polygon(id).unwrap().clone();

        let session = EditSession::begin(LabelId::new(1), id, &mut surface).unwrap();
        assert!(surface.polygon(id).unwrap().has_controls);
        session.end(&mut surface);

        let after = surface.polygon(id).unwrap();
        assert_eq!(after.selectable, committed.selectable);
        assert_eq!(after.evented, committed.evented);
        assert_eq!(after.has_borders, committed.has_borders);
        assert_eq!(after.has_controls, committed.has_controls);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "non-invertible")]
    fn test_drag_on_collapsed_polygon_panics() {
        let mut polygon = triangle();
        polygon.set_scale(Vec2::ZERO);
        let handle = VertexHandle::new(ObjectId::nil(), 0);
        drag_vertex(&handle, &mut polygon, Point::new(10.0, 10.0));
    }

    #[test]
    fn test_glyph_colors_convert() {
        let style = HandleStyle::default();
        let glyph = VertexHandle::new(ObjectId::nil(), 0).glyph(Point::ZERO, &style);
        assert_eq!(SerializableColor::from(glyph.fill_color()), style.fill);
        assert_eq!(SerializableColor::from(glyph.stroke_color()), style.stroke);
    }

    #[test]
    fn test_session_begin_without_polygon() {
        let mut surface = MemorySurface::new(Size::new(512.0, 512.0));
        assert!(EditSession::begin(LabelId::new(1), ObjectId::nil(), &mut surface).is_none());
        assert_eq!(surface.render_requests(), 0);
    }

    #[test]
    fn test_session_drag_is_continuous() {
        let mut surface = MemorySurface::new(Size::new(512.0, 512.0));
        surface.set_viewport_transform(Affine::scale(2.0));
        let id = surface.add_object(SurfaceObject::Polygon(triangle()));
        let mut session = EditSession::begin(LabelId::new(1), id, &mut surface).unwrap();

        // Vertex 0 at scene (100, 100) is displayed at (200, 200).
        assert!(session.pointer_down(&surface, &PointerEvent::down((201.0, 199.0)), 6.0));
        assert_eq!(session.dragging(), Some(0));

        assert!(session.pointer_move(&mut surface, &PointerEvent::moved((180.0, 200.0))));
        assert!(approx(surface.polygon(id).unwrap().points()[0], Point::new(90.0, 100.0)));
        assert!(session.pointer_move(&mut surface, &PointerEvent::moved((160.0, 200.0))));
        assert!(approx(surface.polygon(id).unwrap().points()[0], Point::new(80.0, 100.0)));

        assert!(session.pointer_up());
        assert!(!session.pointer_move(&mut surface, &PointerEvent::moved((0.0, 0.0))));
        assert!(approx(surface.polygon(id).unwrap().points()[0], Point::new(80.0, 100.0)));
    }
}
