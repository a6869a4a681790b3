//! In-memory surface implementation.

use super::{KeyboardSource, ListenerId, ObjectId, Surface, SurfaceObject};
use crate::edit::{HandleGlyph, VertexHandle, handle_position};
use crate::input::{PointerEvent, PointerEventKind};
use crate::style::HandleStyle;
use kurbo::{Affine, Point, Size};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use uuid::Uuid;

/// In-memory surface for testing and headless hosts.
///
/// Keeps objects in z-order, tracks listener registrations and counts redraw
/// requests instead of painting anything.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    size: Size,
    viewport: Affine,
    objects: HashMap<ObjectId, SurfaceObject>,
    /// Back to front.
    z_order: Vec<ObjectId>,
    controls: HashMap<ObjectId, Vec<VertexHandle>>,
    pointer_listeners: BTreeMap<ListenerId, PointerEventKind>,
    key_listeners: BTreeSet<ListenerId>,
    next_listener: u64,
    active: Option<ObjectId>,
    render_requests: usize,
}

impl MemorySurface {
    /// Create an empty surface of the given pixel size.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_viewport_transform(&mut self, viewport: Affine) {
        self.viewport = viewport;
    }

    /// Objects back to front.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &SurfaceObject)> {
        self.z_order
            .iter()
            .filter_map(|id| self.objects.get(id).map(|object| (*id, object)))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn guide_line_count(&self) -> usize {
        self.objects.values().filter(|o| o.is_guide_line()).count()
    }

    pub fn polygon_ids(&self) -> Vec<ObjectId> {
        self.objects()
            .filter(|(_, object)| object.as_polygon().is_some())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn is_listening(&self, kind: PointerEventKind) -> bool {
        self.pointer_listeners.values().any(|k| *k == kind)
    }

    pub fn key_listener_count(&self) -> usize {
        self.key_listeners.len()
    }

    pub fn has_listeners(&self) -> bool {
        !self.pointer_listeners.is_empty() || !self.key_listeners.is_empty()
    }

    pub fn render_requests(&self) -> usize {
        self.render_requests
    }

    /// Render the handles installed on an object, in display space.
    pub fn handle_glyphs(&self, id: ObjectId, style: &HandleStyle) -> Vec<HandleGlyph> {
        let Some(polygon) = self.polygon(id) else {
            return Vec::new();
        };
        self.controls(id)
            .iter()
            .filter_map(|handle| {
                handle_position(handle, polygon, self.viewport)
                    .map(|position| handle.glyph(position, style))
            })
            .collect()
    }

    fn next_listener_id(&mut self) -> ListenerId {
        self.next_listener += 1;
        ListenerId::new(self.next_listener)
    }
}

impl Surface for MemorySurface {
    fn add_object(&mut self, object: SurfaceObject) -> ObjectId {
        let id = Uuid::new_v4();
        self.objects.insert(id, object);
        self.z_order.push(id);
        id
    }

    fn remove_object(&mut self, id: ObjectId) -> Option<SurfaceObject> {
        let object = self.objects.remove(&id)?;
        self.z_order.retain(|&other| other != id);
        self.controls.remove(&id);
        if self.active == Some(id) {
            self.active = None;
        }
        Some(object)
    }

    fn object(&self, id: ObjectId) -> Option<&SurfaceObject> {
        self.objects.get(&id)
    }

    fn object_mut(&mut self, id: ObjectId) -> Option<&mut SurfaceObject> {
        self.objects.get_mut(&id)
    }

    /// Positions outside the surface are clamped to its edge. A surface
    /// without an area accepts any position.
    fn pointer(&self, event: &PointerEvent) -> Point {
        let mut display = event.position();
        if self.size.width > 0.0 && self.size.height > 0.0 {
            display.x = display.x.clamp(0.0, self.size.width);
            display.y = display.y.clamp(0.0, self.size.height);
        }
        self.viewport.inverse() * display
    }

    fn viewport_transform(&self) -> Affine {
        self.viewport
    }

    fn listen(&mut self, kind: PointerEventKind) -> ListenerId {
        let id = self.next_listener_id();
        self.pointer_listeners.insert(id, kind);
        id
    }

    fn unlisten(&mut self, id: ListenerId) {
        self.pointer_listeners.remove(&id);
    }

    fn request_render(&mut self) {
        self.render_requests += 1;
    }

    fn active_object(&self) -> Option<ObjectId> {
        self.active
    }

    fn set_active_object(&mut self, id: Option<ObjectId>) {
        self.active = id.filter(|id| self.objects.contains_key(id));
    }

    fn set_controls(&mut self, id: ObjectId, handles: Vec<VertexHandle>) {
        if self.objects.contains_key(&id) {
            self.controls.insert(id, handles);
        }
    }

    fn clear_controls(&mut self, id: ObjectId) {
        self.controls.remove(&id);
    }

    fn controls(&self, id: ObjectId) -> &[VertexHandle] {
        self.controls.get(&id).map(Vec::as_slice).unwrap_or_default()
    }
}

impl KeyboardSource for MemorySurface {
    fn listen_keys(&mut self) -> ListenerId {
        let id = self.next_listener_id();
        self.key_listeners.insert(id);
        id
    }

    fn unlisten_keys(&mut self, id: ListenerId) {
        self.key_listeners.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::Polygon;
    use crate::style::PolygonStyle;

    fn triangle() -> SurfaceObject {
        SurfaceObject::Polygon(Polygon::new(
            vec![
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(100.0, 100.0),
            ],
            PolygonStyle::label(),
        ))
    }

    #[test]
    fn test_add_remove_object() {
        let mut surface = MemorySurface::new(Size::new(512.0, 512.0));
        let id = surface.add_object(triangle());
        assert!(surface.contains_object(id));
        assert_eq!(surface.polygon_ids(), vec![id]);

        surface.set_active_object(Some(id));
        surface.set_controls(id, VertexHandle::for_polygon(id, 3));

        assert!(surface.remove_object(id).is_some());
        assert!(surface.is_empty());
        assert_eq!(surface.active_object(), None);
        assert!(surface.controls(id).is_empty());
        assert!(surface.remove_object(id).is_none());
    }

    #[test]
    fn test_pointer_applies_inverse_viewport() {
        let mut surface = MemorySurface::new(Size::new(512.0, 512.0));
        surface.set_viewport_transform(Affine::scale(2.0));
        let scene = surface.pointer(&PointerEvent::down((200.0, 100.0)));
        assert!((scene.x - 100.0).abs() < f64::EPSILON);
        assert!((scene.y - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pointer_clamped_to_surface() {
        let mut surface = MemorySurface::new(Size::new(512.0, 256.0));
        assert_eq!(surface.size(), Size::new(512.0, 256.0));
        surface.set_viewport_transform(Affine::scale(2.0));
        let scene = surface.pointer(&PointerEvent::up((600.0, -20.0)));
        assert_eq!(scene, Point::new(256.0, 0.0));

        let unbounded = MemorySurface::default();
        let scene = unbounded.pointer(&PointerEvent::up((600.0, -20.0)));
        assert_eq!(scene, Point::new(600.0, -20.0));
    }

    #[test]
    fn test_listener_bookkeeping() {
        let mut surface = MemorySurface::new(Size::new(512.0, 512.0));
        let down = surface.listen(PointerEventKind::Down);
        let keys = surface.listen_keys();
        assert_ne!(down, keys);
        assert!(surface.has_listeners());

        surface.unlisten(down);
        surface.unlisten_keys(keys);
        assert!(!surface.has_listeners());
    }

    #[test]
    fn test_controls_require_object() {
        let mut surface = MemorySurface::new(Size::new(512.0, 512.0));
        let missing = Uuid::new_v4();
        surface.set_controls(missing, VertexHandle::for_polygon(missing, 3));
        assert!(surface.controls(missing).is_empty());
    }
}
