//! Drawing surface abstraction consumed by the engine.
//!
//! The host owns the real rendering surface. The engine only needs to place
//! and remove objects, translate pointer positions, register for events and
//! attach per-vertex handles to a polygon.

mod memory;

pub use memory::MemorySurface;

use crate::edit::VertexHandle;
use crate::input::{PointerEvent, PointerEventKind};
use crate::polygon::Polygon;
use crate::style::PolygonStyle;
use kurbo::{Affine, Line, Point, Rect};
use uuid::Uuid;

/// Unique identifier for objects placed on a surface.
pub type ObjectId = Uuid;

/// A straight guide segment shown while tracing a polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct GuideLine {
    pub line: Line,
    pub style: PolygonStyle,
}

impl GuideLine {
    pub fn new(start: Point, end: Point, style: PolygonStyle) -> Self {
        Self {
            line: Line::new(start, end),
            style,
        }
    }
}

/// Anything the engine draws on a surface.
#[derive(Debug, Clone)]
pub enum SurfaceObject {
    GuideLine(GuideLine),
    Polygon(Polygon),
}

impl SurfaceObject {
    pub fn as_polygon(&self) -> Option<&Polygon> {
        match self {
            Self::Polygon(p) => Some(p),
            Self::GuideLine(_) => None,
        }
    }

    pub fn as_polygon_mut(&mut self) -> Option<&mut Polygon> {
        match self {
            Self::Polygon(p) => Some(p),
            Self::GuideLine(_) => None,
        }
    }

    pub fn is_guide_line(&self) -> bool {
        matches!(self, Self::GuideLine(_))
    }

    /// Scene-space bounds.
    pub fn bounds(&self) -> Rect {
        match self {
            Self::GuideLine(g) => Rect::from_points(g.line.p0, g.line.p1),
            Self::Polygon(p) => p.bounds(),
        }
    }
}

/// Token returned when registering for events; used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A drawing surface.
pub trait Surface {
    /// Place an object on top of the z-order.
    fn add_object(&mut self, object: SurfaceObject) -> ObjectId;

    /// Remove an object. Its controls and active selection go with it.
    fn remove_object(&mut self, id: ObjectId) -> Option<SurfaceObject>;

    fn object(&self, id: ObjectId) -> Option<&SurfaceObject>;

    fn object_mut(&mut self, id: ObjectId) -> Option<&mut SurfaceObject>;

    fn contains_object(&self, id: ObjectId) -> bool {
        self.object(id).is_some()
    }

    fn polygon(&self, id: ObjectId) -> Option<&Polygon> {
        self.object(id).and_then(SurfaceObject::as_polygon)
    }

    fn polygon_mut(&mut self, id: ObjectId) -> Option<&mut Polygon> {
        self.object_mut(id).and_then(SurfaceObject::as_polygon_mut)
    }

    /// Translate a raw pointer event into scene coordinates.
    fn pointer(&self, event: &PointerEvent) -> Point;

    /// Scene → display transform (pan/zoom).
    fn viewport_transform(&self) -> Affine;

    /// Register interest in one kind of pointer event.
    fn listen(&mut self, kind: PointerEventKind) -> ListenerId;

    fn unlisten(&mut self, id: ListenerId);

    /// Schedule a redraw.
    fn request_render(&mut self);

    fn active_object(&self) -> Option<ObjectId>;

    fn set_active_object(&mut self, id: Option<ObjectId>);

    /// Install per-vertex handles on an object, replacing any existing ones.
    fn set_controls(&mut self, id: ObjectId, handles: Vec<VertexHandle>);

    fn clear_controls(&mut self, id: ObjectId);

    fn controls(&self, id: ObjectId) -> &[VertexHandle];
}

/// Document-scope keyboard events (the confirm key).
pub trait KeyboardSource {
    fn listen_keys(&mut self) -> ListenerId;

    fn unlisten_keys(&mut self, id: ListenerId);
}

/// Event registrations held for the lifetime of a drawing session.
///
/// Must be handed back through [`Listeners::release`]; dropping it while
/// still attached leaves the surface listening and is logged.
#[must_use]
#[derive(Debug, Default)]
pub struct Listeners {
    pointer: Vec<ListenerId>,
    keys: Option<ListenerId>,
}

impl Listeners {
    /// Register pointer-down/up/move and key-down listeners.
    pub fn attach<S: Surface + KeyboardSource>(surface: &mut S) -> Self {
        let pointer = [
            PointerEventKind::Down,
            PointerEventKind::Up,
            PointerEventKind::Move,
        ]
        .into_iter()
        .map(|kind| surface.listen(kind))
        .collect();
        let keys = Some(surface.listen_keys());
        Self { pointer, keys }
    }

    /// Unregister everything.
    pub fn release<S: Surface + KeyboardSource>(mut self, surface: &mut S) {
        for id in self.pointer.drain(..) {
            surface.unlisten(id);
        }
        if let Some(id) = self.keys.take() {
            surface.unlisten_keys(id);
        }
    }

    pub fn is_attached(&self) -> bool {
        !self.pointer.is_empty() || self.keys.is_some()
    }
}

impl Drop for Listeners {
    fn drop(&mut self) {
        if self.is_attached() {
            log::warn!("Event listeners dropped without being released");
        }
    }
}
