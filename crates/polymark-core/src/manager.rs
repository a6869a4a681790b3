//! Label manager: the host-facing entry point.
//!
//! Owns the surface, the label registry and at most one drawing session and
//! one edit session. Hosts forward raw events to [`LabelManager::handle_event`]
//! and poll [`LabelManager::drain_notifications`] to refresh their UI.

use crate::config::EngineConfig;
use crate::drawing::{DrawingSession, DrawingState, DrawingStep};
use crate::edit::EditSession;
use crate::input::{PointerEvent, SurfaceEvent};
use crate::polygon::Polygon;
use crate::registry::{Label, LabelId, LabelRegistry, LabelSummary};
use crate::surface::{KeyboardSource, Surface};
use kurbo::Point;

/// Changes a host may want to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// Drawing mode switched on or off.
    DrawingModeChanged(bool),
    LabelCommitted(LabelId),
    LabelEdited(LabelId),
    LabelDeleted(LabelId),
}

/// Coordinates drawing, editing and deletion of polygon labels on a surface.
#[derive(Debug)]
pub struct LabelManager<S: Surface + KeyboardSource> {
    surface: S,
    config: EngineConfig,
    registry: LabelRegistry,
    drawing: Option<DrawingSession>,
    editing: Option<EditSession>,
    notifications: Vec<Notification>,
}

impl<S: Surface + KeyboardSource> LabelManager<S> {
    pub fn new(surface: S, config: EngineConfig) -> Self {
        let registry = LabelRegistry::new(config.label_prefix.clone());
        Self {
            surface,
            config,
            registry,
            drawing: None,
            editing: None,
            notifications: Vec::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether a drawing session is active.
    pub fn is_adding_label(&self) -> bool {
        self.drawing.is_some()
    }

    /// Switch drawing mode. Turning it on while already on, or off while
    /// already off, does nothing.
    pub fn set_adding_label(&mut self, adding: bool) {
        if adding == self.is_adding_label() {
            return;
        }

        if adding {
            self.end_edit();
            self.drawing = Some(DrawingSession::activate(&mut self.surface, &self.config));
            log::info!("Drawing mode on");
        } else {
            if let Some(mut session) = self.drawing.take() {
                session.deactivate(&mut self.surface);
            }
            log::info!("Drawing mode off");
        }
        self.notifications.push(Notification::DrawingModeChanged(adding));
    }

    /// Feed one raw surface event. Returns true if anything changed.
    ///
    /// While drawing, every event goes to the drawing session; otherwise
    /// pointer events drive the active edit session, if any.
    pub fn handle_event(&mut self, event: &SurfaceEvent) -> bool {
        if let Some(session) = self.drawing.as_mut() {
            return match session.handle_event(&mut self.surface, event) {
                DrawingStep::Ignored => false,
                DrawingStep::Updated => true,
                DrawingStep::Finished(polygon) => {
                    let id = self.registry.commit(polygon);
                    if let Some(label) = self.registry.get(id) {
                        log::info!("Committed {} ({})", label.name(), id);
                    }
                    self.notifications.push(Notification::LabelCommitted(id));
                    self.drawing = None;
                    self.notifications.push(Notification::DrawingModeChanged(false));
                    true
                }
            };
        }

        let SurfaceEvent::Pointer(pointer) = event else {
            return false;
        };
        if !pointer.is_primary() {
            return false;
        }
        let Some(session) = self.editing.as_mut() else {
            return false;
        };

        match pointer {
            PointerEvent::Down { .. } => {
                session.pointer_down(&self.surface, pointer, self.config.handle.hit_radius)
            }
            PointerEvent::Move { .. } => {
                let moved = session.pointer_move(&mut self.surface, pointer);
                if moved {
                    self.notifications
                        .push(Notification::LabelEdited(session.label()));
                }
                moved
            }
            PointerEvent::Up { .. } => session.pointer_up(),
        }
    }

    /// Make one label's vertices draggable. Any previous edit session ends
    /// and every other label becomes inert. Ignored while drawing.
    pub fn request_edit(&mut self, id: LabelId) {
        if self.is_adding_label() {
            log::warn!("Edit of label {} requested while drawing", id);
            return;
        }
        self.end_edit();
        for label in self.registry.iter() {
            if let Some(polygon) = self.surface.polygon_mut(label.polygon()) {
                polygon.set_interactive(false);
            }
        }

        let Some(label) = self.registry.get(id) else {
            log::warn!("Edit requested for unknown label {}", id);
            return;
        };
        match EditSession::begin(id, label.polygon(), &mut self.surface) {
            Some(session) => {
                log::info!("Editing {}", label.name());
                self.editing = Some(session);
            }
            None => log::warn!("Label {} has no polygon on the surface", id),
        }
    }

    /// Topmost label whose polygon contains a display-space position.
    /// Later commits sit above earlier ones.
    pub fn label_at(&self, display: Point) -> Option<LabelId> {
        let scene = self.surface.pointer(&PointerEvent::moved(display));
        self.registry
            .iter()
            .rev()
            .find(|label| {
                self.surface
                    .polygon(label.polygon())
                    .is_some_and(|polygon| polygon.contains(scene))
            })
            .map(Label::id)
    }

    /// Edit the label under a display-space position. Pressing on empty
    /// surface ends the current edit session. Ignored while drawing.
    pub fn edit_at(&mut self, display: Point) -> Option<LabelId> {
        if self.is_adding_label() {
            return None;
        }
        match self.label_at(display) {
            Some(id) => {
                self.request_edit(id);
                Some(id)
            }
            None => {
                self.end_edit();
                None
            }
        }
    }

    /// Stop editing, if a session is active.
    pub fn end_edit(&mut self) {
        if let Some(session) = self.editing.take() {
            session.end(&mut self.surface);
        }
    }

    /// Remove a label and its polygon. Unknown ids are ignored.
    pub fn delete_label(&mut self, id: LabelId) {
        let Some(polygon) = self.registry.get(id).map(Label::polygon) else {
            log::debug!("Delete requested for unknown label {}", id);
            return;
        };

        if self.editing.as_ref().is_some_and(|s| s.label() == id) {
            self.end_edit();
        }
        self.surface.clear_controls(polygon);
        self.surface.remove_object(polygon);
        self.surface.request_render();

        if let Some(label) = self.registry.remove(id) {
            log::info!("Deleted {}", label.name());
        }
        self.notifications.push(Notification::LabelDeleted(id));
    }

    /// Labels in commit order.
    pub fn labels(&self) -> Vec<LabelSummary> {
        self.registry.summaries()
    }

    pub fn label(&self, id: LabelId) -> Option<&Label> {
        self.registry.get(id)
    }

    pub fn label_by_name(&self, name: &str) -> Option<&Label> {
        self.registry.get_by_name(name)
    }

    /// Current geometry of a label.
    pub fn polygon(&self, id: LabelId) -> Option<&Polygon> {
        let label = self.registry.get(id)?;
        self.surface.polygon(label.polygon())
    }

    /// Label currently being edited.
    pub fn editing(&self) -> Option<LabelId> {
        self.editing.as_ref().map(EditSession::label)
    }

    /// State of the active drawing session.
    pub fn drawing_state(&self) -> Option<DrawingState> {
        self.drawing.as_ref().map(DrawingSession::state)
    }

    pub fn drawing(&self) -> Option<&DrawingSession> {
        self.drawing.as_ref()
    }

    /// Take all notifications raised since the last call.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}

impl<S: Surface + KeyboardSource> Drop for LabelManager<S> {
    fn drop(&mut self) {
        if let Some(mut session) = self.drawing.take() {
            session.deactivate(&mut self.surface);
        }
    }
}
