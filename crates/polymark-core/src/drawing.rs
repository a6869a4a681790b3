//! Interactive polygon drawing.
//!
//! A [`DrawingSession`] turns a sequence of pointer clicks into a polygon:
//!
//! ```text
//! Idle --press--> Placing --release--> Tracing --close/confirm--> Committed
//!   \________________\_____________________\-----deactivate-----> Cancelled
//! ```
//!
//! The first press records point 0, the following release records point 1,
//! then every press adds a point until one lands within the closure radius
//! of point 0 or the confirm key is pressed.

use crate::config::EngineConfig;
use crate::geometry;
use crate::input::{KeyEvent, PointerEvent, SurfaceEvent};
use crate::polygon::Polygon;
use crate::style::PolygonStyle;
use crate::surface::{GuideLine, KeyboardSource, Listeners, ObjectId, Surface, SurfaceObject};
use kurbo::Point;

/// State of a drawing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawingState {
    /// Activated, no point yet.
    #[default]
    Idle,
    /// First point recorded, waiting for the release that places the second.
    Placing,
    /// Two or more points recorded; live preview follows the pointer.
    Tracing,
    /// Finished; the polygon is on the surface.
    Committed,
    /// Torn down before finishing.
    Cancelled,
}

impl DrawingState {
    /// Whether the session still accepts input.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Idle | Self::Placing | Self::Tracing)
    }
}

/// Result of feeding one event to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawingStep {
    /// The event did not apply in the current state.
    Ignored,
    /// Points, guide lines or preview changed.
    Updated,
    /// The polygon was committed to the surface under this id.
    Finished(ObjectId),
}

/// One activation of drawing mode.
#[derive(Debug)]
pub struct DrawingSession {
    state: DrawingState,
    points: Vec<Point>,
    guide_lines: Vec<ObjectId>,
    preview: Option<ObjectId>,
    listeners: Option<Listeners>,
    closure_radius: f64,
    confirm_key: String,
    guide_style: PolygonStyle,
    preview_style: PolygonStyle,
    label_style: PolygonStyle,
}

impl DrawingSession {
    /// Start a session, attaching pointer and key listeners.
    pub fn activate<S: Surface + KeyboardSource>(surface: &mut S, config: &EngineConfig) -> Self {
        log::debug!("Drawing session activated");
        Self {
            state: DrawingState::Idle,
            points: Vec::new(),
            guide_lines: Vec::new(),
            preview: None,
            listeners: Some(Listeners::attach(surface)),
            closure_radius: config.closure_radius,
            confirm_key: config.confirm_key.clone(),
            guide_style: config.guide_style.clone(),
            preview_style: config.preview_style.clone(),
            label_style: config.label_style.clone(),
        }
    }

    pub fn state(&self) -> DrawingState {
        self.state
    }

    /// Recorded points (not including the pointer preview).
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Guide segments currently on the surface.
    pub fn guide_lines(&self) -> &[ObjectId] {
        &self.guide_lines
    }

    /// Preview polygon currently on the surface.
    pub fn preview(&self) -> Option<ObjectId> {
        self.preview
    }

    /// Whether the session still holds its event listeners.
    pub fn is_listening(&self) -> bool {
        self.listeners.is_some()
    }

    /// Dispatch a raw event. Events arriving after the listeners were
    /// released, and non-primary buttons, are ignored.
    pub fn handle_event<S: Surface + KeyboardSource>(
        &mut self,
        surface: &mut S,
        event: &SurfaceEvent,
    ) -> DrawingStep {
        if !self.is_listening() {
            return DrawingStep::Ignored;
        }

        match event {
            SurfaceEvent::Pointer(pointer) if pointer.is_primary() => {
                let position = surface.pointer(pointer);
                match pointer {
                    PointerEvent::Down { .. } => self.handle_pointer_down(surface, position),
                    PointerEvent::Up { .. } => self.handle_pointer_up(surface, position),
                    PointerEvent::Move { .. } => self.handle_pointer_move(surface, position),
                }
            }
            SurfaceEvent::Pointer(_) => DrawingStep::Ignored,
            SurfaceEvent::Key(KeyEvent::Pressed(key)) => self.handle_key(surface, key),
            SurfaceEvent::Key(KeyEvent::Released(_)) => DrawingStep::Ignored,
        }
    }

    /// Pointer press at a scene-space position.
    pub fn handle_pointer_down<S: Surface + KeyboardSource>(
        &mut self,
        surface: &mut S,
        position: Point,
    ) -> DrawingStep {
        match self.state {
            DrawingState::Idle => {
                self.points.push(position);
                self.state = DrawingState::Placing;
                log::debug!("First point placed at ({}, {})", position.x, position.y);
                DrawingStep::Updated
            }
            DrawingState::Tracing => {
                let first = self.points[0];
                if geometry::distance(position, first) < self.closure_radius {
                    // A two-point trace cannot close into a polygon yet.
                    if self.points.len() < 3 {
                        return DrawingStep::Ignored;
                    }
                    return self.finish(surface);
                }
                self.push_point(surface, position);
                DrawingStep::Updated
            }
            DrawingState::Placing | DrawingState::Committed | DrawingState::Cancelled => {
                DrawingStep::Ignored
            }
        }
    }

    /// Pointer release at a scene-space position.
    pub fn handle_pointer_up<S: Surface>(&mut self, surface: &mut S, position: Point) -> DrawingStep {
        if self.state != DrawingState::Placing {
            return DrawingStep::Ignored;
        }
        // A click without a drag releases on the first point: not a vertex.
        if position == self.points[0] {
            return DrawingStep::Ignored;
        }

        self.push_point(surface, position);
        self.state = DrawingState::Tracing;
        log::debug!("Tracing started");
        DrawingStep::Updated
    }

    /// Pointer move at a scene-space position: refresh the live preview.
    pub fn handle_pointer_move<S: Surface>(&mut self, surface: &mut S, position: Point) -> DrawingStep {
        if self.state != DrawingState::Tracing {
            return DrawingStep::Ignored;
        }

        self.remove_preview(surface);
        let mut candidate = self.points.clone();
        candidate.push(position);
        let preview = Polygon::new(candidate, self.preview_style.clone()).non_interactive();
        self.preview = Some(surface.add_object(SurfaceObject::Polygon(preview)));
        surface.request_render();
        DrawingStep::Updated
    }

    /// Key press: the confirm key finishes a polygon of three or more points.
    pub fn handle_key<S: Surface + KeyboardSource>(&mut self, surface: &mut S, key: &str) -> DrawingStep {
        if key != self.confirm_key || self.state != DrawingState::Tracing || self.points.len() < 3 {
            return DrawingStep::Ignored;
        }
        self.finish(surface)
    }

    /// Tear the session down without committing. Uncommitted geometry is
    /// discarded. Safe to call in any state.
    pub fn deactivate<S: Surface + KeyboardSource>(&mut self, surface: &mut S) {
        self.release_listeners(surface);
        if !self.state.is_active() {
            return;
        }

        self.clear_artifacts(surface);
        self.points.clear();
        self.state = DrawingState::Cancelled;
        surface.request_render();
        log::debug!("Drawing session cancelled");
    }

    fn push_point<S: Surface>(&mut self, surface: &mut S, position: Point) {
        if let Some(&last) = self.points.last() {
            let guide = GuideLine::new(last, position, self.guide_style.clone());
            self.guide_lines
                .push(surface.add_object(SurfaceObject::GuideLine(guide)));
        }
        self.points.push(position);
    }

    fn finish<S: Surface + KeyboardSource>(&mut self, surface: &mut S) -> DrawingStep {
        self.clear_artifacts(surface);

        let points = std::mem::take(&mut self.points);
        let count = points.len();
        debug_assert!(count >= 3, "finishing a polygon with {count} points");
        let polygon = Polygon::new(points, self.label_style.clone()).non_interactive();
        let id = surface.add_object(SurfaceObject::Polygon(polygon));
        surface.request_render();

        self.state = DrawingState::Committed;
        self.release_listeners(surface);
        log::debug!("Polygon finished with {} points", count);
        DrawingStep::Finished(id)
    }

    fn remove_preview<S: Surface>(&mut self, surface: &mut S) {
        if let Some(id) = self.preview.take() {
            surface.remove_object(id);
        }
    }

    fn clear_artifacts<S: Surface>(&mut self, surface: &mut S) {
        for id in self.guide_lines.drain(..) {
            surface.remove_object(id);
        }
        self.remove_preview(surface);
    }

    fn release_listeners<S: Surface + KeyboardSource>(&mut self, surface: &mut S) {
        if let Some(listeners) = self.listeners.take() {
            listeners.release(surface);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurface;
    use kurbo::Size;

    fn setup() -> (MemorySurface, DrawingSession) {
        let mut surface = MemorySurface::new(Size::new(512.0, 512.0));
        let session = DrawingSession::activate(&mut surface, &EngineConfig::default());
        (surface, session)
    }

    fn click<S: Surface + KeyboardSource>(session: &mut DrawingSession, surface: &mut S, p: Point) -> DrawingStep {
        let step = session.handle_event(surface, &PointerEvent::down(p).into());
        if let DrawingStep::Finished(_) = step {
            return step;
        }
        session.handle_event(surface, &PointerEvent::up(p).into());
        step
    }

    /// Press at the start, release elsewhere: the usual way to begin a trace.
    fn start_trace(session: &mut DrawingSession, surface: &mut MemorySurface) {
        session.handle_event(surface, &PointerEvent::down((100.0, 100.0)).into());
        session.handle_event(surface, &PointerEvent::up((200.0, 100.0)).into());
    }

    #[test]
    fn test_activation_attaches_listeners() {
        let (surface, session) = setup();
        assert_eq!(session.state(), DrawingState::Idle);
        assert!(session.is_listening());
        assert!(surface.has_listeners());
        assert_eq!(surface.key_listener_count(), 1);
    }

    #[test]
    fn test_press_places_first_point() {
        let (mut surface, mut session) = setup();
        let step = session.handle_pointer_down(&mut surface, Point::new(10.0, 10.0));
        assert_eq!(step, DrawingStep::Updated);
        assert_eq!(session.state(), DrawingState::Placing);
        assert_eq!(session.points(), &[Point::new(10.0, 10.0)]);
    }

    #[test]
    fn test_click_without_drag_stays_placing() {
        let (mut surface, mut session) = setup();
        click(&mut session, &mut surface, Point::new(10.0, 10.0));
        assert_eq!(session.state(), DrawingState::Placing);
        assert_eq!(session.points().len(), 1);
        assert_eq!(surface.guide_line_count(), 0);

        // A second press while placing is not a vertex either.
        session.handle_pointer_down(&mut surface, Point::new(50.0, 50.0));
        assert_eq!(session.points().len(), 1);
    }

    #[test]
    fn test_release_places_second_point_with_guide() {
        let (mut surface, mut session) = setup();
        start_trace(&mut session, &mut surface);
        assert_eq!(session.state(), DrawingState::Tracing);
        assert_eq!(session.points(), &[Point::new(100.0, 100.0), Point::new(200.0, 100.0)]);
        assert_eq!(session.guide_lines().len(), 1);
        assert_eq!(surface.guide_line_count(), 1);
    }

    #[test]
    fn test_click_adds_point_and_guide() {
        let (mut surface, mut session) = setup();
        start_trace(&mut session, &mut surface);
        click(&mut session, &mut surface, Point::new(200.0, 200.0));
        assert_eq!(session.points().len(), 3);
        assert_eq!(surface.guide_line_count(), 2);
    }

    #[test]
    fn test_preview_replaces_previous_and_keeps_points() {
        let (mut surface, mut session) = setup();
        start_trace(&mut session, &mut surface);

        session.handle_event(&mut surface, &PointerEvent::moved((150.0, 180.0)).into());
        let first_preview = session.preview().unwrap();
        session.handle_event(&mut surface, &PointerEvent::moved((160.0, 190.0)).into());
        let second_preview = session.preview().unwrap();

        assert_ne!(first_preview, second_preview);
        assert!(!surface.contains_object(first_preview));
        let preview = surface.polygon(second_preview).unwrap();
        assert_eq!(preview.len(), 3);
        assert!(!preview.evented);
        assert_eq!(session.points().len(), 2);
    }

    #[test]
    fn test_move_before_tracing_has_no_preview() {
        let (mut surface, mut session) = setup();
        session.handle_pointer_down(&mut surface, Point::new(10.0, 10.0));
        assert_eq!(
            session.handle_pointer_move(&mut surface, Point::new(20.0, 20.0)),
            DrawingStep::Ignored
        );
        assert!(session.preview().is_none());
    }

    #[test]
    fn test_closure_click_finishes() {
        let (mut surface, mut session) = setup();
        start_trace(&mut session, &mut surface);
        click(&mut session, &mut surface, Point::new(200.0, 200.0));
        session.handle_event(&mut surface, &PointerEvent::moved((120.0, 150.0)).into());

        let step = click(&mut session, &mut surface, Point::new(104.0, 97.0));
        let DrawingStep::Finished(id) = step else {
            panic!("expected the closure click to finish, got {step:?}");
        };

        let polygon = surface.polygon(id).unwrap();
        assert_eq!(
            polygon.points(),
            &[
                Point::new(100.0, 100.0),
                Point::new(200.0, 100.0),
                Point::new(200.0, 200.0)
            ]
        );
        assert!(!polygon.selectable);
        assert!(!polygon.evented);
        assert_eq!(session.state(), DrawingState::Committed);
        assert!(session.points().is_empty());
        assert!(session.guide_lines().is_empty());
        assert!(session.preview().is_none());
        assert_eq!(surface.guide_line_count(), 0);
        assert_eq!(surface.polygon_ids(), vec![id]);
        assert!(!surface.has_listeners());
    }

    #[test]
    fn test_closure_click_with_two_points_is_ignored() {
        let (mut surface, mut session) = setup();
        start_trace(&mut session, &mut surface);
        let step = session.handle_pointer_down(&mut surface, Point::new(101.0, 101.0));
        assert_eq!(step, DrawingStep::Ignored);
        assert_eq!(session.state(), DrawingState::Tracing);
        assert_eq!(session.points().len(), 2);
    }

    #[test]
    fn test_click_at_exact_radius_adds_point() {
        let (mut surface, mut session) = setup();
        start_trace(&mut session, &mut surface);
        click(&mut session, &mut surface, Point::new(200.0, 200.0));
        let step = session.handle_pointer_down(&mut surface, Point::new(110.0, 100.0));
        assert_eq!(step, DrawingStep::Updated);
        assert_eq!(session.points().len(), 4);
    }

    #[test]
    fn test_confirm_key_requires_three_points() {
        let (mut surface, mut session) = setup();
        start_trace(&mut session, &mut surface);
        let step = session.handle_event(&mut surface, &KeyEvent::Pressed("Enter".into()).into());
        assert_eq!(step, DrawingStep::Ignored);
        assert_eq!(session.state(), DrawingState::Tracing);

        click(&mut session, &mut surface, Point::new(200.0, 200.0));
        let step = session.handle_event(&mut surface, &KeyEvent::Pressed("Enter".into()).into());
        assert!(matches!(step, DrawingStep::Finished(_)));
    }

    #[test]
    fn test_other_keys_ignored() {
        let (mut surface, mut session) = setup();
        start_trace(&mut session, &mut surface);
        click(&mut session, &mut surface, Point::new(200.0, 200.0));
        let step = session.handle_event(&mut surface, &KeyEvent::Pressed("Escape".into()).into());
        assert_eq!(step, DrawingStep::Ignored);
        let step = session.handle_event(&mut surface, &KeyEvent::Released("Enter".into()).into());
        assert_eq!(step, DrawingStep::Ignored);
    }

    #[test]
    fn test_secondary_button_ignored() {
        let (mut surface, mut session) = setup();
        let event = PointerEvent::Down {
            position: Point::new(5.0, 5.0),
            button: crate::input::MouseButton::Right,
        };
        assert_eq!(session.handle_event(&mut surface, &event.into()), DrawingStep::Ignored);
        assert_eq!(session.state(), DrawingState::Idle);
    }

    #[test]
    fn test_deactivate_discards_partial_geometry() {
        let (mut surface, mut session) = setup();
        start_trace(&mut session, &mut surface);
        click(&mut session, &mut surface, Point::new(200.0, 200.0));
        session.handle_pointer_move(&mut surface, Point::new(150.0, 150.0));

        session.deactivate(&mut surface);
        assert_eq!(session.state(), DrawingState::Cancelled);
        assert!(session.points().is_empty());
        assert!(surface.is_empty());
        assert!(!surface.has_listeners());

        // Events after teardown do nothing.
        let step = session.handle_event(&mut surface, &PointerEvent::down((1.0, 1.0)).into());
        assert_eq!(step, DrawingStep::Ignored);
    }

    #[test]
    fn test_deactivate_after_commit_keeps_polygon() {
        let (mut surface, mut session) = setup();
        start_trace(&mut session, &mut surface);
        click(&mut session, &mut surface, Point::new(200.0, 200.0));
        session.handle_key(&mut surface, "Enter");

        session.deactivate(&mut surface);
        assert_eq!(session.state(), DrawingState::Committed);
        assert_eq!(surface.polygon_ids().len(), 1);
    }

    #[test]
    fn test_custom_closure_radius() {
        let mut surface = MemorySurface::new(Size::new(512.0, 512.0));
        let config = EngineConfig {
            closure_radius: 2.0,
            ..EngineConfig::default()
        };
        let mut session = DrawingSession::activate(&mut surface, &config);
        start_trace(&mut session, &mut surface);
        click(&mut session, &mut surface, Point::new(200.0, 200.0));
        assert_eq!(
            session.handle_pointer_down(&mut surface, Point::new(105.0, 100.0)),
            DrawingStep::Updated
        );
        assert!(matches!(
            session.handle_pointer_down(&mut surface, Point::new(101.0, 100.0)),
            DrawingStep::Finished(_)
        ));
    }
}
