//! Headless Polymark host.
//!
//! Replays a scripted annotation session against a [`MemorySurface`] and
//! reports the resulting labels.

use kurbo::{Affine, Point, Size};
use peniko::Color;
use polymark_core::{
    ConfigError, EngineConfig, KeyEvent, LabelId, LabelManager, MemorySurface, PointerEvent,
    SurfaceEvent,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Replay errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Unknown label: {0}")]
    UnknownLabel(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Invalid options: {0}")]
    Invalid(String),
}

/// Result type for replay operations.
pub type ReplayResult<T> = Result<T, ReplayError>;

/// One host action. Pointer positions are display pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    StartDrawing,
    StopDrawing,
    Down { x: f64, y: f64 },
    Up { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Key { key: String },
    /// Edit a label by display name.
    Edit { label: String },
    /// Delete a label by display name.
    Delete { label: String },
    /// Edit the topmost label under a display position, or stop editing if
    /// there is none.
    EditAt { x: f64, y: f64 },
}

/// Parse a script: a JSON array of steps.
pub fn parse_script(json: &str) -> ReplayResult<Vec<Step>> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_script(path: impl AsRef<Path>) -> ReplayResult<Vec<Step>> {
    let json = std::fs::read_to_string(path)?;
    parse_script(&json)
}

/// Surface setup for a replay. Pointer positions outside `size` are clamped
/// to the surface edge.
#[derive(Debug, Clone)]
pub struct ReplayOptions {
    pub size: Size,
    pub zoom: f64,
    pub config: EngineConfig,
}

impl ReplayOptions {
    /// Reject a surface or zoom that would make pointer mapping degenerate.
    pub fn validate(&self) -> ReplayResult<()> {
        let lengths = [
            ("width", self.size.width),
            ("height", self.size.height),
            ("zoom", self.zoom),
        ];
        if let Some((name, value)) = lengths
            .iter()
            .find(|(_, value)| !value.is_finite() || *value <= 0.0)
        {
            return Err(ReplayError::Invalid(format!(
                "{name} must be a finite, positive number (got {value})"
            )));
        }
        Ok(())
    }
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            size: Size::new(1024.0, 768.0),
            zoom: 1.0,
            config: EngineConfig::default(),
        }
    }
}

/// A committed label as reported after replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelReport {
    pub id: u64,
    pub name: String,
    /// Scene-space vertices.
    pub points: Vec<Point>,
    pub area: f64,
    /// Closed outline as SVG path data.
    pub outline: String,
    pub stroke: String,
    pub fill: Option<String>,
}

/// A visible vertex handle, in display pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandleReport {
    pub index: usize,
    pub center: Point,
    pub radius: f64,
    pub fill: String,
    pub stroke: String,
}

/// State of the session after the last step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub labels: Vec<LabelReport>,
    /// Name of the label being edited.
    pub editing: Option<String>,
    /// Handles of the label being edited.
    pub handles: Vec<HandleReport>,
}

impl Report {
    pub fn to_json(&self, compact: bool) -> ReplayResult<String> {
        let json = if compact {
            serde_json::to_string(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };
        Ok(json)
    }
}

/// Drives a [`LabelManager`] step by step.
pub struct Replay {
    manager: LabelManager<MemorySurface>,
}

impl Replay {
    pub fn new(options: ReplayOptions) -> ReplayResult<Self> {
        options.validate()?;
        let mut surface = MemorySurface::new(options.size);
        surface.set_viewport_transform(Affine::scale(options.zoom));
        Ok(Self {
            manager: LabelManager::new(surface, options.config),
        })
    }

    pub fn manager(&self) -> &LabelManager<MemorySurface> {
        &self.manager
    }

    /// Apply one step. Naming a label that does not exist is an error.
    pub fn apply(&mut self, step: &Step) -> ReplayResult<()> {
        log::debug!("Replaying {:?}", step);
        match step {
            Step::StartDrawing => self.manager.set_adding_label(true),
            Step::StopDrawing => self.manager.set_adding_label(false),
            Step::Down { x, y } => self.send(PointerEvent::down((*x, *y))),
            Step::Up { x, y } => self.send(PointerEvent::up((*x, *y))),
            Step::Move { x, y } => self.send(PointerEvent::moved((*x, *y))),
            Step::Key { key } => self.send(KeyEvent::Pressed(key.clone())),
            Step::Edit { label } => {
                let id = self.resolve(label)?;
                self.manager.request_edit(id);
            }
            Step::Delete { label } => {
                let id = self.resolve(label)?;
                self.manager.delete_label(id);
            }
            Step::EditAt { x, y } => {
                self.manager.edit_at(Point::new(*x, *y));
            }
        }
        for notification in self.manager.drain_notifications() {
            log::debug!("{:?}", notification);
        }
        Ok(())
    }

    pub fn run(&mut self, steps: &[Step]) -> ReplayResult<()> {
        steps.iter().try_for_each(|step| self.apply(step))
    }

    pub fn report(&self) -> Report {
        let labels = self
            .manager
            .labels()
            .into_iter()
            .filter_map(|summary| {
                let polygon = self.manager.polygon(summary.id)?;
                Some(LabelReport {
                    id: summary.id.get(),
                    name: summary.name,
                    points: polygon.scene_points(),
                    area: polygon.area(),
                    outline: polygon.to_path().to_svg(),
                    stroke: css_hex(polygon.style.stroke_color()),
                    fill: polygon.style.fill_color().map(css_hex),
                })
            })
            .collect();

        let editing = self.manager.editing().and_then(|id| self.manager.label(id));
        let handles = editing
            .map(|label| {
                self.manager
                    .surface()
                    .handle_glyphs(label.polygon(), &self.manager.config().handle)
                    .into_iter()
                    .map(|glyph| HandleReport {
                        index: glyph.index,
                        center: glyph.circle.center,
                        radius: glyph.circle.radius,
                        fill: css_hex(glyph.fill_color()),
                        stroke: css_hex(glyph.stroke_color()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Report {
            labels,
            editing: editing.map(|label| label.name().to_string()),
            handles,
        }
    }

    fn send(&mut self, event: impl Into<SurfaceEvent>) {
        self.manager.handle_event(&event.into());
    }

    fn resolve(&self, name: &str) -> ReplayResult<LabelId> {
        self.manager
            .label_by_name(name)
            .map(|label| label.id())
            .ok_or_else(|| ReplayError::UnknownLabel(name.to_string()))
    }
}

/// `#rrggbbaa` form of a color.
pub fn css_hex(color: Color) -> String {
    let rgba = color.to_rgba8();
    format!("#{:02x}{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b, rgba.a)
}

/// Replay a whole script and report the final state.
pub fn replay(steps: &[Step], options: ReplayOptions) -> ReplayResult<Report> {
    let mut replay = Replay::new(options)?;
    replay.run(steps)?;
    let report = replay.report();
    log::info!("Replayed {} steps, {} labels", steps.len(), report.labels.len());
    Ok(report)
}
