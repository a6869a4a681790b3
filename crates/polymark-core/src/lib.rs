//! Polymark Core Library
//!
//! Polygon annotation engine: trace polygons on a host surface, commit them as
//! named labels, drag their vertices and delete them.

pub mod config;
pub mod drawing;
pub mod edit;
pub mod geometry;
pub mod input;
pub mod manager;
pub mod polygon;
pub mod registry;
pub mod style;
pub mod surface;

pub use config::{ConfigError, ConfigResult, EngineConfig};
pub use drawing::{DrawingSession, DrawingState, DrawingStep};
pub use edit::{EditSession, HandleGlyph, VertexHandle};
pub use geometry::VertexTransform;
pub use input::{KeyEvent, MouseButton, PointerEvent, PointerEventKind, SurfaceEvent};
pub use manager::{LabelManager, Notification};
pub use polygon::{GeometryError, GeometryResult, Polygon};
pub use registry::{Label, LabelId, LabelRegistry, LabelSummary};
pub use style::{HandleStyle, PolygonStyle, SerializableColor};
pub use surface::{
    GuideLine, KeyboardSource, ListenerId, Listeners, MemorySurface, ObjectId, Surface, SurfaceObject,
};
