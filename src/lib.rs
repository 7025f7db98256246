#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod diagram;
pub mod error;
pub mod geometry;
pub mod index;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod node;
pub mod parser;
pub mod text_metrics;
pub mod theme;
pub mod viewport;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, ViewportConfig, load_config};
pub use diagram::{Diagram, ResolvedEdge};
pub use error::{DiagramError, FocusError, ParseError};
pub use geometry::{Orientation, Point, Rect, Size, ViewTransform};
pub use index::GraphIndex;
pub use node::{CollapseTransition, Edge, Node};
pub use parser::{parse_and_prepare, parse_graph};
pub use text_metrics::{FixedMeasurer, FontMeasurer, LabelMeasurer};
pub use theme::Theme;
pub use viewport::{Focus, TransformLog, TransformSink, Viewport};

/// Parse `input` and build a diagram measured with the configured theme font.
pub fn build_diagram(input: &str, config: &Config) -> Result<Diagram, ParseError> {
    Diagram::parse(
        input,
        Box::new(FontMeasurer::new(&config.theme)),
        config.layout.clone(),
    )
}
