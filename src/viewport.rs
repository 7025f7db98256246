//! Camera over the diagram: focus a node and its neighbourhood, zoom, reset.
//!
//! Transforms are computed here and handed to a [`TransformSink`]; applying
//! or animating them is the host's business.

use crate::config::ViewportConfig;
use crate::diagram::Diagram;
use crate::error::FocusError;
use crate::geometry::{Point, Rect, Size, ViewTransform, bounding_box, fit_transform};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

/// Element name the viewport transform is applied to.
pub const CANVAS_ELEMENT: &str = "canvas";

/// Receiver of computed transforms, keyed by element id.
pub trait TransformSink {
    fn apply_transform(&mut self, element: &str, transform: ViewTransform);
}

/// Sink that records every transform it receives.
#[derive(Debug, Clone, Default)]
pub struct TransformLog {
    pub applied: Vec<(String, ViewTransform)>,
}

impl TransformSink for TransformLog {
    fn apply_transform(&mut self, element: &str, transform: ViewTransform) {
        self.applied.push((element.to_string(), transform));
    }
}

/// Result of a focus request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Focus {
    pub target: String,
    /// Target followed by its immediate parents and children.
    pub neighbors: Vec<String>,
    /// Nodes whose boxes were framed. A neighbour hidden by a collapsed
    /// ancestor is represented by that ancestor.
    pub framed: Vec<String>,
    /// Padded bounding box, in the orientation's axis order.
    pub bounds: Rect,
    pub transform: ViewTransform,
}

/// Compute the transform framing `id` and its neighbours. The scale is not
/// limited to the zoom extent.
pub fn compute_focus(diagram: &Diagram, id: &str, config: &ViewportConfig) -> Result<Focus, FocusError> {
    let neighbors = diagram
        .index()
        .neighbors(id)
        .ok_or_else(|| FocusError::TargetNotFound(id.to_string()))?;

    let mut framed: Vec<&str> = Vec::with_capacity(neighbors.len());
    for neighbor in &neighbors {
        let Some(anchor) = diagram.visible_anchor(neighbor) else {
            continue;
        };
        if !framed.contains(&anchor.id()) {
            framed.push(anchor.id());
        }
    }

    let boxes = framed.iter().filter_map(|id| {
        let rect = diagram.absolute_rect(id)?;
        Some((rect.center(), Size::new(rect.width, rect.height)))
    });
    let bounds = bounding_box(boxes, config.orientation)
        .ok_or_else(|| FocusError::TargetNotFound(id.to_string()))?
        .pad(config.focus_padding);
    let transform = fit_transform(&bounds, config.size(), config.orientation);
    tracing::debug!(node = id, framed = framed.len(), scale = transform.scale, "focus computed");

    Ok(Focus {
        target: id.to_string(),
        neighbors: neighbors.iter().map(|s| s.to_string()).collect(),
        framed: framed.iter().map(|s| s.to_string()).collect(),
        bounds,
        transform,
    })
}

#[derive(Debug, Clone)]
pub struct Viewport {
    config: ViewportConfig,
    transform: ViewTransform,
    last_focus: Option<Focus>,
}

impl Viewport {
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            config,
            transform: ViewTransform::IDENTITY,
            last_focus: None,
        }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn last_focus(&self) -> Option<&Focus> {
        self.last_focus.as_ref()
    }

    /// Frame `id` and its neighbours. On error the current transform is kept.
    pub fn focus(&mut self, diagram: &Diagram, id: &str) -> Result<Focus, FocusError> {
        let focus = compute_focus(diagram, id, &self.config)?;
        self.transform = focus.transform;
        self.last_focus = Some(focus.clone());
        Ok(focus)
    }

    /// Like [`Viewport::focus`], then hand the transform to `sink`. The sink
    /// is not called when the target is missing.
    pub fn focus_with(
        &mut self,
        diagram: &Diagram,
        id: &str,
        sink: &mut dyn TransformSink,
    ) -> Result<Focus, FocusError> {
        let focus = self.focus(diagram, id)?;
        sink.apply_transform(CANVAS_ELEMENT, focus.transform);
        Ok(focus)
    }

    /// Focus the first node carrying `label`, in traversal order.
    pub fn focus_by_label(&mut self, diagram: &Diagram, label: &str) -> Result<Focus, FocusError> {
        let id = diagram
            .all_nodes(false)
            .into_iter()
            .find(|node| node.label() == label)
            .map(|node| node.id().to_string())
            .ok_or_else(|| FocusError::LabelNotFound(label.to_string()))?;
        self.focus(diagram, &id)
    }

    pub fn focus_random<R: Rng + ?Sized>(&mut self, diagram: &Diagram, rng: &mut R) -> Result<Focus, FocusError> {
        let id = diagram
            .index()
            .ids()
            .choose(rng)
            .cloned()
            .ok_or(FocusError::EmptyGraph)?;
        self.focus(diagram, &id)
    }

    pub fn zoom_in(&mut self) -> ViewTransform {
        self.scale_by(self.config.zoom_in_factor)
    }

    pub fn zoom_out(&mut self) -> ViewTransform {
        self.scale_by(self.config.zoom_out_factor)
    }

    /// Scale about the viewport centre, clamped to the zoom extent.
    pub fn scale_by(&mut self, factor: f32) -> ViewTransform {
        let scale = (self.transform.scale * factor).clamp(self.config.min_scale, self.config.max_scale);
        let center = Point::new(self.config.width / 2.0, self.config.height / 2.0);
        let anchor = self.transform.invert(center);
        self.transform = ViewTransform {
            translate_x: center.x - anchor.x * scale,
            translate_y: center.y - anchor.y * scale,
            scale,
        };
        self.transform
    }

    pub fn reset(&mut self) -> ViewTransform {
        self.transform = ViewTransform::IDENTITY;
        self.last_focus = None;
        self.transform
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::geometry::Orientation;
    use crate::text_metrics::FixedMeasurer;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn diagram(input: &str) -> Diagram {
        // Small glyphs so declared 10x10 leaves are not grown to fit labels.
        Diagram::parse(input, Box::new(FixedMeasurer::new(1.0, 2.0)), LayoutConfig::default()).unwrap()
    }

    const PAIR: &str = r#"{
        nodes: [
          { id: "A", label: "A", x: 0, y: 0, width: 10, height: 10 },
          { id: "B", label: "B", x: 20, y: 0, width: 10, height: 10, parentIds: ["A"] },
          { id: "C", label: "C", x: 500, y: 500, width: 10, height: 10 },
        ],
    }"#;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    fn config() -> ViewportConfig {
        ViewportConfig {
            width: 100.0,
            height: 100.0,
            ..ViewportConfig::default()
        }
    }

    #[test]
    fn focus_frames_target_and_neighbor() {
        let diagram = diagram(PAIR);
        let mut viewport = Viewport::new(config());
        let focus = viewport.focus(&diagram, "A").unwrap();
        assert_eq!(focus.neighbors, vec!["A", "B"]);
        assert!(approx(focus.bounds.width, 30.0 + 4.0));
        assert!(approx(focus.bounds.height, 10.0 + 4.0));
        assert!(approx(focus.bounds.x, -7.0));
        assert!(approx(focus.bounds.y, -7.0));
        let scale = (100.0f32 / 34.0).min(100.0 / 14.0);
        assert!(approx(focus.transform.scale, scale));
        assert!(approx(focus.transform.translate_x, 50.0 - scale * 10.0));
        assert!(approx(focus.transform.translate_y, 50.0));
        assert_eq!(viewport.transform(), focus.transform);
    }

    #[test]
    fn horizontal_focus_swaps_axes() {
        let diagram = diagram(PAIR);
        let config = ViewportConfig {
            orientation: Orientation::Horizontal,
            ..config()
        };
        let focus = compute_focus(&diagram, "A", &config).unwrap();
        // Centres are read as (y, x): both at 0 on the first axis, 0 and 20 on the second.
        assert!(approx(focus.bounds.width, 10.0 + 4.0));
        assert!(approx(focus.bounds.height, 30.0 + 4.0));
        let scale = focus.transform.scale;
        assert!(approx(focus.transform.translate_x, 50.0 - scale * 10.0));
        assert!(approx(focus.transform.translate_y, 50.0));
    }

    #[test]
    fn unknown_target_applies_nothing() {
        let diagram = diagram(PAIR);
        let mut viewport = Viewport::new(config());
        let mut log = TransformLog::default();
        let err = viewport.focus_with(&diagram, "missing", &mut log).unwrap_err();
        assert_eq!(err, FocusError::TargetNotFound("missing".to_string()));
        assert!(log.applied.is_empty());
        assert_eq!(viewport.transform(), ViewTransform::IDENTITY);
    }

    #[test]
    fn focus_with_hands_transform_to_sink() {
        let diagram = diagram(PAIR);
        let mut viewport = Viewport::new(config());
        let mut log = TransformLog::default();
        let focus = viewport.focus_with(&diagram, "C", &mut log).unwrap();
        assert_eq!(log.applied, vec![(CANVAS_ELEMENT.to_string(), focus.transform)]);
        assert_eq!(focus.neighbors, vec!["C"]);
    }

    #[test]
    fn hidden_neighbors_frame_their_collapsed_ancestor() {
        let diagram = diagram(
            r#"{
                nodes: [
                  { id: "g", label: "G", "type": "group", x: 0, y: 0, children: [ { id: "inner", label: "I" } ] },
                  { id: "src", label: "S", x: 300, y: 0 },
                ],
                edges: [ { source: "src", target: "inner" } ],
            }"#,
        );
        let mut diagram = diagram;
        diagram.set_collapsed("g", true).unwrap();
        let focus = compute_focus(&diagram, "src", &config()).unwrap();
        assert_eq!(focus.neighbors, vec!["src", "inner"]);
        assert_eq!(focus.framed, vec!["src", "g"]);
    }

    #[test]
    fn focus_by_label_and_random() {
        let diagram = diagram(PAIR);
        let mut viewport = Viewport::new(config());
        assert_eq!(viewport.focus_by_label(&diagram, "B").unwrap().target, "B");
        assert_eq!(
            viewport.focus_by_label(&diagram, "nope").unwrap_err(),
            FocusError::LabelNotFound("nope".to_string())
        );
        let mut rng = StdRng::seed_from_u64(7);
        let focus = viewport.focus_random(&diagram, &mut rng).unwrap();
        assert!(["A", "B", "C"].contains(&focus.target.as_str()));
    }

    #[test]
    fn random_focus_on_empty_graph_fails() {
        let diagram = diagram("{ nodes: [] }");
        let mut viewport = Viewport::new(config());
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(viewport.focus_random(&diagram, &mut rng), Err(FocusError::EmptyGraph));
    }

    #[test]
    fn zoom_is_clamped_and_reset_returns_to_identity() {
        let mut viewport = Viewport::new(config());
        let zoomed = viewport.zoom_in();
        assert!(approx(zoomed.scale, 1.2));
        // The viewport centre stays put.
        let center = zoomed.apply(Point::new(50.0, 50.0));
        assert!(approx(center.x, 50.0) && approx(center.y, 50.0));
        for _ in 0..5 {
            viewport.zoom_out();
        }
        assert!(approx(viewport.transform().scale, 1.0));
        for _ in 0..100 {
            viewport.zoom_in();
        }
        assert!(approx(viewport.transform().scale, 40.0));
        assert_eq!(viewport.reset(), ViewTransform::IDENTITY);
    }
}
