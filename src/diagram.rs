use crate::config::LayoutConfig;
use crate::error::{DiagramError, ParseError};
use crate::geometry::{Point, Rect, Size, ViewTransform};
use crate::index::{GraphIndex, node_at_path};
use crate::ir::GraphDescription;
use crate::node::{BuildContext, CollapseTransition, Edge, Node};
use crate::parser::{PreparedGraph, parse_and_prepare, prepare_graph};
use crate::text_metrics::LabelMeasurer;
use crate::viewport::TransformSink;

/// An edge with both endpoints looked up.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedEdge<'a> {
    pub edge: &'a Edge,
    pub source: &'a Node,
    pub target: &'a Node,
}

/// A built node forest together with the index answering id queries over it.
pub struct Diagram {
    settings: serde_json::Value,
    roots: Vec<Node>,
    edges: Vec<Edge>,
    index: GraphIndex,
    measurer: Box<dyn LabelMeasurer>,
    config: LayoutConfig,
}

impl Diagram {
    pub fn new(graph: PreparedGraph, measurer: Box<dyn LabelMeasurer>, config: LayoutConfig) -> Self {
        let roots: Vec<Node> = {
            let ctx = BuildContext {
                measurer: measurer.as_ref(),
                config: &config,
            };
            graph
                .roots
                .into_iter()
                .map(|node| Node::build(node, &ctx))
                .collect()
        };
        let index = GraphIndex::build(&roots, &graph.edges);
        tracing::debug!(roots = roots.len(), nodes = index.len(), "diagram built");
        Self {
            settings: graph.settings,
            roots,
            edges: graph.edges,
            index,
            measurer,
            config,
        }
    }

    pub fn from_description(
        graph: GraphDescription,
        measurer: Box<dyn LabelMeasurer>,
        config: LayoutConfig,
    ) -> Result<Self, ParseError> {
        let prepared = prepare_graph(graph, &config)?;
        Ok(Self::new(prepared, measurer, config))
    }

    pub fn parse(input: &str, measurer: Box<dyn LabelMeasurer>, config: LayoutConfig) -> Result<Self, ParseError> {
        let prepared = parse_and_prepare(input, &config)?;
        Ok(Self::new(prepared, measurer, config))
    }

    /// Renderer settings from the input, passed through untouched.
    pub fn settings(&self) -> &serde_json::Value {
        &self.settings
    }

    pub fn roots(&self) -> &[Node] {
        &self.roots
    }

    /// Edges not owned by any container.
    pub fn root_edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn index(&self) -> &GraphIndex {
        &self.index
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Depth-first search over the roots in order.
    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.roots.iter().find_map(|root| root.get_node(id))
    }

    /// Index-backed lookup.
    pub fn node(&self, id: &str) -> Option<&Node> {
        node_at_path(&self.roots, self.index.path(id)?)
    }

    pub fn all_nodes(&self, only_selected: bool) -> Vec<&Node> {
        self.roots
            .iter()
            .flat_map(|root| root.all_nodes(only_selected))
            .collect()
    }

    /// Root edges first, then each root's subtree.
    pub fn all_edges(&self, only_selected: bool) -> Vec<&Edge> {
        let selected = |id: &str| self.node(id).is_some_and(Node::is_selected);
        self.edges
            .iter()
            .filter(|edge| !only_selected || (selected(&edge.source) && selected(&edge.target)))
            .chain(self.roots.iter().flat_map(|root| root.all_edges(only_selected)))
            .collect()
    }

    /// Edges whose endpoints both exist. Unresolvable ones are skipped.
    pub fn resolved_edges(&self) -> Vec<ResolvedEdge<'_>> {
        self.all_edges(false)
            .into_iter()
            .filter_map(|edge| {
                let (Some(source), Some(target)) = (self.node(&edge.source), self.node(&edge.target))
                else {
                    tracing::debug!(source = %edge.source, target = %edge.target, "edge endpoint not constructed");
                    return None;
                };
                Some(ResolvedEdge { edge, source, target })
            })
            .collect()
    }

    /// Centre in graph space: the sum of relative centres along the path.
    pub fn absolute_position(&self, id: &str) -> Option<Point> {
        let path = self.index.path(id)?;
        let mut node = self.roots.get(*path.first()?)?;
        let mut point = node.position();
        for idx in &path[1..] {
            node = node.child(*idx)?;
            point = point.offset(node.position());
        }
        Some(point)
    }

    pub fn absolute_rect(&self, id: &str) -> Option<Rect> {
        let center = self.absolute_position(id)?;
        let node = self.node(id)?;
        Some(Rect::from_center(center, node.size()))
    }

    /// The node itself when visible, otherwise its nearest visible ancestor.
    pub fn visible_anchor(&self, id: &str) -> Option<&Node> {
        let path = self.index.path(id)?;
        let mut node = self.roots.get(*path.first()?)?;
        let mut anchor = node.is_visible().then_some(node);
        for idx in &path[1..] {
            node = node.child(*idx)?;
            if !node.is_visible() {
                break;
            }
            anchor = Some(node);
        }
        anchor
    }

    fn update<R>(&mut self, id: &str, f: impl FnOnce(&mut Node, &BuildContext<'_>) -> R) -> Result<R, DiagramError> {
        let root_idx = self
            .index
            .path(id)
            .and_then(|path| path.first().copied())
            .ok_or_else(|| DiagramError::NodeNotFound(id.to_string()))?;
        let ctx = BuildContext {
            measurer: self.measurer.as_ref(),
            config: &self.config,
        };
        let root = self
            .roots
            .get_mut(root_idx)
            .ok_or_else(|| DiagramError::NodeNotFound(id.to_string()))?;
        root.update(id, |node| f(node, &ctx))
            .ok_or_else(|| DiagramError::NodeNotFound(id.to_string()))
    }

    fn reindex(&mut self) {
        self.index = GraphIndex::build(&self.roots, &self.edges);
    }

    pub fn set_collapsed(&mut self, id: &str, collapsed: bool) -> Result<CollapseTransition, DiagramError> {
        let transition = self.update(id, |node, ctx| node.set_collapsed(collapsed, ctx))??;
        if matches!(transition, CollapseTransition::Expanded { constructed, .. } if constructed > 0) {
            self.reindex();
        }
        Ok(transition)
    }

    pub fn toggle_collapsed(&mut self, id: &str) -> Result<CollapseTransition, DiagramError> {
        let transition = self.update(id, |node, ctx| node.toggle_collapsed(ctx))??;
        if matches!(transition, CollapseTransition::Expanded { constructed, .. } if constructed > 0) {
            self.reindex();
        }
        Ok(transition)
    }

    /// Resize a node (clamped to its minimum) and re-arrange its ancestors.
    pub fn resize_node(&mut self, id: &str, size: Size) -> Result<Size, DiagramError> {
        self.update(id, |node, _| node.resize(size))
    }

    /// Move a node's centre, relative to its parent. Children of containers
    /// are re-placed by the next arrangement of their parent.
    pub fn move_node(&mut self, id: &str, position: Point) -> Result<(), DiagramError> {
        let path_len = self.index.path(id).map(<[usize]>::len).unwrap_or(0);
        if path_len > 1 {
            tracing::debug!(id, "moving a contained node; its parent may re-place it");
        }
        self.node_mut(id)?.set_position(position);
        Ok(())
    }

    /// Flip the selection flag. Positions are left untouched.
    pub fn select(&mut self, id: &str, selected: bool) -> Result<(), DiagramError> {
        self.node_mut(id)?.set_selected(selected);
        Ok(())
    }

    fn node_mut(&mut self, id: &str) -> Result<&mut Node, DiagramError> {
        let root_idx = self.index.path(id).and_then(|path| path.first().copied());
        root_idx
            .and_then(|idx| self.roots.get_mut(idx))
            .and_then(|root| root.get_node_mut(id))
            .ok_or_else(|| DiagramError::NodeNotFound(id.to_string()))
    }

    pub fn clear_selection(&mut self) {
        let ids: Vec<String> = self
            .all_nodes(true)
            .iter()
            .map(|node| node.id().to_string())
            .collect();
        for id in ids {
            if let Err(err) = self.select(&id, false) {
                tracing::warn!(%err, "failed to clear selection");
            }
        }
    }

    /// Hand every visible node's absolute translate to `sink`, in traversal
    /// order.
    pub fn emit_node_transforms(&self, sink: &mut dyn TransformSink) {
        for node in self.all_nodes(false) {
            if !node.is_visible() {
                continue;
            }
            let Some(rect) = self.absolute_rect(node.id()) else {
                continue;
            };
            sink.apply_transform(node.id(), ViewTransform::translate(rect.x, rect.y));
        }
    }
}
